use serde::Serialize;

use crate::table::ObservationTable;

/// One bin of the circular wind histogram.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WindSector {
    pub center_deg: f64,
    pub mean_speed: f64,
    pub mean_gust: f64,
    pub count: usize,
}

/// Bucket wind direction into fixed angular sectors, sector 0 centered on
/// North (0 degrees), aggregating mean WS and WSgust per sector. Rows with a
/// missing direction are ignored; output is ordered by sector index.
pub fn wind_rose(table: &ObservationTable, sectors: usize) -> Vec<WindSector> {
    let width = 360.0 / sectors as f64;
    let direction = table.column("WD").expect("WD column exists");
    let speed = table.column("WS").expect("WS column exists");
    let gust = table.column("WSgust").expect("WSgust column exists");

    let mut counts = vec![0usize; sectors];
    let mut speed_sums = vec![0.0f64; sectors];
    let mut speed_counts = vec![0usize; sectors];
    let mut gust_sums = vec![0.0f64; sectors];
    let mut gust_counts = vec![0usize; sectors];

    for row in 0..table.len() {
        let wd = direction[row];
        if !wd.is_finite() {
            continue;
        }
        let sector = ((wd.rem_euclid(360.0) / width).round() as usize) % sectors;
        counts[sector] += 1;
        if speed[row].is_finite() {
            speed_sums[sector] += speed[row];
            speed_counts[sector] += 1;
        }
        if gust[row].is_finite() {
            gust_sums[sector] += gust[row];
            gust_counts[sector] += 1;
        }
    }

    (0..sectors)
        .map(|i| WindSector {
            center_deg: i as f64 * width,
            mean_speed: if speed_counts[i] > 0 {
                speed_sums[i] / speed_counts[i] as f64
            } else {
                f64::NAN
            },
            mean_gust: if gust_counts[i] > 0 {
                gust_sums[i] / gust_counts[i] as f64
            } else {
                f64::NAN
            },
            count: counts[i],
        })
        .collect()
}
