use crate::types::{PopulationRecord, Province, FIRST_YEAR, LAST_YEAR};
use std::sync::OnceLock;

const ANCHOR_YEAR: i32 = 2026;
const YEARLY_RATE: f64 = 0.012;
const MIN_FACTOR: f64 = 0.2;

/// Simulated population of `province` in `year`.
///
/// Linear in the distance from the anchor year, never below 20% of the base.
pub fn simulate_population(province: Province, year: i32) -> u64 {
    let factor = 1.0 + (year as f64 - ANCHOR_YEAR as f64) * YEARLY_RATE;
    (province.base_population() as f64 * factor.max(MIN_FACTOR)) as u64
}

/// Builds the full province x year table, grouped by province then year ascending.
pub fn generate() -> Vec<PopulationRecord> {
    let mut records = Vec::with_capacity(Province::ALL.len() * (LAST_YEAR - FIRST_YEAR + 1) as usize);

    for province in Province::ALL {
        for year in FIRST_YEAR..=LAST_YEAR {
            records.push(PopulationRecord {
                year,
                province,
                population: simulate_population(province, year),
                latitude: province.latitude(),
                longitude: province.longitude(),
            });
        }
    }

    records
}

/// The process-wide dataset, generated on first access.
pub fn dataset() -> &'static [PopulationRecord] {
    static DATASET: OnceLock<Vec<PopulationRecord>> = OnceLock::new();
    DATASET.get_or_init(|| {
        let records = generate();
        tracing::info!(
            "Generated simulated dataset: {} records ({} provinces, {}-{})",
            records.len(),
            Province::ALL.len(),
            FIRST_YEAR,
            LAST_YEAR
        );
        records
    })
}
