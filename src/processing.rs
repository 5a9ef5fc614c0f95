use crate::types::{PopulationRecord, Province, FIRST_YEAR, LAST_YEAR};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Year {0} is outside the supported range 1950-2026")]
    YearOutOfRange(i32),

    #[error("Unknown province: {0}")]
    UnknownProvince(String),
}

/// Records whose year equals `year`, in input order. Unknown years yield nothing.
pub fn filter_by_year(dataset: &[PopulationRecord], year: i32) -> Vec<&PopulationRecord> {
    dataset.iter().filter(|r| r.year == year).collect()
}

/// Records whose province is in `provinces`, in input order.
pub fn filter_by_provinces<'a>(
    dataset: &'a [PopulationRecord],
    provinces: &BTreeSet<Province>,
) -> Vec<&'a PopulationRecord> {
    dataset.iter().filter(|r| provinces.contains(&r.province)).collect()
}

/// Current state of the dashboard controls: one year and a subset of provinces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    year: i32,
    provinces: BTreeSet<Province>,
}

impl Selection {
    pub fn new(year: i32, provinces: impl IntoIterator<Item = Province>) -> Result<Self, SelectionError> {
        if !(FIRST_YEAR..=LAST_YEAR).contains(&year) {
            return Err(SelectionError::YearOutOfRange(year));
        }
        Ok(Selection {
            year,
            provinces: provinces.into_iter().collect(),
        })
    }

    /// Every province selected, which is what the controls start with.
    pub fn all(year: i32) -> Result<Self, SelectionError> {
        Self::new(year, Province::ALL)
    }

    /// Parses a comma separated list of province names.
    ///
    /// Blank entries are skipped, so `""` is the empty selection.
    pub fn parse_provinces(list: &str) -> Result<BTreeSet<Province>, SelectionError> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse::<Province>)
            .collect()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn provinces(&self) -> &BTreeSet<Province> {
        &self.provinces
    }

    /// Year AND province filter, backing the map, pie, metrics and export.
    pub fn snapshot_view<'a>(&self, dataset: &'a [PopulationRecord]) -> Vec<&'a PopulationRecord> {
        filter_by_year(dataset, self.year)
            .into_iter()
            .filter(|r| self.provinces.contains(&r.province))
            .collect()
    }

    /// Province filter only, backing the historical trend.
    pub fn history_view<'a>(&self, dataset: &'a [PopulationRecord]) -> Vec<&'a PopulationRecord> {
        filter_by_provinces(dataset, &self.provinces)
    }
}
