use crate::types::PopulationRecord;
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};

pub fn export_filename(year: i32) -> String {
    format!("population_{}.csv", year)
}

/// Serializes a view as UTF-8 CSV: header row, then one row per record in view order.
pub fn to_csv<'a, I>(view: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a PopulationRecord>,
{
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    let mut rows = 0;

    for record in view {
        wtr.serialize(record)
            .with_context(|| format!("Failed to serialize {} {}", record.province, record.year))?;
        rows += 1;
    }

    // An empty view still gets its header row.
    if rows == 0 {
        wtr.write_record(["Year", "Province", "Population", "Latitude", "Longitude"])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    tracing::debug!("Exported {} rows ({} bytes)", rows, bytes.len());
    Ok(bytes)
}

/// Parses bytes produced by [`to_csv`] back into records.
pub fn from_csv(bytes: &[u8]) -> Result<Vec<PopulationRecord>> {
    let mut rdr = ReaderBuilder::new().from_reader(bytes);
    rdr.deserialize::<PopulationRecord>()
        .map(|row| row.context("Failed to parse CSV row"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate;
    use crate::processing::{filter_by_year, Selection};
    use crate::types::Province;

    #[test]
    fn header_and_row_order() {
        let dataset = generate();
        let view = filter_by_year(&dataset, 2026);
        let csv = String::from_utf8(to_csv(view).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Year,Province,Population,Latitude,Longitude");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "2026,Buenos Aires,15000000,-34.6037,-58.3816");
        assert_eq!(lines[2], "2026,Córdoba,3800000,-31.4135,-64.1811");
        assert_eq!(lines[5], "2026,Chubut,600000,-43.3002,-65.1023");
    }

    #[test]
    fn round_trips_year_view() {
        let dataset = generate();
        let view = filter_by_year(&dataset, 2026);
        let parsed = from_csv(&to_csv(view.iter().copied()).unwrap()).unwrap();

        let original: Vec<PopulationRecord> = view.into_iter().cloned().collect();
        assert_eq!(parsed, original);
    }

    #[test]
    fn output_is_deterministic() {
        let dataset = generate();
        let selection = Selection::new(1975, [Province::Misiones, Province::Chubut]).unwrap();
        let first = to_csv(selection.snapshot_view(&dataset)).unwrap();
        let second = to_csv(selection.snapshot_view(&dataset)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_view_is_header_only() {
        let csv = to_csv(std::iter::empty::<&PopulationRecord>()).unwrap();
        assert_eq!(csv, b"Year,Province,Population,Latitude,Longitude\n");
        assert!(from_csv(&csv).unwrap().is_empty());
    }

    #[test]
    fn filename_embeds_year() {
        assert_eq!(export_filename(1987), "population_1987.csv");
    }
}
