use crate::config::DashboardConfig;
use crate::export;
use crate::processing::Selection;
use crate::render::{self, GeoBubbleSpec, LineSpec, PieSpec, SummaryMetrics};
use crate::types::{PopulationRecord, Province};
use anyhow::Result;
use serde::Serialize;

pub const TITLE: &str = "Argentine Population Dashboard";

/// Everything the page needs for one state of the controls.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: &'static str,
    pub subtitle: String,
    pub year: i32,
    pub provinces: Vec<Province>,
    pub metrics: SummaryMetrics,
    pub map: GeoBubbleSpec,
    pub pie: PieSpec,
    pub trend: LineSpec,
    pub export_filename: String,
    #[serde(skip)]
    snapshot: Vec<PopulationRecord>,
}

pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Dashboard {
    pub fn build(dataset: &[PopulationRecord], selection: &Selection, settings: &DashboardConfig) -> Self {
        let snapshot = selection.snapshot_view(dataset);
        let history = selection.history_view(dataset);
        let template = settings.template.as_str();

        Dashboard {
            title: TITLE,
            subtitle: format!("General statistics - Year {}", selection.year()),
            year: selection.year(),
            provinces: selection.provinces().iter().copied().collect(),
            metrics: render::summary(&snapshot, selection.provinces().len(), &settings.source_label),
            map: render::geo_bubbles(&snapshot, template),
            pie: render::pie(&snapshot, template),
            trend: render::trend(&history, selection.year(), template),
            export_filename: export::export_filename(selection.year()),
            snapshot: snapshot.into_iter().cloned().collect(),
        }
    }

    /// CSV of the records currently on the map, named for the selected year.
    pub fn csv(&self) -> Result<CsvExport> {
        Ok(CsvExport {
            filename: self.export_filename.clone(),
            bytes: export::to_csv(&self.snapshot)?,
        })
    }
}

/// The export trigger: CSV of the snapshot view plus its download name.
pub fn export_selection(dataset: &[PopulationRecord], selection: &Selection) -> Result<CsvExport> {
    let bytes = export::to_csv(selection.snapshot_view(dataset))?;
    Ok(CsvExport {
        filename: export::export_filename(selection.year()),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset;

    #[test]
    fn default_controls_show_everything() {
        let selection = Selection::all(2026).unwrap();
        let dash = Dashboard::build(dataset(), &selection, &DashboardConfig::default());

        assert_eq!(dash.title, TITLE);
        assert_eq!(dash.subtitle, "General statistics - Year 2026");
        assert_eq!(dash.provinces, Province::ALL.to_vec());
        assert_eq!(dash.metrics.active_provinces, 5);
        assert_eq!(dash.metrics.total_population, 22_700_000);
        assert_eq!(dash.map.bubbles.len(), 5);
        assert_eq!(dash.pie.slices.len(), 5);
        assert_eq!(dash.trend.series.len(), 5);
        assert_eq!(dash.trend.marker.x, 2026);
        assert_eq!(dash.map.template, "plotly_dark");
        assert_eq!(dash.export_filename, "population_2026.csv");
    }

    #[test]
    fn empty_selection_is_a_valid_state() {
        let selection = Selection::new(1960, Vec::new()).unwrap();
        let dash = Dashboard::build(dataset(), &selection, &DashboardConfig::default());

        assert_eq!(dash.metrics.total_population, 0);
        assert_eq!(dash.metrics.active_provinces, 0);
        assert!(dash.map.bubbles.is_empty());
        assert!(dash.pie.slices.is_empty());
        assert!(dash.trend.series.is_empty());
        assert_eq!(dash.trend.marker.x, 1960);

        let csv = export_selection(dataset(), &selection).unwrap();
        assert_eq!(csv.filename, "population_1960.csv");
        assert_eq!(csv.bytes, b"Year,Province,Population,Latitude,Longitude\n");
    }

    #[test]
    fn export_matches_snapshot() {
        let selection = Selection::new(2001, [Province::Mendoza]).unwrap();
        let csv = export_selection(dataset(), &selection).unwrap();
        let rows = export::from_csv(&csv.bytes).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].province, Province::Mendoza);
        assert_eq!(rows[0].year, 2001);
        assert_eq!(rows[0].population, crate::data::simulate_population(Province::Mendoza, 2001));
    }

    #[test]
    fn dashboard_csv_matches_export_trigger() {
        let selection = Selection::new(1977, [Province::BuenosAires, Province::Chubut]).unwrap();
        let dash = Dashboard::build(dataset(), &selection, &DashboardConfig::default());

        let from_dashboard = dash.csv().unwrap();
        let from_trigger = export_selection(dataset(), &selection).unwrap();
        assert_eq!(from_dashboard.filename, "population_1977.csv");
        assert_eq!(from_dashboard.filename, from_trigger.filename);
        assert_eq!(from_dashboard.bytes, from_trigger.bytes);

        let rows = export::from_csv(&from_dashboard.bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().map(|r| r.population).sum::<u64>(), dash.metrics.total_population);
    }

    #[test]
    fn serializes_for_the_page() {
        let selection = Selection::new(1990, [Province::Cordoba]).unwrap();
        let dash = Dashboard::build(dataset(), &selection, &DashboardConfig::default());
        let json = serde_json::to_value(&dash).unwrap();

        assert_eq!(json["provinces"][0], "Córdoba");
        assert_eq!(json["map"]["bubbles"][0]["province"], "Córdoba");
        assert_eq!(json["trend"]["marker"]["color"], "yellow");
        assert_eq!(json["metrics"]["source_label"], "Simulación INDEC");
        assert!(json.get("snapshot").is_none());
    }
}
