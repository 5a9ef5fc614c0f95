use crate::types::{PopulationRecord, Province};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::MultiPoint;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;

// Geo bubble layout, matching the scatter_geo defaults the page expects.
const MAP_SCOPE: &str = "south america";
const BUBBLE_SIZE_MAX: u32 = 40;
const PIE_HOLE: f64 = 0.4;
const MARKER_DASH: &str = "dash";
const MARKER_COLOR: &str = "yellow";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub province: Province,
    pub year: i32,
    pub lat: f64,
    pub lon: f64,
    pub size: u64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoBubbleSpec {
    pub template: String,
    pub scope: &'static str,
    pub size_max: u32,
    pub bubbles: Vec<Bubble>,
    /// Fit-to-locations box; `None` when there is nothing to show.
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub province: Province,
    pub value: u64,
    pub share: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSpec {
    pub template: String,
    pub hole: f64,
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub population: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub province: Province,
    pub color: &'static str,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerticalMarker {
    pub x: i32,
    pub dash: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSpec {
    pub template: String,
    pub markers: bool,
    pub series: Vec<Series>,
    pub marker: VerticalMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_population: u64,
    pub total_population_display: String,
    pub active_provinces: usize,
    pub source_label: String,
}

pub fn geo_bubbles(view: &[&PopulationRecord], template: &str) -> GeoBubbleSpec {
    let bubbles: Vec<Bubble> = view
        .iter()
        .map(|r| Bubble {
            province: r.province,
            year: r.year,
            lat: r.latitude,
            lon: r.longitude,
            size: r.population,
            color: r.province.color(),
        })
        .collect();

    let points: MultiPoint<f64> = view.iter().map(|r| r.point()).collect::<Vec<_>>().into();
    let bounds = points.bounding_rect().map(|rect| Bounds {
        min_lon: rect.min().x,
        min_lat: rect.min().y,
        max_lon: rect.max().x,
        max_lat: rect.max().y,
    });

    GeoBubbleSpec {
        template: template.to_string(),
        scope: MAP_SCOPE,
        size_max: BUBBLE_SIZE_MAX,
        bubbles,
        bounds,
    }
}

pub fn pie(view: &[&PopulationRecord], template: &str) -> PieSpec {
    let total = total_population(view);
    let slices = group_by_province(view)
        .into_iter()
        .map(|(province, records)| {
            let value: u64 = records.iter().map(|r| r.population).sum();
            Slice {
                province,
                value,
                share: if total == 0 { 0.0 } else { value as f64 / total as f64 },
                color: province.color(),
            }
        })
        .collect();

    PieSpec {
        template: template.to_string(),
        hole: PIE_HOLE,
        slices,
    }
}

/// One line per province over the history view, with a marker at `selected_year`.
pub fn trend(history: &[&PopulationRecord], selected_year: i32, template: &str) -> LineSpec {
    let series = group_by_province(history)
        .into_iter()
        .map(|(province, records)| Series {
            province,
            color: province.color(),
            points: records
                .iter()
                .map(|r| TrendPoint { year: r.year, population: r.population })
                .collect(),
        })
        .collect();

    LineSpec {
        template: template.to_string(),
        markers: true,
        series,
        marker: VerticalMarker {
            x: selected_year,
            dash: MARKER_DASH,
            color: MARKER_COLOR,
        },
    }
}

pub fn summary(view: &[&PopulationRecord], active_provinces: usize, source_label: &str) -> SummaryMetrics {
    let total = total_population(view);
    SummaryMetrics {
        total_population: total,
        total_population_display: with_thousands(total),
        active_provinces,
        source_label: source_label.to_string(),
    }
}

/// The bubble layer as GeoJSON points, for map clients that prefer it.
pub fn bubble_features(view: &[&PopulationRecord]) -> FeatureCollection {
    let features = view
        .iter()
        .map(|r| {
            let mut properties = JsonObject::new();
            properties.insert("province".to_string(), r.province.name().into());
            properties.insert("year".to_string(), r.year.into());
            properties.insert("population".to_string(), r.population.into());
            properties.insert("color".to_string(), r.province.color().into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&r.point()))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn total_population(view: &[&PopulationRecord]) -> u64 {
    view.iter().map(|r| r.population).sum()
}

// Groups keep the order in which provinces first appear in the view.
fn group_by_province<'a>(view: &[&'a PopulationRecord]) -> Vec<(Province, Vec<&'a PopulationRecord>)> {
    let mut groups: Vec<(Province, Vec<&'a PopulationRecord>)> = Vec::new();
    for &record in view {
        match groups.iter_mut().find(|(p, _)| *p == record.province) {
            Some((_, records)) => records.push(record),
            None => groups.push((record.province, vec![record])),
        }
    }
    groups
}

// Same grouping as Python's `{:,}` format: 15000000 -> "15,000,000".
fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
