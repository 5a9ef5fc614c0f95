use crate::processing::SelectionError;
use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FIRST_YEAR: i32 = 1950;
pub const LAST_YEAR: i32 = 2026;

/// The five provinces covered by the simulation, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Province {
    #[serde(rename = "Buenos Aires")]
    BuenosAires,
    #[serde(rename = "Córdoba", alias = "Cordoba")]
    Cordoba,
    Mendoza,
    Misiones,
    Chubut,
}

impl Province {
    pub const ALL: [Province; 5] = [
        Province::BuenosAires,
        Province::Cordoba,
        Province::Mendoza,
        Province::Misiones,
        Province::Chubut,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Province::BuenosAires => "Buenos Aires",
            Province::Cordoba => "Córdoba",
            Province::Mendoza => "Mendoza",
            Province::Misiones => "Misiones",
            Province::Chubut => "Chubut",
        }
    }

    /// Population in the anchor year (2026).
    pub fn base_population(self) -> u64 {
        match self {
            Province::BuenosAires => 15_000_000,
            Province::Cordoba => 3_800_000,
            Province::Mendoza => 2_000_000,
            Province::Misiones => 1_300_000,
            Province::Chubut => 600_000,
        }
    }

    pub fn latitude(self) -> f64 {
        match self {
            Province::BuenosAires => -34.6037,
            Province::Cordoba => -31.4135,
            Province::Mendoza => -32.8895,
            Province::Misiones => -27.3671,
            Province::Chubut => -43.3002,
        }
    }

    pub fn longitude(self) -> f64 {
        match self {
            Province::BuenosAires => -58.3816,
            Province::Cordoba => -64.1811,
            Province::Mendoza => -68.8458,
            Province::Misiones => -55.8961,
            Province::Chubut => -65.1023,
        }
    }

    // Plotly's default qualitative palette, so charts match what the renderer would pick.
    pub fn color(self) -> &'static str {
        match self {
            Province::BuenosAires => "#636EFA",
            Province::Cordoba => "#EF553B",
            Province::Mendoza => "#00CC96",
            Province::Misiones => "#AB63FA",
            Province::Chubut => "#FFA15A",
        }
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Province {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cordoba" => Ok(Province::Cordoba),
            _ => Province::ALL
                .into_iter()
                .find(|p| p.name() == s)
                .ok_or_else(|| SelectionError::UnknownProvince(s.to_string())),
        }
    }
}

/// One simulated (province, year) observation.
///
/// Field names double as the CSV export header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Province")]
    pub province: Province,
    #[serde(rename = "Population")]
    pub population: u64,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

impl PopulationRecord {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceInfo {
    pub name: Province,
    pub base_population: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub color: &'static str,
}

impl From<Province> for ProvinceInfo {
    fn from(p: Province) -> Self {
        ProvinceInfo {
            name: p,
            base_population: p.base_population(),
            latitude: p.latitude(),
            longitude: p.longitude(),
            color: p.color(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_names() {
        for p in Province::ALL {
            assert_eq!(p.name().parse::<Province>(), Ok(p));
        }
        assert_eq!("Cordoba".parse::<Province>(), Ok(Province::Cordoba));
        assert_eq!(
            "Salta".parse::<Province>(),
            Err(SelectionError::UnknownProvince("Salta".to_string()))
        );
        assert!("buenos aires".parse::<Province>().is_err());
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Province::Cordoba).unwrap();
        assert_eq!(json, "\"Córdoba\"");
        let back: Province = serde_json::from_str("\"Cordoba\"").unwrap();
        assert_eq!(back, Province::Cordoba);
    }

    #[test]
    fn ordering_follows_enumeration() {
        let mut shuffled = vec![Province::Chubut, Province::BuenosAires, Province::Misiones];
        shuffled.sort();
        assert_eq!(shuffled, vec![Province::BuenosAires, Province::Misiones, Province::Chubut]);
    }
}
