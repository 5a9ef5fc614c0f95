use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

use crate::processing::Selection;
use crate::types::LAST_YEAR;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub default_year: i32,
    pub template: String, // Plotly template name
    pub source_label: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            default_year: LAST_YEAR,
            template: "plotly_dark".to_string(),
            source_label: "Simulación INDEC".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub out_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig { out_dir: PathBuf::from(".") }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("web")
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Selection::all(config.dashboard.default_year)
            .with_context(|| "Invalid dashboard.default_year")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let config = AppConfig::from_toml("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.web_dir, PathBuf::from("web"));
        assert_eq!(config.dashboard.default_year, 2026);
        assert_eq!(config.dashboard.template, "plotly_dark");
        assert_eq!(config.dashboard.source_label, "Simulación INDEC");
        assert_eq!(config.export.out_dir, PathBuf::from("."));
    }

    #[test]
    fn rejects_default_year_outside_range() {
        let err = AppConfig::from_toml("[server]\nport = 1\n[dashboard]\ndefault_year = 1900\n").unwrap_err();
        assert!(format!("{:#}", err).contains("1900"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nhost = \"0.0.0.0\"\nport = 8080\n\n[dashboard]\ndefault_year = 1999\ntemplate = \"plotly_white\""
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.dashboard.default_year, 1999);
        assert_eq!(config.dashboard.template, "plotly_white");
        assert_eq!(config.dashboard.source_label, "Simulación INDEC");
    }

    #[test]
    fn missing_file_has_context() {
        let err = AppConfig::load_from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
