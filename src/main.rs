pub mod types;
pub mod config;
pub mod data;
pub mod processing;
pub mod render;
pub mod export;
pub mod dashboard;
pub mod server;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::dashboard::Dashboard;
use crate::processing::Selection;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the CSV export for a year and set of provinces
    Export {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Directory to write into (defaults to export.out_dir)
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Print the summary metrics and per-province figures
    Summary {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Serve the dashboard API and web page
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Year between 1950 and 2026 (defaults to dashboard.default_year)
    #[arg(short, long)]
    year: Option<i32>,
    /// Comma separated province names (defaults to all five)
    #[arg(short, long)]
    provinces: Option<String>,
}

impl SelectionArgs {
    fn resolve(&self, config: &AppConfig) -> anyhow::Result<Selection> {
        let year = self.year.unwrap_or(config.dashboard.default_year);
        let selection = match &self.provinces {
            Some(list) => Selection::new(year, Selection::parse_provinces(list)?)?,
            None => Selection::all(year)?,
        };
        Ok(selection)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Export { config, selection, out_dir } => {
            let app_config = AppConfig::load_from_file(config)?;
            let selection = selection.resolve(&app_config)?;

            let dash = Dashboard::build(data::dataset(), &selection, &app_config.dashboard);
            let export = dash.csv()?;
            let dir = out_dir.clone().unwrap_or_else(|| app_config.export.out_dir.clone());
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

            let path = dir.join(&export.filename);
            fs::write(&path, &export.bytes)
                .with_context(|| format!("Failed to write export: {:?}", path))?;
            println!(
                "Wrote {:?} ({} provinces, total {})",
                path, dash.metrics.active_provinces, dash.metrics.total_population_display
            );
        }
        Commands::Summary { config, selection } => {
            let app_config = AppConfig::load_from_file(config)?;
            let selection = selection.resolve(&app_config)?;
            let dash = Dashboard::build(data::dataset(), &selection, &app_config.dashboard);

            println!("{}", dash.title);
            println!("{}", dash.subtitle);
            println!("  Total population:  {}", dash.metrics.total_population_display);
            println!("  Active provinces:  {}", dash.metrics.active_provinces);
            println!("  Data source:       {}", dash.metrics.source_label);
            for slice in &dash.pie.slices {
                println!(
                    "  {:<14} {:>12}  {:>5.1}%",
                    slice.province.name(),
                    slice.value,
                    slice.share * 100.0
                );
            }
        }
        Commands::Serve { config } => {
            let app_config = AppConfig::load_from_file(config)?;
            tracing::info!("Serving dashboard with config: {:?}", config);

            // Warm the dataset before taking requests.
            let dataset = data::dataset();
            server::start_server(app_config, dataset).await?;
        }
    }

    Ok(())
}
