use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sectorkml::config::ExportConfig;
use sectorkml::export::build_document;
use sectorkml::legend::LegendSet;
use sectorkml::mapping::{ColumnMapping, Role};
use sectorkml::table::DataTable;

#[derive(Parser)]
#[command(name = "sectorkml", about = "SectorKML — tabular site data to KML sector maps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the column headers found in a data file
    Columns {
        /// CSV data file with a header row
        data: PathBuf,
    },
    /// Generate a starter configuration: auto-mapped columns and legends
    Init {
        /// CSV data file with a header row
        #[arg(long)]
        data: PathBuf,
        /// Where to write the configuration
        #[arg(long, default_value = "sector_export.json")]
        out: PathBuf,
    },
    /// Rebuild the category legends in a configuration, keeping edited values
    Refresh {
        /// CSV data file with a header row
        #[arg(long)]
        data: PathBuf,
        /// Configuration to update in place
        #[arg(long)]
        config: PathBuf,
    },
    /// Export the KML document
    Export {
        /// CSV data file with a header row
        #[arg(long)]
        data: PathBuf,
        /// Export configuration
        #[arg(long)]
        config: PathBuf,
        /// Output KML path
        #[arg(long, default_value = "sector_category_export.kml")]
        out: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Init structured logging (respects RUST_LOG; defaults to info)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Columns { data } => columns(data),
        Commands::Init { data, out } => init(data, out),
        Commands::Refresh { data, config } => refresh(data, config),
        Commands::Export { data, config, out } => export(data, config, out),
    }
}

fn columns(data: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let table = DataTable::from_path(&data)?;
    for header in table.headers() {
        println!("{header}");
    }
    Ok(())
}

fn init(data: PathBuf, out: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let table = DataTable::from_path(&data)?;
    let mapping = ColumnMapping::auto_map(table.headers());

    for role in Role::REQUIRED {
        match mapping.column_for(role) {
            Some(column) => tracing::info!(role = role.label(), column, "auto-mapped"),
            None => tracing::warn!(
                role = role.label(),
                "no matching header — edit the configuration before exporting"
            ),
        }
    }

    let legends = LegendSet::rebuild(&table, &mapping, &LegendSet::default());
    let config = ExportConfig {
        columns: mapping,
        legends,
        ..Default::default()
    };
    config.save(&out)?;
    tracing::info!(path = %out.display(), "wrote starter configuration");
    Ok(())
}

fn refresh(data: PathBuf, config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let table = DataTable::from_path(&data)?;
    let mut config = ExportConfig::load(&config_path)?;

    let legends = LegendSet::rebuild(&table, &config.columns, &config.legends);
    report_legend(Role::RadiusCategory, &config.columns, legends.radius_value.len());
    report_legend(Role::BeamCategory, &config.columns, legends.beam_value.len());
    report_legend(Role::SiteColor, &config.columns, legends.site_color.len());
    report_legend(Role::SectorColor, &config.columns, legends.sector_color.len());

    config.legends = legends;
    config.save(&config_path)?;
    tracing::info!(path = %config_path.display(), "updated legends");
    Ok(())
}

fn report_legend(role: Role, mapping: &ColumnMapping, categories: usize) {
    match mapping.column_for(role) {
        Some(column) if categories == 0 => {
            tracing::warn!(role = role.label(), column, "mapped column contains no values to map");
        }
        Some(column) => {
            tracing::info!(role = role.label(), column, categories, "rebuilt legend");
        }
        None => {}
    }
}

fn export(data: PathBuf, config_path: PathBuf, out: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let table = DataTable::from_path(&data)?;
    let config = ExportConfig::load(&config_path)?;

    let kml = build_document(&table, &config)?;
    std::fs::write(&out, kml)?;
    tracing::info!(path = %out.display(), "wrote KML document");
    Ok(())
}
