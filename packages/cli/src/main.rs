#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for browsing catalog cases.
//!
//! Loads cases from a JSON export (`--data`) or the built-in demo set,
//! then prints per-category statistics, a filtered and paginated listing,
//! or a case's resolved map location as `GeoJSON`.
//!
//! Logging goes through `pretty_env_logger`; set `RUST_LOG=debug` to
//! watch each resolution step.

mod commands;
mod error;
mod source;

use std::path::PathBuf;

use case_catalog_case_models::{FilterCriteria, StatusFilter};
use case_catalog_geocoder::LocationResolver;
use case_catalog_geocoder::service_registry::resolver_settings;
use clap::{Parser, Subcommand};

use crate::source::{DEFAULT_CATEGORIES, DataSource};

// ---------------------------------------------------------------------------
// CLI definitions
// ---------------------------------------------------------------------------

/// Browse, aggregate and locate catalog cases.
#[derive(Parser)]
#[command(name = "case_catalog_cli")]
#[command(about = "Browse, aggregate and locate catalog cases")]
struct Cli {
    /// JSON array of case records. The built-in demo cases are used when
    /// omitted.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show per-category statistics.
    Stats {
        /// Comma-separated categories in display order (default: the
        /// catalog's categories).
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List cases matching the given filters, one page at a time.
    List {
        /// Exact category label.
        #[arg(long)]
        category: Option<String>,

        /// Free-text search over title, description, location and
        /// contributor.
        #[arg(long)]
        query: Option<String>,

        /// Status filter: "active", "ativo", "pausado" or "concluido".
        #[arg(long)]
        status: Option<StatusFilter>,

        /// 1-based page number.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        /// Cases per page.
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        page_size: i64,
    },

    /// Resolve a case's map position and impact area.
    Locate {
        /// Case ID.
        id: String,

        /// Skip external geocoding services even for live data.
        #[arg(long)]
        offline: bool,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let data_source = DataSource::from_path(cli.data);
    let cases = data_source.load()?;

    match cli.command {
        Commands::Stats { categories, json } => {
            let report = if categories.is_empty() {
                commands::stats_report(&cases, DEFAULT_CATEGORIES)
            } else {
                commands::stats_report(&cases, &categories)
            };

            if json {
                println!("{}", commands::to_pretty_json(&report)?);
            } else {
                print!("{}", report.to_table());
            }
        }
        Commands::List {
            category,
            query,
            status,
            page,
            page_size,
        } => {
            let criteria = FilterCriteria {
                category,
                query,
                status,
            };
            let listing = commands::list_cases(&cases, &criteria, page, page_size);
            print!("{}", listing.to_table());
        }
        Commands::Locate { id, offline } => {
            let resolver = if offline {
                LocationResolver::offline(resolver_settings())
            } else {
                data_source.resolver()?
            };

            let (case, location) = commands::locate(&cases, &id, &resolver).await?;
            let geojson = commands::location_to_geojson(&case, &location);
            println!("{}", commands::to_pretty_json(&geojson)?);
        }
    }

    Ok(())
}
