//! Where cases come from.
//!
//! The data source is picked once from the command line and passed to
//! every command. Demo mode serves a built-in set of cases and never
//! touches the network.

use std::path::PathBuf;

use case_catalog_case_models::Case;
use case_catalog_geocoder::service_registry::resolver_settings;
use case_catalog_geocoder::{Address, Coordinate, LocationResolver};

use crate::error::CliError;

/// Categories shown by the catalog, in display order.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Educação",
    "Saúde",
    "Meio Ambiente",
    "Assistência Social",
    "Cultura",
    "Esporte e Lazer",
    "Geração de Renda",
    "Habitação",
];

const DEMO_CASES: &str = include_str!("../data/demo_cases.json");

/// Source of case records for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A JSON file exported from the data store.
    Live {
        /// Path to the JSON array of cases.
        path: PathBuf,
    },
    /// Built-in demo cases.
    Demo,
}

impl DataSource {
    /// `Live` when a path was given, `Demo` otherwise.
    #[must_use]
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Demo, |path| Self::Live { path })
    }

    /// Loads every case from this source.
    ///
    /// # Errors
    ///
    /// * [`CliError::Read`] if the file cannot be read
    /// * [`CliError::Parse`] if the file is not a JSON array of cases
    pub fn load(&self) -> Result<Vec<Case>, CliError> {
        match self {
            Self::Live { path } => {
                let body = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                    path: path.clone(),
                    source,
                })?;
                let cases: Vec<Case> =
                    serde_json::from_str(&body).map_err(|source| CliError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                log::info!("Loaded {} case(s) from {}", cases.len(), path.display());
                Ok(cases)
            }
            Self::Demo => {
                let cases = demo_cases();
                log::info!("Using {} demo case(s)", cases.len());
                Ok(cases)
            }
        }
    }

    /// A resolver suited to this source: HTTP services for live data,
    /// [`LocationResolver::offline`] for the demo.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Geocode`] if the HTTP client cannot be built.
    pub fn resolver(&self) -> Result<LocationResolver, CliError> {
        match self {
            Self::Live { .. } => Ok(LocationResolver::from_registry()?),
            Self::Demo => Ok(LocationResolver::offline(resolver_settings())),
        }
    }
}

/// The built-in demo cases.
///
/// # Panics
///
/// Panics if the embedded demo file is malformed.
#[must_use]
pub fn demo_cases() -> Vec<Case> {
    serde_json::from_str(DEMO_CASES).unwrap_or_else(|e| panic!("Failed to parse demo cases: {e}"))
}

/// The address fields of a case, as the resolver sees them.
#[must_use]
pub fn case_address(case: &Case) -> Address {
    Address {
        postal_code: case.postal_code.clone(),
        neighborhood: case.neighborhood.clone(),
        city: case.city.clone(),
        state: case.state.clone(),
        locality: case.locality.clone(),
        coordinate: case
            .stored_coordinate()
            .map(|(latitude, longitude)| Coordinate::new(latitude, longitude)),
    }
}
