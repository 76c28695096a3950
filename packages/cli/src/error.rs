use std::path::PathBuf;

use case_catalog_geocoder::GeocodeError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The case file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The case file is not a JSON array of cases.
    #[error("Failed to parse cases in {}: {source}", .path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No case carries the requested id.
    #[error("No case with id {id:?}")]
    UnknownCase {
        /// Requested id.
        id: String,
    },

    /// The geocoding client could not be set up.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}
