#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location resolution for case addresses.
//!
//! Turns a partial Brazilian address into a map position using a fixed
//! chain of strategies (see [`resolver::ResolveStrategy`]):
//!
//! 1. **Stored coordinate**: returned as-is, no network.
//! 2. **Postal code**: ViaCEP lookup, then a Nominatim search built from
//!    the returned street/neighborhood/city/state.
//! 3. **Neighborhood + city**: Nominatim free-text search.
//! 4. **City**: Nominatim free-text search.
//! 5. **Legacy locality**: Nominatim free-text search qualified with the
//!    default region.
//!
//! When every step fails the configured default coordinate is used, so
//! resolution never fails. Neighborhood boundary polygons come from the
//! Overpass API; when none exist the caller draws a circle whose radius
//! is derived from the impacted-people count (see [`radius`]).
//!
//! Services are configured via TOML files in `services/` (see
//! [`service_registry`]).

pub mod address;
pub mod nominatim;
pub mod overpass;
pub mod providers;
pub mod radius;
pub mod resolver;
pub mod service_registry;
pub mod viacep;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use address::Address;
pub use resolver::{CaseLocation, ImpactArea, LocationResolver, Resolution, ResolveStrategy};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both halves are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A closed ring of coordinates outlining one polygon.
///
/// The first point is always repeated as the last point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPolygon {
    points: Vec<Coordinate>,
}

impl BoundaryPolygon {
    /// Builds a ring from an ordered point list, closing it if needed.
    ///
    /// Consecutive repeated points are collapsed. Returns `None` for rings
    /// with fewer than three distinct points (not counting the closing
    /// duplicate) or with non-finite coordinates.
    #[must_use]
    pub fn from_points(mut points: Vec<Coordinate>) -> Option<Self> {
        if points.iter().any(|p| !p.is_finite()) {
            return None;
        }

        points.dedup();

        let first = *points.first()?;
        if points.last() == Some(&first) && points.len() > 1 {
            points.pop();
        }

        if points.len() < 3 {
            return None;
        }

        points.push(first);
        Some(Self { points })
    }

    /// The ring's points, first point repeated at the end.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// `GeoJSON` `Polygon` geometry (`[longitude, latitude]` order).
    #[must_use]
    pub fn to_geojson(&self) -> serde_json::Value {
        let ring: Vec<[f64; 2]> = self
            .points
            .iter()
            .map(|p| [p.longitude, p.latitude])
            .collect();

        serde_json::json!({
            "type": "Polygon",
            "coordinates": [ring],
        })
    }
}

/// A structured address returned by the postal-code service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    /// Street name.
    pub street: Option<String>,
    /// Neighborhood name.
    pub neighborhood: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// State code.
    pub state: Option<String>,
}

/// Errors from geocoding service calls.
///
/// The resolver never returns these to its callers; they are logged and
/// the next strategy is tried.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{service} returned status {status}")]
    Status {
        /// Service that answered.
        service: &'static str,
        /// HTTP status code.
        status: reqwest::StatusCode,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Maps an HTTP status to the error the service clients report:
/// `429` is [`GeocodeError::RateLimited`], any other non-2xx is
/// [`GeocodeError::Status`].
fn check_status(service: &'static str, status: reqwest::StatusCode) -> Result<(), GeocodeError> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    if !status.is_success() {
        return Err(GeocodeError::Status { service, status });
    }

    Ok(())
}
