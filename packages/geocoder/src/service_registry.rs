//! Compile-time registry of geocoding service configurations.
//!
//! Each external service is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`]. Resolver-wide settings
//! (country, default region, default coordinate) come from
//! `services/resolver.toml` via [`resolver_settings`].
//!
//! A service's base URL can be overridden at runtime with
//! `CASE_CATALOG_<ID>_URL` (e.g. `CASE_CATALOG_NOMINATIM_URL`), which is
//! how a self-hosted Nominatim or Overpass instance is plugged in.

use std::time::Duration;

use serde::Deserialize;

use crate::Coordinate;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"viacep"`, `"nominatim"`, `"overpass"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the resolver should call this service. Disabled services
    /// behave as if they never return a result.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// ViaCEP postal code lookup.
    PostalCode {
        /// API base URL (e.g., `"https://viacep.com.br/ws"`).
        base_url: String,
    },
    /// Nominatim free-text place search.
    PlaceSearch {
        /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
        base_url: String,
        /// Comma-separated ISO country codes to restrict results to.
        country_codes: String,
    },
    /// Overpass API query interpreter.
    BoundaryQuery {
        /// Interpreter endpoint (e.g., `"https://overpass-api.de/api/interpreter"`).
        base_url: String,
        /// Server-side `[timeout:N]` placed in each query.
        #[serde(default = "default_query_timeout_secs")]
        query_timeout_secs: u64,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    15
}

const fn default_query_timeout_secs() -> u64 {
    25
}

impl GeocodingService {
    /// Returns the configured base URL regardless of variant.
    #[must_use]
    pub fn configured_base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::PostalCode { base_url }
            | ProviderConfig::PlaceSearch { base_url, .. }
            | ProviderConfig::BoundaryQuery { base_url, .. } => base_url,
        }
    }

    /// Name of the environment variable that overrides the base URL.
    #[must_use]
    pub fn url_override_var(&self) -> String {
        format!("CASE_CATALOG_{}_URL", self.id.to_uppercase())
    }

    /// Base URL to use: the environment override when set and non-empty,
    /// otherwise the configured one.
    #[must_use]
    pub fn base_url(&self) -> String {
        std::env::var(self.url_override_var())
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.configured_base_url().to_string())
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resolver-wide settings loaded from `services/resolver.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResolverSettings {
    /// Country appended to every free-text search.
    pub country: String,
    /// Region used to qualify legacy localities.
    pub default_region: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Results requested per place search.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Coordinate returned when nothing resolves.
    pub default_coordinate: Coordinate,
}

const fn default_search_limit() -> u32 {
    1
}

// ── Compile-time embedded TOML files ────────────────────────────────

/// `(file stem, contents)` for every service. The stem must match the
/// service's `id` so override variables line up with file names.
const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("viacep", include_str!("../services/viacep.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
    ("overpass", include_str!("../services/overpass.toml")),
];

const RESOLVER_TOML: &str = include_str!("../services/resolver.toml");

fn parse_service(file: &str, toml_str: &str) -> GeocodingService {
    toml::de::from_str(toml_str)
        .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{file}': {e}"))
}

/// Returns every configured service, enabled or not, in resolution-role
/// order (postal code, place search, boundary query).
///
/// # Panics
///
/// Panics if an embedded service TOML is malformed.
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(file, toml_str)| parse_service(file, toml_str))
        .collect()
}

/// Returns the services the resolver should call. A role whose service is
/// disabled falls back to an offline stand-in.
///
/// # Panics
///
/// Panics if an embedded service TOML is malformed.
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    retain_enabled(all_services())
}

fn retain_enabled(services: Vec<GeocodingService>) -> Vec<GeocodingService> {
    services
        .into_iter()
        .filter(|service| {
            if !service.enabled {
                log::info!("Geocoding service {} is disabled", service.id);
            }
            service.enabled
        })
        .collect()
}

/// Returns the embedded resolver settings.
///
/// # Panics
///
/// Panics if `resolver.toml` is malformed.
#[must_use]
pub fn resolver_settings() -> ResolverSettings {
    toml::de::from_str(RESOLVER_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse resolver settings: {e}"))
}
