//! Service seams used by the resolver.
//!
//! Each external service sits behind a small async trait so the resolver
//! can run against HTTP clients in production, [`Offline`] in demo mode,
//! and stubs in tests.

use std::time::Duration;

use crate::overpass::BoundaryElement;
use crate::service_registry::{GeocodingService, ProviderConfig};
use crate::{Coordinate, GeocodeError, PostalAddress, nominatim, overpass, viacep};

/// Resolves a digits-only postal code to a structured address.
#[async_trait::async_trait]
pub trait PostalCodeLookup: Send + Sync {
    /// Returns `Ok(None)` when the code is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the lookup fails.
    async fn lookup(&self, postal_code: &str) -> Result<Option<PostalAddress>, GeocodeError>;
}

/// Free-text place search.
#[async_trait::async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Returns up to `limit` candidates, best first.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the search fails.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Coordinate>, GeocodeError>;
}

/// Geographic-data query service.
#[async_trait::async_trait]
pub trait BoundaryQuery: Send + Sync {
    /// Server-side timeout to embed in generated queries.
    fn query_timeout_secs(&self) -> u64 {
        25
    }

    /// Runs an Overpass QL query.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the query fails.
    async fn query(&self, ql: &str) -> Result<Vec<BoundaryElement>, GeocodeError>;
}

/// ViaCEP over HTTP.
#[derive(Debug, Clone)]
pub struct ViaCepLookup {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ViaCepLookup {
    /// Creates a lookup against `base_url`.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl PostalCodeLookup for ViaCepLookup {
    async fn lookup(&self, postal_code: &str) -> Result<Option<PostalAddress>, GeocodeError> {
        viacep::lookup(&self.client, &self.base_url, postal_code, self.timeout).await
    }
}

/// Nominatim over HTTP.
#[derive(Debug, Clone)]
pub struct NominatimSearch {
    client: reqwest::Client,
    base_url: String,
    country_codes: String,
    timeout: Duration,
}

impl NominatimSearch {
    /// Creates a search client against `base_url`, restricted to
    /// `country_codes`.
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        country_codes: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            country_codes,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl PlaceSearch for NominatimSearch {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Coordinate>, GeocodeError> {
        nominatim::search(
            &self.client,
            &self.base_url,
            &self.country_codes,
            query,
            limit,
            self.timeout,
        )
        .await
    }
}

/// Overpass over HTTP.
#[derive(Debug, Clone)]
pub struct OverpassBoundaries {
    client: reqwest::Client,
    base_url: String,
    query_timeout_secs: u64,
    timeout: Duration,
}

impl OverpassBoundaries {
    /// Creates a query client against `base_url`.
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        query_timeout_secs: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            query_timeout_secs,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl BoundaryQuery for OverpassBoundaries {
    fn query_timeout_secs(&self) -> u64 {
        self.query_timeout_secs
    }

    async fn query(&self, ql: &str) -> Result<Vec<BoundaryElement>, GeocodeError> {
        overpass::query(&self.client, &self.base_url, ql, self.timeout).await
    }
}

/// A stand-in for every service that never touches the network and never
/// finds anything. Backs demo mode and disabled services.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

#[async_trait::async_trait]
impl PostalCodeLookup for Offline {
    async fn lookup(&self, _postal_code: &str) -> Result<Option<PostalAddress>, GeocodeError> {
        Ok(None)
    }
}

#[async_trait::async_trait]
impl PlaceSearch for Offline {
    async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<Coordinate>, GeocodeError> {
        Ok(Vec::new())
    }
}

#[async_trait::async_trait]
impl BoundaryQuery for Offline {
    async fn query(&self, _ql: &str) -> Result<Vec<BoundaryElement>, GeocodeError> {
        Ok(Vec::new())
    }
}

/// HTTP-backed services built from the registry. Roles whose service is
/// disabled are `None`.
#[derive(Default)]
pub struct HttpServices {
    /// Postal-code lookup.
    pub postal: Option<ViaCepLookup>,
    /// Place search.
    pub search: Option<NominatimSearch>,
    /// Boundary query.
    pub boundaries: Option<OverpassBoundaries>,
}

impl HttpServices {
    /// Builds clients for every service in `services`, sharing `client`.
    #[must_use]
    pub fn from_services(client: &reqwest::Client, services: &[GeocodingService]) -> Self {
        let mut built = Self::default();

        for service in services {
            let base_url = service.base_url();
            let timeout = service.timeout();
            log::debug!("Configuring {} at {base_url}", service.name);

            match &service.provider {
                ProviderConfig::PostalCode { .. } => {
                    built.postal = Some(ViaCepLookup::new(client.clone(), base_url, timeout));
                }
                ProviderConfig::PlaceSearch { country_codes, .. } => {
                    built.search = Some(NominatimSearch::new(
                        client.clone(),
                        base_url,
                        country_codes.clone(),
                        timeout,
                    ));
                }
                ProviderConfig::BoundaryQuery {
                    query_timeout_secs, ..
                } => {
                    built.boundaries = Some(OverpassBoundaries::new(
                        client.clone(),
                        base_url,
                        *query_timeout_secs,
                        timeout,
                    ));
                }
            }
        }

        built
    }
}
