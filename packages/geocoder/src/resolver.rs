//! The location resolution chain.
//!
//! [`LocationResolver`] walks an ordered list of [`ResolveStrategy`]
//! values and stops at the first one that produces a coordinate. Every
//! service error is logged and treated as "no result", and the configured
//! default coordinate backs the whole chain, so resolution never fails.
//!
//! Steps within one resolution run strictly one after another. The
//! resolver keeps no cache and imposes no concurrency limit; callers
//! resolving many cases against public services must pace themselves.

use serde::Serialize;

use crate::address::{
    self, Address, city_query, locality_query, neighborhood_query, normalize_postal_code,
};
use crate::providers::{BoundaryQuery, HttpServices, Offline, PlaceSearch, PostalCodeLookup};
use crate::radius::{CIRCLE_SEGMENTS, fallback_radius_meters, impact_circle};
use crate::service_registry::{self, ResolverSettings};
use crate::{BoundaryPolygon, Coordinate, GeocodeError, overpass};

/// One step of the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStrategy {
    /// Coordinate already stored on the record.
    StoredCoordinate,
    /// Postal-code lookup followed by a place search on its result.
    PostalCode,
    /// `"neighborhood, city[, state], country"` place search.
    Neighborhood,
    /// `"city[, state], country"` place search.
    City,
    /// `"locality, default region, country"` place search.
    Locality,
}

impl ResolveStrategy {
    /// Production priority order.
    pub const DEFAULT_ORDER: &'static [Self] = &[
        Self::StoredCoordinate,
        Self::PostalCode,
        Self::Neighborhood,
        Self::City,
        Self::Locality,
    ];
}

impl std::fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoredCoordinate => write!(f, "stored coordinate"),
            Self::PostalCode => write!(f, "postal code"),
            Self::Neighborhood => write!(f, "neighborhood"),
            Self::City => write!(f, "city"),
            Self::Locality => write!(f, "locality"),
        }
    }
}

/// A resolved coordinate and the step that produced it. `strategy` is
/// `None` when the default coordinate was used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Resolved position.
    pub coordinate: Coordinate,
    /// Step that produced it.
    pub strategy: Option<ResolveStrategy>,
}

impl Resolution {
    /// Whether the default coordinate was used.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.strategy.is_none()
    }
}

/// The area drawn around a case on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImpactArea {
    /// Known neighborhood boundary, one or more polygons.
    Boundary {
        /// Boundary rings.
        polygons: Vec<BoundaryPolygon>,
    },
    /// Circle sized from the impacted-people count.
    Circle {
        /// Radius in meters.
        radius_meters: u32,
        /// Ring approximating the circle.
        ring: Option<BoundaryPolygon>,
    },
}

/// Everything the map needs to draw one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLocation {
    /// Marker position.
    pub resolution: Resolution,
    /// Area to shade.
    pub area: ImpactArea,
}

/// Resolves addresses to coordinates and neighborhood boundaries.
pub struct LocationResolver {
    postal: Box<dyn PostalCodeLookup>,
    search: Box<dyn PlaceSearch>,
    boundaries: Box<dyn BoundaryQuery>,
    settings: ResolverSettings,
    strategies: Vec<ResolveStrategy>,
}

impl LocationResolver {
    /// Creates a resolver over the given services.
    #[must_use]
    pub fn new(
        postal: Box<dyn PostalCodeLookup>,
        search: Box<dyn PlaceSearch>,
        boundaries: Box<dyn BoundaryQuery>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            postal,
            search,
            boundaries,
            settings,
            strategies: ResolveStrategy::DEFAULT_ORDER.to_vec(),
        }
    }

    /// A resolver that never touches the network: stored coordinates are
    /// honoured and everything else falls back to the default.
    #[must_use]
    pub fn offline(settings: ResolverSettings) -> Self {
        Self::new(
            Box::new(Offline),
            Box::new(Offline),
            Box::new(Offline),
            settings,
        )
    }

    /// A resolver over the HTTP services in the embedded registry.
    /// Disabled services are replaced by [`Offline`].
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_registry() -> Result<Self, GeocodeError> {
        let settings = service_registry::resolver_settings();
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()?;

        let HttpServices {
            postal,
            search,
            boundaries,
        } = HttpServices::from_services(&client, &service_registry::enabled_services());

        let postal: Box<dyn PostalCodeLookup> = match postal {
            Some(service) => Box::new(service),
            None => Box::new(Offline),
        };
        let search: Box<dyn PlaceSearch> = match search {
            Some(service) => Box::new(service),
            None => Box::new(Offline),
        };
        let boundaries: Box<dyn BoundaryQuery> = match boundaries {
            Some(service) => Box::new(service),
            None => Box::new(Offline),
        };

        Ok(Self::new(postal, search, boundaries, settings))
    }

    /// Replaces the strategy order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<ResolveStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// The settings in use.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolves `address` to a coordinate. Never fails.
    pub async fn resolve_coordinate(&self, address: &Address) -> Coordinate {
        self.resolve(address).await.coordinate
    }

    /// Resolves `address`, reporting which step succeeded.
    pub async fn resolve(&self, address: &Address) -> Resolution {
        if address.is_empty() {
            log::debug!("Address has no usable field, using default coordinate");
            return self.default_resolution();
        }

        for &strategy in &self.strategies {
            log::debug!("Trying {strategy} for {address:?}");
            if let Some(coordinate) = self.attempt(strategy, address).await {
                log::info!(
                    "Resolved via {strategy}: ({}, {})",
                    coordinate.latitude,
                    coordinate.longitude
                );
                return Resolution {
                    coordinate,
                    strategy: Some(strategy),
                };
            }
        }

        log::info!("No strategy resolved {address:?}, using default coordinate");
        self.default_resolution()
    }

    const fn default_resolution(&self) -> Resolution {
        Resolution {
            coordinate: self.settings.default_coordinate,
            strategy: None,
        }
    }

    async fn attempt(&self, strategy: ResolveStrategy, address: &Address) -> Option<Coordinate> {
        let country = self.settings.country.as_str();

        match strategy {
            ResolveStrategy::StoredCoordinate => address.stored_coordinate(),
            ResolveStrategy::PostalCode => {
                let digits = normalize_postal_code(&address.postal_code()?)?;
                let found = match self.postal.lookup(&digits).await {
                    Ok(Some(found)) => found,
                    Ok(None) => {
                        log::debug!("Postal code {digits} not found");
                        return None;
                    }
                    Err(e) => {
                        log::warn!("Postal code lookup for {digits} failed: {e}");
                        return None;
                    }
                };
                let query = address::postal_query(&found, country)?;
                self.first_result(&query).await
            }
            ResolveStrategy::Neighborhood => {
                let neighborhood = address.neighborhood()?;
                let city = address.city()?;
                let state = address.state();
                let query = neighborhood_query(&neighborhood, &city, state.as_deref(), country);
                self.first_result(&query).await
            }
            ResolveStrategy::City => {
                let city = address.city()?;
                let state = address.state();
                self.first_result(&city_query(&city, state.as_deref(), country))
                    .await
            }
            ResolveStrategy::Locality => {
                let locality = address.locality()?;
                let query = locality_query(&locality, &self.settings.default_region, country);
                self.first_result(&query).await
            }
        }
    }

    /// First finite result of a place search, or `None` on error or no
    /// results.
    async fn first_result(&self, query: &str) -> Option<Coordinate> {
        match self.search.search(query, self.settings.search_limit).await {
            Ok(results) => {
                let first = results.into_iter().find(Coordinate::is_finite);
                if first.is_none() {
                    log::debug!("No place found for {query:?}");
                }
                first
            }
            Err(e) => {
                log::warn!("Place search for {query:?} failed: {e}");
                None
            }
        }
    }

    /// Neighborhood boundary polygons, or an empty list when none are
    /// known.
    ///
    /// Only queries when both `neighborhood` and `city` are non-blank.
    /// Errors are logged and produce an empty list.
    pub async fn resolve_boundary(
        &self,
        neighborhood: Option<&str>,
        city: Option<&str>,
    ) -> Vec<BoundaryPolygon> {
        let (Some(neighborhood), Some(city)) = (
            address::clean_field(neighborhood),
            address::clean_field(city),
        ) else {
            return Vec::new();
        };

        let ql = overpass::build_boundary_query(
            &neighborhood,
            &city,
            self.boundaries.query_timeout_secs(),
        );

        match self.boundaries.query(&ql).await {
            Ok(elements) => {
                let polygons = overpass::elements_to_polygons(&elements);
                log::debug!(
                    "Boundary for {neighborhood}, {city}: {} element(s), {} polygon(s)",
                    elements.len(),
                    polygons.len()
                );
                polygons
            }
            Err(e) => {
                log::warn!("Boundary query for {neighborhood}, {city} failed: {e}");
                Vec::new()
            }
        }
    }

    /// Resolves the marker position and the area to shade around it.
    ///
    /// Falls back to a circle sized by [`fallback_radius_meters`] when no
    /// boundary is known.
    pub async fn resolve_location(
        &self,
        address: &Address,
        impacted_people: Option<u64>,
    ) -> CaseLocation {
        let resolution = self.resolve(address).await;
        let polygons = self
            .resolve_boundary(address.neighborhood.as_deref(), address.city.as_deref())
            .await;

        let area = if polygons.is_empty() {
            let radius_meters = fallback_radius_meters(impacted_people);
            ImpactArea::Circle {
                radius_meters,
                ring: impact_circle(resolution.coordinate, radius_meters, CIRCLE_SEGMENTS),
            }
        } else {
            ImpactArea::Boundary { polygons }
        };

        CaseLocation { resolution, area }
    }
}
