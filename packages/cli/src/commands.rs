//! Command implementations. Each returns its output so `main` only
//! prints.

use std::fmt::Write as _;

use case_catalog_aggregate::{
    aggregate_by_category, filter, page_info, paginate, sort_by_count_desc, summarize,
    unlisted_categories,
};
use case_catalog_case_models::{Case, CatalogSummary, CategoryStats, FilterCriteria, PageInfo};
use case_catalog_geocoder::{CaseLocation, ImpactArea, LocationResolver};
use serde::Serialize;
use serde_json::json;

use crate::error::CliError;
use crate::source::case_address;

/// Per-category statistics plus catalog-wide figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    /// Figures over every loaded case.
    pub summary: CatalogSummary,
    /// One entry per requested category, busiest first.
    pub categories: Vec<CategoryStats>,
    /// Categories present in the data but not requested.
    pub unlisted: Vec<String>,
}

/// Builds the statistics report for `categories`.
#[must_use]
pub fn stats_report<S: AsRef<str>>(cases: &[Case], categories: &[S]) -> StatsReport {
    let mut stats = aggregate_by_category(cases, categories);
    sort_by_count_desc(&mut stats);

    let unlisted = unlisted_categories(cases, categories);
    for category in &unlisted {
        log::warn!("Cases with unlisted category {category:?} are excluded from the breakdown");
    }

    StatsReport {
        summary: summarize(cases),
        categories: stats,
        unlisted,
    }
}

impl StatsReport {
    /// Plain-text table.
    #[must_use]
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;

        writeln!(out, "=== Catalog ===").unwrap();
        writeln!(
            out,
            "{} case(s), {} active, {} categories, {} cities",
            s.total_cases, s.active_count, s.distinct_categories, s.distinct_cities
        )
        .unwrap();
        writeln!(
            out,
            "{} people impacted, budget {:.2}",
            s.total_impacted, s.total_budget
        )
        .unwrap();
        writeln!(out).unwrap();

        writeln!(
            out,
            "{:<22} {:>6} {:>7} {:>10} {:>14} {:>7}",
            "CATEGORY", "CASES", "ACTIVE", "IMPACTED", "BUDGET", "CITIES"
        )
        .unwrap();
        writeln!(out, "{}", "-".repeat(71)).unwrap();
        for stats in &self.categories {
            writeln!(
                out,
                "{:<22} {:>6} {:>7} {:>10} {:>14.2} {:>7}",
                truncate(&stats.category, 21),
                stats.count,
                stats.active_count,
                stats.total_impacted,
                stats.total_budget,
                stats.distinct_cities,
            )
            .unwrap();
        }

        if !self.unlisted.is_empty() {
            writeln!(out).unwrap();
            writeln!(out, "Unlisted categories: {}", self.unlisted.join(", ")).unwrap();
        }

        out
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<'a> {
    /// Cases on the requested page.
    pub cases: Vec<&'a Case>,
    /// Pagination over the filtered set.
    pub info: PageInfo,
    /// Figures over the filtered set.
    pub summary: CatalogSummary,
}

/// Filters `cases` and cuts out one page.
#[must_use]
pub fn list_cases<'a>(
    cases: &'a [Case],
    criteria: &FilterCriteria,
    page: i64,
    page_size: i64,
) -> Listing<'a> {
    let matched = filter(cases, criteria);
    log::debug!("{} of {} case(s) match {criteria:?}", matched.len(), cases.len());

    Listing {
        cases: paginate(&matched, page, page_size).to_vec(),
        info: page_info(matched.len(), page, page_size),
        summary: summarize(&matched),
    }
}

impl Listing<'_> {
    /// Plain-text table.
    #[must_use]
    pub fn to_table(&self) -> String {
        let mut out = String::new();

        if self.cases.is_empty() {
            writeln!(out, "No cases found.").unwrap();
        } else {
            writeln!(
                out,
                "{:<10} {:<36} {:<20} {:<16} {:<10} {:>9}",
                "ID", "TITLE", "CATEGORY", "CITY", "STATUS", "IMPACTED"
            )
            .unwrap();
            writeln!(out, "{}", "-".repeat(106)).unwrap();
            for case in &self.cases {
                let status = match case.parsed_status() {
                    Some(status) => status.to_string(),
                    None if case.is_active() => "-".to_string(),
                    None => "?".to_string(),
                };
                writeln!(
                    out,
                    "{:<10} {:<36} {:<20} {:<16} {:<10} {:>9}",
                    truncate(&case.id, 9),
                    truncate(&case.title, 35),
                    truncate(&case.category, 19),
                    truncate(case.city_label().unwrap_or("-"), 15),
                    status,
                    case.impacted_people
                        .map_or_else(|| "-".to_string(), |n| n.to_string()),
                )
                .unwrap();
            }
        }

        writeln!(out).unwrap();
        writeln!(
            out,
            "Page {} of {} ({} matching case(s), {} people impacted)",
            self.info.page,
            self.info.total_pages,
            self.info.total_items,
            self.summary.total_impacted
        )
        .unwrap();

        out
    }
}

/// Resolves the map location of the case with `id`.
///
/// # Errors
///
/// Returns [`CliError::UnknownCase`] if no case has that id.
pub async fn locate(
    cases: &[Case],
    id: &str,
    resolver: &LocationResolver,
) -> Result<(Case, CaseLocation), CliError> {
    let case = cases
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| CliError::UnknownCase { id: id.to_string() })?;

    let location = resolver
        .resolve_location(&case_address(case), case.impacted_people)
        .await;

    if location.resolution.is_default() {
        log::warn!(
            "Case {id} could not be located; placing it in {}",
            resolver.settings().default_region
        );
    }

    Ok((case.clone(), location))
}

/// A `GeoJSON` `FeatureCollection` with the marker and the impact area.
#[must_use]
pub fn location_to_geojson(case: &Case, location: &CaseLocation) -> serde_json::Value {
    let coordinate = location.resolution.coordinate;
    let resolved_by = location
        .resolution
        .strategy
        .map_or_else(|| "default".to_string(), |s| s.to_string());

    let mut features = vec![json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [coordinate.longitude, coordinate.latitude],
        },
        "properties": {
            "id": case.id,
            "title": case.title,
            "category": case.category,
            "resolvedBy": resolved_by,
        },
    })];

    match &location.area {
        ImpactArea::Boundary { polygons } => {
            features.extend(polygons.iter().map(|polygon| {
                json!({
                    "type": "Feature",
                    "geometry": polygon.to_geojson(),
                    "properties": { "id": case.id, "area": "boundary" },
                })
            }));
        }
        ImpactArea::Circle {
            radius_meters,
            ring,
        } => {
            features.extend(ring.iter().map(|polygon| {
                json!({
                    "type": "Feature",
                    "geometry": polygon.to_geojson(),
                    "properties": {
                        "id": case.id,
                        "area": "circle",
                        "radiusMeters": radius_meters,
                    },
                })
            }));
        }
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Pretty-printed JSON.
///
/// # Errors
///
/// Returns [`CliError::Serialize`] if `value` cannot be serialized.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Truncates to `max_chars` characters, marking the cut with `…`.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_owned()
    } else {
        let mut result: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        result.push('…');
        result
    }
}

#[cfg(test)]
mod tests {
    use case_catalog_case_models::StatusFilter;
    use case_catalog_geocoder::service_registry::resolver_settings;
    use case_catalog_geocoder::{Coordinate, ResolveStrategy};

    use super::*;
    use crate::source::{DEFAULT_CATEGORIES, demo_cases};

    #[test]
    fn demo_stats_follow_count_order() {
        let report = stats_report(&demo_cases(), DEFAULT_CATEGORIES);

        assert_eq!(report.categories.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(report.categories[0].category, "Educação");
        assert_eq!(report.categories[0].count, 3);
        assert_eq!(report.categories[0].total_impacted, 970);
        assert_eq!(report.categories[0].active_count, 3);
        assert_eq!(report.categories[1].category, "Saúde");
        assert_eq!(report.categories[1].active_count, 1);
        assert_eq!(report.unlisted, vec!["cultura".to_string()]);
        assert_eq!(report.summary.total_cases, 8);
    }

    #[test]
    fn stats_table_mentions_unlisted_categories() {
        let table = stats_report(&demo_cases(), &["Saúde"]).to_table();
        assert!(table.contains("Saúde"));
        assert!(table.contains("Unlisted categories: Educação"));
    }

    #[test]
    fn listing_pages_through_filtered_cases() {
        let cases = demo_cases();
        let criteria = FilterCriteria::new().with_status(StatusFilter::Active);

        let first = list_cases(&cases, &criteria, 1, 4);
        let second = list_cases(&cases, &criteria, 2, 4);

        assert_eq!(first.info.total_items, 6);
        assert_eq!(first.info.total_pages, 2);
        assert_eq!(first.cases.len(), 4);
        assert_eq!(second.cases.len(), 2);
        assert_eq!(first.cases[0].id, "demo-001");
        assert_eq!(second.cases[1].id, "demo-008");
    }

    #[test]
    fn listing_beyond_last_page_is_empty() {
        let cases = demo_cases();
        let listing = list_cases(&cases, &FilterCriteria::new(), 5, 10);
        assert!(listing.cases.is_empty());
        assert!(listing.to_table().contains("No cases found."));
    }

    #[test]
    fn listing_query_matches_contributor() {
        let cases = demo_cases();
        let listing = list_cases(
            &cases,
            &FilterCriteria::new().with_query("rede aprender"),
            1,
            10,
        );
        assert_eq!(listing.cases.len(), 1);
        assert_eq!(listing.cases[0].id, "demo-002");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Educação", 10), "Educação");
        assert_eq!(truncate("Assistência Social", 6), "Assis…");
    }

    #[tokio::test]
    async fn locate_unknown_case_fails() {
        let resolver = LocationResolver::offline(resolver_settings());
        let result = locate(&demo_cases(), "missing", &resolver).await;
        assert!(matches!(result, Err(CliError::UnknownCase { .. })));
    }

    #[tokio::test]
    async fn demo_locate_uses_stored_coordinate_and_circle() {
        let resolver = LocationResolver::offline(resolver_settings());
        let (case, location) = locate(&demo_cases(), "demo-003", &resolver).await.unwrap();

        assert_eq!(
            location.resolution.strategy,
            Some(ResolveStrategy::StoredCoordinate)
        );
        assert_eq!(location.resolution.coordinate, Coordinate::new(-8.1189, -34.9006));

        let geojson = location_to_geojson(&case, &location);
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["geometry"]["coordinates"][0], -34.9006);
        assert_eq!(features[0]["properties"]["resolvedBy"], "stored coordinate");
        assert_eq!(features[1]["properties"]["area"], "circle");
        assert_eq!(features[1]["properties"]["radiusMeters"], 2000);
    }

    #[tokio::test]
    async fn demo_locate_without_coordinate_uses_default() {
        let resolver = LocationResolver::offline(resolver_settings());
        let (case, location) = locate(&demo_cases(), "demo-002", &resolver).await.unwrap();

        assert!(location.resolution.is_default());
        let geojson = location_to_geojson(&case, &location);
        assert_eq!(geojson["features"][0]["properties"]["resolvedBy"], "default");
        assert_eq!(geojson["features"][1]["properties"]["radiusMeters"], 750);
    }
}
