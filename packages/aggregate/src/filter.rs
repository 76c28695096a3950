//! Multi-criteria case filtering.

use std::borrow::Borrow;

use case_catalog_case_models::{Case, FilterCriteria};

/// Keeps the cases that satisfy every criterion, preserving input order.
///
/// - **category**: exact, case-sensitive equality when non-empty.
/// - **query**: case-insensitive substring match against the title,
///   description, locality, city, neighborhood, state and contributor
///   name. Blank queries impose no constraint.
/// - **status**: see [`StatusFilter`](case_catalog_case_models::StatusFilter).
#[must_use]
pub fn filter<'a, C: Borrow<Case>>(cases: &'a [C], criteria: &FilterCriteria) -> Vec<&'a Case> {
    let query = normalized_query(criteria);

    cases
        .iter()
        .map(Borrow::<Case>::borrow)
        .filter(|case| matches_normalized(case, criteria, query.as_deref()))
        .collect()
}

fn normalized_query(criteria: &FilterCriteria) -> Option<String> {
    criteria
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

fn matches_normalized(case: &Case, criteria: &FilterCriteria, query: Option<&str>) -> bool {
    if let Some(category) = criteria.category.as_deref().filter(|c| !c.is_empty())
        && case.category != category
    {
        return false;
    }

    if let Some(query) = query
        && !searchable_fields(case).any(|field| field.to_lowercase().contains(query))
    {
        return false;
    }

    criteria.status.is_none_or(|status| status.matches(case))
}

fn searchable_fields(case: &Case) -> impl Iterator<Item = &str> {
    std::iter::once(case.title.as_str()).chain(
        [
            &case.description,
            &case.locality,
            &case.city,
            &case.neighborhood,
            &case.state,
            &case.contributor_name,
        ]
        .into_iter()
        .filter_map(Option::as_deref),
    )
}
