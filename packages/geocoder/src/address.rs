//! Address normalization and search-query composition.
//!
//! Case records carry hand-entered address fragments:
//! - Postal codes with or without punctuation: `"01310-100"`, `"01.310-100"`
//! - Padded or blank fields: `"  Centro "`, `""`
//! - A legacy free-text locality from before the structured fields existed
//!
//! This module cleans these up and composes the free-text queries sent to
//! the place-search service.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Coordinate, PostalAddress};

/// Anything that is not an ASCII digit.
static NON_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]+").expect("valid regex"));

/// Runs of whitespace inside a field.
static MULTI_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A partial address to resolve. Any subset of fields may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Postal code (CEP).
    pub postal_code: Option<String>,
    /// Neighborhood (bairro).
    pub neighborhood: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// State code (UF).
    pub state: Option<String>,
    /// Legacy free-text locality.
    pub locality: Option<String>,
    /// Coordinate stored on the record, if any.
    pub coordinate: Option<Coordinate>,
}

impl Address {
    /// Cleaned postal code field.
    #[must_use]
    pub fn postal_code(&self) -> Option<String> {
        clean_field(self.postal_code.as_deref())
    }

    /// Cleaned neighborhood field.
    #[must_use]
    pub fn neighborhood(&self) -> Option<String> {
        clean_field(self.neighborhood.as_deref())
    }

    /// Cleaned city field.
    #[must_use]
    pub fn city(&self) -> Option<String> {
        clean_field(self.city.as_deref())
    }

    /// Cleaned state field.
    #[must_use]
    pub fn state(&self) -> Option<String> {
        clean_field(self.state.as_deref())
    }

    /// Cleaned legacy locality field.
    #[must_use]
    pub fn locality(&self) -> Option<String> {
        clean_field(self.locality.as_deref())
    }

    /// Stored coordinate, if present and finite.
    #[must_use]
    pub fn stored_coordinate(&self) -> Option<Coordinate> {
        self.coordinate.filter(Coordinate::is_finite)
    }

    /// Whether no field carries usable data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stored_coordinate().is_none()
            && self.postal_code().is_none()
            && self.neighborhood().is_none()
            && self.city().is_none()
            && self.state().is_none()
            && self.locality().is_none()
    }
}

/// Trims a field and collapses inner whitespace. Blank fields become `None`.
#[must_use]
pub fn clean_field(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(MULTI_SPACE_RE.replace_all(trimmed, " ").into_owned())
}

/// Strips everything but digits from a postal code.
///
/// Returns `None` when no digits remain.
#[must_use]
pub fn normalize_postal_code(raw: &str) -> Option<String> {
    let digits = NON_DIGIT_RE.replace_all(raw, "").into_owned();
    if digits.is_empty() { None } else { Some(digits) }
}

/// Joins the non-blank parts with `", "`.
fn join_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .filter_map(|p| clean_field(Some(p)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"street, neighborhood, city, state, country"` from a postal lookup.
///
/// Returns `None` when the lookup carried no usable field.
#[must_use]
pub fn postal_query(found: &PostalAddress, country: &str) -> Option<String> {
    let location = join_parts([
        found.street.as_deref(),
        found.neighborhood.as_deref(),
        found.city.as_deref(),
        found.state.as_deref(),
    ]);
    if location.is_empty() {
        return None;
    }
    Some(join_parts([Some(location.as_str()), Some(country)]))
}

/// `"neighborhood, city[, state], country"`.
#[must_use]
pub fn neighborhood_query(
    neighborhood: &str,
    city: &str,
    state: Option<&str>,
    country: &str,
) -> String {
    join_parts([Some(neighborhood), Some(city), state, Some(country)])
}

/// `"city[, state], country"`.
#[must_use]
pub fn city_query(city: &str, state: Option<&str>, country: &str) -> String {
    join_parts([Some(city), state, Some(country)])
}

/// `"locality, default region, country"`.
#[must_use]
pub fn locality_query(locality: &str, default_region: &str, country: &str) -> String {
    join_parts([Some(locality), Some(default_region), Some(country)])
}
