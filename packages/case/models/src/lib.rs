#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Case record, filter criteria and statistics types.
//!
//! A [`Case`] is a single social-innovation case study as stored by the
//! catalog's hosted data store. Records arrive as JSON rows, so numeric
//! columns are deserialized leniently (see [`lenient`]): a malformed
//! budget or impacted-people value is treated as absent rather than
//! rejecting the whole row.

pub mod lenient;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lifecycle status of a case, as stored in the `status` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum CaseStatus {
    /// The initiative is running.
    #[serde(rename = "ativo")]
    #[strum(serialize = "ativo")]
    Active,
    /// The initiative is on hold.
    #[serde(rename = "pausado")]
    #[strum(serialize = "pausado")]
    Paused,
    /// The initiative has finished.
    #[serde(rename = "concluido")]
    #[strum(to_string = "concluido", serialize = "concluído")]
    Completed,
}

impl CaseStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Active, Self::Paused, Self::Completed]
    }
}

/// A case study record.
///
/// Owned by the calling application; the aggregation functions only
/// ever borrow it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Unique identifier.
    pub id: String,
    /// Case title.
    pub title: String,
    /// Long-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category label, compared exactly as stored (e.g. `"Educação"`).
    pub category: String,
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// Neighborhood name.
    #[serde(default)]
    pub neighborhood: Option<String>,
    /// State / region code (e.g. `"SP"`).
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code (CEP), with or without punctuation.
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Legacy free-text locality, predating the structured address fields.
    #[serde(default)]
    pub locality: Option<String>,
    /// Raw status value. Absent or blank means active.
    #[serde(default)]
    pub status: Option<String>,
    /// Number of people impacted by the initiative.
    #[serde(default, deserialize_with = "lenient::deserialize_count")]
    pub impacted_people: Option<u64>,
    /// Budget amount.
    #[serde(default, deserialize_with = "lenient::deserialize_amount")]
    pub budget: Option<f64>,
    /// Name of the person or organization that submitted the case.
    #[serde(default)]
    pub contributor_name: Option<String>,
    /// Stored latitude (WGS84), if the case was geocoded before.
    #[serde(default, deserialize_with = "lenient::deserialize_amount")]
    pub latitude: Option<f64>,
    /// Stored longitude (WGS84), if the case was geocoded before.
    #[serde(default, deserialize_with = "lenient::deserialize_amount")]
    pub longitude: Option<f64>,
}

impl Case {
    /// Parses the stored status, ignoring blank and unknown values.
    #[must_use]
    pub fn parsed_status(&self) -> Option<CaseStatus> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }

    /// Whether the case counts as active.
    ///
    /// A missing or blank status defaults to active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(_) => self.parsed_status() == Some(CaseStatus::Active),
        }
    }

    /// Impacted-people count, treating absent as zero.
    #[must_use]
    pub fn impacted_or_zero(&self) -> u64 {
        self.impacted_people.unwrap_or(0)
    }

    /// Budget amount, treating absent as zero.
    #[must_use]
    pub fn budget_or_zero(&self) -> f64 {
        self.budget.unwrap_or(0.0)
    }

    /// Stored `(latitude, longitude)` pair, when both halves are present.
    #[must_use]
    pub fn stored_coordinate(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Trimmed, non-empty city label.
    #[must_use]
    pub fn city_label(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Which statuses a filter keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Active cases, including those without a status.
    Active,
    /// Cases whose stored status parses to exactly this value.
    Exactly(CaseStatus),
}

impl StatusFilter {
    /// Whether `case` passes this filter.
    #[must_use]
    pub fn matches(self, case: &Case) -> bool {
        match self {
            Self::Active => case.is_active(),
            Self::Exactly(status) => case.parsed_status() == Some(status),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("active") {
            return Ok(Self::Active);
        }
        s.trim().parse().map(Self::Exactly)
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Exactly(status) => write!(f, "{status}"),
        }
    }
}

/// Criteria for narrowing a case listing. Omitted fields impose no
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Exact category label.
    pub category: Option<String>,
    /// Free-text query, matched case-insensitively as a substring.
    pub query: Option<String>,
    /// Status selector.
    pub status: Option<StatusFilter>,
}

impl FilterCriteria {
    /// Criteria that keep every case.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts to cases matching a free-text query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Restricts by status.
    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }
}

/// Statistics for a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// Category label.
    pub category: String,
    /// Number of cases in the category.
    pub count: u64,
    /// Sum of impacted people.
    pub total_impacted: u64,
    /// Sum of budgets.
    pub total_budget: f64,
    /// Number of distinct non-empty city labels.
    pub distinct_cities: u64,
    /// Number of active cases.
    pub active_count: u64,
}

impl CategoryStats {
    /// Zero-valued stats for `category`.
    #[must_use]
    pub fn empty(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            count: 0,
            total_impacted: 0,
            total_budget: 0.0,
            distinct_cities: 0,
            active_count: 0,
        }
    }
}

/// Headline figures over a whole (possibly filtered) collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    /// Number of cases.
    pub total_cases: u64,
    /// Sum of impacted people.
    pub total_impacted: u64,
    /// Sum of budgets.
    pub total_budget: f64,
    /// Number of distinct non-empty city labels.
    pub distinct_cities: u64,
    /// Number of distinct category labels.
    pub distinct_categories: u64,
    /// Number of active cases.
    pub active_count: u64,
}

/// Pagination metadata for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Requested 1-based page number.
    pub page: i64,
    /// Requested page size.
    pub page_size: i64,
    /// Items in the full (unpaginated) collection.
    pub total_items: u64,
    /// Number of non-empty pages.
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case_with_status(status: Option<&str>) -> Case {
        Case {
            id: "1".to_string(),
            status: status.map(String::from),
            ..Case::default()
        }
    }

    #[test]
    fn missing_status_is_active() {
        assert!(case_with_status(None).is_active());
    }

    #[test]
    fn blank_status_is_active() {
        assert!(case_with_status(Some("  ")).is_active());
    }

    #[test]
    fn ativo_is_active_case_insensitively() {
        assert!(case_with_status(Some("Ativo")).is_active());
        assert!(!case_with_status(Some("pausado")).is_active());
    }

    #[test]
    fn unknown_status_is_not_active() {
        let case = case_with_status(Some("arquivado"));
        assert!(!case.is_active());
        assert_eq!(case.parsed_status(), None);
    }

    #[test]
    fn parses_accented_completed() {
        assert_eq!(
            case_with_status(Some("concluído")).parsed_status(),
            Some(CaseStatus::Completed)
        );
    }

    #[test]
    fn status_filter_from_str() {
        assert_eq!("active".parse::<StatusFilter>().unwrap(), StatusFilter::Active);
        assert_eq!(
            "pausado".parse::<StatusFilter>().unwrap(),
            StatusFilter::Exactly(CaseStatus::Paused)
        );
        assert!("sleeping".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn deserializes_row_with_malformed_numbers() {
        let case: Case = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "title": "Horta comunitária",
            "category": "Meio Ambiente",
            "impacted_people": "muitos",
            "budget": "1.500,50",
            "latitude": -23.5,
            "longitude": "-46.6"
        }))
        .unwrap();

        assert_eq!(case.impacted_people, None);
        assert_eq!(case.impacted_or_zero(), 0);
        assert!((case.budget_or_zero() - 1500.5).abs() < f64::EPSILON);
        assert_eq!(case.stored_coordinate(), Some((-23.5, -46.6)));
        assert!(case.is_active());
    }

    #[test]
    fn stored_coordinate_requires_both_halves() {
        let case = Case {
            latitude: Some(-23.5),
            ..Case::default()
        };
        assert_eq!(case.stored_coordinate(), None);
    }
}
