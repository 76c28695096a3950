//! Overpass API client for neighborhood boundary polygons.
//!
//! Neighborhoods in OpenStreetMap are ways or relations tagged
//! `place=neighbourhood` or `place=suburb`. A single Overpass QL query
//! asks for both element types, matching `name` and `addr:city`
//! case-insensitively, and requests inline geometry with `out geom`.
//!
//! See <https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL>

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::{BoundaryPolygon, Coordinate, GeocodeError, check_status};

/// `place=*` values that describe a neighborhood.
const PLACE_PATTERN: &str = "^(neighbourhood|suburb)$";

/// One point of an element's inline geometry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeometryPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// A member of a relation, with geometry when requested via `out geom`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelationMember {
    /// `"way"`, `"node"` or `"relation"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Member role (`"outer"`, `"inner"`, ...).
    #[serde(default)]
    pub role: String,
    /// Member geometry.
    #[serde(default)]
    pub geometry: Option<Vec<GeometryPoint>>,
}

/// An element returned by an Overpass query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoundaryElement {
    /// `"way"` or `"relation"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// OSM element id.
    pub id: u64,
    /// OSM tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Inline geometry (ways).
    #[serde(default)]
    pub geometry: Option<Vec<GeometryPoint>>,
    /// Relation members (relations).
    #[serde(default)]
    pub members: Vec<RelationMember>,
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<BoundaryElement>,
}

/// Builds the Overpass QL query for a neighborhood within a city.
///
/// User input is regex-escaped and then quoted for the QL string
/// literal, so names containing `.`, `(`, `"` or `\` match literally.
#[must_use]
pub fn build_boundary_query(neighborhood: &str, city: &str, timeout_secs: u64) -> String {
    let name = quote(&format!("^{}$", regex::escape(neighborhood.trim())));
    let city = quote(&format!("^{}$", regex::escape(city.trim())));
    let filters =
        format!(r#"["place"~"{PLACE_PATTERN}"]["name"~"{name}",i]["addr:city"~"{city}",i]"#);

    format!("[out:json][timeout:{timeout_secs}];\n(\n  way{filters};\n  relation{filters};\n);\nout geom;")
}

/// Escapes `\` and `"` for an Overpass QL string literal.
fn quote(value: &str) -> String {
    value.replace('\\', r"\\").replace('"', r#"\""#)
}

/// Posts a query to the Overpass interpreter.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn query(
    client: &reqwest::Client,
    base_url: &str,
    ql: &str,
    timeout: Duration,
) -> Result<Vec<BoundaryElement>, GeocodeError> {
    let resp = client
        .post(base_url)
        .form(&[("data", ql)])
        .timeout(timeout)
        .send()
        .await?;

    check_status("Overpass", resp.status())?;

    let body = resp.text().await?;
    parse_response(&body)
}

fn parse_response(body: &str) -> Result<Vec<BoundaryElement>, GeocodeError> {
    let parsed: OverpassResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse {
            message: format!("Failed to parse Overpass response: {e}"),
        })?;
    Ok(parsed.elements)
}

/// Converts elements into polygons.
///
/// Elements with their own geometry become one polygon each. Relations
/// without it contribute one polygon per `outer` member that carries
/// geometry. Everything else, including degenerate rings, is dropped.
#[must_use]
pub fn elements_to_polygons(elements: &[BoundaryElement]) -> Vec<BoundaryPolygon> {
    let mut polygons = Vec::new();

    for element in elements {
        if let Some(points) = element.geometry.as_deref() {
            polygons.extend(ring(points));
        } else if element.kind == "relation" {
            polygons.extend(
                element
                    .members
                    .iter()
                    .filter(|m| m.role == "outer")
                    .filter_map(|m| m.geometry.as_deref())
                    .filter_map(ring),
            );
        }
    }

    polygons
}

fn ring(points: &[GeometryPoint]) -> Option<BoundaryPolygon> {
    BoundaryPolygon::from_points(
        points
            .iter()
            .map(|p| Coordinate::new(p.lat, p.lon))
            .collect(),
    )
}
