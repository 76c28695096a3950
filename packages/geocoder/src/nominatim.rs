//! Nominatim / OpenStreetMap place search client.
//!
//! Used for every free-text step of the resolution chain. The public
//! instance allows at most **1 request per second** and requires an
//! identifying `User-Agent`; the shared client sets the latter, and the
//! caller is responsible for pacing batch resolutions.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use crate::{Coordinate, GeocodeError, check_status};

/// Searches for a free-form query, returning up to `limit` candidates in
/// relevance order.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn search(
    client: &reqwest::Client,
    base_url: &str,
    country_codes: &str,
    query: &str,
    limit: u32,
    timeout: Duration,
) -> Result<Vec<Coordinate>, GeocodeError> {
    let limit = limit.max(1).to_string();

    let resp = client
        .get(base_url)
        .query(&[
            ("q", query),
            ("countrycodes", country_codes),
            ("format", "jsonv2"),
            ("limit", limit.as_str()),
        ])
        .timeout(timeout)
        .send()
        .await?;

    check_status("Nominatim", resp.status())?;

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a Nominatim JSON response.
///
/// Entries without a usable `lat`/`lon` pair are skipped.
fn parse_response(body: &serde_json::Value) -> Result<Vec<Coordinate>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    Ok(results
        .iter()
        .filter_map(|result| {
            let lat = number_field(&result["lat"])?;
            let lon = number_field(&result["lon"])?;
            Some(Coordinate::new(lat, lon)).filter(Coordinate::is_finite)
        })
        .collect())
}

/// Nominatim sends coordinates as numeric strings; accept plain numbers
/// too.
fn number_field(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
