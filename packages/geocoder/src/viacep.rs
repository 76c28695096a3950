//! ViaCEP postal code lookup client.
//!
//! Resolves an 8-digit Brazilian postal code (CEP) to its street,
//! neighborhood, city and state. Unknown codes are answered with HTTP 200
//! and `{"erro": true}` (older deployments send the string `"true"`).
//!
//! See <https://viacep.com.br/>

use std::time::Duration;

use crate::{GeocodeError, PostalAddress, check_status};

/// Looks up a digits-only postal code.
///
/// Returns `Ok(None)` when ViaCEP reports the code as not found.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the service answers
/// with a non-success status, or the response cannot be parsed.
pub async fn lookup(
    client: &reqwest::Client,
    base_url: &str,
    postal_code: &str,
    timeout: Duration,
) -> Result<Option<PostalAddress>, GeocodeError> {
    let url = format!("{}/{postal_code}/json/", base_url.trim_end_matches('/'));

    let resp = client.get(&url).timeout(timeout).send().await?;

    check_status("ViaCEP", resp.status())?;

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a ViaCEP JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<PostalAddress>, GeocodeError> {
    let obj = body.as_object().ok_or_else(|| GeocodeError::Parse {
        message: "ViaCEP response is not an object".to_string(),
    })?;

    let not_found = match obj.get("erro") {
        Some(serde_json::Value::Bool(flag)) => *flag,
        Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
        _ => false,
    };
    if not_found {
        return Ok(None);
    }

    let field = |key: &str| {
        obj.get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    Ok(Some(PostalAddress {
        street: field("logradouro"),
        neighborhood: field("bairro"),
        city: field("localidade"),
        state: field("uf"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_viacep_address() {
        let body = serde_json::json!({
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "complemento": "de 612 a 1510 - lado par",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308"
        });
        let found = parse_response(&body).unwrap().unwrap();
        assert_eq!(found.street.as_deref(), Some("Avenida Paulista"));
        assert_eq!(found.neighborhood.as_deref(), Some("Bela Vista"));
        assert_eq!(found.city.as_deref(), Some("São Paulo"));
        assert_eq!(found.state.as_deref(), Some("SP"));
    }

    #[test]
    fn parses_viacep_not_found() {
        assert!(parse_response(&serde_json::json!({ "erro": true })).unwrap().is_none());
        assert!(parse_response(&serde_json::json!({ "erro": "true" })).unwrap().is_none());
    }

    #[test]
    fn blank_fields_become_none() {
        let body = serde_json::json!({
            "cep": "56000-000",
            "logradouro": "",
            "bairro": "",
            "localidade": "Salgueiro",
            "uf": "PE"
        });
        let found = parse_response(&body).unwrap().unwrap();
        assert_eq!(found.street, None);
        assert_eq!(found.neighborhood, None);
        assert_eq!(found.city.as_deref(), Some("Salgueiro"));
    }

    #[test]
    fn rejects_non_object() {
        assert!(parse_response(&serde_json::json!([])).is_err());
    }
}
