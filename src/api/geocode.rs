use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::thread;
use std::time::Duration;

use crate::config::GeocoderConfig;
use crate::geofence::GeoPoint;

const USER_AGENT: &str = "campusreport/0.1.0 (https://github.com/campusreport/campusreport)";

/// Address shown when the geocoder has nothing useful for a coordinate.
pub const FALLBACK_ADDRESS: &str = "Campus Location";

#[derive(Debug, Deserialize)]
struct ReverseResult {
    #[serde(default)]
    display_name: Option<String>,
}

/// Reverse-geocode a coordinate to a human-readable address.
///
/// Uses the Nominatim reverse endpoint. Includes a 1 second delay for rate
/// limiting (Nominatim ToS). A missing or empty address resolves to
/// [`FALLBACK_ADDRESS`] rather than an error, since reports remain useful
/// without a street address.
pub fn reverse_geocode(point: GeoPoint, config: &GeocoderConfig) -> Result<String> {
    // Rate limiting - Nominatim requires max 1 request per second
    thread::sleep(Duration::from_secs(1));

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(&config.url)
        .query(&[
            ("lat", point.latitude.to_string()),
            ("lon", point.longitude.to_string()),
            ("format", "json".to_string()),
        ])
        .send()
        .context("Failed to send request to reverse geocoder")?;

    if !response.status().is_success() {
        bail!(
            "Reverse geocoder returned error status: {}",
            response.status()
        );
    }

    let result: ReverseResult = response
        .json()
        .context("Failed to parse reverse geocoder JSON response")?;

    Ok(match result.display_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => FALLBACK_ADDRESS.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reverse_response() {
        let json = r#"{"display_name":"Main Gate, Campus Road, Mumbai","place_id":12345}"#;
        let result: ReverseResult = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.display_name.as_deref(),
            Some("Main Gate, Campus Road, Mumbai")
        );
    }

    #[test]
    fn test_parse_reverse_error_shape() {
        // Nominatim reports unresolvable coordinates as {"error": "..."}.
        let json = r#"{"error":"Unable to geocode"}"#;
        let result: ReverseResult = serde_json::from_str(json).unwrap();
        assert!(result.display_name.is_none());
    }
}
