use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::GeocodeError;
use crate::types::{Address, Coordinates};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Best match returned by a geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderHit {
    pub coords: Coordinates,
    /// Administrative area name as reported by the provider (not yet
    /// normalized through the synonym table).
    pub state: Option<String>,
    pub city: Option<String>,
    pub confidence: Option<f64>,
}

/// Interface to an external geocoding provider. Implementations must not
/// enforce global throttling; rate-limit discipline is the caller's job.
pub trait GeocodeProvider: Send + Sync {
    /// Look up an address. `Ok(None)` means the provider answered but found
    /// nothing; transport and provider failures map to `GeocodeError`.
    fn lookup(&self, address: &Address) -> Result<Option<ProviderHit>, GeocodeError>;
}

/// Nominatim-backed provider with a bounded request timeout.
pub struct NominatimProvider {
    client: Client,
    base_url: String,
}

impl NominatimProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("zustaendig/0.1 (+https://github.com/zustaendig/zustaendig)")
            .timeout(timeout)
            .build()
            .context("build geocoding HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl GeocodeProvider for NominatimProvider {
    fn lookup(&self, address: &Address) -> Result<Option<ProviderHit>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![
            ("format", "jsonv2"),
            ("addressdetails", "1"),
            ("limit", "1"),
            ("countrycodes", "de"),
            ("street", &address.street),
            ("postalcode", &address.postal_code),
            ("city", &address.city),
        ];
        if let Some(state) = &address.state {
            query.push(("state", state.as_str()));
        }

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    GeocodeError::Timeout
                } else {
                    GeocodeError::Unavailable(err.to_string())
                }
            })?;

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(GeocodeError::RateLimited),
            status if !status.is_success() => {
                return Err(GeocodeError::Unavailable(format!("HTTP {status}")));
            }
            _ => {}
        }

        let results: Vec<Value> = resp
            .json()
            .map_err(|err| GeocodeError::Unavailable(format!("invalid response body: {err}")))?;

        Ok(results.first().and_then(parse_hit))
    }
}

/// Parse a single Nominatim result object. Coordinates come back as strings.
fn parse_hit(result: &Value) -> Option<ProviderHit> {
    let lat = result["lat"].as_str()?.parse::<f64>().ok()?;
    let lon = result["lon"].as_str()?.parse::<f64>().ok()?;

    let details = &result["address"];
    let state = details["state"].as_str().map(str::to_string);
    // Nominatim reports the settlement under one of several keys.
    let city = ["city", "town", "village", "municipality"]
        .iter()
        .find_map(|key| details[*key].as_str())
        .map(str::to_string);

    Some(ProviderHit {
        coords: Coordinates::new(lat, lon),
        state,
        city,
        confidence: result["importance"].as_f64(),
    })
}
