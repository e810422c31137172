// ==========================================
// Roofline Engine - HTTP Weather Provider
// ==========================================
// Resolves the tenant-configured provider endpoint, fetches the
// hourly payload with a hard timeout (fail fast, no retry) and
// normalizes the dynamic JSON into typed forecast points through
// narrow, total conversion functions.
// ==========================================

use crate::config::EngineConfig;
use crate::domain::forecast::HourlyForecastPoint;
use crate::weather::provider::{ForecastRange, SiteLocation, WeatherError, WeatherProvider};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// HTTP fetch timeout. Resilience policy (retries, backoff) belongs
/// to the caller, so a slow provider surfaces quickly.
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Per-tenant provider endpoint configuration.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Weather provider backed by tenant-configured HTTP endpoints.
pub struct HttpWeatherProvider {
    client: reqwest::Client,
    endpoints: HashMap<String, ProviderEndpoint>,
    lookback_hours: i64,
}

impl HttpWeatherProvider {
    pub fn new(
        endpoints: HashMap<String, ProviderEndpoint>,
        config: &EngineConfig,
    ) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoints,
            lookback_hours: config.forecast_lookback_hours,
        })
    }
}

#[async_trait]
impl WeatherProvider for HttpWeatherProvider {
    async fn fetch_hourly(
        &self,
        tenant_id: &str,
        site: &SiteLocation,
        range: &ForecastRange,
    ) -> Result<Vec<HourlyForecastPoint>, WeatherError> {
        let endpoint = self.endpoints.get(tenant_id).ok_or_else(|| {
            WeatherError::ProviderNotConfigured {
                tenant_id: tenant_id.to_string(),
            }
        })?;

        // Lookback buffer so the first in-range hour carries a
        // rising-trend context.
        let start = range.start - Duration::hours(self.lookback_hours);

        debug!(
            tenant_id,
            base_url = %endpoint.base_url,
            %start,
            end = %range.end,
            "fetching hourly forecast"
        );

        let mut request = self.client.get(&endpoint.base_url).query(&[
            ("latitude", site.latitude.to_string()),
            ("longitude", site.longitude.to_string()),
            ("start", start.to_rfc3339()),
            ("end", range.end.to_rfc3339()),
        ]);
        if let Some(key) = &endpoint.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request.send().await?.error_for_status()?;
        let body: Value = response.json().await?;

        let points = normalize_hourly_payload(&body)?;
        if points.is_empty() {
            return Err(WeatherError::NoHourlyData {
                latitude: site.latitude,
                longitude: site.longitude,
            });
        }

        info!(tenant_id, hours = points.len(), "hourly forecast fetched");
        Ok(points)
    }
}

// ==========================================
// Payload normalization
// ==========================================
// Provider payloads arrive as dynamic JSON; everything past this
// boundary is statically typed. Conversions are total: any missing
// or mistyped field is a MalformedPayload error, never a silent
// default.

/// Convert a provider payload to typed forecast points.
///
/// Accepted shape: an object with an `hours` (or `hourly`) array of
/// objects carrying a timestamp and the three measurements. Field
/// name aliases cover the providers currently in use.
pub fn normalize_hourly_payload(body: &Value) -> Result<Vec<HourlyForecastPoint>, WeatherError> {
    let hours = body
        .get("hours")
        .or_else(|| body.get("hourly"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            WeatherError::MalformedPayload("missing 'hours' array in payload".to_string())
        })?;

    let mut points = Vec::with_capacity(hours.len());
    for (idx, entry) in hours.iter().enumerate() {
        let ts = field_timestamp(entry, &["ts", "time"], idx)?;
        let temp_f = field_number(entry, &["temp_f", "temperature_f"], idx)?;
        let wind_mph = field_number(entry, &["wind_mph", "wind_speed_mph"], idx)?;
        let precip_prob = field_number(entry, &["precip_prob", "precipitation_probability"], idx)?;

        points.push(HourlyForecastPoint {
            ts,
            temp_f,
            wind_mph,
            precip_prob,
        });
    }
    Ok(points)
}

fn field_number(entry: &Value, names: &[&str], idx: usize) -> Result<f64, WeatherError> {
    for name in names {
        if let Some(v) = entry.get(name).and_then(Value::as_f64) {
            return Ok(v);
        }
    }
    Err(WeatherError::MalformedPayload(format!(
        "hour {}: missing numeric field {:?}",
        idx, names
    )))
}

fn field_timestamp(entry: &Value, names: &[&str], idx: usize) -> Result<DateTime<Utc>, WeatherError> {
    for name in names {
        if let Some(raw) = entry.get(name).and_then(Value::as_str) {
            return DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    WeatherError::MalformedPayload(format!("hour {}: bad timestamp '{}': {}", idx, raw, e))
                });
        }
    }
    Err(WeatherError::MalformedPayload(format!(
        "hour {}: missing timestamp field {:?}",
        idx, names
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_primary_field_names() {
        let body = json!({
            "hours": [
                { "ts": "2026-04-01T12:00:00Z", "temp_f": 45.0, "wind_mph": 10.0, "precip_prob": 0.1 },
                { "ts": "2026-04-01T13:00:00Z", "temp_f": 46.5, "wind_mph": 12.0, "precip_prob": 0.2 },
            ]
        });
        let points = normalize_hourly_payload(&body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].temp_f, 45.0);
        assert_eq!(points[1].precip_prob, 0.2);
    }

    #[test]
    fn test_normalize_alias_field_names() {
        let body = json!({
            "hourly": [
                {
                    "time": "2026-04-01T12:00:00Z",
                    "temperature_f": 50.0,
                    "wind_speed_mph": 8.0,
                    "precipitation_probability": 0.05
                },
            ]
        });
        let points = normalize_hourly_payload(&body).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].wind_mph, 8.0);
    }

    #[test]
    fn test_normalize_rejects_missing_array() {
        let body = json!({ "data": [] });
        let err = normalize_hourly_payload(&body).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedPayload(_)));
    }

    #[test]
    fn test_normalize_rejects_mistyped_field() {
        let body = json!({
            "hours": [
                { "ts": "2026-04-01T12:00:00Z", "temp_f": "warm", "wind_mph": 10.0, "precip_prob": 0.1 },
            ]
        });
        let err = normalize_hourly_payload(&body).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedPayload(_)));
    }

    #[test]
    fn test_normalize_rejects_bad_timestamp() {
        let body = json!({
            "hours": [
                { "ts": "yesterday", "temp_f": 45.0, "wind_mph": 10.0, "precip_prob": 0.1 },
            ]
        });
        let err = normalize_hourly_payload(&body).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedPayload(_)));
    }

    #[test]
    fn test_empty_hours_normalizes_to_empty() {
        // The provider turns this into NoHourlyData; normalization
        // itself stays total.
        let body = json!({ "hours": [] });
        let points = normalize_hourly_payload(&body).unwrap();
        assert!(points.is_empty());
    }
}
