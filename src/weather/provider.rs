// ==========================================
// Roofline Engine - Weather Provider Contract
// ==========================================
// Consumed interface: given a site and a time range, return hourly
// forecast points covering at least the range plus a small lookback
// buffer for rising-temperature evaluation. Providers must fail
// loudly when no usable hourly data exists.
// ==========================================

use crate::domain::forecast::HourlyForecastPoint;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Forecast site coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Requested forecast horizon, inclusive of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Weather adapter error type.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("no weather provider configured for tenant {tenant_id}")]
    ProviderNotConfigured { tenant_id: String },

    #[error("no hourly forecast data for {latitude},{longitude} in requested range")]
    NoHourlyData { latitude: f64, longitude: f64 },

    #[error("weather provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed provider payload: {0}")]
    MalformedPayload(String),
}

/// Hourly forecast source, resolved per tenant and injected at
/// engine construction. No process-wide client state.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch hourly points covering `range` plus the provider's
    /// lookback buffer. Points may arrive unordered; the engine
    /// re-sorts. Must return an error, never an empty Ok, when no
    /// hourly data exists for the range.
    async fn fetch_hourly(
        &self,
        tenant_id: &str,
        site: &SiteLocation,
        range: &ForecastRange,
    ) -> Result<Vec<HourlyForecastPoint>, WeatherError>;
}
