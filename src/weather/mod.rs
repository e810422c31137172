// ==========================================
// Roofline Engine - Weather Adapter Layer
// ==========================================
// External-facing: provider contract plus the HTTP implementation.
// ==========================================

pub mod http_provider;
pub mod provider;

pub use http_provider::{normalize_hourly_payload, HttpWeatherProvider, ProviderEndpoint};
pub use provider::{ForecastRange, SiteLocation, WeatherError, WeatherProvider};
