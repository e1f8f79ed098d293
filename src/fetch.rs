//! Feed transport: HTTP fetch with an on-disk cache fallback.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use papercal_core::WeatherConfig;
use papercal_core::weather::{WeatherSample, parse_current, parse_forecast};
use reqwest::Client;

const WEATHER_BASE: &str = "https://api.openweathermap.org/data/2.5";

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("papercal/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Could not build the HTTP client")
}

async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let url = url::Url::parse(url).with_context(|| format!("Invalid feed URL: {url}"))?;
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("Request to {url} was rejected"))?;

    Ok(response.text().await?)
}

/// GET a calendar feed. A fresh payload refreshes the cache file; on any
/// transport failure the cached copy is served instead, so a flaky feed
/// degrades to the last seen snapshot rather than an empty agenda.
pub async fn fetch_calendar(client: &Client, url: &str, cache_path: &Path) -> Result<String> {
    match fetch_text(client, url).await {
        Ok(payload) => {
            if let Some(parent) = cache_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = std::fs::write(cache_path, &payload);
            Ok(payload)
        }
        Err(fetch_err) => std::fs::read_to_string(cache_path).with_context(|| {
            format!("{fetch_err:#}; no cached copy at {}", cache_path.display())
        }),
    }
}

/// Fetch and decode both weather endpoints (current conditions and the
/// 3-hourly forecast). Any transport or decode failure aborts the whole
/// refresh, so the caller's previous weather state stays untouched.
pub async fn fetch_weather(
    client: &Client,
    config: &WeatherConfig,
) -> Result<((i32, String), Vec<WeatherSample>)> {
    let api_key = config
        .api_key
        .as_deref()
        .context("weather.api_key is not configured")?;
    let lat = config.lat.context("weather.lat is not configured")?;
    let lon = config.lon.context("weather.lon is not configured")?;
    let units = config.units.api_value();

    let current_url =
        format!("{WEATHER_BASE}/weather?lat={lat}&lon={lon}&units={units}&appid={api_key}");
    let forecast_url =
        format!("{WEATHER_BASE}/forecast?lat={lat}&lon={lon}&units={units}&appid={api_key}");

    let current = parse_current(&fetch_text(client, &current_url).await?)?;
    let samples = parse_forecast(&fetch_text(client, &forecast_url).await?)?;

    Ok((current, samples))
}
