//! Dashboard configuration at ~/.config/papercal/config.toml.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_DAYS_TO_SHOW, DEFAULT_FETCH_TIMEOUT, DEFAULT_FORECAST_SLOTS, DEFAULT_MARQUEE_GAP,
    DEFAULT_MARQUEE_SPEED, DEFAULT_MARQUEE_STEP_MS, DEFAULT_MAX_EVENTS, DEFAULT_WEATHER_REFRESH,
};
use crate::error::{PaperCalError, PaperCalResult};
use crate::marquee::MarqueeMotion;

static DEFAULT_CACHE_DIR: &str = "~/.cache/papercal";

fn default_cache_dir() -> String {
    DEFAULT_CACHE_DIR.to_string()
}

fn default_days_to_show() -> usize {
    DEFAULT_DAYS_TO_SHOW
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

fn default_fetch_timeout() -> String {
    DEFAULT_FETCH_TIMEOUT.to_string()
}

/// Global configuration at ~/.config/papercal/config.toml.
///
/// Both calendar sources and the weather section are optional; absent
/// sources simply leave their panel empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IANA timezone name. When absent, callers fall back to the system
    /// zone.
    pub timezone: Option<String>,

    pub calendar_url: Option<String>,
    pub calendar_url2: Option<String>,

    pub days_to_show: usize,
    pub max_events: usize,

    /// Where fetched calendar payloads are cached for offline fallback.
    pub cache_dir: String,

    /// Per-request feed fetch timeout (humantime, e.g. "10s").
    pub fetch_timeout: String,

    pub weather: WeatherConfig,
    pub layout: LayoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timezone: None,
            calendar_url: None,
            calendar_url2: None,
            days_to_show: default_days_to_show(),
            max_events: default_max_events(),
            cache_dir: default_cache_dir(),
            fetch_timeout: default_fetch_timeout(),
            weather: WeatherConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

/// Temperature units requested from the weather service. Fixed by
/// configuration, never auto-detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    /// Query-string value for the weather API.
    pub fn api_value(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }

    /// Degree suffix for rendering.
    pub fn suffix(self) -> &'static str {
        match self {
            Units::Imperial => "°F",
            Units::Metric => "°C",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub units: Units,
    pub forecast_days: usize,
    /// Period between forecast refreshes (humantime, e.g. "30m").
    pub refresh: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            api_key: None,
            lat: None,
            lon: None,
            units: Units::default(),
            forecast_days: DEFAULT_FORECAST_SLOTS,
            refresh: DEFAULT_WEATHER_REFRESH.to_string(),
        }
    }
}

impl WeatherConfig {
    pub fn refresh_period(&self) -> PaperCalResult<Duration> {
        humantime::parse_duration(&self.refresh).map_err(|e| {
            PaperCalError::Config(format!("Invalid weather.refresh '{}': {e}", self.refresh))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Dashboard width and height in renderer units.
    pub screen_width: i32,
    pub screen_height: i32,
    pub marquee_speed: i32,
    pub marquee_step_ms: u64,
    pub marquee_gap: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            screen_width: 120,
            screen_height: 36,
            marquee_speed: DEFAULT_MARQUEE_SPEED,
            marquee_step_ms: DEFAULT_MARQUEE_STEP_MS,
            marquee_gap: DEFAULT_MARQUEE_GAP,
        }
    }
}

impl LayoutConfig {
    pub fn motion(&self) -> MarqueeMotion {
        MarqueeMotion {
            speed: self.marquee_speed,
            step: Duration::from_millis(self.marquee_step_ms),
            gap: self.marquee_gap,
        }
    }
}

impl Config {
    pub fn config_path() -> PaperCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PaperCalError::Config("Could not determine config directory".into()))?
            .join("papercal");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load_from(path: &Path) -> PaperCalResult<Config> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PaperCalError::Config(format!("Could not read {}: {e}", path.display()))
        })?;

        toml::from_str(&contents).map_err(|e| {
            PaperCalError::Config(format!("Could not parse {}: {e}", path.display()))
        })
    }

    /// Resolve the configured timezone rule, if one is set.
    pub fn timezone(&self) -> PaperCalResult<Option<Tz>> {
        match &self.timezone {
            Some(name) => Tz::from_str(name)
                .map(Some)
                .map_err(|_| PaperCalError::Timezone(name.clone())),
            None => Ok(None),
        }
    }

    pub fn fetch_timeout(&self) -> PaperCalResult<Duration> {
        humantime::parse_duration(&self.fetch_timeout).map_err(|e| {
            PaperCalError::Config(format!(
                "Invalid fetch_timeout '{}': {e}",
                self.fetch_timeout
            ))
        })
    }

    /// Cache directory with `~` expanded.
    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.cache_dir).into_owned())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PaperCalResult<()> {
        let contents = "\
# papercal configuration

# IANA timezone for the dashboard (defaults to the system zone):
# timezone = \"America/New_York\"

# Calendar feed sources (up to two, merged into one agenda):
# calendar_url = \"https://example.com/personal.ics\"
# calendar_url2 = \"https://example.com/work.ics\"

# days_to_show = 5
# max_events = 160
# cache_dir = \"~/.cache/papercal\"
# fetch_timeout = \"10s\"

# [weather]
# api_key = \"your-openweathermap-key\"
# lat = 40.78
# lon = -73.97
# units = \"imperial\"
# forecast_days = 7
# refresh = \"30m\"

# [layout]
# screen_width = 120
# screen_height = 36
# marquee_speed = 4
# marquee_step_ms = 180
# marquee_gap = 32
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = toml::from_str("calendar_url = \"https://example.com/a.ics\"")
            .expect("Minimal config should parse");

        assert_eq!(config.days_to_show, 5);
        assert_eq!(config.max_events, 160);
        assert_eq!(config.weather.units, Units::Imperial);
        assert_eq!(config.weather.forecast_days, 7);
        assert_eq!(config.layout.marquee_speed, 4);
        assert!(config.timezone().unwrap().is_none());
    }

    #[test]
    fn test_full_config_round_trip() {
        let config: Config = toml::from_str(
            r#"
timezone = "America/New_York"
calendar_url = "https://example.com/a.ics"
calendar_url2 = "https://example.com/b.ics"
days_to_show = 3

[weather]
api_key = "k"
lat = 40.78
lon = -73.97
units = "metric"
refresh = "15m"

[layout]
marquee_gap = 8
"#,
        )
        .expect("Full config should parse");

        assert_eq!(
            config.timezone().unwrap(),
            Some(chrono_tz::America::New_York)
        );
        assert_eq!(config.days_to_show, 3);
        assert_eq!(config.weather.units, Units::Metric);
        assert_eq!(
            config.weather.refresh_period().unwrap(),
            Duration::from_secs(15 * 60)
        );
        assert_eq!(config.layout.motion().gap, 8);
    }

    #[test]
    fn test_unknown_timezone_is_an_error() {
        let config: Config =
            toml::from_str("timezone = \"Mars/Olympus_Mons\"").expect("Shape parses");
        assert!(matches!(
            config.timezone(),
            Err(PaperCalError::Timezone(_))
        ));
    }

    #[test]
    fn test_bad_refresh_duration_is_an_error() {
        let config: Config = toml::from_str("[weather]\nrefresh = \"soonish\"").unwrap();
        assert!(config.weather.refresh_period().is_err());
    }
}
