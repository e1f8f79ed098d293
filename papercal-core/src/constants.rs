//! Shared defaults for capacities, the display window and marquee motion.

/// Combined event capacity across all calendar sources.
pub const DEFAULT_MAX_EVENTS: usize = 160;

/// Days shown in the rolling agenda window.
pub const DEFAULT_DAYS_TO_SHOW: usize = 5;

/// Per-day forecast slots kept by the aggregator.
pub const DEFAULT_FORECAST_SLOTS: usize = 7;

/// Units a marquee advances per step.
pub const DEFAULT_MARQUEE_SPEED: i32 = 4;

/// Minimum wall-clock milliseconds between marquee steps.
pub const DEFAULT_MARQUEE_STEP_MS: u64 = 180;

/// Gap between the two text copies in a marquee loop.
pub const DEFAULT_MARQUEE_GAP: i32 = 32;

/// Default period between weather refreshes.
pub const DEFAULT_WEATHER_REFRESH: &str = "30m";

/// Default per-request feed fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: &str = "10s";
