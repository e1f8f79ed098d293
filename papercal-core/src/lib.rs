//! Core models and layout engine for the papercal dashboard.
//!
//! The calendar side: raw feed text is scanned into a bounded
//! [`EventStore`], sorted, and bucketed into a rolling window of
//! [`DayView`]s. The weather side: raw forecast samples aggregate into
//! per-day [`weather::ForecastSlot`]s plus a current-conditions
//! projection. The layout engine wraps text into bounded boxes and builds
//! marquees for single-line overflow. Fetching bytes and drawing pixels
//! both stay with the caller.
//!
//! [`DayView`]: day_view::DayView
//! [`EventStore`]: store::EventStore

pub mod config;
pub mod constants;
pub mod day_view;
pub mod error;
pub mod event;
pub mod ics;
pub mod layout;
pub mod marquee;
pub mod store;
pub mod timezone;
pub mod weather;

// Re-export the types most callers need at the crate root
pub use config::{Config, LayoutConfig, Units, WeatherConfig};
pub use day_view::{DayView, build_day_views};
pub use error::{PaperCalError, PaperCalResult};
pub use event::CalendarEvent;
pub use store::EventStore;
pub use weather::{CurrentConditions, ForecastSlot, WeatherSample, WeatherState};
