//! Calendar feed parsing (lenient VEVENT subset).

mod parse;

pub use parse::{FeedBatch, parse_events};
