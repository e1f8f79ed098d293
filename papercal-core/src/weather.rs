//! Forecast aggregation and the weather payload subset it reads.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{PaperCalError, PaperCalResult};

/// One raw forecast sample from the 3-hourly feed.
#[derive(Debug, Clone)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    pub temp_min: f32,
    pub temp_max: f32,
    pub condition: String,
}

/// Aggregated high/low/condition for one local calendar day.
///
/// `high`/`low` stay `None` until a sample has updated them; the options
/// replace the original unset sentinels without ever entering arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSlot {
    pub date: NaiveDate,
    pub high: Option<i32>,
    pub low: Option<i32>,
    pub condition: String,
}

impl ForecastSlot {
    fn empty(date: NaiveDate) -> ForecastSlot {
        ForecastSlot {
            date,
            high: None,
            low: None,
            condition: String::new(),
        }
    }
}

/// The "now" projection shown in the header.
#[derive(Debug, Clone)]
pub struct CurrentConditions {
    pub temperature: i32,
    pub high: i32,
    pub low: i32,
    pub condition: String,
}

/// Weather state kept between refresh cycles.
///
/// Replaced wholesale on a successful fetch; a failed fetch must leave
/// the previous state completely untouched.
#[derive(Debug, Clone)]
pub struct WeatherState {
    pub current: CurrentConditions,
    pub slots: Vec<ForecastSlot>,
}

impl WeatherState {
    /// Build the full state for one refresh: aggregate `samples` into
    /// day slots, then project current conditions for `today`.
    pub fn build(
        temperature: i32,
        condition: String,
        samples: &[WeatherSample],
        tz: Tz,
        today: NaiveDate,
        slot_capacity: usize,
    ) -> WeatherState {
        let slots = aggregate_samples(samples, tz, slot_capacity);
        let current = current_conditions(&slots, today, temperature, condition);
        WeatherState { current, slots }
    }
}

/// Integer day key (`year*10000 + month*100 + day`) used for slot matching.
pub fn ymd_key(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}

/// Fold raw samples into at most `slot_capacity` per-day slots.
///
/// Grouping is by each sample's local day key, with slots created in
/// first-seen order; samples for a day past the capacity contribute
/// nothing. Temperatures are rounded to the nearest integer at the point
/// of comparison. The condition label prefers a midday (hour 11–14 local)
/// reading; outside that window the first label seen wins.
pub fn aggregate_samples(samples: &[WeatherSample], tz: Tz, slot_capacity: usize) -> Vec<ForecastSlot> {
    let mut slots: Vec<ForecastSlot> = Vec::new();
    let mut keys: Vec<u32> = Vec::new();

    for sample in samples {
        let local = sample.timestamp.with_timezone(&tz);
        let key = ymd_key(local.date_naive());

        let index = match keys.iter().position(|&k| k == key) {
            Some(i) => i,
            None => {
                if slots.len() >= slot_capacity {
                    continue;
                }
                keys.push(key);
                slots.push(ForecastSlot::empty(local.date_naive()));
                slots.len() - 1
            }
        };
        let slot = &mut slots[index];

        let t_max = sample.temp_max.round() as i32;
        let t_min = sample.temp_min.round() as i32;
        slot.high = Some(slot.high.map_or(t_max, |high| high.max(t_max)));
        slot.low = Some(slot.low.map_or(t_min, |low| low.min(t_min)));

        let hour = local.hour();
        if (11..=14).contains(&hour) || slot.condition.is_empty() {
            slot.condition = sample.condition.clone();
        }
    }

    slots
}

/// Project "now": high/low come from today's slot, falling back to the
/// first slot, and finally to the current temperature itself. A slot
/// whose high/low were never updated also falls back to the current
/// temperature.
pub fn current_conditions(
    slots: &[ForecastSlot],
    today: NaiveDate,
    temperature: i32,
    condition: String,
) -> CurrentConditions {
    let today_key = ymd_key(today);
    let slot = slots
        .iter()
        .find(|slot| ymd_key(slot.date) == today_key)
        .or_else(|| slots.first());

    let (high, low) = match slot {
        Some(slot) => (
            slot.high.unwrap_or(temperature),
            slot.low.unwrap_or(temperature),
        ),
        None => (temperature, temperature),
    };

    CurrentConditions {
        temperature,
        high,
        low,
        condition,
    }
}

// ---- Feed payload subset -------------------------------------------------

#[derive(Deserialize)]
struct CurrentPayload {
    main: CurrentMain,
    #[serde(default)]
    weather: Vec<ConditionTag>,
}

#[derive(Deserialize)]
struct CurrentMain {
    temp: f32,
}

#[derive(Deserialize)]
struct ForecastPayload {
    list: Vec<ForecastEntry>,
}

#[derive(Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: ForecastMain,
    #[serde(default)]
    weather: Vec<ConditionTag>,
}

#[derive(Deserialize)]
struct ForecastMain {
    temp_min: f32,
    temp_max: f32,
}

#[derive(Deserialize)]
struct ConditionTag {
    main: String,
}

/// Decode a current-conditions payload into (rounded temperature, label).
pub fn parse_current(payload: &str) -> PaperCalResult<(i32, String)> {
    let doc: CurrentPayload = serde_json::from_str(payload)
        .map_err(|e| PaperCalError::WeatherDecode(e.to_string()))?;
    let condition = doc
        .weather
        .into_iter()
        .next()
        .map(|tag| tag.main)
        .unwrap_or_default();
    Ok((doc.main.temp.round() as i32, condition))
}

/// Decode a forecast payload into raw samples. Entries whose timestamp is
/// out of range are skipped rather than failing the payload.
pub fn parse_forecast(payload: &str) -> PaperCalResult<Vec<WeatherSample>> {
    let doc: ForecastPayload = serde_json::from_str(payload)
        .map_err(|e| PaperCalError::WeatherDecode(e.to_string()))?;

    Ok(doc
        .list
        .into_iter()
        .filter_map(|entry| {
            let timestamp = DateTime::from_timestamp(entry.dt, 0)?;
            Some(WeatherSample {
                timestamp,
                temp_min: entry.main.temp_min,
                temp_max: entry.main.temp_max,
                condition: entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|tag| tag.main)
                    .unwrap_or_default(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn sample(utc: (i32, u32, u32, u32), temp_min: f32, temp_max: f32, cond: &str) -> WeatherSample {
        let (y, m, d, h) = utc;
        WeatherSample {
            timestamp: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            temp_min,
            temp_max,
            condition: cond.to_string(),
        }
    }

    #[test]
    fn test_samples_over_two_local_days_make_two_slots() {
        // Eight 3-hourly samples; in New York (UTC-4 in August) the first
        // four land on Aug 10, the rest on Aug 11.
        let samples = vec![
            sample((2026, 8, 10, 12), 68.0, 71.0, "Clouds"),
            sample((2026, 8, 10, 15), 70.0, 75.4, "Clear"),
            sample((2026, 8, 10, 18), 72.0, 74.0, "Clear"),
            sample((2026, 8, 10, 21), 66.0, 70.0, "Rain"),
            sample((2026, 8, 11, 6), 60.0, 63.0, "Clear"),
            sample((2026, 8, 11, 9), 62.0, 67.0, "Clouds"),
            sample((2026, 8, 11, 12), 64.0, 72.6, "Rain"),
            sample((2026, 8, 11, 15), 65.0, 71.0, "Clear"),
        ];

        let slots = aggregate_samples(&samples, New_York, 7);
        assert_eq!(slots.len(), 2);

        assert_eq!(slots[0].date, NaiveDate::from_ymd_opt(2026, 8, 10).unwrap());
        assert_eq!(slots[0].high, Some(75));
        assert_eq!(slots[0].low, Some(66));

        assert_eq!(slots[1].date, NaiveDate::from_ymd_opt(2026, 8, 11).unwrap());
        assert_eq!(slots[1].high, Some(73));
        assert_eq!(slots[1].low, Some(60));
    }

    #[test]
    fn test_midday_condition_overwrites_earlier_label() {
        // 15:00 UTC = 11:00 in New York (EDT): inside the midday window
        let samples = vec![
            sample((2026, 8, 10, 10), 60.0, 65.0, "Mist"),
            sample((2026, 8, 10, 15), 62.0, 70.0, "Clear"),
            sample((2026, 8, 10, 22), 61.0, 66.0, "Rain"),
        ];

        let slots = aggregate_samples(&samples, New_York, 7);
        assert_eq!(slots[0].condition, "Clear");
    }

    #[test]
    fn test_first_label_wins_outside_the_midday_window() {
        let samples = vec![
            sample((2026, 8, 10, 10), 60.0, 65.0, "Mist"),
            sample((2026, 8, 10, 23), 61.0, 66.0, "Rain"),
        ];

        let slots = aggregate_samples(&samples, New_York, 7);
        assert_eq!(slots[0].condition, "Mist");
    }

    #[test]
    fn test_days_past_the_slot_capacity_are_dropped() {
        let samples: Vec<WeatherSample> = (10..14)
            .map(|day| sample((2026, 8, day, 16), 60.0, 70.0, "Clear"))
            .collect();

        let slots = aggregate_samples(&samples, New_York, 2);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].date, NaiveDate::from_ymd_opt(2026, 8, 11).unwrap());
    }

    #[test]
    fn test_current_conditions_prefer_todays_slot() {
        let samples = vec![
            sample((2026, 8, 10, 15), 62.0, 75.0, "Clear"),
            sample((2026, 8, 11, 15), 58.0, 68.0, "Rain"),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 8, 11).unwrap();

        let state = WeatherState::build(70, "Clouds".to_string(), &samples, New_York, today, 7);
        assert_eq!(state.current.high, 68);
        assert_eq!(state.current.low, 58);
        assert_eq!(state.current.temperature, 70);
    }

    #[test]
    fn test_current_conditions_fall_back_to_first_slot() {
        let samples = vec![sample((2026, 8, 12, 15), 62.0, 75.0, "Clear")];
        let today = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();

        let state = WeatherState::build(70, "Clouds".to_string(), &samples, New_York, today, 7);
        assert_eq!(state.current.high, 75);
        assert_eq!(state.current.low, 62);
    }

    #[test]
    fn test_current_conditions_without_slots_use_the_temperature() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        let current = current_conditions(&[], today, 71, "Clear".to_string());

        assert_eq!(current.high, 71);
        assert_eq!(current.low, 71);
    }

    #[test]
    fn test_never_updated_slot_falls_back_to_the_temperature() {
        let slots = vec![ForecastSlot::empty(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap())];
        let today = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();

        let current = current_conditions(&slots, today, 69, "Clear".to_string());
        assert_eq!(current.high, 69);
        assert_eq!(current.low, 69);
    }

    #[test]
    fn test_parse_forecast_payload_subset() {
        let payload = r#"{
            "cod": "200",
            "list": [
                {
                    "dt": 1786467600,
                    "main": {"temp": 71.2, "temp_min": 68.4, "temp_max": 72.9},
                    "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds"}]
                },
                {
                    "dt": 1786478400,
                    "main": {"temp": 74.0, "temp_min": 71.0, "temp_max": 75.6},
                    "weather": []
                }
            ]
        }"#;

        let samples = parse_forecast(payload).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].condition, "Clouds");
        assert_eq!(samples[1].condition, "");
        assert!((samples[0].temp_max - 72.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_current_payload_subset() {
        let payload = r#"{
            "main": {"temp": 71.6, "humidity": 40},
            "weather": [{"main": "Clear", "description": "clear sky"}]
        }"#;

        let (temp, condition) = parse_current(payload).unwrap();
        assert_eq!(temp, 72);
        assert_eq!(condition, "Clear");
    }

    #[test]
    fn test_unparsable_payload_is_an_error() {
        assert!(parse_current("<html>err</html>").is_err());
        assert!(parse_forecast("{}").is_err());
    }

    #[test]
    fn test_ymd_key_encoding() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(ymd_key(date), 20_260_807);
    }
}
