//! Terminal renderer: the drawing collaborator for the dashboard.
//!
//! Owns all character output. Day cards, the forecast ribbon and the
//! header are stamped onto a character-cell canvas from the spans the
//! core layout engine produces; marquee regions are stamped last so watch
//! mode can re-stamp them at each new offset without relaying anything.

use std::time::Instant;

use chrono::{DateTime, Datelike, NaiveTime, Timelike, Weekday};
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use papercal_core::layout::{BoxBounds, TextMeasure, TextSpan, wrap_into_box};
use papercal_core::marquee::{Marquee, MarqueeMotion, SingleLine, layout_single_line};
use papercal_core::{CalendarEvent, DayView, EventStore, LayoutConfig, Units, WeatherState};

/// Character-cell measurement: every cell is one unit wide and every row
/// one unit tall, whatever the nominal size.
pub struct CellMeasure;

impl TextMeasure for CellMeasure {
    fn text_width(&self, text: &str, _size: i32) -> i32 {
        text.chars().count() as i32
    }

    fn line_height(&self, _size: i32) -> i32 {
        1
    }
}

/// Fixed-size character grid that layout spans are stamped onto.
#[derive(Clone)]
pub struct Canvas {
    width: i32,
    height: i32,
    cells: Vec<char>,
}

impl Canvas {
    pub fn new(width: i32, height: i32) -> Canvas {
        Canvas {
            width,
            height,
            cells: vec![' '; (width.max(0) * height.max(0)) as usize],
        }
    }

    fn put_char(&mut self, x: i32, y: i32, c: char) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        self.cells[(y * self.width + x) as usize] = c;
    }

    pub fn put_str(&mut self, x: i32, y: i32, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.put_char(x + i as i32, y, c);
        }
    }

    /// Stamp `text`, keeping only cells inside `[clip_x, clip_x + clip_w)`.
    pub fn put_clipped(&mut self, x: i32, y: i32, text: &str, clip_x: i32, clip_w: i32) {
        for (i, c) in text.chars().enumerate() {
            let cx = x + i as i32;
            if cx >= clip_x && cx < clip_x + clip_w {
                self.put_char(cx, y, c);
            }
        }
    }

    pub fn put_span(&mut self, span: &TextSpan) {
        self.put_str(span.x, span.y, &span.text);
    }

    pub fn hline(&mut self, x: i32, y: i32, width: i32) {
        for i in 0..width {
            self.put_char(x + i, y, '─');
        }
    }

    fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|y| {
            (0..self.width)
                .map(|x| self.cells[(y * self.width + x) as usize])
                .collect()
        })
    }
}

/// One rendered frame: colored header lines, the card canvas, and the
/// marquee regions that animate over it in watch mode.
pub struct Frame {
    pub header: Vec<String>,
    pub canvas: Canvas,
    pub marquees: Vec<Marquee>,
}

impl Frame {
    /// Tick every marquee region independently; returns whether any moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut moved = false;
        for marquee in &mut self.marquees {
            moved |= marquee.tick(now);
        }
        moved
    }

    /// Paint the frame: header, then the canvas with every marquee
    /// stamped at its current offset, clipped to its own region.
    pub fn paint(&self) -> String {
        let mut canvas = self.canvas.clone();
        for marquee in &self.marquees {
            for i in 0..marquee.width {
                canvas.put_char(marquee.x + i, marquee.y, ' ');
            }
            for span in marquee.spans() {
                canvas.put_clipped(span.x, span.y, &span.text, marquee.x, marquee.width);
            }
        }

        let mut out = String::new();
        for line in &self.header {
            out.push_str(line);
            out.push('\n');
        }
        for row in canvas.rows() {
            out.push_str(row.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Build one full dashboard frame from the current snapshot.
pub fn build_frame(
    store: &EventStore,
    days: &[DayView],
    weather: Option<&WeatherState>,
    now_local: DateTime<Tz>,
    layout: &LayoutConfig,
    units: Units,
    now: Instant,
) -> Frame {
    let header = build_header(weather, now_local, units);
    let mut canvas = Canvas::new(layout.screen_width, layout.screen_height);
    let mut marquees = Vec::new();
    let motion = layout.motion();

    let day_count = days.len().max(1) as i32;
    let gap = 2;
    let card_w = ((layout.screen_width - (day_count - 1) * gap) / day_count).max(8);

    for (i, day) in days.iter().enumerate() {
        let x = i as i32 * (card_w + gap);
        draw_day_card(
            &mut canvas,
            store,
            day,
            x,
            0,
            card_w,
            layout.screen_height,
            i == 0,
            motion,
            now,
            &mut marquees,
        );
    }

    Frame {
        header,
        canvas,
        marquees,
    }
}

fn build_header(
    weather: Option<&WeatherState>,
    now_local: DateTime<Tz>,
    units: Units,
) -> Vec<String> {
    let month_year = now_local.format("%B %Y").to_string().to_uppercase();
    let day = format!("{} {}", weekday_label(now_local.weekday()), now_local.day());
    let clock = time12(now_local.time());

    let mut lines = Vec::new();
    match weather {
        Some(state) => {
            let current = &state.current;
            lines.push(format!(
                "{}   {}   {}      {}{} {}   H:{} L:{}",
                month_year.bold(),
                day.bold(),
                clock,
                current.temperature,
                units.suffix(),
                current.condition,
                current.high,
                current.low,
            ));
            if !state.slots.is_empty() {
                lines.push(forecast_ribbon(state));
            }
        }
        None => lines.push(format!("{}   {}   {}", month_year.bold(), day.bold(), clock)),
    }
    lines.push(String::new());
    lines
}

fn forecast_ribbon(state: &WeatherState) -> String {
    state
        .slots
        .iter()
        .map(|slot| {
            let high = slot.high.map_or("--".to_string(), |h| h.to_string());
            let low = slot.low.map_or("--".to_string(), |l| l.to_string());
            format!(
                "{} {} {}°/{}°",
                slot.date.format("%a").to_string().to_uppercase(),
                slot.condition,
                high,
                low
            )
        })
        .collect::<Vec<_>>()
        .join("   ")
}

#[allow(clippy::too_many_arguments)]
fn draw_day_card(
    canvas: &mut Canvas,
    store: &EventStore,
    day: &DayView,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    is_today: bool,
    motion: MarqueeMotion,
    now: Instant,
    marquees: &mut Vec<Marquee>,
) {
    let label = if is_today {
        format!("{} {} ◂", day.date.day(), weekday_label(day.weekday))
    } else {
        format!("{} {}", day.date.day(), weekday_label(day.weekday))
    };
    canvas.put_str(x, y, &label);
    canvas.hline(x, y + 1, w);

    let bottom = y + h - 1; // last row is reserved for the overflow count
    let mut cy = y + 2;
    let mut hidden = 0;

    for (k, &index) in day.indices.iter().enumerate() {
        let Some(event) = store.get(index) else {
            continue;
        };
        // every block needs at least a badge, title and separator row
        if cy + 3 > bottom {
            hidden = day.indices.len() - k;
            break;
        }
        let after = draw_event_block(canvas, x, cy, w, bottom, event, motion, now, marquees);
        if after <= cy {
            hidden = day.indices.len() - k;
            break;
        }
        cy = after;
    }

    if hidden > 0 {
        canvas.put_str(x, y + h - 1, &format!("+ {hidden} more"));
    }

    // an empty day is an explicit state, never a blank box
    if day.is_empty() {
        canvas.put_str(x, y + 2, "No events");
    }
}

/// Lay out one event inside a card: time badge, optional end badge, title
/// line (marquee when it overflows), wrapped location, separator. Returns
/// the next vertical cursor.
#[allow(clippy::too_many_arguments)]
fn draw_event_block(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    w: i32,
    bottom: i32,
    event: &CalendarEvent,
    motion: MarqueeMotion,
    now: Instant,
    marquees: &mut Vec<Marquee>,
) -> i32 {
    let measure = CellMeasure;
    let mut cy = y;

    let badge = if event.all_day {
        "All-day".to_string()
    } else {
        event.start.map(time12).unwrap_or_default()
    };
    canvas.put_str(x, cy, &format!("[{badge}]"));
    cy += 1;

    if !event.all_day {
        if let Some(end) = event.end {
            canvas.put_str(x, cy, &format!("[{}]", time12(end)));
            cy += 1;
        }
    }

    if !event.title.is_empty() && cy + 1 <= bottom {
        match layout_single_line(&measure, x, cy, w, &event.title, 1, motion, now) {
            SingleLine::Static(span) => canvas.put_span(&span),
            SingleLine::Scrolling(marquee) => marquees.push(marquee),
        }
        cy += 1;
    }

    if !event.location.is_empty() {
        let wrapped = wrap_into_box(
            &measure,
            BoxBounds {
                x,
                y: cy,
                width: w,
                bottom,
            },
            &event.location,
            1,
        );
        for span in &wrapped.spans {
            canvas.put_span(span);
        }
        cy = wrapped.next_y.unwrap_or(bottom);
    }

    if cy + 1 <= bottom {
        canvas.hline(x, cy, w);
        cy += 1;
    }
    cy
}

/// 12-hour clock label, "3:04 PM".
pub fn time12(t: NaiveTime) -> String {
    let (is_pm, hour) = t.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        t.minute(),
        if is_pm { "PM" } else { "AM" }
    )
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "SUN",
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
    }
}

/// One-line listing entry for `papercal events`.
pub fn event_line(event: &CalendarEvent) -> String {
    let time = if event.all_day {
        "All-day".to_string()
    } else {
        event.start.map(time12).unwrap_or_default()
    };
    let mut line = format!(
        "{}  {:>8}  {}",
        event.date.format("%Y-%m-%d"),
        time,
        event.title
    );
    if !event.location.is_empty() {
        line.push_str(&format!("  ({})", event.location.dimmed()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time12_formatting() {
        assert_eq!(time12(NaiveTime::from_hms_opt(0, 5, 0).unwrap()), "12:05 AM");
        assert_eq!(time12(NaiveTime::from_hms_opt(9, 0, 0).unwrap()), "9:00 AM");
        assert_eq!(time12(NaiveTime::from_hms_opt(12, 30, 0).unwrap()), "12:30 PM");
        assert_eq!(time12(NaiveTime::from_hms_opt(15, 4, 0).unwrap()), "3:04 PM");
    }

    #[test]
    fn test_canvas_clips_marquee_spans() {
        let mut canvas = Canvas::new(10, 1);
        canvas.put_clipped(-3, 0, "abcdefgh", 0, 4);
        let row: String = canvas.rows().next().unwrap();
        assert_eq!(row.trim_end(), "defg");
    }

    #[test]
    fn test_canvas_ignores_out_of_range_cells() {
        let mut canvas = Canvas::new(4, 2);
        canvas.put_str(2, 1, "long text runs off");
        canvas.put_str(0, 5, "below the canvas");
        let rows: Vec<String> = canvas.rows().collect();
        assert_eq!(rows[1], "  lo");
    }
}
