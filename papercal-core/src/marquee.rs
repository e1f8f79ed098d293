//! Horizontally scrolling single-line text regions.

use std::time::{Duration, Instant};

use crate::constants::{DEFAULT_MARQUEE_GAP, DEFAULT_MARQUEE_SPEED, DEFAULT_MARQUEE_STEP_MS};
use crate::layout::{TextMeasure, TextSpan};

/// Motion parameters shared by all marquee regions on a screen.
#[derive(Debug, Clone, Copy)]
pub struct MarqueeMotion {
    /// Units the offset advances per step.
    pub speed: i32,
    /// Minimum wall-clock time between steps.
    pub step: Duration,
    /// Gap between the two text copies in the loop buffer.
    pub gap: i32,
}

impl Default for MarqueeMotion {
    fn default() -> Self {
        MarqueeMotion {
            speed: DEFAULT_MARQUEE_SPEED,
            step: Duration::from_millis(DEFAULT_MARQUEE_STEP_MS),
            gap: DEFAULT_MARQUEE_GAP,
        }
    }
}

/// How a single-line region is presented: static when the text fits its
/// box, scrolling otherwise.
#[derive(Debug)]
pub enum SingleLine {
    /// Fits: render once, clipped to the box.
    Static(TextSpan),
    /// Overflows: a looping marquee.
    Scrolling(Marquee),
}

/// Lay out one line of text for a fixed-width region at `(x, y)`.
pub fn layout_single_line(
    measure: &dyn TextMeasure,
    x: i32,
    y: i32,
    width: i32,
    text: &str,
    size: i32,
    motion: MarqueeMotion,
    now: Instant,
) -> SingleLine {
    let text_width = measure.text_width(text, size);
    if text_width <= width {
        return SingleLine::Static(TextSpan {
            x,
            y,
            size,
            text: text.to_string(),
        });
    }

    SingleLine::Scrolling(Marquee {
        x,
        y,
        width,
        height: measure.line_height(size),
        size,
        text: text.to_string(),
        text_width,
        loop_width: text_width + motion.gap + width,
        gap: motion.gap,
        offset: 0,
        speed: motion.speed,
        step: motion.step,
        last_step: now,
    })
}

/// State for one scrolling region.
///
/// The loop buffer holds the text twice, `gap` apart, and is
/// `text_width + gap + width` wide, so the copies tile seamlessly as the
/// offset wraps.
#[derive(Debug)]
pub struct Marquee {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub size: i32,
    pub text: String,
    pub text_width: i32,
    pub loop_width: i32,
    gap: i32,
    offset: i32,
    speed: i32,
    step: Duration,
    last_step: Instant,
}

impl Marquee {
    /// Current scroll offset into the loop buffer.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Spans for the two text copies, positioned for the current offset.
    /// The renderer clips them to `[x, x + width)`.
    pub fn spans(&self) -> [TextSpan; 2] {
        let base = self.x - self.offset;
        [
            TextSpan {
                x: base,
                y: self.y,
                size: self.size,
                text: self.text.clone(),
            },
            TextSpan {
                x: base + self.text_width + self.gap,
                y: self.y,
                size: self.size,
                text: self.text.clone(),
            },
        ]
    }

    /// Advance one step and wrap the offset into `[0, loop_width)`.
    ///
    /// Wraps downward past the loop width and, defensively, upward from
    /// any negative value, so after k steps the offset equals
    /// `(k * speed) mod loop_width`.
    pub fn advance(&mut self) {
        self.offset += self.speed;
        if self.offset >= self.loop_width {
            self.offset -= self.loop_width;
        }
        if self.offset < 0 {
            self.offset += self.loop_width;
        }
    }

    /// Rate-limited advance: steps only when the step interval has
    /// elapsed since this region's last step. Returns whether the region
    /// moved. Regions tick independently; one call per region per render
    /// frame.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_step) < self.step {
            return false;
        }
        self.last_step = now;
        self.advance();
        true
    }
}
