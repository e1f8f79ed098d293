//! Text layout: greedy word wrap into a bounded box.

/// Measurement capability supplied by the drawing collaborator.
///
/// Widths and heights are in whatever horizontal/vertical units the
/// renderer draws in (pixels, character cells); the layout engine only
/// compares them.
pub trait TextMeasure {
    /// Width of `text` at `size`.
    fn text_width(&self, text: &str, size: i32) -> i32;
    /// Vertical advance of one line at `size`, leading included.
    fn line_height(&self, size: i32) -> i32;
}

/// Target box for layout: left edge, top edge, width, and the vertical
/// limit below which nothing may be emitted.
#[derive(Debug, Clone, Copy)]
pub struct BoxBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub bottom: i32,
}

/// One positioned run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub text: String,
}

/// Outcome of a wrap: the spans that fit, plus the vertical cursor after
/// the last one. `next_y == None` means the box ran out of vertical space
/// before the text ran out.
#[derive(Debug)]
pub struct WrapResult {
    pub spans: Vec<TextSpan>,
    pub next_y: Option<i32>,
}

/// Marker appended when a single word must be cut to fit the box width.
const ELLIPSIS: char = '…';

/// Greedily pack words into lines no wider than the box.
///
/// Words are split on spaces; a literal line break forces a flush. Before
/// any line is emitted the next vertical position is checked against the
/// bottom limit, so a box with no usable height yields the sentinel
/// immediately. A trailing word wider than the box is truncated with an
/// ellipsis rather than overflowing.
pub fn wrap_into_box(
    measure: &dyn TextMeasure,
    bounds: BoxBounds,
    text: &str,
    size: i32,
) -> WrapResult {
    let line_h = measure.line_height(size);
    let mut spans: Vec<TextSpan> = Vec::new();
    let mut cy = bounds.y;
    let mut line = String::new();
    let mut word = String::new();

    // Emit the current line if another row fits above the bottom limit.
    fn flush(
        spans: &mut Vec<TextSpan>,
        line: &mut String,
        cy: &mut i32,
        line_h: i32,
        bounds: BoxBounds,
        size: i32,
    ) -> bool {
        if *cy + line_h > bounds.bottom {
            return false;
        }
        if !line.is_empty() {
            spans.push(TextSpan {
                x: bounds.x,
                y: *cy,
                size,
                text: std::mem::take(line),
            });
        }
        *cy += line_h;
        true
    }

    for c in text.chars().chain(std::iter::once(' ')) {
        if c != ' ' && c != '\n' {
            word.push(c);
            continue;
        }

        let prospect = if line.is_empty() {
            word.clone()
        } else {
            format!("{line} {word}")
        };
        if measure.text_width(&prospect, size) <= bounds.width {
            line = prospect;
        } else {
            if !flush(&mut spans, &mut line, &mut cy, line_h, bounds, size) {
                return WrapResult { spans, next_y: None };
            }
            line = word.clone();
        }
        word.clear();

        if c == '\n' && !flush(&mut spans, &mut line, &mut cy, line_h, bounds, size) {
            return WrapResult { spans, next_y: None };
        }
    }

    if !line.is_empty() {
        if measure.text_width(&line, size) > bounds.width {
            // Single unbreakable word wider than the box: cut and mark
            while !line.is_empty()
                && measure.text_width(&format!("{line}{ELLIPSIS}"), size) > bounds.width
            {
                line.pop();
            }
            line.push(ELLIPSIS);
        }
        if cy + line_h > bounds.bottom {
            return WrapResult { spans, next_y: None };
        }
        spans.push(TextSpan {
            x: bounds.x,
            y: cy,
            size,
            text: line,
        });
        cy += line_h;
    }

    WrapResult {
        spans,
        next_y: Some(cy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One unit per character, one unit per row: sizes are ignored so the
    /// geometry in these tests is easy to count.
    struct CharCells;

    impl TextMeasure for CharCells {
        fn text_width(&self, text: &str, _size: i32) -> i32 {
            text.chars().count() as i32
        }
        fn line_height(&self, _size: i32) -> i32 {
            1
        }
    }

    fn bounds(width: i32, height: i32) -> BoxBounds {
        BoxBounds {
            x: 0,
            y: 0,
            width,
            bottom: height,
        }
    }

    fn texts(result: &WrapResult) -> Vec<&str> {
        result.spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_short_text_stays_on_one_line() {
        let result = wrap_into_box(&CharCells, bounds(20, 5), "pick up keys", 1);
        assert_eq!(texts(&result), ["pick up keys"]);
        assert_eq!(result.next_y, Some(1));
    }

    #[test]
    fn test_words_wrap_at_the_box_width() {
        let result = wrap_into_box(&CharCells, bounds(11, 5), "one two three four", 1);
        assert_eq!(texts(&result), ["one two", "three four"]);
        assert_eq!(result.next_y, Some(2));
    }

    #[test]
    fn test_line_break_forces_a_flush() {
        let result = wrap_into_box(&CharCells, bounds(20, 5), "Room 4\nBuilding B", 1);
        assert_eq!(texts(&result), ["Room 4", "Building B"]);
    }

    #[test]
    fn test_oversized_word_is_truncated_with_ellipsis() {
        let result = wrap_into_box(&CharCells, bounds(8, 5), "Grundstücksverkehrsgenehmigung", 1);
        assert_eq!(texts(&result), ["Grundst…"]);
        assert_eq!(result.spans[0].text.chars().count(), 8);
        // The failed fit flushes an (empty) first row, so the truncated
        // word lands on the second row, as the cursor reflects.
        assert_eq!(result.spans[0].y, 1);
        assert_eq!(result.next_y, Some(2));
    }

    #[test]
    fn test_one_line_box_with_two_line_input_returns_the_sentinel() {
        let result = wrap_into_box(&CharCells, bounds(7, 1), "one two three", 1);
        assert_eq!(texts(&result), ["one two"]);
        assert_eq!(result.next_y, None);
    }

    #[test]
    fn test_zero_height_box_emits_nothing() {
        let result = wrap_into_box(&CharCells, bounds(10, 0), "anything at all", 1);
        assert!(result.spans.is_empty());
        assert_eq!(result.next_y, None);
    }

    #[test]
    fn test_spans_carry_their_vertical_positions() {
        let result = wrap_into_box(&CharCells, bounds(5, 10), "aa bb cc", 1);
        let ys: Vec<i32> = result.spans.iter().map(|s| s.y).collect();
        assert_eq!(ys, [0, 1]);
    }
}
