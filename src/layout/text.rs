use crate::config::LayoutConfig;
use crate::text_metrics::{TextMeasurer, split_lines};

use super::TextBlock;

const AVERAGE_SAMPLE: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Measures a label at the configured font size, wrapping long lines.
pub(super) fn measure_label(
    measurer: &dyn TextMeasurer,
    text: &str,
    config: &LayoutConfig,
) -> TextBlock {
    measure_label_with_font_size(measurer, text, config.font_size, config, true)
}

pub(super) fn measure_label_with_font_size(
    measurer: &dyn TextMeasurer,
    text: &str,
    font_size: f32,
    config: &LayoutConfig,
    wrap: bool,
) -> TextBlock {
    let max_width_px = max_label_width_px(measurer, config.max_label_width_chars, font_size);
    let mut lines = Vec::new();
    for line in split_lines(text) {
        if wrap {
            lines.extend(wrap_line(measurer, &line, max_width_px, font_size));
        } else {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let width = lines
        .iter()
        .map(|line| measurer.measure(line, font_size).width)
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * config.label_line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}

pub(super) fn optional_label(
    measurer: &dyn TextMeasurer,
    text: Option<&str>,
    config: &LayoutConfig,
) -> Option<TextBlock> {
    text.filter(|t| !t.trim().is_empty())
        .map(|t| measure_label(measurer, t, config))
}

pub(super) fn wrap_line(
    measurer: &dyn TextMeasurer,
    line: &str,
    max_width: f32,
    font_size: f32,
) -> Vec<String> {
    if measurer.measure(line, font_size).width <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measurer.measure(&candidate, font_size).width > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn max_label_width_px(measurer: &dyn TextMeasurer, max_chars: usize, font_size: f32) -> f32 {
    let sample = measurer.measure(AVERAGE_SAMPLE, font_size).width;
    let avg_char = sample / AVERAGE_SAMPLE.len() as f32;
    max_chars.max(1) as f32 * avg_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::DeterministicTextMeasurer;

    #[test]
    fn wrap_line_does_not_wrap_short_text() {
        let measurer = DeterministicTextMeasurer::default();
        let result = wrap_line(&measurer, "short", 1000.0, 16.0);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn wrap_line_splits_long_text() {
        let measurer = DeterministicTextMeasurer::default();
        let result = wrap_line(
            &measurer,
            "this is a rather long line that should be wrapped",
            100.0,
            16.0,
        );
        assert!(result.len() > 1, "expected wrapping, got {:?}", result);
    }

    #[test]
    fn measure_label_produces_nonempty_block() {
        let measurer = DeterministicTextMeasurer::default();
        let block = measure_label(&measurer, "Hello world", &LayoutConfig::default());
        assert!(!block.lines.is_empty());
        assert!(block.width > 0.0);
        assert!(block.height > 0.0);
    }

    #[test]
    fn measure_label_empty_string_produces_single_line() {
        let measurer = DeterministicTextMeasurer::default();
        let block = measure_label(&measurer, "", &LayoutConfig::default());
        assert_eq!(block.lines.len(), 1);
    }

    #[test]
    fn blank_optional_label_is_none() {
        let measurer = DeterministicTextMeasurer::default();
        assert!(optional_label(&measurer, Some("  "), &LayoutConfig::default()).is_none());
    }
}
