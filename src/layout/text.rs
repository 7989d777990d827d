use crate::config::LayoutConfig;
use crate::text_metrics;

use super::TextBlock;

/// Wraps each logical line to `max_width` and measures the result.
pub(crate) fn measure_lines(
    lines: &[String],
    font_size: f32,
    max_width: f32,
    config: &LayoutConfig,
    font_family: &str,
) -> TextBlock {
    let fast = config.fast_text_metrics;
    let mut wrapped = Vec::new();
    for line in lines {
        wrapped.extend(wrap_line(line.trim(), max_width, font_size, font_family, fast));
    }
    if wrapped.is_empty() {
        wrapped.push(String::new());
    }
    let width = wrapped
        .iter()
        .map(|line| text_width(line, font_size, font_family, fast))
        .fold(0.0, f32::max);
    let height = wrapped.len() as f32 * font_size * config.label_line_height;
    TextBlock {
        lines: wrapped,
        width,
        height,
    }
}

/// Measures a single-line label without wrapping.
pub(crate) fn measure_single(
    text: &str,
    font_size: f32,
    config: &LayoutConfig,
    font_family: &str,
) -> TextBlock {
    let width = text_width(text, font_size, font_family, config.fast_text_metrics);
    TextBlock {
        lines: vec![text.to_string()],
        width,
        height: font_size * config.label_line_height,
    }
}

pub(crate) fn wrap_line(
    line: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast: bool,
) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }
    if text_width(line, font_size, font_family, fast) <= max_width {
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
        if !current.is_empty() && text_width(&candidate, font_size, font_family, fast) > max_width {
            lines.push(std::mem::take(&mut current));
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

pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, fast: bool) -> f32 {
    if fast {
        return estimate_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| estimate_text_width(text, font_size))
}

// Rough em-fractions for a proportional sans-serif face.
fn width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.30,
        'i' | 'j' | 'l' | 'I' | '|' | '!' | '.' | ',' | ':' | ';' | '\'' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' | '/' => 0.36,
        'm' | 'w' => 0.84,
        'M' | 'W' | '@' | '%' => 0.92,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.60,
        c if c.is_ascii() => 0.56,
        _ => 0.90,
    }
}

pub(crate) fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(width_factor).sum::<f32>() * font_size
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn short_line_is_not_wrapped() {
        assert_eq!(wrap_line("Acme", 500.0, 14.0, "sans-serif", true), vec!["Acme"]);
    }

    #[test]
    fn long_address_wraps_on_words() {
        let lines = wrap_line(
            "Unit 4, 221 Long Industrial Estate Road, Manchester",
            120.0,
            14.0,
            "sans-serif",
            true,
        );
        assert!(lines.len() > 1, "expected wrapping, got {lines:?}");
        assert!(lines.iter().all(|line| !line.is_empty()));
    }

    #[test]
    fn oversized_single_word_stays_on_its_own_line() {
        let lines = wrap_line("Supercalifragilistic", 20.0, 14.0, "sans-serif", true);
        assert_eq!(lines, vec!["Supercalifragilistic"]);
    }

    #[test]
    fn estimate_scales_with_font_size() {
        let small = estimate_text_width("Holdco", 10.0);
        let large = estimate_text_width("Holdco", 20.0);
        assert!((large - small * 2.0).abs() < 0.01);
    }

    #[test]
    fn empty_input_measures_one_blank_line() {
        let config = fast_config();
        let block = measure_lines(&[], 14.0, 200.0, &config, "sans-serif");
        assert_eq!(block.lines.len(), 1);
        assert!(block.height > 0.0);
    }
}
