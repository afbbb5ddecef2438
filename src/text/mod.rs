//! # Text Layout
//!
//! Greedy line breaking against the base-font metrics. Break opportunities
//! come from UAX#14, so hyphens, slashes and explicit newlines behave the
//! way readers expect. A word wider than the line is split at the last
//! character that fits.

use crate::font::StandardFont;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The text with trailing whitespace removed.
    pub text: String,
    /// Width of `text` in points.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` is the break opportunity *before* char `i`. Index 0 is always
/// `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn make_line(chars: &[char], font: StandardFont, font_size: f64) -> BrokenLine {
    let text: String = chars
        .iter()
        .filter(|c| !is_line_terminator(**c))
        .collect::<String>()
        .trim_end()
        .to_string();
    let width = font.measure(&text, font_size);
    BrokenLine { text, width }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Always returns at least one line; empty input yields a single empty line.
pub fn wrap_text(text: &str, max_width: f64, font: StandardFont, font_size: f64) -> Vec<BrokenLine> {
    if text.is_empty() {
        return vec![BrokenLine {
            text: String::new(),
            width: 0.0,
        }];
    }

    let chars: Vec<char> = text.chars().collect();
    let widths: Vec<f64> = chars.iter().map(|&c| font.char_width(c, font_size)).collect();
    let break_opps = compute_break_opportunities(text);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break_point: Option<usize> = None;

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 {
            match break_opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(make_line(&chars[line_start..i], font, font_size));
                    line_start = i;
                    line_width = 0.0;
                    last_break_point = None;
                }
                Some(BreakOpportunity::Allowed) => {
                    last_break_point = Some(i);
                }
                None => {}
            }
        }

        if is_line_terminator(ch) {
            continue;
        }

        // Trailing spaces never force a wrap.
        if ch.is_whitespace() {
            line_width += widths[i];
            continue;
        }

        if line_width + widths[i] > max_width && line_start < i {
            let break_at = match last_break_point {
                Some(bp) if bp > line_start => bp,
                _ => i,
            };
            lines.push(make_line(&chars[line_start..break_at], font, font_size));
            line_start = break_at;
            line_width = widths[line_start..=i].iter().sum();
            last_break_point = None;
            continue;
        }

        line_width += widths[i];
    }

    if line_start < chars.len() {
        lines.push(make_line(&chars[line_start..], font, font_size));
    }

    lines
}
