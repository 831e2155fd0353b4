//! Text metrics for the standard Helvetica faces and greedy word wrapping.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em for printable ASCII.
//! Anything outside that range is measured as a full em, which overestimates
//! rather than letting wide glyphs spill out of a cell.

use crate::backend::{FontStyle, TextStyle};

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.16;

const FALLBACK_WIDTH: u16 = 1000;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

pub fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT_FACTOR
}

fn glyph_width(ch: char, font: FontStyle) -> u16 {
    let table = match font {
        FontStyle::Regular => &HELVETICA,
        FontStyle::Bold => &HELVETICA_BOLD,
    };
    match ch as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Advance width of a single line of text, in points.
pub fn text_width(text: &str, style: TextStyle) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(glyph_width(ch, style.font))).sum();
    units as f32 * style.size / 1000.0
}

/// Break `text` into lines no wider than `width`.
///
/// Explicit newlines always break. Words longer than the width are split
/// between characters. Empty text produces no lines.
pub fn wrap(text: &str, width: f32, style: TextStyle) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate, style) <= width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = split_long_word(word, width, style, &mut lines);
        }
        lines.push(current);
    }
    lines
}

// Pushes full-width chunks of `word` and returns the unfinished tail.
fn split_long_word(word: &str, width: f32, style: TextStyle, lines: &mut Vec<String>) -> String {
    let mut chunk = String::new();
    for ch in word.chars() {
        chunk.push(ch);
        if text_width(&chunk, style) > width && chunk.chars().count() > 1 {
            chunk.pop();
            lines.push(std::mem::take(&mut chunk));
            chunk.push(ch);
        }
    }
    chunk
}

/// Height of `text` once wrapped at `width`.
pub fn wrapped_height(text: &str, width: f32, style: TextStyle) -> f32 {
    wrap(text, width, style).len() as f32 * line_height(style.size)
}
