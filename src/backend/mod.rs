//! Rendering backend capability.
//!
//! The layout engine only ever talks to a [`RenderBackend`]: it measures
//! wrapped text, places text runs and rules, and finally asks for the encoded
//! bytes. Coordinates are PDF points with the origin at the top-left corner
//! of the page and `y` growing downwards; a text run's `y` is the top of its
//! first line. Backends convert to whatever their output format needs.

mod pdf;
mod recording;

pub use pdf::PrintPdfBackend;
pub use recording::RecordingBackend;

use serde::Serialize;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Regular,
    Bold,
}

/// Face and size of a text run. Passed with every call; backends keep no
/// "current font".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub font: FontStyle,
    pub size: f32,
}

impl TextStyle {
    pub const fn new(font: FontStyle, size: f32) -> Self {
        Self { font, size }
    }

    pub const fn regular(size: f32) -> Self {
        Self::new(FontStyle::Regular, size)
    }

    pub const fn bold(size: f32) -> Self {
        Self::new(FontStyle::Bold, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Text placed in a box `width` points wide, wrapped and aligned inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub align: Align,
    pub style: TextStyle,
}

/// A straight stroke between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One positioned drawing primitive, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawInstruction {
    Text(TextRun),
    Line(Rule),
}

impl DrawInstruction {
    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            DrawInstruction::Text(run) => Some(run),
            DrawInstruction::Line(_) => None,
        }
    }

    pub fn as_line(&self) -> Option<&Rule> {
        match self {
            DrawInstruction::Line(rule) => Some(rule),
            DrawInstruction::Text(_) => None,
        }
    }
}

pub trait RenderBackend {
    /// Height of `text` once wrapped to `width`.
    fn measure_text_height(&self, text: &str, width: f32, style: TextStyle) -> Result<f32, RenderError>;

    fn draw_text(&mut self, run: &TextRun) -> Result<(), RenderError>;

    fn draw_line(&mut self, rule: &Rule) -> Result<(), RenderError>;

    /// Encode everything drawn so far.
    fn finalize(self) -> Result<Vec<u8>, RenderError>
    where
        Self: Sized;
}
