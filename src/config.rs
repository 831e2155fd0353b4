use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_COLUMN_WIDTHS;

/// Page size and uniform margin, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PageMetrics {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageMetrics {
    pub const LETTER: PageMetrics = PageMetrics {
        width: 612.0,
        height: 792.0,
        margin: 50.0,
    };

    pub const A4: PageMetrics = PageMetrics {
        width: 595.28,
        height: 841.89,
        margin: 50.0,
    };

    pub fn content_bounds(&self) -> ContentBounds {
        ContentBounds {
            left: self.margin,
            top: self.margin,
            right: self.width - self.margin,
            bottom: self.height - self.margin,
        }
    }
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self::LETTER
    }
}

/// The printable area of a page, top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ContentBounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

/// What to do when content would cross the bottom margin.
///
/// Documents are single-page; there is no continuation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageBreakPolicy {
    /// Abort the render with a page overflow error.
    #[default]
    Fail,
    /// Keep drawing below the margin and log a warning.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page: PageMetrics,
    pub column_widths: [f32; 7],
    pub min_row_height: f32,
    pub row_padding: f32,
    pub page_break: PageBreakPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page: PageMetrics::default(),
            column_widths: DEFAULT_COLUMN_WIDTHS,
            min_row_height: 20.0,
            row_padding: 10.0,
            page_break: PageBreakPolicy::default(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
