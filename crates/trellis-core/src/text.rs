//! Text measurement oracle.
//!
//! The layout engine never rasterizes text. Callers plug in whatever measures strings the way
//! their renderer will draw them; [`DeterministicTextMeasurer`] is the fallback used when nothing
//! better is available (tests, the CLI, size estimates before the first frame).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_family: Option<String>,
    /// Font height in world units.
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 13.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;

    fn width(&self, text: &str, style: &TextStyle) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        self.measure(text, style).width
    }
}

/// Fixed advance per character. Good enough for monospace-ish estimates and fully reproducible.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.55
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(1.0);
        let mut line_count = 0usize;
        let mut max_chars = 0usize;
        for line in text.split('\n') {
            line_count += 1;
            max_chars = max_chars.max(line.chars().count());
        }

        TextMetrics {
            width: max_chars as f64 * font_size * char_width_factor,
            height: line_count as f64 * font_size * line_height_factor,
            line_count,
        }
    }
}
