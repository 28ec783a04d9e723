//! Text measurement used for bounding boxes and label placement.

use serde::Deserialize;

/// Point size of the name/property label block drawn next to a symbol.
pub const LABEL_POINT_SIZE: f64 = 10.0;

/// Measures rendered text. Supplied by the host application, usually backed
/// by its font engine.
pub trait TextMetrics {
    /// Width and height of `text` rendered at `point_size`.
    ///
    /// Multi-line text reports the widest line and the summed line heights.
    fn measure(&self, text: &str, point_size: f64) -> (i32, i32);

    /// Width and line height of one line of the label block.
    fn label_line(&self, text: &str) -> (i32, i32) {
        self.measure(text, LABEL_POINT_SIZE)
    }
}

impl<T: TextMetrics + ?Sized> TextMetrics for &T {
    fn measure(&self, text: &str, point_size: f64) -> (i32, i32) {
        (**self).measure(text, point_size)
    }

    fn label_line(&self, text: &str) -> (i32, i32) {
        (**self).label_line(text)
    }
}

/// Fixed-pitch approximation of a font, scaled by point size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonospaceMetrics {
    /// Character advance as a fraction of the point size
    pub advance: f64,
    /// Line height as a fraction of the point size
    pub line_height: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure(&self, text: &str, point_size: f64) -> (i32, i32) {
        let line = (self.line_height * point_size).round() as i32;
        let advance = self.advance * point_size;
        let (widest, lines) = text.split('\n').fold((0usize, 0i32), |(w, n), l| {
            (w.max(l.chars().count()), n + 1)
        });
        ((widest as f64 * advance).round() as i32, line * lines)
    }
}
