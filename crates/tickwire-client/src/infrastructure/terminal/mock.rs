//! A [`Surface`] that records draw calls instead of painting.

use crate::application::game::Surface;

/// Records every `fill_rect` and `draw_text` call, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingSurface {
    /// `(x, y, width, height)` per `fill_rect`.
    pub rects: Vec<(i32, i32, i32, i32)>,
    /// `(text, x, y)` per `draw_text`.
    pub texts: Vec<(String, i32, i32)>,
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.rects.push((x, y, width, height));
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        self.texts.push((text.to_string(), x, y));
    }
}
