use trellis_core::{Point, Size, size};

/// Interpolates one block from its current size to a target size while its top-left corner
/// stays at `anchor`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeAnimation {
    pub block_id: String,
    pub from: Size,
    pub to: Size,
    pub anchor: Point,
    /// In `[0, 1]`.
    pub progress: f64,
}

impl ResizeAnimation {
    pub fn new(block_id: impl Into<String>, from: Size, to: Size, anchor: Point) -> Self {
        Self {
            block_id: block_id.into(),
            from,
            to,
            anchor,
            progress: 0.0,
        }
    }

    /// Advances progress by `delta` and returns `true` once the animation is complete.
    pub fn advance(&mut self, delta: f64) -> bool {
        self.progress = (self.progress + delta).clamp(0.0, 1.0);
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.progress >= 1.0
    }

    /// Interpolated size. Exactly `to` once done.
    pub fn current(&self) -> Size {
        if self.is_done() {
            return self.to;
        }
        let t = self.progress;
        size(
            self.from.width + (self.to.width - self.from.width) * t,
            self.from.height + (self.to.height - self.from.height) * t,
        )
    }
}
