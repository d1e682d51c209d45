// Rotating window over the visible review list.
//
// Purpose
// - Decide which entries a carousel shows, without any rendering concerns.

pub const WIDE_LAYOUT_MIN_WIDTH: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    start: usize,
    visible: usize,
}

impl Rotation {
    pub fn new(visible: usize) -> Self {
        Self { start: 0, visible }
    }

    pub fn for_width(width_px: u32) -> Self {
        Self::new(Self::visible_for_width(width_px))
    }

    /// Three cards on tablet and desktop widths, two on phones.
    pub fn visible_for_width(width_px: u32) -> usize {
        if width_px >= WIDE_LAYOUT_MIN_WIDTH { 3 } else { 2 }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Indices to show, wrapping around the end of the list.
    pub fn window(&self, len: usize) -> Vec<usize> {
        if len == 0 {
            return Vec::new();
        }
        (0..self.visible.min(len))
            .map(|i| (self.start + i) % len)
            .collect()
    }

    pub fn next(&mut self, len: usize) {
        self.advance(1, len);
    }

    /// Move forward by `steps` entries, wrapping modulo `len`.
    pub fn advance(&mut self, steps: usize, len: usize) {
        self.start = if len == 0 {
            0
        } else {
            (self.start % len + steps % len) % len
        };
    }

    /// Move forward by whole pages of `visible` entries.
    pub fn advance_pages(&mut self, pages: usize, len: usize) {
        if len == 0 {
            self.start = 0;
            return;
        }
        let steps = (pages % len).saturating_mul(self.visible % len) % len;
        self.advance(steps, len);
    }

    pub fn prev(&mut self, len: usize) {
        self.start = if len == 0 {
            0
        } else {
            (self.start % len + len - 1) % len
        };
    }

    pub fn reset(&mut self) {
        self.start = 0;
    }

    pub fn should_auto_rotate(&self, len: usize, paused: bool) -> bool {
        !paused && len > self.visible
    }
}
