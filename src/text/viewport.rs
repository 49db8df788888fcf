use crate::text::style::DisplayLine;

/// Vertical window into a list of rendered display lines.
///
/// The scroll offset always satisfies `offset <= max(0, total - height)`;
/// every operation re-establishes that bound by clamping, so shrinking the
/// content or the viewport keeps the relative position instead of jumping
/// back to the top.
#[derive(Debug, Default)]
pub struct Viewport {
    lines: Vec<DisplayLine>,
    offset: usize,
    height: usize,
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            lines: Vec::new(),
            offset: 0,
            height,
        }
    }

    /// Replaces the rendered content, e.g. after a re-wrap on resize.
    pub fn set_lines(&mut self, lines: Vec<DisplayLine>) {
        self.lines = lines;
        self.clamp();
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.clamp();
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.offset = self
            .offset
            .saturating_add_signed(delta)
            .min(self.max_offset());
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.height as isize));
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.height as isize);
    }

    /// The visible slice, at most `height` lines starting at the offset.
    pub fn visible(&self) -> &[DisplayLine] {
        let end = self.offset.saturating_add(self.height).min(self.lines.len());
        &self.lines[self.offset..end]
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}
