/// Position within the ordered question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
    len: usize,
}

impl Navigator {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    /// Jump to `index`, clamped to `[0, len - 1]`. Returns the resulting index.
    pub fn go_to(&mut self, index: usize) -> usize {
        self.current = index.min(self.len.saturating_sub(1));
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.current.saturating_add(1))
    }

    pub fn previous(&mut self) -> usize {
        self.go_to(self.current.saturating_sub(1))
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.len
    }
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    /// 1-based position of the question on screen.
    pub position: usize,
}
