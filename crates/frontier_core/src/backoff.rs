/// Lowest delay, in backoff units.
pub const DEFAULT_FLOOR: u32 = 10;
/// Highest delay, in backoff units.
pub const DEFAULT_CEILING: u32 = 20;

/// Adaptive delay shared by every task kind.
///
/// The value doubles as request timeout and failure cool-down. It moves one
/// unit per observation and always stays within `[floor, ceiling]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    current: u32,
    floor: u32,
    ceiling: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_FLOOR, DEFAULT_CEILING)
    }
}

impl Backoff {
    /// Starts at `floor`. A ceiling below the floor is raised to it.
    pub fn new(floor: u32, ceiling: u32) -> Self {
        Self {
            current: floor,
            floor,
            ceiling: ceiling.max(floor),
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn on_success(&mut self) {
        self.current = self.current.saturating_sub(1).max(self.floor);
    }

    /// Returns the delay to wait out now, then grows the stored value.
    pub fn on_failure(&mut self) -> u32 {
        let delay = self.current;
        self.current = self.current.saturating_add(1).min(self.ceiling);
        delay
    }
}
