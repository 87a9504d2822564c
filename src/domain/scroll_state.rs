/// Mutable state of one target's scroll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    /// `None` until the first measurement.
    pub last_count: Option<usize>,
    pub stall_count: u32,
    pub iteration: u32,
}

/// What a single measurement meant for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Grew { from: Option<usize>, to: usize },
    Stalled { count: usize, stall_count: u32 },
}

impl ScrollState {
    pub fn new() -> Self {
        ScrollState::default()
    }

    /// Seed with a count taken before the loop started.
    pub fn with_baseline(count: usize) -> Self {
        ScrollState {
            last_count: Some(count),
            ..ScrollState::default()
        }
    }

    pub fn observe(&mut self, count: usize) -> Progress {
        if self.last_count == Some(count) {
            self.stall_count += 1;
            Progress::Stalled {
                count,
                stall_count: self.stall_count,
            }
        } else {
            let from = self.last_count.replace(count);
            self.stall_count = 0;
            Progress::Grew { from, to: count }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// No new rows for `stall_limit` iterations; the list is fully loaded.
    Stalled,
    /// Hit `max_iterations`; the list may be incomplete.
    Capped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOutcome {
    pub exit: LoopExit,
    pub state: ScrollState,
}
