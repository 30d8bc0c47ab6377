use std::time::{Duration, Instant};

/// Example queries offered while there is nothing to show
pub const SUGGESTIONS: &[&str] = &[
    "Show me the API endpoint for creating a new user",
    "Is there a confirmation dialog when deleting an item?",
    "What is the default limit when getting users?",
];

/// How long each suggestion stays on screen
pub const ROTATE_EVERY: Duration = Duration::from_secs(5);

/// Cycles through [`SUGGESTIONS`] on a fixed interval
#[derive(Debug, Clone)]
pub struct SuggestionCycle {
    index: usize,
    shown_at: Instant,
}

impl SuggestionCycle {
    pub fn new(now: Instant) -> Self {
        Self {
            index: 0,
            shown_at: now,
        }
    }

    pub fn current(&self) -> &'static str {
        SUGGESTIONS[self.index % SUGGESTIONS.len()]
    }

    /// Advance past every interval that has elapsed by `now`.
    /// Returns true when the visible suggestion changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.shown_at);
        let steps = (elapsed.as_millis() / ROTATE_EVERY.as_millis()) as usize;
        if steps == 0 {
            return false;
        }
        self.index = (self.index + steps) % SUGGESTIONS.len();
        self.shown_at += ROTATE_EVERY * steps as u32;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_after_interval_and_wraps() {
        let start = Instant::now();
        let mut cycle = SuggestionCycle::new(start);
        assert_eq!(cycle.current(), SUGGESTIONS[0]);

        assert!(!cycle.tick(start + Duration::from_secs(4)));
        assert_eq!(cycle.current(), SUGGESTIONS[0]);

        assert!(cycle.tick(start + Duration::from_secs(5)));
        assert_eq!(cycle.current(), SUGGESTIONS[1]);

        assert!(cycle.tick(start + Duration::from_secs(16)));
        assert_eq!(cycle.current(), SUGGESTIONS[0]);
    }
}
