// In crates/engine/src/schedule.rs

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Bookkeeping of the continuous loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleState {
    /// Index of the last cycle started; the first cycle is 1.
    pub cycle_index: u64,
    /// Wall-clock start of the last cycle.
    pub last_run: Option<DateTime<Utc>>,
    /// Cycles that ended with an error.
    pub failed_cycles: u64,
}

impl CycleState {
    /// Moves to the next cycle and returns its index.
    pub fn advance(&mut self) -> u64 {
        self.cycle_index += 1;
        self.last_run = Some(Utc::now());
        self.cycle_index
    }
}

/// Time to wait before the next cycle: `max(1s, interval - elapsed)`.
pub fn sleep_duration(interval_secs: u64, elapsed: Duration) -> Duration {
    Duration::from_secs(interval_secs)
        .saturating_sub(elapsed)
        .max(Duration::from_secs(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleeps_the_rest_of_the_interval() {
        assert_eq!(
            sleep_duration(300, Duration::from_secs(12)),
            Duration::from_secs(288)
        );
        assert_eq!(
            sleep_duration(300, Duration::from_millis(500)),
            Duration::from_millis(299_500)
        );
    }

    #[test]
    fn never_sleeps_less_than_a_second() {
        assert_eq!(sleep_duration(300, Duration::from_secs(300)), Duration::from_secs(1));
        assert_eq!(sleep_duration(300, Duration::from_secs(999)), Duration::from_secs(1));
        assert_eq!(sleep_duration(1, Duration::from_millis(200)), Duration::from_secs(1));
    }

    #[test]
    fn advance_counts_from_one() {
        let mut state = CycleState::default();
        assert_eq!(state.advance(), 1);
        assert_eq!(state.advance(), 2);
        assert!(state.last_run.is_some());
    }
}
