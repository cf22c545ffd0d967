use std::time::Duration;

/// Fixed backoff schedule for reconnect attempts.
const BACKOFF_SECS: [u64; 5] = [2, 4, 8, 16, 30];
const MAX_ATTEMPTS: u32 = 5;

/// Reconnection policy: how many attempts to make after an unexpected
/// transport disconnect, and how long to wait before each one.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    delays: Vec<Duration>,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(delays: Vec<Duration>, max_attempts: u32) -> Self {
        Self {
            delays,
            max_attempts,
        }
    }

    /// Delay before the given 1-based attempt. Attempts beyond the end of
    /// the schedule reuse the last delay; an empty schedule falls back to
    /// the default first delay.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let index = (attempt.saturating_sub(1) as usize).min(self.delays.len().saturating_sub(1));
        match self.delays.get(index) {
            Some(delay) => *delay,
            None => Duration::from_secs(BACKOFF_SECS[0]),
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delays: BACKOFF_SECS.iter().map(|s| Duration::from_secs(*s)).collect(),
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(4), Duration::from_secs(16));
        assert_eq!(policy.delay_for(5), Duration::from_secs(30));
    }

    #[test]
    fn test_delay_clamps_past_schedule_end() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(6), Duration::from_secs(30));
        assert_eq!(policy.delay_for(100), Duration::from_secs(30));
    }

    #[test]
    fn test_attempt_zero_uses_first_delay() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
    }

    #[test]
    fn test_custom_policy() {
        let policy = ReconnectPolicy::new(vec![Duration::from_millis(100)], 2);
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(100));
        assert_eq!(policy.max_attempts, 2);
    }

    #[test]
    fn test_empty_schedule_uses_fallback_delay() {
        let policy = ReconnectPolicy::new(Vec::new(), 3);
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(7), Duration::from_secs(2));
    }
}
