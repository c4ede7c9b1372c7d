//! Minimum interval between pair switches that hit the backend.
//!
//! Only live (cache-miss) loads are recorded; loads served from the chart
//! cache never consume the window.

/// Cooldown window over live pair switches.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    last_switch_at: Option<i64>,
    window_ms: i64,
}

impl CooldownGate {
    pub fn new(window_ms: i64) -> Self {
        Self {
            last_switch_at: None,
            window_ms: window_ms.max(0),
        }
    }

    /// True while `now - last_switch_at < window`
    pub fn is_blocked(&self, now_ms: i64) -> bool {
        match self.last_switch_at {
            Some(last) => now_ms - last < self.window_ms,
            None => false,
        }
    }

    /// Milliseconds left before the next live switch is allowed
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        match self.last_switch_at {
            Some(last) => (self.window_ms - (now_ms - last)).max(0),
            None => 0,
        }
    }

    /// Start a new window at `now_ms`
    pub fn record_switch(&mut self, now_ms: i64) {
        self.last_switch_at = Some(now_ms);
    }

    pub fn last_switch_at(&self) -> Option<i64> {
        self.last_switch_at
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_gate_is_open() {
        let gate = CooldownGate::new(30_000);
        assert!(!gate.is_blocked(0));
        assert_eq!(gate.remaining_ms(0), 0);
        assert_eq!(gate.last_switch_at(), None);
    }

    #[test]
    fn test_window_arithmetic() {
        let mut gate = CooldownGate::new(30_000);
        gate.record_switch(0);

        assert!(gate.is_blocked(10_000));
        assert_eq!(gate.remaining_ms(10_000), 20_000);
        assert!(gate.is_blocked(29_999));
        assert!(!gate.is_blocked(30_000));
        assert_eq!(gate.remaining_ms(30_000), 0);
        assert_eq!(gate.remaining_ms(90_000), 0);
    }

    #[test]
    fn test_record_restarts_window() {
        let mut gate = CooldownGate::new(1_000);
        gate.record_switch(0);
        gate.record_switch(900);
        assert!(gate.is_blocked(1_500));
        assert_eq!(gate.remaining_ms(1_500), 400);
    }

    #[test]
    fn test_zero_window_never_blocks() {
        let mut gate = CooldownGate::new(0);
        gate.record_switch(5);
        assert!(!gate.is_blocked(5));
    }
}
