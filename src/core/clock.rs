use std::time::{Duration, Instant};

/// Simulation tick period. The original loop ran on a ~30ms interval timer
/// with no sub-frame preemption.
pub const TICK_INTERVAL: Duration = Duration::from_millis(30);

// If the event loop stalls, run at most this many catch-up ticks and drop
// the rest rather than spiraling.
const MAX_TICK_BURST: u32 = 4;

/// A single periodic task. Exactly one timer is armed per simulation
/// instance; state transitions cancel before re-arming. Poll-driven so tests
/// can feed synthetic instants instead of sleeping.
#[derive(Debug)]
pub struct TickTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Number of ticks elapsed by `now`. A cancelled timer never fires.
    pub fn ticks_due(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let mut ticks = 0;
        while due <= now {
            due += self.period;
            ticks += 1;
        }
        if ticks > MAX_TICK_BURST {
            ticks = MAX_TICK_BURST;
            due = now + self.period;
        }
        self.next_due = Some(due);
        ticks
    }
}
