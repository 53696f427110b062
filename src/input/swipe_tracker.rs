use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

const HISTORY_LIMIT: Duration = Duration::from_millis(150);
const DECELERATION_TOUCHPAD: f64 = 0.997;

/// Recent swipe deltas, kept to estimate release velocity.
#[derive(Debug, Default, Clone)]
pub struct SwipeTracker {
    history: VecDeque<Sample>,
    pos: f64,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    delta: f64,
    timestamp: Duration,
}

impl SwipeTracker {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, delta: f64, timestamp: Duration) {
        if let Some(last) = self.history.back()
            && timestamp < last.timestamp
        {
            trace!(?timestamp, last = ?last.timestamp, "dropping out-of-order swipe sample");
            return;
        }
        self.history.push_back(Sample { delta, timestamp });
        self.pos += delta;
        self.trim_history();
    }

    pub fn pos(&self) -> f64 { self.pos }

    /// Pixels per second over the retained history; 0 when it spans no time.
    pub fn velocity(&self) -> f64 {
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return 0.0;
        };
        let total_time = (last.timestamp - first.timestamp).as_secs_f64();
        if total_time == 0.0 {
            return 0.0;
        }
        self.history.iter().map(|s| s.delta).sum::<f64>() / total_time
    }

    /// How much further the swipe would travel while decelerating to a halt.
    pub fn projected_travel(&self) -> f64 {
        -self.velocity() / (1000.0 * DECELERATION_TOUCHPAD.ln())
    }

    fn trim_history(&mut self) {
        let Some(&Sample { timestamp, .. }) = self.history.back() else {
            return;
        };
        while let Some(first) = self.history.front() {
            if timestamp <= first.timestamp + HISTORY_LIMIT {
                break;
            }
            self.history.pop_front();
        }
    }
}
