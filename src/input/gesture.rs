use tracing::trace;

use crate::common::config::ScrollGestureSettings;
use crate::sys::event::{EventPhase, GestureEvent};
use crate::sys::geometry::Point;

/// Fixed multiplier from normalized trackpad travel to column units, applied
/// on top of the configured sensitivity.
pub const GESTURE_GAIN: f64 = 8.0;

/// Scaled per-sample deltas at or below this magnitude are dropped.
pub const GESTURE_COMMIT_THRESHOLD: f64 = 0.5;

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Armed,
    Committed,
}

/// What the viewport should do in response to one gesture sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    None,
    /// Scroll by this many column units; positive reveals columns to the right.
    Scroll(f64),
    /// The gesture is over; snap to a column.
    End,
}

#[derive(Default, Debug)]
struct GestureState {
    phase: GesturePhase,
    origin: Point,
    /// Horizontal displacement from `origin` at the previous sample.
    last_dx: f64,
}

impl GestureState {
    fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
        self.origin = Point::ZERO;
        self.last_dx = 0.0;
    }
}

/// Multi-finger horizontal swipe recognizer.
///
/// One instance serves the whole process; there is only one trackpad stream.
#[derive(Debug)]
pub struct GestureRecognizer {
    config: ScrollGestureSettings,
    state: GestureState,
}

impl GestureRecognizer {
    pub fn new(config: &ScrollGestureSettings) -> Self {
        Self {
            config: config.clone(),
            state: GestureState::default(),
        }
    }

    pub fn update_settings(&mut self, config: &ScrollGestureSettings) {
        self.config = config.clone();
        self.state.reset();
    }

    pub fn phase(&self) -> GesturePhase { self.state.phase }

    /// Drops any tracked gesture. Returns `End` if the viewport had been
    /// handed deltas and needs to settle.
    fn abandon(&mut self) -> GestureAction {
        let was_committed = self.state.phase == GesturePhase::Committed;
        self.state.reset();
        if was_committed { GestureAction::End } else { GestureAction::None }
    }

    pub fn handle(&mut self, event: &GestureEvent) -> GestureAction {
        if !self.config.enabled {
            return self.abandon();
        }

        // A new stream over a committed gesture still owes the viewport an `End`.
        let restarted = match event.phase {
            EventPhase::Ended | EventPhase::Cancelled => return self.abandon(),
            EventPhase::Began => self.abandon(),
            EventPhase::None | EventPhase::Changed => GestureAction::None,
        };

        let fingers = self.config.fingers.max(1);
        let touch_count = event.touches.len();
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut active_count = 0usize;
        for touch in event.touches.iter().filter(|t| t.phase.is_active()) {
            sum_x += touch.normalized_position.x;
            sum_y += touch.normalized_position.y;
            active_count += 1;
        }

        if touch_count > fingers || active_count == 0 || active_count != fingers {
            return match self.abandon() {
                GestureAction::None => restarted,
                action => action,
            };
        }

        let avg = Point::new(sum_x / active_count as f64, sum_y / active_count as f64);

        let st = &mut self.state;
        match st.phase {
            GesturePhase::Idle => {
                st.origin = avg;
                st.last_dx = 0.0;
                st.phase = GesturePhase::Armed;
                trace!("scroll armed: start_x={:.3} start_y={:.3}", avg.x, avg.y);
                restarted
            }
            GesturePhase::Armed | GesturePhase::Committed => {
                let dx = avg.x - st.origin.x;
                let delta = dx - st.last_dx;
                st.last_dx = dx;
                st.phase = GesturePhase::Committed;

                let mut scaled = delta * self.config.sensitivity * GESTURE_GAIN;
                if self.config.invert_horizontal {
                    scaled = -scaled;
                }
                if scaled.abs() > GESTURE_COMMIT_THRESHOLD {
                    trace!(delta = scaled, "scroll gesture delta");
                    GestureAction::Scroll(scaled)
                } else {
                    GestureAction::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sys::event::{Touch, TouchPhase};

    fn config(fingers: usize) -> ScrollGestureSettings {
        ScrollGestureSettings { fingers, ..Default::default() }
    }

    fn sample(phase: EventPhase, xs: &[f64]) -> GestureEvent {
        GestureEvent {
            phase,
            touches: xs.iter().map(|x| Touch::new(TouchPhase::Moved, *x, 0.5)).collect(),
            timestamp: Duration::ZERO,
        }
    }

    fn scroll_amount(action: GestureAction) -> f64 {
        match action {
            GestureAction::Scroll(delta) => delta,
            other => panic!("expected a scroll, got {other:?}"),
        }
    }

    #[test]
    fn dead_zone_drops_small_deltas_then_forwards_only_the_new_one() {
        let mut g = GestureRecognizer::new(&config(2));

        assert_eq!(g.handle(&sample(EventPhase::Began, &[0.3, 0.3])), GestureAction::None);
        assert_eq!(g.phase(), GesturePhase::Armed);

        // 0.05 of travel scales to 0.4: committed, but nothing forwarded.
        assert_eq!(g.handle(&sample(EventPhase::Changed, &[0.35, 0.35])), GestureAction::None);
        assert_eq!(g.phase(), GesturePhase::Committed);

        // Another 0.075 scales to 0.6 and is forwarded on its own.
        let delta = scroll_amount(g.handle(&sample(EventPhase::Changed, &[0.425, 0.425])));
        assert!((delta - 0.6).abs() < 1e-9, "{delta}");
    }

    #[test]
    fn origin_is_the_average_touch_position() {
        let mut g = GestureRecognizer::new(&config(2));
        g.handle(&sample(EventPhase::Began, &[0.2, 0.4]));
        let delta = scroll_amount(g.handle(&sample(EventPhase::Changed, &[0.3, 0.5])));
        assert!((delta - 0.8).abs() < 1e-9);
    }

    #[test]
    fn invert_and_sensitivity_scale_the_delta() {
        let mut g = GestureRecognizer::new(&ScrollGestureSettings {
            fingers: 3,
            sensitivity: 2.0,
            invert_horizontal: true,
            ..Default::default()
        });
        g.handle(&sample(EventPhase::Began, &[0.5, 0.5, 0.5]));
        let delta = scroll_amount(g.handle(&sample(EventPhase::Changed, &[0.55, 0.55, 0.55])));
        assert!((delta + 0.8).abs() < 1e-9);
    }

    #[test]
    fn ending_reports_end_only_after_commit() {
        let mut g = GestureRecognizer::new(&config(2));
        g.handle(&sample(EventPhase::Began, &[0.3, 0.3]));
        assert_eq!(g.handle(&sample(EventPhase::Ended, &[])), GestureAction::None);
        assert_eq!(g.phase(), GesturePhase::Idle);

        g.handle(&sample(EventPhase::Began, &[0.3, 0.3]));
        g.handle(&sample(EventPhase::Changed, &[0.31, 0.31]));
        assert_eq!(g.handle(&sample(EventPhase::Cancelled, &[])), GestureAction::End);
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn finger_count_mismatch_resets() {
        let mut g = GestureRecognizer::new(&config(2));
        g.handle(&sample(EventPhase::Began, &[0.3, 0.3]));
        assert_eq!(g.handle(&sample(EventPhase::Changed, &[0.3, 0.3, 0.3])), GestureAction::None);
        assert_eq!(g.phase(), GesturePhase::Idle);

        // Wrong count never arms.
        assert_eq!(g.handle(&sample(EventPhase::Changed, &[0.3])), GestureAction::None);
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn lifting_a_finger_abandons_a_committed_gesture() {
        let mut g = GestureRecognizer::new(&config(2));
        g.handle(&sample(EventPhase::Began, &[0.3, 0.3]));
        g.handle(&sample(EventPhase::Changed, &[0.4, 0.4]));
        assert_eq!(g.phase(), GesturePhase::Committed);

        let mut lifted = sample(EventPhase::Changed, &[0.4, 0.4]);
        lifted.touches[1].phase = TouchPhase::Ended;
        assert_eq!(g.handle(&lifted), GestureAction::End);
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn began_rearms_from_the_new_position() {
        let mut g = GestureRecognizer::new(&config(2));
        g.handle(&sample(EventPhase::Began, &[0.3, 0.3]));
        g.handle(&sample(EventPhase::Began, &[0.9, 0.9]));
        assert_eq!(g.phase(), GesturePhase::Armed);
        assert_eq!(g.handle(&sample(EventPhase::Changed, &[0.9, 0.9])), GestureAction::None);
    }

    #[test]
    fn began_over_a_committed_gesture_ends_it_and_rearms() {
        let mut g = GestureRecognizer::new(&config(2));
        g.handle(&sample(EventPhase::Began, &[0.3, 0.3]));
        g.handle(&sample(EventPhase::Changed, &[0.4, 0.4]));
        assert_eq!(g.phase(), GesturePhase::Committed);

        assert_eq!(g.handle(&sample(EventPhase::Began, &[0.4, 0.4])), GestureAction::End);
        assert_eq!(g.phase(), GesturePhase::Armed);
        assert_eq!(g.handle(&sample(EventPhase::Ended, &[])), GestureAction::None);

        // Still reported when the new stream has the wrong finger count.
        g.handle(&sample(EventPhase::Began, &[0.3, 0.3]));
        g.handle(&sample(EventPhase::Changed, &[0.4, 0.4]));
        assert_eq!(g.handle(&sample(EventPhase::Began, &[0.4])), GestureAction::End);
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn disabled_recognizer_ignores_input() {
        let mut g = GestureRecognizer::new(&ScrollGestureSettings {
            enabled: false,
            fingers: 2,
            ..Default::default()
        });
        g.handle(&sample(EventPhase::Began, &[0.3, 0.3]));
        assert_eq!(g.phase(), GesturePhase::Idle);
    }
}
