use std::time::Duration;

use tracing::trace;

use super::{Direction, EventResponse, LayoutEngine};
use crate::input::GestureAction;
use crate::layout_engine::WorkspaceId;
use crate::sys::event::{EventPhase, GestureEvent, ScrollWheelEvent};

impl LayoutEngine {
    /// Feeds a raw trackpad sample through the swipe recognizer and scrolls
    /// the strip of `ws` with whatever it emits.
    pub fn handle_touch_gesture(&mut self, ws: WorkspaceId, event: &GestureEvent) -> EventResponse {
        match self.gesture.handle(event) {
            GestureAction::None => EventResponse::default(),
            GestureAction::Scroll(units) => {
                let Some(step) = self
                    .strip(ws)
                    .and_then(|s| s.widths.get(s.active).map(|width| width + s.gap))
                else {
                    return EventResponse::default();
                };
                self.drive_view_gesture(ws, units * step, event.timestamp, true)
            }
            GestureAction::End => self.finish_view_gesture(ws),
        }
    }

    /// Scroll events with a phase follow the fingers in pixels; momentum is
    /// swallowed; phase-less wheel notches step the selection one column.
    pub fn handle_scroll_wheel(&mut self, ws: WorkspaceId, event: &ScrollWheelEvent) -> EventResponse {
        if !event.is_trackpad() {
            let amount = if event.delta.x != 0.0 { event.delta.x } else { event.delta.y };
            return if amount > 0.0 {
                self.move_focus(ws, Direction::Right)
            } else if amount < 0.0 {
                self.move_focus(ws, Direction::Left)
            } else {
                EventResponse::default()
            };
        }
        if event.momentum_phase != EventPhase::None {
            return EventResponse::default();
        }
        match event.phase {
            EventPhase::Began => {
                if let Some(state) = self.workspaces.get_mut(ws)
                    && state.resize.is_none()
                    && state.drag.is_none()
                {
                    state.viewport.begin_gesture(true);
                }
                self.drive_view_gesture(ws, event.delta.x, event.timestamp, true)
            }
            EventPhase::Changed => self.drive_view_gesture(ws, event.delta.x, event.timestamp, true),
            EventPhase::Ended | EventPhase::Cancelled => self.finish_view_gesture(ws),
            EventPhase::None => EventResponse::default(),
        }
    }

    fn drive_view_gesture(
        &mut self,
        ws: WorkspaceId,
        delta: f64,
        timestamp: Duration,
        is_trackpad: bool,
    ) -> EventResponse {
        let center = self.settings.scrolling.center_focused_column;
        let Some(strip) = self.strip(ws) else {
            return EventResponse::default();
        };
        let Some(state) = self.workspaces.get_mut(ws) else {
            return EventResponse::default();
        };
        if state.resize.is_some() || state.drag.is_some() {
            return EventResponse::default();
        }
        if !state.viewport.is_input_live() {
            state.viewport.begin_gesture(is_trackpad);
        }
        let steps = state.viewport.update_gesture(delta, timestamp, &strip, center);
        trace!(delta, steps, "view gesture update");
        if steps == 0 {
            return EventResponse::relayout();
        }

        let from = self.selected_node(ws);
        let Some(target) = self.tree.move_selection_by_columns(steps as isize, from, ws) else {
            return EventResponse::relayout();
        };
        self.set_selection(ws, target);
        EventResponse::focus(self.selected_window(ws))
    }

    fn finish_view_gesture(&mut self, ws: WorkspaceId) -> EventResponse {
        let center = self.settings.scrolling.center_focused_column;
        let Some(strip) = self.strip(ws) else {
            return EventResponse::default();
        };
        let Some(state) = self.workspaces.get_mut(ws) else {
            return EventResponse::default();
        };
        let Some(idx) = state.viewport.end_gesture(
            &strip,
            center,
            self.clock.clone(),
            &self.settings.animations.view_offset,
        ) else {
            return EventResponse::default();
        };
        if idx == strip.active {
            return EventResponse::relayout();
        }

        let Some(target) = self
            .tree
            .columns(ws)
            .get(idx)
            .and_then(|c| self.tree.column(*c))
            .and_then(|c| c.active_window())
        else {
            return EventResponse::relayout();
        };
        self.set_selection(ws, target);
        EventResponse::focus(self.selected_window(ws))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::tests::{instant, offset, settings, setup, setup_custom, wid};
    use super::*;
    use crate::common::config::ScrollGestureSettings;
    use crate::input::GesturePhase;
    use crate::layout_engine::{ResizeEdge, ViewOffsetMode};
    use crate::sys::event::{Touch, TouchPhase};
    use crate::sys::geometry::Point;

    fn swipe(phase: EventPhase, x: f64) -> GestureEvent {
        GestureEvent {
            phase,
            touches: vec![Touch::new(TouchPhase::Moved, x, 0.5); 2],
            timestamp: Duration::ZERO,
        }
    }

    fn wheel(phase: EventPhase, momentum_phase: EventPhase, dx: f64) -> ScrollWheelEvent {
        ScrollWheelEvent {
            delta: Point::new(dx, 0.0),
            phase,
            momentum_phase,
            timestamp: Duration::ZERO,
        }
    }

    fn assert_near(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
    }

    #[test_log::test]
    fn two_finger_swipe_scrolls_steps_and_snaps() {
        let mut settings = settings(instant());
        settings.gestures = ScrollGestureSettings { fingers: 2, ..Default::default() };
        let (mut engine, ws, nodes) = setup_custom(settings, 3);
        assert!(engine.select_window(ws, nodes[0]));
        assert_eq!(offset(&mut engine, ws), 0.0);

        assert_eq!(engine.handle_touch_gesture(ws, &swipe(EventPhase::Began, 0.3)), EventResponse::default());
        assert_eq!(engine.handle_touch_gesture(ws, &swipe(EventPhase::Changed, 0.35)), EventResponse::default());
        assert_eq!(engine.gesture_recognizer().phase(), GesturePhase::Committed);

        let response = engine.handle_touch_gesture(ws, &swipe(EventPhase::Changed, 0.425));
        assert!(response.needs_layout);
        assert_eq!(response.focus_window, None);
        assert_near(offset(&mut engine, ws), 300.0);
        assert!(engine.workspace(ws).unwrap().viewport().is_input_live());

        let response = engine.handle_touch_gesture(ws, &swipe(EventPhase::Changed, 0.5));
        assert_eq!(response.focus_window, Some(wid(2)));
        assert_eq!(engine.selected_node(ws), Some(nodes[1]));
        assert_near(offset(&mut engine, ws), 600.0);

        let response = engine.handle_touch_gesture(ws, &swipe(EventPhase::Ended, 0.5));
        assert!(response.needs_layout);
        assert_eq!(engine.workspace(ws).unwrap().viewport().mode(), ViewOffsetMode::Resting);
        assert_eq!(offset(&mut engine, ws), 500.0);
        assert_eq!(engine.selected_node(ws), Some(nodes[1]));
    }

    #[test_log::test]
    fn ending_between_columns_selects_the_snap_target() {
        let mut settings = settings(instant());
        settings.gestures = ScrollGestureSettings { fingers: 2, ..Default::default() };
        let (mut engine, ws, nodes) = setup_custom(settings, 3);
        assert!(engine.select_window(ws, nodes[0]));

        let _ = engine.handle_touch_gesture(ws, &swipe(EventPhase::Began, 0.3));
        let _ = engine.handle_touch_gesture(ws, &swipe(EventPhase::Changed, 0.4));
        // 0.1 of travel is 0.8 columns: short of a full step.
        assert_eq!(engine.selected_node(ws), Some(nodes[0]));
        assert_near(offset(&mut engine, ws), 400.0);

        let response = engine.handle_touch_gesture(ws, &swipe(EventPhase::Cancelled, 0.4));
        assert_eq!(response.focus_window, Some(wid(2)));
        assert_eq!(engine.selected_node(ws), Some(nodes[1]));
        assert_eq!(offset(&mut engine, ws), 500.0);
    }

    #[test_log::test]
    fn restarting_the_swipe_settles_the_previous_one() {
        let mut settings = settings(instant());
        settings.gestures = ScrollGestureSettings { fingers: 2, ..Default::default() };
        let (mut engine, ws, nodes) = setup_custom(settings, 3);
        assert!(engine.select_window(ws, nodes[0]));

        let _ = engine.handle_touch_gesture(ws, &swipe(EventPhase::Began, 0.3));
        let _ = engine.handle_touch_gesture(ws, &swipe(EventPhase::Changed, 0.4));
        assert!(engine.workspace(ws).unwrap().viewport().is_input_live());

        let response = engine.handle_touch_gesture(ws, &swipe(EventPhase::Began, 0.4));
        assert_eq!(response.focus_window, Some(wid(2)));
        assert_eq!(engine.workspace(ws).unwrap().viewport().mode(), ViewOffsetMode::Resting);
        assert_eq!(engine.gesture_recognizer().phase(), GesturePhase::Armed);

        let response = engine.handle_touch_gesture(ws, &swipe(EventPhase::Ended, 0.4));
        assert_eq!(response, EventResponse::default());
        assert_eq!(engine.workspace(ws).unwrap().viewport().mode(), ViewOffsetMode::Resting);
        assert_eq!(offset(&mut engine, ws), 500.0);
    }

    #[test_log::test]
    fn wheel_notches_step_one_column() {
        let (mut engine, ws, nodes) = setup(3);
        assert!(engine.select_window(ws, nodes[0]));

        let response = engine.handle_scroll_wheel(ws, &wheel(EventPhase::None, EventPhase::None, 1.0));
        assert_eq!(response.focus_window, Some(wid(2)));
        let response = engine.handle_scroll_wheel(ws, &wheel(EventPhase::None, EventPhase::None, -3.0));
        assert_eq!(response.focus_window, Some(wid(1)));
        let response = engine.handle_scroll_wheel(ws, &wheel(EventPhase::None, EventPhase::None, -1.0));
        assert_eq!(response, EventResponse::default());
    }

    #[test_log::test]
    fn trackpad_scroll_follows_the_phases() {
        let (mut engine, ws, nodes) = setup(3);
        assert!(engine.select_window(ws, nodes[0]));

        let _ = engine.handle_scroll_wheel(ws, &wheel(EventPhase::Began, EventPhase::None, 200.0));
        assert_eq!(offset(&mut engine, ws), 200.0);
        let response = engine.handle_scroll_wheel(ws, &wheel(EventPhase::Changed, EventPhase::None, 400.0));
        assert_eq!(response.focus_window, Some(wid(2)));
        assert_eq!(offset(&mut engine, ws), 600.0);

        let _ = engine.handle_scroll_wheel(ws, &wheel(EventPhase::Ended, EventPhase::None, 0.0));
        assert_eq!(offset(&mut engine, ws), 500.0);

        let response = engine.handle_scroll_wheel(ws, &wheel(EventPhase::None, EventPhase::Changed, 300.0));
        assert_eq!(response, EventResponse::default());
        assert_eq!(offset(&mut engine, ws), 500.0);
        assert_eq!(engine.selected_node(ws), Some(nodes[1]));
    }

    #[test_log::test]
    fn interactive_sessions_take_over_from_scrolling() {
        let (mut engine, ws, nodes) = setup(3);
        assert!(engine.select_window(ws, nodes[0]));
        let _ = engine.handle_scroll_wheel(ws, &wheel(EventPhase::Began, EventPhase::None, 200.0));
        assert!(engine.workspace(ws).unwrap().viewport().is_input_live());

        assert!(engine.interactive_resize_begin(ws, nodes[0], ResizeEdge::RIGHT, Point::ZERO));
        assert_eq!(engine.workspace(ws).unwrap().viewport().mode(), ViewOffsetMode::Resting);
        assert_eq!(offset(&mut engine, ws), 200.0);

        for phase in [EventPhase::Changed, EventPhase::Began] {
            let response = engine.handle_scroll_wheel(ws, &wheel(phase, EventPhase::None, 300.0));
            assert_eq!(response, EventResponse::default());
            assert_eq!(engine.workspace(ws).unwrap().viewport().mode(), ViewOffsetMode::Resting);
        }
        assert_eq!(offset(&mut engine, ws), 200.0);
        assert_eq!(engine.selected_node(ws), Some(nodes[0]));
    }

    #[test_log::test]
    fn trackpad_scroll_is_clamped_at_the_first_column() {
        let (mut engine, ws, nodes) = setup(2);
        assert!(engine.select_window(ws, nodes[0]));
        let _ = engine.handle_scroll_wheel(ws, &wheel(EventPhase::Began, EventPhase::None, -300.0));
        assert_eq!(offset(&mut engine, ws), 0.0);
        let response = engine.handle_scroll_wheel(ws, &wheel(EventPhase::Ended, EventPhase::None, 0.0));
        assert!(response.needs_layout);
        assert_eq!(engine.selected_node(ws), Some(nodes[0]));
    }
}
