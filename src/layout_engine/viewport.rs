use std::time::Duration;

use super::NodeId;
use crate::animation::{Animation, Clock};
use crate::common::config::AnimationConfig;
use crate::input::SwipeTracker;

/// Horizontal metrics of a workspace's columns, in strip coordinates where the
/// first column starts at x = 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStrip {
    pub widths: Vec<f64>,
    pub starts: Vec<f64>,
    pub gap: f64,
    pub viewport_width: f64,
    /// Index of the column holding the selection.
    pub active: usize,
}

impl ColumnStrip {
    pub fn new(widths: Vec<f64>, gap: f64, viewport_width: f64, active: usize) -> Self {
        let mut starts = Vec::with_capacity(widths.len());
        let mut cursor = 0.0;
        for width in &widths {
            starts.push(cursor);
            cursor += width + gap;
        }
        let active = active.min(widths.len().saturating_sub(1));
        Self { widths, starts, gap, viewport_width, active }
    }

    pub fn len(&self) -> usize { self.widths.len() }

    pub fn is_empty(&self) -> bool { self.widths.is_empty() }

    /// View offset that puts column `idx` at the left edge, or centers it.
    pub fn column_offset(&self, idx: usize, center: bool) -> f64 {
        let Some((&start, &width)) = self.starts.get(idx).zip(self.widths.get(idx)) else {
            return 0.0;
        };
        if center && width < self.viewport_width {
            start - (self.viewport_width - width) / 2.0
        } else {
            start
        }
    }

    pub fn offset_bounds(&self, center: bool) -> (f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0);
        }
        let last = self.len() - 1;
        let (min, max) = if center {
            (self.column_offset(0, true), self.column_offset(last, true))
        } else {
            (0.0, self.starts[last])
        };
        (min, max.max(min))
    }

    /// Column whose snapping offset is closest to `offset`.
    pub fn nearest_column(&self, offset: f64, center: bool) -> usize {
        (0..self.len())
            .min_by(|a, b| {
                let da = (self.column_offset(*a, center) - offset).abs();
                let db = (self.column_offset(*b, center) - offset).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0)
    }

    /// Smallest change to `current` that brings column `idx` fully on screen.
    pub fn reveal_offset(&self, idx: usize, current: f64, center: bool) -> f64 {
        if center {
            return self.column_offset(idx, true);
        }
        let Some((&start, &width)) = self.starts.get(idx).zip(self.widths.get(idx)) else {
            return current;
        };
        let x = start - current;
        if x < 0.0 || width >= self.viewport_width {
            start
        } else if x + width > self.viewport_width {
            start + width - self.viewport_width
        } else {
            current
        }
    }

    fn step_width(&self, idx: usize) -> f64 { self.widths[idx] + self.gap }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOffsetMode {
    Resting,
    Animating,
    Gesture { is_trackpad: bool },
}

#[derive(Debug)]
pub enum ViewOffset {
    /// The view offset is static.
    Static(f64),
    /// The view offset is animating towards a settle point.
    Animation(Animation),
    /// The view offset is controlled by the ongoing gesture.
    Gesture(ViewGesture),
}

#[derive(Debug)]
pub struct ViewGesture {
    /// Offset the gesture started from, moved by one column width per step taken.
    base: f64,
    /// Displacement not yet converted into whole column steps.
    accumulated: f64,
    is_trackpad: bool,
    tracker: SwipeTracker,
}

impl ViewGesture {
    fn current(&self) -> f64 { self.base + self.accumulated }
}

impl ViewOffset {
    pub fn current(&self) -> f64 {
        match self {
            ViewOffset::Static(offset) => *offset,
            ViewOffset::Animation(anim) => anim.value(),
            ViewOffset::Gesture(gesture) => gesture.current(),
        }
    }

    /// Where the offset is heading: the animation target, or the live value.
    pub fn target(&self) -> f64 {
        match self {
            ViewOffset::Static(offset) => *offset,
            ViewOffset::Animation(anim) => anim.to(),
            ViewOffset::Gesture(gesture) => gesture.current(),
        }
    }

    pub fn mode(&self) -> ViewOffsetMode {
        match self {
            ViewOffset::Static(_) => ViewOffsetMode::Resting,
            ViewOffset::Animation(_) => ViewOffsetMode::Animating,
            ViewOffset::Gesture(g) => ViewOffsetMode::Gesture { is_trackpad: g.is_trackpad },
        }
    }
}

/// Per-workspace scroll and selection state.
#[derive(Debug)]
pub struct ViewportState {
    pub(super) selected: Option<NodeId>,
    view_offset: ViewOffset,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            selected: None,
            view_offset: ViewOffset::Static(0.0),
        }
    }
}

impl ViewportState {
    /// Raw selection. May be stale; resolve it against the tree before use.
    pub fn selected_node(&self) -> Option<NodeId> { self.selected }

    pub fn view_offset(&self) -> &ViewOffset { &self.view_offset }

    pub fn current_offset(&self) -> f64 { self.view_offset.current() }

    pub fn mode(&self) -> ViewOffsetMode { self.view_offset.mode() }

    pub fn is_input_live(&self) -> bool { matches!(self.view_offset, ViewOffset::Gesture(_)) }

    pub fn is_animating(&self) -> bool { matches!(self.view_offset, ViewOffset::Animation(_)) }

    pub fn set_offset(&mut self, offset: f64) { self.view_offset = ViewOffset::Static(offset); }

    /// Freezes an in-flight animation at its current value.
    pub fn cancel_animation(&mut self) {
        if let ViewOffset::Animation(anim) = &self.view_offset {
            self.view_offset = ViewOffset::Static(anim.value());
        }
    }

    /// Like [`Self::cancel_animation`], and also drops a live gesture.
    pub fn stop_anim_and_gesture(&mut self) {
        self.view_offset = ViewOffset::Static(self.view_offset.current());
    }

    pub fn animate_to(&mut self, target: f64, clock: Clock, config: &AnimationConfig) {
        let current = self.view_offset.current();
        if current == target {
            self.view_offset = ViewOffset::Static(target);
            return;
        }
        let anim = Animation::new(clock, current, target, config);
        self.view_offset = if anim.is_done() {
            ViewOffset::Static(target)
        } else {
            ViewOffset::Animation(anim)
        };
    }

    pub fn begin_gesture(&mut self, is_trackpad: bool) {
        self.view_offset = ViewOffset::Gesture(ViewGesture {
            base: self.view_offset.current(),
            accumulated: 0.0,
            is_trackpad,
            tracker: SwipeTracker::new(),
        });
    }

    /// Feeds a pixel delta into the running gesture.
    ///
    /// Returns how many whole columns the selection should move (negative means
    /// left). Each step consumes the width of the column being left plus the gap
    /// from the accumulator; the remainder keeps tracking the fingers smoothly.
    /// Returns 0 when no gesture is running.
    pub fn update_gesture(
        &mut self,
        delta: f64,
        timestamp: Duration,
        strip: &ColumnStrip,
        center: bool,
    ) -> i32 {
        let ViewOffset::Gesture(gesture) = &mut self.view_offset else {
            return 0;
        };
        gesture.tracker.push(delta, timestamp);
        gesture.accumulated += delta;

        if strip.is_empty() {
            return 0;
        }

        let mut active = strip.active;
        let mut steps = 0;
        loop {
            if gesture.accumulated > 0.0 && active + 1 < strip.len() {
                let step = strip.step_width(active);
                if step <= 0.0 || gesture.accumulated < step {
                    break;
                }
                gesture.accumulated -= step;
                gesture.base += step;
                active += 1;
                steps += 1;
            } else if gesture.accumulated < 0.0 && active > 0 {
                let step = strip.step_width(active - 1);
                if step <= 0.0 || -gesture.accumulated < step {
                    break;
                }
                gesture.accumulated += step;
                gesture.base -= step;
                active -= 1;
                steps -= 1;
            } else {
                break;
            }
        }

        let (min, max) = strip.offset_bounds(center);
        let clamped = gesture.current().clamp(min, max);
        gesture.accumulated = clamped - gesture.base;

        steps
    }

    /// Ends the running gesture and animates to the snap point. Without
    /// centering, the release velocity is projected forward first so a flick
    /// carries past the nearest column.
    ///
    /// Returns the column snapped to, or `None` when no gesture was running or
    /// there are no columns.
    pub fn end_gesture(
        &mut self,
        strip: &ColumnStrip,
        center: bool,
        clock: Clock,
        config: &AnimationConfig,
    ) -> Option<usize> {
        let ViewOffset::Gesture(gesture) = &self.view_offset else {
            return None;
        };
        let current = gesture.current();
        if strip.is_empty() {
            self.view_offset = ViewOffset::Static(current);
            return None;
        }

        let idx = if center {
            strip.active
        } else {
            strip.nearest_column(current + gesture.tracker.projected_travel(), false)
        };
        let (min, max) = strip.offset_bounds(center);
        let target = strip.column_offset(idx, center).clamp(min, max);
        self.animate_to(target, clock, config);
        Some(idx)
    }

    pub(super) fn advance(&mut self) -> bool {
        if let ViewOffset::Animation(anim) = &self.view_offset {
            if anim.is_done() {
                self.view_offset = ViewOffset::Static(anim.to());
            }
        }
        self.is_animating()
    }
}
