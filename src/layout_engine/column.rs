use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::animation::{Animation, Clock};
use crate::common::config::AnimationConfig;
use crate::sys::geometry::{Point, Rect};

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, strum::AsRefStr
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColumnDisplay {
    /// Windows are stacked vertically and share the column height.
    #[default]
    Normal,
    /// Only the active window is shown, at full column height.
    Tabbed,
}

/// A vertical slot in the strip. The window nodes themselves live in the arena;
/// the column only keeps their ids in display order.
#[derive(Debug, Clone)]
pub struct Column {
    pub(super) windows: Vec<NodeId>,
    pub(super) display: ColumnDisplay,
    pub(super) active_tile_idx: usize,
    pub(super) width_ratio: f64,
}

impl Column {
    pub(super) fn new(width_ratio: f64) -> Self {
        Self {
            windows: Vec::new(),
            display: ColumnDisplay::Normal,
            active_tile_idx: 0,
            width_ratio,
        }
    }

    pub fn windows(&self) -> &[NodeId] { &self.windows }

    pub fn display(&self) -> ColumnDisplay { self.display }

    pub fn active_tile_idx(&self) -> usize { self.active_tile_idx }

    pub fn active_window(&self) -> Option<NodeId> { self.windows.get(self.active_tile_idx).copied() }

    pub fn width_ratio(&self) -> f64 { self.width_ratio }

    pub fn len(&self) -> usize { self.windows.len() }

    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.windows.iter().position(|w| *w == node)
    }

    pub fn is_tabbed(&self) -> bool { self.display == ColumnDisplay::Tabbed }

    pub(super) fn clamp_active_tile_idx(&mut self) {
        self.active_tile_idx = self.active_tile_idx.min(self.windows.len().saturating_sub(1));
    }

    /// Whether the tile at `idx` must be hidden under the current display mode.
    pub(super) fn hides_tile(&self, idx: usize) -> bool {
        self.display == ColumnDisplay::Tabbed && idx != self.active_tile_idx
    }
}

/// Splits a column's area into tile rects.
///
/// Normal columns divide the height minus the inner gaps by each tile's weight;
/// tabbed columns give every tile the whole area.
pub(super) fn tile_rects(area: Rect, weights: &[f64], gap: f64, display: ColumnDisplay) -> Vec<Rect> {
    if display == ColumnDisplay::Tabbed {
        return weights.iter().map(|_| area).collect();
    }

    let count = weights.len();
    if count == 0 {
        return Vec::new();
    }
    let total_gap = gap * (count - 1) as f64;
    let available = (area.size.height - total_gap).max(0.0);
    let total_weight: f64 = weights.iter().copied().filter(|w| *w > 0.0).sum();

    let mut y = area.origin.y;
    let mut out = Vec::with_capacity(count);
    for weight in weights {
        let share = if total_weight > 0.0 {
            weight.max(0.0) / total_weight
        } else {
            1.0 / count as f64
        };
        let height = available * share;
        out.push(Rect::from_xywh(area.origin.x, y, area.size.width, height));
        y += height + gap;
    }
    out
}

#[derive(Debug, Clone)]
struct MoveAnimation {
    /// Runs from 1 to 0, scaling `from`.
    anim: Animation,
    from: Point,
}

/// Per-window appearance state owned by the column it sits in.
#[derive(Debug, Clone)]
pub struct TileAppearance {
    /// Settled alpha, i.e. where any alpha animation is heading.
    alpha: f64,
    alpha_animation: Option<Animation>,
    move_animation: Option<MoveAnimation>,
    pub(super) is_hidden_in_tabbed_mode: bool,
}

impl Default for TileAppearance {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            alpha_animation: None,
            move_animation: None,
            is_hidden_in_tabbed_mode: false,
        }
    }
}

impl TileAppearance {
    pub fn alpha(&self) -> f64 {
        self.alpha_animation.as_ref().map_or(self.alpha, Animation::value)
    }

    pub fn base_alpha(&self) -> f64 { self.alpha }

    pub fn is_hidden_in_tabbed_mode(&self) -> bool { self.is_hidden_in_tabbed_mode }

    /// Displacement from the settled position caused by an in-flight move animation.
    pub fn render_offset(&self) -> Point {
        self.move_animation
            .as_ref()
            .map_or(Point::ZERO, |m| m.from.scale(m.anim.value()))
    }

    pub fn has_alpha_animation(&self) -> bool { self.alpha_animation.is_some() }

    pub fn has_move_animation(&self) -> bool { self.move_animation.is_some() }

    pub fn is_animating(&self) -> bool {
        self.alpha_animation.is_some() || self.move_animation.is_some()
    }

    /// Starts sliding the tile in from `delta` away from its settled position.
    pub(super) fn animate_move_from(&mut self, delta: Point, clock: Clock, config: &AnimationConfig) {
        let from = delta + self.render_offset();
        self.move_animation = Some(MoveAnimation {
            anim: Animation::new(clock, 1., 0., config),
            from,
        });
    }

    pub(super) fn animate_alpha(&mut self, to: f64, clock: Clock, config: &AnimationConfig) {
        let from = self.alpha();
        self.alpha = to;
        self.alpha_animation =
            (from != to).then(|| Animation::new(clock, from, to, config));
    }

    pub(super) fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.alpha_animation = None;
    }

    /// Drops finished animations. Returns whether any are still running.
    pub(super) fn advance(&mut self) -> bool {
        if self.alpha_animation.as_ref().is_some_and(Animation::is_done) {
            self.alpha_animation = None;
        }
        if self.move_animation.as_ref().is_some_and(|m| m.anim.is_done()) {
            self.move_animation = None;
        }
        self.is_animating()
    }
}
