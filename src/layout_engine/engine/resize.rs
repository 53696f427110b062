use tracing::{debug, trace};

use super::LayoutEngine;
use crate::common::config::GapSettings;
use crate::layout_engine::interactive::{MIN_TILE_SIZE, ResizeEdge, ResizeSession};
use crate::layout_engine::utils::compute_tiling_area;
use crate::layout_engine::viewport::ViewOffset;
use crate::layout_engine::{NodeId, WorkspaceId};
use crate::sys::geometry::{Point, Rect};

impl LayoutEngine {
    /// Opens a resize session on `node` grabbing `edges`.
    ///
    /// Fails if `edges` is empty, `node` is not a window of `ws`, or the
    /// workspace already has an interactive session open.
    pub fn interactive_resize_begin(
        &mut self,
        ws: WorkspaceId,
        node: NodeId,
        edges: ResizeEdge,
        start_location: Point,
    ) -> bool {
        if edges.is_empty() {
            return false;
        }
        if self.tree.window(node).is_none() || self.tree.find_column(node, ws).is_none() {
            return false;
        }
        let Some(state) = self.workspaces.get_mut(ws) else {
            return false;
        };
        if state.resize.is_some() || state.drag.is_some() {
            return false;
        }
        state.viewport.stop_anim_and_gesture();
        state.resize = Some(ResizeSession::new(node, edges, start_location));
        debug!(?node, ?edges, "interactive resize begin");
        true
    }

    /// Applies the pointer travel since the previous update to the session's node.
    ///
    /// Left/right edges change the width of the whole column; top/bottom edges
    /// move the split between the tile and its neighbour above or below.
    /// Returns whether any size changed.
    pub fn interactive_resize_update(
        &mut self,
        ws: WorkspaceId,
        location: Point,
        monitor_frame: Rect,
        gaps: &GapSettings,
    ) -> bool {
        let Some(state) = self.workspaces.get_mut(ws) else {
            return false;
        };
        let Some(session) = state.resize.as_mut() else {
            return false;
        };
        let delta = location - session.last_location;
        session.last_location = location;
        let (node, edges) = (session.node, session.edges);

        let area = compute_tiling_area(monitor_frame, gaps);
        let mut changed = false;
        if edges.intersects(ResizeEdge::LEFT_RIGHT) {
            changed |= self.resize_column_edge(ws, node, edges, delta.x, area.size.width);
        }
        if edges.intersects(ResizeEdge::TOP_BOTTOM) {
            changed |= self.resize_tile_edge(node, edges, delta.y, area.size.height, gaps.inner.vertical);
        }
        if changed {
            trace!(?node, dx = delta.x, dy = delta.y, "interactive resize update");
        }
        changed
    }

    fn resize_column_edge(
        &mut self,
        ws: WorkspaceId,
        node: NodeId,
        edges: ResizeEdge,
        dx: f64,
        working_width: f64,
    ) -> bool {
        if dx == 0.0 || working_width <= 0.0 {
            return false;
        }
        let Some(column) = self.tree.column_of(node) else {
            return false;
        };
        let Some(old_width) = self.tree.column(column).map(|c| self.tree.column_width_px(c, working_width))
        else {
            return false;
        };

        let growth = if edges.contains(ResizeEdge::RIGHT) { dx } else { -dx };
        let min_width = MIN_TILE_SIZE.min(working_width);
        let target = (old_width + growth).clamp(min_width, working_width);
        let ratio = self.settings.scrolling.clamp_ratio(target / working_width);

        let Some(col) = self.tree.column_mut(column) else {
            return false;
        };
        if col.width_ratio == ratio {
            return false;
        }
        col.width_ratio = ratio;
        let Some(new_width) = self.tree.column(column).map(|c| self.tree.column_width_px(c, working_width))
        else {
            return false;
        };

        // Dragging the left edge keeps the right edge where it is on screen.
        if !edges.contains(ResizeEdge::RIGHT)
            && let Some(state) = self.workspaces.get_mut(ws)
            && let ViewOffset::Static(offset) = *state.viewport.view_offset()
        {
            state.viewport.set_offset(offset + (new_width - old_width));
        }
        true
    }

    fn resize_tile_edge(
        &mut self,
        node: NodeId,
        edges: ResizeEdge,
        dy: f64,
        working_height: f64,
        gap: f64,
    ) -> bool {
        if dy == 0.0 {
            return false;
        }
        let Some(column) = self.tree.column_of(node).and_then(|c| self.tree.column(c)) else {
            return false;
        };
        if column.is_tabbed() || column.len() < 2 {
            return false;
        }
        let Some(row) = column.position(node) else {
            return false;
        };
        let (neighbour_row, growth) = if edges.contains(ResizeEdge::BOTTOM) {
            (row + 1, dy)
        } else {
            let Some(above) = row.checked_sub(1) else {
                return false;
            };
            (above, -dy)
        };
        let Some(neighbour) = column.windows().get(neighbour_row).copied() else {
            return false;
        };

        let weights: Vec<f64> = column
            .windows()
            .iter()
            .map(|w| self.tree.window(*w).map_or(1.0, |w| w.height_weight()))
            .collect();
        let total_weight: f64 = weights.iter().sum();
        let available = working_height - gap * (weights.len() - 1) as f64;
        if total_weight <= 0.0 || available <= 0.0 {
            return false;
        }
        let px_per_weight = available / total_weight;
        let own = weights[row] * px_per_weight;
        let pair = own + weights[neighbour_row] * px_per_weight;
        if pair < 2.0 * MIN_TILE_SIZE {
            return false;
        }

        let new_own = (own + growth).clamp(MIN_TILE_SIZE, pair - MIN_TILE_SIZE);
        if new_own == own {
            return false;
        }
        if let Some(w) = self.tree.window_mut(node) {
            w.height_weight = new_own / px_per_weight;
        }
        if let Some(w) = self.tree.window_mut(neighbour) {
            w.height_weight = (pair - new_own) / px_per_weight;
        }
        true
    }

    /// Closes the resize session of `ws` and settles the view if the new
    /// widths left it out of bounds.
    pub fn interactive_resize_end(&mut self, ws: WorkspaceId) -> bool {
        let center = self.settings.scrolling.center_focused_column;
        let strip = self.strip(ws);
        let Some(state) = self.workspaces.get_mut(ws) else {
            return false;
        };
        let Some(session) = state.resize.take() else {
            return false;
        };
        debug!(node = ?session.node, "interactive resize end");

        if let Some(strip) = strip
            && let ViewOffset::Static(offset) = *state.viewport.view_offset()
        {
            let (min, max) = strip.offset_bounds(center);
            let clamped = offset.clamp(min, max);
            if clamped != offset {
                state.viewport.animate_to(
                    clamped,
                    self.clock.clone(),
                    &self.settings.animations.view_offset,
                );
            }
        }
        true
    }

    /// Drops the resize session of `ws` without touching the sizes applied so far.
    pub fn clear_interactive_resize(&mut self, ws: WorkspaceId) -> bool {
        let cleared = self.workspaces.get_mut(ws).and_then(|s| s.resize.take()).is_some();
        if cleared {
            debug!(?ws, "interactive resize cleared");
        }
        cleared
    }
}
