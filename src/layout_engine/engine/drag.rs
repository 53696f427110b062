use tracing::{debug, trace};

use super::LayoutEngine;
use crate::layout_engine::interactive::{HoverTarget, InsertPosition, MoveSession};
use crate::layout_engine::{NodeId, WorkspaceId};
use crate::model::WindowId;
use crate::sys::geometry::Point;

impl LayoutEngine {
    /// Opens a move session dragging `node`, which must be the tile of `window`.
    pub fn interactive_move_begin(
        &mut self,
        ws: WorkspaceId,
        node: NodeId,
        window: WindowId,
        start_location: Point,
        is_insert_mode: bool,
    ) -> bool {
        if self.tree.window(node).is_none_or(|w| w.window() != window)
            || self.tree.find_column(node, ws).is_none()
        {
            return false;
        }
        let Some(state) = self.workspaces.get_mut(ws) else {
            return false;
        };
        if state.drag.is_some() || state.resize.is_some() {
            return false;
        }
        state.viewport.stop_anim_and_gesture();
        state.drag = Some(MoveSession {
            node,
            window,
            start_location,
            is_insert_mode,
            hover: None,
        });
        debug!(?window, is_insert_mode, "interactive move begin");
        true
    }

    /// Where the dragged window would land if released at `location`.
    fn move_target(&self, ws: WorkspaceId, session: &MoveSession, location: Point) -> Option<HoverTarget> {
        let target = self.tree.hit_test_tiled(location, ws)?;
        let target_column = self.tree.column_of(target)?;
        let source_column = self.tree.column_of(session.node)?;

        let position = if session.is_insert_mode {
            let frame = self.tree.find_node(target_column)?.frame();
            if location.x < frame.mid_x() {
                InsertPosition::Before
            } else {
                InsertPosition::After
            }
        } else {
            InsertPosition::Swap
        };
        if target_column == source_column
            && (position == InsertPosition::Swap
                || self.tree.column(source_column).is_none_or(|c| c.len() <= 1))
        {
            return None;
        }

        let window = self.tree.window(target)?.window();
        Some(HoverTarget::Window { node: target, window, position })
    }

    /// Recomputes the drop target for the pointer at `location`. The tree is
    /// left untouched.
    pub fn interactive_move_update(&mut self, ws: WorkspaceId, location: Point) -> Option<HoverTarget> {
        let session = self.workspaces.get(ws)?.drag.as_ref()?;
        let hover = self.move_target(ws, session, location);
        if let Some(session) = self.workspaces.get_mut(ws).and_then(|s| s.drag.as_mut())
            && session.hover != hover
        {
            trace!(?hover, "interactive move hover");
            session.hover = hover;
        }
        hover
    }

    /// Drops the dragged window at `location`. Returns whether the tree changed.
    pub fn interactive_move_end(&mut self, ws: WorkspaceId, location: Point) -> bool {
        let Some(session) = self.workspaces.get_mut(ws).and_then(|s| s.drag.take()) else {
            return false;
        };
        debug!(window = ?session.window, "interactive move end");
        let Some(target) = self.move_target(ws, &session, location) else {
            return false;
        };
        let Some(gaps) = self.workspaces.get(ws).map(|s| s.last_gaps) else {
            return false;
        };
        let (Some((source_idx, _)), Some((target_idx, _))) =
            (self.tree.locate(session.node), self.tree.locate(target.node()))
        else {
            return false;
        };

        let rows_before = self.tree.window_rows(ws);
        let before = self.tile_positions(ws, &gaps);
        match target.position() {
            InsertPosition::Swap => {
                self.tree.swap_columns(ws, source_idx, target_idx);
            }
            position @ (InsertPosition::Before | InsertPosition::After) => {
                let insert_at = match position {
                    InsertPosition::After => target_idx + 1,
                    _ => target_idx,
                };
                let Some(source_column) = self.tree.column_of(session.node) else {
                    return false;
                };
                let alone = self.tree.column(source_column).is_some_and(|c| c.len() == 1);
                if alone && (insert_at == source_idx || insert_at == source_idx + 1) {
                    return false;
                }
                if !self.extract_to_column(ws, session.node, target.node(), position) {
                    return false;
                }
            }
        }

        let changed = self.tree.window_rows(ws) != rows_before;
        if changed {
            self.set_selection(ws, session.node);
            self.animate_moves_since(ws, before, &gaps);
            self.reveal_selection(ws);
        }
        changed
    }

    /// Pulls `node` out of its column into a new one next to `target`'s column.
    fn extract_to_column(
        &mut self,
        ws: WorkspaceId,
        node: NodeId,
        target: NodeId,
        position: InsertPosition,
    ) -> bool {
        let (Some(source_column), Some(target_column)) =
            (self.tree.column_of(node), self.tree.column_of(target))
        else {
            return false;
        };
        let Some(detached) = self.tree.detach_window(node) else {
            return false;
        };
        // Indices may have shifted if the source column went away.
        let Some(mut idx) = self.tree.column_index(target_column) else {
            return false;
        };
        if position == InsertPosition::After {
            idx += 1;
        }
        if self.tree.attach_as_column(ws, idx, node).is_none() {
            return false;
        }
        if !detached.removed_column {
            self.sync_tab_alpha(source_column);
        }
        if let Some(window) = self.tree.window_mut(node) {
            window.height_weight = 1.0;
            window.appearance.set_alpha(1.0);
            window.appearance.is_hidden_in_tabbed_mode = false;
        }
        true
    }
}
