use tracing::debug;

use super::LayoutEngine;
use crate::common::config::GapSettings;
use crate::layout_engine::column::ColumnDisplay;
use crate::layout_engine::{NodeId, WorkspaceId};

impl LayoutEngine {
    /// Switches a column between stacked and tabbed display.
    ///
    /// Tiles slide from their old to their new position; non-active tiles fade
    /// out when entering tabbed mode and back in when leaving it. The active
    /// tile is made opaque immediately.
    pub fn set_column_display(
        &mut self,
        mode: ColumnDisplay,
        column: NodeId,
        gaps: &GapSettings,
    ) -> bool {
        let Some(col) = self.tree.column(column) else {
            return false;
        };
        if col.display == mode {
            return false;
        }
        let Some(ws) = self.tree.find_node(column).map(|n| n.workspace()) else {
            return false;
        };
        let children = col.windows.clone();
        let active = col.active_tile_idx;

        if self
            .workspaces
            .get(ws)
            .and_then(|s| s.resize.as_ref())
            .is_some_and(|session| children.contains(&session.node))
        {
            self.clear_interactive_resize(ws);
        }
        if let Some(state) = self.workspaces.get_mut(ws) {
            state.viewport.cancel_animation();
        }

        let before = self.tile_positions(ws, gaps);
        if let Some(col) = self.tree.column_mut(column) {
            col.display = mode;
        }
        self.animate_moves_since(ws, before, gaps);

        let config = self.settings.animations.window_alpha;
        let hidden_alpha = if mode == ColumnDisplay::Tabbed { 0.0 } else { 1.0 };
        for (idx, node) in children.iter().enumerate() {
            let Some(window) = self.tree.window_mut(*node) else { continue };
            if idx == active {
                window.appearance.set_alpha(1.0);
            } else {
                window.appearance.animate_alpha(hidden_alpha, self.clock.clone(), &config);
            }
        }

        self.update_tabbed_column_visibility(column);
        debug!(?column, ?mode, "set column display");
        true
    }

    pub fn update_tabbed_column_visibility(&mut self, column: NodeId) {
        let Some(col) = self.tree.column_mut(column) else {
            return;
        };
        col.clamp_active_tile_idx();
        let hidden: Vec<_> =
            col.windows.iter().enumerate().map(|(idx, node)| (*node, col.hides_tile(idx))).collect();
        for (node, hidden) in hidden {
            if let Some(window) = self.tree.window_mut(node) {
                window.appearance.is_hidden_in_tabbed_mode = hidden;
            }
        }
    }

    /// Brings tab `index` of a tabbed column to the front. The selection follows
    /// if it was in this column.
    pub fn activate_tab(&mut self, index: usize, column: NodeId) -> bool {
        let Some(col) = self.tree.column(column) else {
            return false;
        };
        if !col.is_tabbed() || index == col.active_tile_idx {
            return false;
        }
        let Some(target) = col.windows.get(index).copied() else {
            return false;
        };
        let Some(ws) = self.tree.find_node(column).map(|n| n.workspace()) else {
            return false;
        };
        let selection_in_column = self
            .workspaces
            .get(ws)
            .and_then(|s| s.viewport.selected)
            .is_some_and(|node| col.position(node).is_some());

        self.show_tile(column, index);
        if selection_in_column && let Some(state) = self.workspaces.get_mut(ws) {
            state.viewport.selected = Some(target);
        }
        debug!(?column, index, "activated tab");
        true
    }

    /// Flips the display mode of the column holding the selection.
    pub fn toggle_column_tabbed(&mut self, ws: WorkspaceId) -> bool {
        let Some(column) = self.selected_node(ws).and_then(|n| self.tree.column_of(n)) else {
            return false;
        };
        let Some(mode) = self.tree.column(column).map(|c| match c.display {
            ColumnDisplay::Normal => ColumnDisplay::Tabbed,
            ColumnDisplay::Tabbed => ColumnDisplay::Normal,
        }) else {
            return false;
        };
        let Some(gaps) = self.workspaces.get(ws).map(|s| s.last_gaps) else {
            return false;
        };
        self.set_column_display(mode, column, &gaps)
    }

    /// Makes tile `idx` the active one of its column.
    pub(super) fn show_tile(&mut self, column: NodeId, idx: usize) {
        let Some(col) = self.tree.column_mut(column) else {
            return;
        };
        if idx >= col.len() {
            return;
        }
        col.active_tile_idx = idx;
        self.sync_tab_alpha(column);
    }

    /// Refreshes visibility and, for tabbed columns, snaps tile alpha to match it.
    pub(super) fn sync_tab_alpha(&mut self, column: NodeId) {
        self.update_tabbed_column_visibility(column);
        let Some(col) = self.tree.column(column).filter(|c| c.is_tabbed()) else {
            return;
        };
        let active = col.active_tile_idx;
        for (idx, node) in col.windows.clone().into_iter().enumerate() {
            let Some(window) = self.tree.window_mut(node) else { continue };
            let alpha = if idx == active { 1.0 } else { 0.0 };
            if window.appearance.base_alpha() != alpha {
                window.appearance.set_alpha(alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::tests::{linear, no_gaps, setup, setup_with, wid};
    use super::*;
    use crate::layout_engine::{EventResponse, LayoutCommand, ResizeEdge, ViewOffsetMode};
    use crate::sys::geometry::Point;

    /// One column holding three stacked windows, the middle one selected.
    fn stacked_column(engine: &mut LayoutEngine, ws: WorkspaceId, first: NodeId) -> (NodeId, Vec<NodeId>) {
        let column = engine.tree().column_of(first).unwrap();
        let second = engine.add_window_to_column(column, wid(20)).unwrap();
        let third = engine.add_window_to_column(column, wid(21)).unwrap();
        assert!(engine.select_window(ws, second));
        (column, vec![first, second, third])
    }

    fn hidden_flags(engine: &LayoutEngine, nodes: &[NodeId]) -> Vec<bool> {
        nodes
            .iter()
            .map(|n| engine.tree().window(*n).unwrap().appearance().is_hidden_in_tabbed_mode())
            .collect()
    }

    #[test_log::test]
    fn entering_tabbed_mode_hides_all_but_the_active_tile() {
        let (mut engine, ws, nodes) = setup_with(linear(), 1);
        let (column, tiles) = stacked_column(&mut engine, ws, nodes[0]);
        assert_eq!(engine.tree().column(column).unwrap().active_tile_idx(), 1);
        assert_eq!(hidden_flags(&engine, &tiles), vec![false, false, false]);

        assert!(engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));
        assert_eq!(hidden_flags(&engine, &tiles), vec![true, false, true]);

        let active = engine.tree().window(tiles[1]).unwrap().appearance();
        assert_eq!(active.alpha(), 1.0);
        assert!(!active.has_alpha_animation());

        let hidden = engine.tree().window(tiles[0]).unwrap().appearance();
        assert!(hidden.has_alpha_animation());
        assert_eq!(hidden.base_alpha(), 0.0);
    }

    #[test_log::test]
    fn only_displaced_tiles_animate_their_position() {
        let (mut engine, ws, nodes) = setup_with(linear(), 1);
        let (column, tiles) = stacked_column(&mut engine, ws, nodes[0]);
        assert!(engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));

        let moving: Vec<bool> = tiles
            .iter()
            .map(|n| engine.tree().window(*n).unwrap().appearance().has_move_animation())
            .collect();
        assert_eq!(moving, vec![false, true, true]);
        let offset = engine.tree().window(tiles[2]).unwrap().appearance().render_offset();
        assert_eq!(offset, Point::new(0.0, 533.0));
    }

    #[test_log::test]
    fn switching_display_freezes_the_view_animation() {
        let (mut engine, ws, nodes) = setup_with(linear(), 3);
        assert!(engine.workspace(ws).unwrap().viewport().is_animating());
        let column = engine.tree().column_of(nodes[0]).unwrap();

        assert!(engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));
        let viewport = engine.workspace(ws).unwrap().viewport();
        assert_eq!(viewport.mode(), ViewOffsetMode::Resting);
        assert_eq!(viewport.current_offset(), 0.0);
    }

    #[test_log::test]
    fn setting_the_same_mode_twice_is_a_no_op() {
        let (mut engine, ws, nodes) = setup(1);
        let (column, tiles) = stacked_column(&mut engine, ws, nodes[0]);
        assert!(!engine.set_column_display(ColumnDisplay::Normal, column, &no_gaps()));
        assert!(engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));
        assert!(!engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));
        assert_eq!(hidden_flags(&engine, &tiles), vec![true, false, true]);
    }

    #[test_log::test]
    fn leaving_tabbed_mode_fades_everything_in() {
        let (mut engine, ws, nodes) = setup(1);
        let (column, tiles) = stacked_column(&mut engine, ws, nodes[0]);
        assert!(engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));
        assert!(engine.set_column_display(ColumnDisplay::Normal, column, &no_gaps()));
        assert_eq!(hidden_flags(&engine, &tiles), vec![false, false, false]);
        for tile in &tiles {
            assert_eq!(engine.tree().window(*tile).unwrap().appearance().alpha(), 1.0);
        }
    }

    #[test_log::test]
    fn display_change_cancels_resize_in_the_column() {
        let (mut engine, ws, nodes) = setup(2);
        let column = engine.tree().column_of(nodes[0]).unwrap();
        assert!(engine.interactive_resize_begin(ws, nodes[0], ResizeEdge::RIGHT, Point::ZERO));
        assert!(engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));
        assert!(engine.workspace(ws).unwrap().resize_session().is_none());
    }

    #[test_log::test]
    fn activate_tab_only_works_in_tabbed_columns() {
        let (mut engine, ws, nodes) = setup(1);
        let (column, tiles) = stacked_column(&mut engine, ws, nodes[0]);
        assert!(!engine.activate_tab(0, column));

        assert!(engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));
        assert!(!engine.activate_tab(1, column));
        assert!(!engine.activate_tab(7, column));

        assert!(engine.activate_tab(2, column));
        assert_eq!(hidden_flags(&engine, &tiles), vec![true, true, false]);
        assert_eq!(engine.selected_node(ws), Some(tiles[2]));
        assert_eq!(engine.tree().window(tiles[1]).unwrap().appearance().alpha(), 0.0);
        assert_eq!(engine.tree().window(tiles[2]).unwrap().appearance().alpha(), 1.0);
    }

    #[test_log::test]
    fn removing_the_active_tab_reveals_a_neighbour() {
        let (mut engine, ws, nodes) = setup(1);
        let (column, tiles) = stacked_column(&mut engine, ws, nodes[0]);
        assert!(engine.set_column_display(ColumnDisplay::Tabbed, column, &no_gaps()));

        assert!(engine.remove_window(wid(20)));
        assert_eq!(engine.selected_node(ws), Some(tiles[2]));
        assert_eq!(hidden_flags(&engine, &[tiles[0], tiles[2]]), vec![true, false]);
        assert_eq!(engine.tree().window(tiles[2]).unwrap().appearance().alpha(), 1.0);
    }

    #[test_log::test]
    fn toggle_command_flips_the_selected_column() {
        let (mut engine, ws, nodes) = setup(2);
        let column = engine.tree().column_of(nodes[1]).unwrap();

        let response = engine.handle_command(ws, LayoutCommand::ToggleColumnTabbed);
        assert!(response.needs_layout);
        assert!(engine.tree().column(column).unwrap().is_tabbed());

        assert!(engine.toggle_column_tabbed(ws));
        assert!(!engine.tree().column(column).unwrap().is_tabbed());

        let response = engine.handle_command(ws, LayoutCommand::ActivateTab(0));
        assert_eq!(response, EventResponse::default());
    }
}
