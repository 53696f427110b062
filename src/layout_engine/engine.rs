use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::debug;

mod drag;
mod gestures;
mod pointer;
mod resize;
mod tabs;

use super::interactive::{CursorShape, MoveSession, ResizeSession};
use super::tree::{Detached, LayoutTree, TileFrame};
use super::utils::compute_tiling_area;
use super::viewport::{ColumnStrip, ViewOffset, ViewportState};
use super::{Direction, NodeId, WorkspaceId};
use crate::animation::Clock;
use crate::common::collections::HashMap;
use crate::common::config::{GapSettings, LayoutSettings};
use crate::input::GestureRecognizer;
use crate::model::WindowId;
use crate::sys::geometry::{Point, Rect};

#[non_exhaustive]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCommand {
    MoveFocus(#[serde(rename = "direction")] Direction),
    /// Scroll the strip by a delta in column units (scaled by the selected column's step width)
    ScrollStrip {
        delta: f64,
    },
    /// Snap the strip to the nearest column boundary
    SnapStrip,
    ToggleColumnTabbed,
    ActivateTab(usize),
    JoinWindow(Direction),
    UnjoinWindow,
    ResizeColumnBy {
        amount: f64,
    },
}

#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub focus_window: Option<WindowId>,
    pub cursor: Option<CursorShape>,
    /// Frames changed; the caller should run `calculate_layout` again.
    pub needs_layout: bool,
}

impl EventResponse {
    fn relayout() -> Self {
        Self {
            needs_layout: true,
            ..Default::default()
        }
    }

    fn focus(window: Option<WindowId>) -> Self {
        Self {
            focus_window: window,
            cursor: None,
            needs_layout: true,
        }
    }
}

/// Everything a workspace owns besides its columns.
#[derive(Debug)]
pub struct WorkspaceState {
    pub(super) viewport: ViewportState,
    pub(super) resize: Option<ResizeSession>,
    pub(super) drag: Option<MoveSession>,
    /// Screen and gaps seen by the last layout pass; input handlers measure against these.
    pub(super) last_screen: Rect,
    pub(super) last_gaps: GapSettings,
}

impl WorkspaceState {
    fn new(gaps: &GapSettings) -> Self {
        Self {
            viewport: ViewportState::default(),
            resize: None,
            drag: None,
            last_screen: Rect::default(),
            last_gaps: *gaps,
        }
    }

    pub fn viewport(&self) -> &ViewportState { &self.viewport }

    pub fn resize_session(&self) -> Option<&ResizeSession> { self.resize.as_ref() }

    pub fn move_session(&self) -> Option<&MoveSession> { self.drag.as_ref() }

    fn tiling_area(&self) -> Rect { compute_tiling_area(self.last_screen, &self.last_gaps) }
}

/// Entry point of the layout core: owns every workspace tree, their viewports
/// and interaction sessions, and the trackpad gesture recognizer.
#[derive(Debug)]
pub struct LayoutEngine {
    tree: LayoutTree,
    workspaces: SlotMap<WorkspaceId, WorkspaceState>,
    gesture: GestureRecognizer,
    settings: LayoutSettings,
    clock: Clock,
}

impl LayoutEngine {
    pub fn new(settings: &LayoutSettings, clock: Clock) -> Self {
        Self {
            tree: LayoutTree::new(&settings.scrolling),
            workspaces: SlotMap::with_key(),
            gesture: GestureRecognizer::new(&settings.gestures),
            settings: settings.clone(),
            clock,
        }
    }

    /// Swaps in new settings. The recognizer starts over, so any gesture it was
    /// driving is frozen where it stands.
    pub fn update_settings(&mut self, settings: &LayoutSettings) {
        self.tree.update_settings(&settings.scrolling);
        self.gesture.update_settings(&settings.gestures);
        self.settings = settings.clone();
        for state in self.workspaces.values_mut() {
            if state.viewport.is_input_live() {
                state.viewport.stop_anim_and_gesture();
            }
        }
    }

    pub fn settings(&self) -> &LayoutSettings { &self.settings }

    pub fn clock(&self) -> &Clock { &self.clock }

    pub fn tree(&self) -> &LayoutTree { &self.tree }

    pub fn gesture_recognizer(&self) -> &GestureRecognizer { &self.gesture }

    pub fn create_workspace(&mut self) -> WorkspaceId {
        let ws = self.workspaces.insert(WorkspaceState::new(&self.settings.gaps));
        self.tree.add_workspace(ws);
        ws
    }

    /// Drops a workspace with all its windows and sessions.
    pub fn remove_workspace(&mut self, ws: WorkspaceId) -> Vec<WindowId> {
        if self.workspaces.remove(ws).is_none() {
            return Vec::new();
        }
        self.tree.remove_workspace(ws)
    }

    pub fn workspace(&self, ws: WorkspaceId) -> Option<&WorkspaceState> { self.workspaces.get(ws) }

    /// Runs `f` with exclusive access to the viewport of `ws` for one logical step.
    pub fn with_viewport_state<R>(
        &mut self,
        ws: WorkspaceId,
        f: impl FnOnce(&mut ViewportState) -> R,
    ) -> Option<R> {
        self.workspaces.get_mut(ws).map(|state| f(&mut state.viewport))
    }

    /// Selection of `ws`, provided it still resolves to a window of that workspace.
    pub fn selected_node(&self, ws: WorkspaceId) -> Option<NodeId> {
        let node = self.workspaces.get(ws)?.viewport.selected?;
        self.tree.window(node)?;
        self.tree.find_column(node, ws).map(|_| node)
    }

    pub fn selected_window(&self, ws: WorkspaceId) -> Option<WindowId> {
        self.tree.window(self.selected_node(ws)?).map(|w| w.window())
    }

    fn selected_column_idx(&self, ws: WorkspaceId) -> Option<usize> {
        self.tree.locate(self.selected_node(ws)?).map(|(col, _)| col)
    }

    /// Tiles `window` in a new column right after the selected one and selects it.
    pub fn add_window(&mut self, ws: WorkspaceId, window: WindowId) -> Option<NodeId> {
        self.workspaces.get(ws)?;
        let idx = match self.selected_column_idx(ws) {
            Some(selected) => selected + 1,
            None => self.tree.columns(ws).len(),
        };
        let node = self.tree.insert_column(ws, idx, window)?;
        debug!(?window, column = idx, "added window");
        self.set_selection(ws, node);
        self.reveal_selection(ws);
        Some(node)
    }

    /// Stacks `window` at the bottom of an existing column. Selection is unchanged.
    pub fn add_window_to_column(&mut self, column: NodeId, window: WindowId) -> Option<NodeId> {
        let node = self.tree.push_window(column, window)?;
        debug!(?window, "added window to column");
        self.sync_tab_alpha(column);
        Some(node)
    }

    pub fn remove_window(&mut self, window: WindowId) -> bool {
        let Some((node, detached)) = self.tree.remove_window(window) else {
            return false;
        };
        let ws = detached.workspace;
        debug!(?window, "removed window");

        let mut was_selected = false;
        if let Some(state) = self.workspaces.get_mut(ws) {
            if state.resize.as_ref().is_some_and(|s| s.node == node) {
                state.resize = None;
            }
            if state.drag.as_ref().is_some_and(|s| s.node == node) {
                state.drag = None;
            } else if let Some(drag) = &mut state.drag
                && drag.hover.is_some_and(|h| h.node() == node)
            {
                drag.hover = None;
            }
            was_selected = state.viewport.selected == Some(node);
            if was_selected {
                state.viewport.selected = None;
            }
        }

        if !detached.removed_column
            && let Some(column) = self.tree.columns(ws).get(detached.column_idx).copied()
        {
            self.sync_tab_alpha(column);
        }
        if was_selected && let Some(next) = self.fallback_selection(ws, detached) {
            self.set_selection(ws, next);
            self.reveal_selection(ws);
        }
        true
    }

    /// Same row of the same column, else that column's last window, else the
    /// previous column's last window, else the first window.
    fn fallback_selection(&self, ws: WorkspaceId, detached: Detached) -> Option<NodeId> {
        let columns = self.tree.columns(ws);
        if let Some(column) = columns.get(detached.column_idx).and_then(|c| self.tree.column(*c))
            && let Some(node) =
                column.windows().get(detached.row_idx).or_else(|| column.windows().last())
        {
            return Some(*node);
        }
        if let Some(prev) = detached.column_idx.checked_sub(1)
            && let Some(node) = columns
                .get(prev)
                .and_then(|c| self.tree.column(*c))
                .and_then(|c| c.windows().last())
        {
            return Some(*node);
        }
        self.tree.first_window(ws)
    }

    pub fn select_window(&mut self, ws: WorkspaceId, node: NodeId) -> bool {
        if self.tree.window(node).is_none() || self.tree.find_column(node, ws).is_none() {
            return false;
        }
        self.set_selection(ws, node);
        self.reveal_selection(ws);
        true
    }

    fn set_selection(&mut self, ws: WorkspaceId, node: NodeId) {
        let Some(state) = self.workspaces.get_mut(ws) else {
            return;
        };
        state.viewport.selected = Some(node);
        if let Some(column) = self.tree.column_of(node)
            && let Some(row) = self.tree.column(column).and_then(|c| c.position(node))
        {
            self.show_tile(column, row);
        }
    }

    fn strip(&self, ws: WorkspaceId) -> Option<ColumnStrip> {
        let state = self.workspaces.get(ws)?;
        let tiling = state.tiling_area();
        let active = self.selected_column_idx(ws).unwrap_or(0);
        Some(self.tree.strip(ws, tiling.size.width, state.last_gaps.inner.horizontal, active))
    }

    /// Animates the view so the selected column is on screen.
    fn reveal_selection(&mut self, ws: WorkspaceId) {
        let center = self.settings.scrolling.center_focused_column;
        let Some(strip) = self.strip(ws) else { return };
        let Some(state) = self.workspaces.get_mut(ws) else {
            return;
        };
        if strip.is_empty() || state.last_screen.is_empty() || state.viewport.is_input_live() {
            return;
        }
        let current = state.viewport.view_offset().target();
        let (min, max) = strip.offset_bounds(center);
        let target = strip.reveal_offset(strip.active, current, center).clamp(min, max);
        if target != current {
            state.viewport.animate_to(
                target,
                self.clock.clone(),
                &self.settings.animations.view_offset,
            );
        }
    }

    /// Settled tile origins of `ws` at the current view offset.
    fn tile_positions(&mut self, ws: WorkspaceId, gaps: &GapSettings) -> HashMap<NodeId, Point> {
        let Some(state) = self.workspaces.get(ws) else {
            return HashMap::default();
        };
        let tiling = compute_tiling_area(state.last_screen, gaps);
        let offset = state.viewport.current_offset();
        let frames = self.tree.layout(ws, tiling, gaps, offset);
        frames
            .iter()
            .filter_map(|f| Some((f.node, self.tree.find_node(f.node)?.frame().origin)))
            .collect()
    }

    /// Slides every tile that moved since `before` from its old position.
    fn animate_moves_since(
        &mut self,
        ws: WorkspaceId,
        before: HashMap<NodeId, Point>,
        gaps: &GapSettings,
    ) {
        let after = self.tile_positions(ws, gaps);
        let config = self.settings.animations.window_movement;
        for (node, old) in before {
            if let Some(new) = after.get(&node)
                && *new != old
                && let Some(window) = self.tree.window_mut(node)
            {
                window.appearance.animate_move_from(old - *new, self.clock.clone(), &config);
            }
        }
    }

    /// Computes target frames for every tiled window of `ws` on `screen`.
    pub fn calculate_layout(
        &mut self,
        ws: WorkspaceId,
        screen: Rect,
        gaps: &GapSettings,
    ) -> Vec<TileFrame> {
        let center = self.settings.scrolling.center_focused_column;
        let active = self.selected_column_idx(ws).unwrap_or(0);
        let tiling = compute_tiling_area(screen, gaps);
        let strip = self.tree.strip(ws, tiling.size.width, gaps.inner.horizontal, active);
        let Some(state) = self.workspaces.get_mut(ws) else {
            return Vec::new();
        };
        state.last_screen = screen;
        state.last_gaps = *gaps;

        let resting = match state.viewport.view_offset() {
            ViewOffset::Static(offset) => Some(*offset),
            ViewOffset::Animation(_) | ViewOffset::Gesture(_) => None,
        };
        if let Some(offset) = resting {
            let (min, max) = strip.offset_bounds(center);
            let clamped = offset.clamp(min, max);
            if clamped != offset {
                state.viewport.set_offset(clamped);
            }
        }
        let offset = state.viewport.current_offset();
        self.tree.layout(ws, tiling, gaps, offset)
    }

    /// Drops finished animations. Returns whether any animation is still running.
    pub fn advance_animations(&mut self) -> bool {
        let mut running = false;
        for window in self.tree.window_nodes_mut() {
            running |= window.appearance.advance();
        }
        for state in self.workspaces.values_mut() {
            running |= state.viewport.advance();
        }
        running
    }

    pub fn draw_tree(&self, ws: WorkspaceId) -> String {
        self.tree.draw_tree(ws, self.selected_node(ws))
    }

    pub fn handle_command(&mut self, ws: WorkspaceId, command: LayoutCommand) -> EventResponse {
        debug!(?command, "layout command");
        if self.workspaces.get(ws).is_none() {
            return EventResponse::default();
        }
        match command {
            LayoutCommand::MoveFocus(direction) => self.move_focus(ws, direction),
            LayoutCommand::ScrollStrip { delta } => self.scroll_strip(ws, delta),
            LayoutCommand::SnapStrip => self.snap_strip(ws),
            LayoutCommand::ToggleColumnTabbed => {
                if self.toggle_column_tabbed(ws) {
                    EventResponse::relayout()
                } else {
                    EventResponse::default()
                }
            }
            LayoutCommand::ActivateTab(index) => {
                let Some(column) = self.selected_node(ws).and_then(|n| self.tree.column_of(n))
                else {
                    return EventResponse::default();
                };
                if self.activate_tab(index, column) {
                    EventResponse::focus(self.selected_window(ws))
                } else {
                    EventResponse::default()
                }
            }
            LayoutCommand::JoinWindow(direction) => self.join_selection(ws, direction),
            LayoutCommand::UnjoinWindow => self.unjoin_selection(ws),
            LayoutCommand::ResizeColumnBy { amount } => self.resize_selected_column(ws, amount),
        }
    }

    fn move_focus(&mut self, ws: WorkspaceId, direction: Direction) -> EventResponse {
        let target = match self.selected_node(ws) {
            None => self.tree.first_window(ws),
            Some(selected) => match direction.column_steps() {
                Some(steps) => self.tree.move_selection_by_columns(steps, Some(selected), ws),
                None => self.window_in_column_direction(selected, direction),
            },
        };
        let Some(target) = target else {
            return EventResponse::default();
        };
        self.set_selection(ws, target);
        self.reveal_selection(ws);
        EventResponse::focus(self.selected_window(ws))
    }

    fn window_in_column_direction(&self, node: NodeId, direction: Direction) -> Option<NodeId> {
        let column = self.tree.column(self.tree.column_of(node)?)?;
        let row = column.position(node)?;
        let target = match direction {
            Direction::Up => row.checked_sub(1)?,
            Direction::Down => row + 1,
            Direction::Left | Direction::Right => return None,
        };
        column.windows().get(target).copied()
    }

    fn scroll_strip(&mut self, ws: WorkspaceId, delta: f64) -> EventResponse {
        let center = self.settings.scrolling.center_focused_column;
        let Some(strip) = self.strip(ws) else {
            return EventResponse::default();
        };
        let Some(width) = strip.widths.get(strip.active) else {
            return EventResponse::default();
        };
        let step = width + strip.gap;
        let (min, max) = strip.offset_bounds(center);
        let Some(state) = self.workspaces.get_mut(ws) else {
            return EventResponse::default();
        };
        let next = (state.viewport.current_offset() + delta * step).clamp(min, max);
        state.viewport.set_offset(next);
        EventResponse::relayout()
    }

    fn snap_strip(&mut self, ws: WorkspaceId) -> EventResponse {
        let center = self.settings.scrolling.center_focused_column;
        let Some(strip) = self.strip(ws).filter(|s| !s.is_empty()) else {
            return EventResponse::default();
        };
        let Some(state) = self.workspaces.get_mut(ws) else {
            return EventResponse::default();
        };
        let current = state.viewport.current_offset();
        let idx = strip.nearest_column(current, center);
        let (min, max) = strip.offset_bounds(center);
        let target = strip.column_offset(idx, center).clamp(min, max);
        state.viewport.animate_to(target, self.clock.clone(), &self.settings.animations.view_offset);
        EventResponse::relayout()
    }

    /// Moves the selected window to the bottom of the neighbouring column.
    fn join_selection(&mut self, ws: WorkspaceId, direction: Direction) -> EventResponse {
        let Some(selected) = self.selected_node(ws) else {
            return EventResponse::default();
        };
        let Some(steps) = direction.column_steps() else {
            return EventResponse::default();
        };
        let Some((col_idx, _)) = self.tree.locate(selected) else {
            return EventResponse::default();
        };
        let Some(target_column) = col_idx
            .checked_add_signed(steps)
            .and_then(|idx| self.tree.columns(ws).get(idx).copied())
        else {
            return EventResponse::default();
        };
        let Some(gaps) = self.workspaces.get(ws).map(|s| s.last_gaps) else {
            return EventResponse::default();
        };

        let before = self.tile_positions(ws, &gaps);
        let source_column = self.tree.column_of(selected);
        let Some(detached) = self.tree.detach_window(selected) else {
            return EventResponse::default();
        };
        self.tree.attach_to_column(target_column, selected);
        if !detached.removed_column
            && let Some(source) = source_column
        {
            self.sync_tab_alpha(source);
        }
        self.set_selection(ws, selected);
        self.animate_moves_since(ws, before, &gaps);
        self.reveal_selection(ws);
        EventResponse::focus(self.selected_window(ws))
    }

    /// Moves the selected window out of a shared column into its own column to the right.
    fn unjoin_selection(&mut self, ws: WorkspaceId) -> EventResponse {
        let Some(selected) = self.selected_node(ws) else {
            return EventResponse::default();
        };
        let Some(column) = self.tree.column_of(selected) else {
            return EventResponse::default();
        };
        if self.tree.column(column).is_none_or(|c| c.len() <= 1) {
            return EventResponse::default();
        }
        let Some((col_idx, _)) = self.tree.locate(selected) else {
            return EventResponse::default();
        };
        let Some(gaps) = self.workspaces.get(ws).map(|s| s.last_gaps) else {
            return EventResponse::default();
        };

        let before = self.tile_positions(ws, &gaps);
        if self.tree.detach_window(selected).is_none() {
            return EventResponse::default();
        }
        self.tree.attach_as_column(ws, col_idx + 1, selected);
        self.sync_tab_alpha(column);
        self.set_selection(ws, selected);
        self.animate_moves_since(ws, before, &gaps);
        self.reveal_selection(ws);
        EventResponse::focus(self.selected_window(ws))
    }

    fn resize_selected_column(&mut self, ws: WorkspaceId, amount: f64) -> EventResponse {
        let Some(column) = self.selected_node(ws).and_then(|n| self.tree.column_of(n)) else {
            return EventResponse::default();
        };
        let scrolling = self.settings.scrolling.clone();
        let Some(col) = self.tree.column_mut(column) else {
            return EventResponse::default();
        };
        let next = scrolling.clamp_ratio(col.width_ratio + amount);
        if next == col.width_ratio {
            return EventResponse::default();
        }
        col.width_ratio = next;
        self.reveal_selection(ws);
        EventResponse::relayout()
    }
}
