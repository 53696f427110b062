use ascii_tree::Tree;
use slotmap::{SecondaryMap, SlotMap};
use tracing::warn;

use super::column::{Column, TileAppearance, tile_rects};
use super::interactive::{InsertPosition, RESIZE_EDGE_THRESHOLD, ResizeEdge, ResizeHit};
use super::viewport::ColumnStrip;
use super::{NodeId, WorkspaceId};
use crate::common::collections::HashMap;
use crate::common::config::{GapSettings, ScrollingLayoutSettings};
use crate::model::WindowId;
use crate::sys::geometry::{Point, Rect};

#[derive(Debug, Clone)]
pub struct LayoutNode {
    parent: Option<NodeId>,
    workspace: WorkspaceId,
    frame: Rect,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Window(WindowNode),
    Column(Column),
}

#[derive(Debug, Clone)]
pub struct WindowNode {
    pub(super) window: WindowId,
    /// Share of the column height relative to its siblings.
    pub(super) height_weight: f64,
    pub(super) appearance: TileAppearance,
}

impl WindowNode {
    fn new(window: WindowId) -> Self {
        Self {
            window,
            height_weight: 1.0,
            appearance: TileAppearance::default(),
        }
    }

    pub fn window(&self) -> WindowId { self.window }

    pub fn height_weight(&self) -> f64 { self.height_weight }

    pub fn appearance(&self) -> &TileAppearance { &self.appearance }
}

impl LayoutNode {
    /// Owning column for windows; `None` for columns and detached windows.
    pub fn parent(&self) -> Option<NodeId> { self.parent }

    pub fn workspace(&self) -> WorkspaceId { self.workspace }

    /// Settled frame from the last layout pass, without animation offsets.
    pub fn frame(&self) -> Rect { self.frame }

    pub fn kind(&self) -> &NodeKind { &self.kind }

    pub fn as_window(&self) -> Option<&WindowNode> {
        match &self.kind {
            NodeKind::Window(w) => Some(w),
            NodeKind::Column(_) => None,
        }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match &self.kind {
            NodeKind::Column(c) => Some(c),
            NodeKind::Window(_) => None,
        }
    }
}

/// Target placement for one window, handed to the window-manipulation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileFrame {
    pub node: NodeId,
    pub window: WindowId,
    /// Frame including any in-flight move displacement.
    pub frame: Rect,
    pub alpha: f64,
    pub hidden: bool,
}

/// Where a window sat before it was taken out of its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Detached {
    pub workspace: WorkspaceId,
    pub column_idx: usize,
    pub row_idx: usize,
    pub removed_column: bool,
}

/// Arena of column and window nodes for every workspace.
///
/// Parent links and column children are ids, never owning pointers, so stale
/// references simply fail to resolve.
#[derive(Debug, Default)]
pub struct LayoutTree {
    nodes: SlotMap<NodeId, LayoutNode>,
    roots: SecondaryMap<WorkspaceId, Vec<NodeId>>,
    windows: HashMap<WindowId, NodeId>,
    settings: ScrollingLayoutSettings,
}

impl LayoutTree {
    pub fn new(settings: &ScrollingLayoutSettings) -> Self {
        Self {
            settings: settings.clone(),
            ..Default::default()
        }
    }

    pub(super) fn update_settings(&mut self, settings: &ScrollingLayoutSettings) {
        self.settings = settings.clone();
    }

    pub(super) fn add_workspace(&mut self, ws: WorkspaceId) { self.roots.insert(ws, Vec::new()); }

    /// Drops a workspace and every node in it, returning the windows it held.
    pub(super) fn remove_workspace(&mut self, ws: WorkspaceId) -> Vec<WindowId> {
        let Some(columns) = self.roots.remove(ws) else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        for column in columns {
            let Some(node) = self.nodes.remove(column) else { continue };
            let NodeKind::Column(column) = node.kind else { continue };
            for child in column.windows {
                if let Some(LayoutNode { kind: NodeKind::Window(w), .. }) = self.nodes.remove(child) {
                    self.windows.remove(&w.window);
                    removed.push(w.window);
                }
            }
        }
        removed
    }

    /// Live column list of a workspace, left to right.
    pub fn columns(&self, ws: WorkspaceId) -> &[NodeId] {
        self.roots.get(ws).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_node(&self, id: NodeId) -> Option<&LayoutNode> { self.nodes.get(id) }

    pub fn window(&self, id: NodeId) -> Option<&WindowNode> { self.nodes.get(id)?.as_window() }

    pub(super) fn window_mut(&mut self, id: NodeId) -> Option<&mut WindowNode> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Window(w) => Some(w),
            NodeKind::Column(_) => None,
        }
    }

    pub(super) fn window_nodes_mut(&mut self) -> impl Iterator<Item = &mut WindowNode> + '_ {
        self.nodes.values_mut().filter_map(|n| match &mut n.kind {
            NodeKind::Window(w) => Some(w),
            NodeKind::Column(_) => None,
        })
    }

    pub fn column(&self, id: NodeId) -> Option<&Column> { self.nodes.get(id)?.as_column() }

    pub(super) fn column_mut(&mut self, id: NodeId) -> Option<&mut Column> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Column(c) => Some(c),
            NodeKind::Window(_) => None,
        }
    }

    pub fn node_for_window(&self, window: WindowId) -> Option<NodeId> {
        self.windows.get(&window).copied()
    }

    /// Column owning `node`, or `node` itself when it is a column.
    pub fn column_of(&self, node: NodeId) -> Option<NodeId> {
        let n = self.nodes.get(node)?;
        match n.kind {
            NodeKind::Column(_) => Some(node),
            NodeKind::Window(_) => n.parent,
        }
    }

    pub fn find_column(&self, window: NodeId, ws: WorkspaceId) -> Option<NodeId> {
        let column = self.column_of(window)?;
        (self.nodes.get(column)?.workspace == ws).then_some(column)
    }

    pub fn column_index(&self, column: NodeId) -> Option<usize> {
        let ws = self.nodes.get(column)?.workspace;
        self.columns(ws).iter().position(|c| *c == column)
    }

    /// Column index and row of a window node.
    pub fn locate(&self, node: NodeId) -> Option<(usize, usize)> {
        let column = self.nodes.get(node)?.parent?;
        let row = self.column(column)?.position(node)?;
        Some((self.column_index(column)?, row))
    }

    pub fn first_window(&self, ws: WorkspaceId) -> Option<NodeId> {
        self.columns(ws).first().and_then(|c| self.column(*c)).and_then(Column::active_window)
    }

    pub fn window_count(&self, ws: WorkspaceId) -> usize {
        self.columns(ws).iter().filter_map(|c| self.column(*c)).map(Column::len).sum()
    }

    /// Window ids per column, used to detect whether a reorder changed anything.
    pub(super) fn window_rows(&self, ws: WorkspaceId) -> Vec<Vec<NodeId>> {
        self.columns(ws)
            .iter()
            .filter_map(|c| self.column(*c))
            .map(|c| c.windows.clone())
            .collect()
    }

    fn new_column(&mut self, ws: WorkspaceId, idx: usize) -> Option<NodeId> {
        let ratio = self.settings.clamp_ratio(self.settings.column_width_ratio);
        let roots = self.roots.get_mut(ws)?;
        let column = self.nodes.insert(LayoutNode {
            parent: None,
            workspace: ws,
            frame: Rect::default(),
            kind: NodeKind::Column(Column::new(ratio)),
        });
        let idx = idx.min(roots.len());
        roots.insert(idx, column);
        Some(column)
    }

    /// Creates a single-window column at `idx` (clamped to the strip end).
    pub(super) fn insert_column(
        &mut self,
        ws: WorkspaceId,
        idx: usize,
        window: WindowId,
    ) -> Option<NodeId> {
        if self.windows.contains_key(&window) {
            warn!(?window, "window is already tiled");
            return None;
        }
        let column = self.new_column(ws, idx)?;
        let node = self.nodes.insert(LayoutNode {
            parent: Some(column),
            workspace: ws,
            frame: Rect::default(),
            kind: NodeKind::Window(WindowNode::new(window)),
        });
        self.column_mut(column)?.windows.push(node);
        self.windows.insert(window, node);
        Some(node)
    }

    pub(super) fn push_window(&mut self, column: NodeId, window: WindowId) -> Option<NodeId> {
        if self.windows.contains_key(&window) {
            warn!(?window, "window is already tiled");
            return None;
        }
        let ws = self.nodes.get(column)?.workspace;
        self.column(column)?;
        let node = self.nodes.insert(LayoutNode {
            parent: Some(column),
            workspace: ws,
            frame: Rect::default(),
            kind: NodeKind::Window(WindowNode::new(window)),
        });
        self.column_mut(column)?.windows.push(node);
        self.windows.insert(window, node);
        Some(node)
    }

    /// Takes a window out of its column, keeping the node alive for reattachment.
    /// A column left empty is removed from the tree.
    pub(super) fn detach_window(&mut self, node: NodeId) -> Option<Detached> {
        let column = self.nodes.get(node)?.parent?;
        let ws = self.nodes.get(column)?.workspace;
        let column_idx = self.column_index(column)?;
        let col = self.column_mut(column)?;
        let row_idx = col.position(node)?;
        col.windows.remove(row_idx);
        if row_idx < col.active_tile_idx {
            col.active_tile_idx -= 1;
        }
        col.clamp_active_tile_idx();
        let removed_column = col.windows.is_empty();

        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = None;
        }
        if removed_column {
            self.nodes.remove(column);
            if let Some(roots) = self.roots.get_mut(ws) {
                roots.remove(column_idx);
            }
        }
        Some(Detached { workspace: ws, column_idx, row_idx, removed_column })
    }

    /// Puts a detached window into a fresh column at `idx`.
    pub(super) fn attach_as_column(
        &mut self,
        ws: WorkspaceId,
        idx: usize,
        node: NodeId,
    ) -> Option<NodeId> {
        if self.nodes.get(node)?.parent.is_some() {
            return None;
        }
        let column = self.new_column(ws, idx)?;
        let n = self.nodes.get_mut(node)?;
        n.parent = Some(column);
        n.workspace = ws;
        self.column_mut(column)?.windows.push(node);
        Some(column)
    }

    /// Appends a detached window to an existing column.
    pub(super) fn attach_to_column(&mut self, column: NodeId, node: NodeId) -> bool {
        let Some(ws) = self.nodes.get(column).map(|c| c.workspace) else {
            return false;
        };
        match self.nodes.get_mut(node) {
            Some(n) if n.parent.is_none() && n.as_window().is_some() => {
                n.parent = Some(column);
                n.workspace = ws;
            }
            _ => return false,
        }
        match self.column_mut(column) {
            Some(col) => {
                col.windows.push(node);
                true
            }
            None => false,
        }
    }

    pub(super) fn remove_window(&mut self, window: WindowId) -> Option<(NodeId, Detached)> {
        let node = self.windows.get(&window).copied()?;
        let detached = self.detach_window(node)?;
        self.nodes.remove(node);
        self.windows.remove(&window);
        Some((node, detached))
    }

    pub(super) fn swap_columns(&mut self, ws: WorkspaceId, a: usize, b: usize) -> bool {
        let Some(roots) = self.roots.get_mut(ws) else {
            return false;
        };
        if a == b || a >= roots.len() || b >= roots.len() {
            return false;
        }
        roots.swap(a, b);
        true
    }

    /// Window that becomes current after moving `steps` columns away from
    /// `from` (negative is left). Clamped to the strip; `None` when the
    /// selection would not change or `from` does not resolve.
    pub fn move_selection_by_columns(
        &self,
        steps: isize,
        from: Option<NodeId>,
        ws: WorkspaceId,
    ) -> Option<NodeId> {
        let columns = self.columns(ws);
        let current_column = self.find_column(from?, ws)?;
        let current = columns.iter().position(|c| *c == current_column)?;
        let last = columns.len().checked_sub(1)? as isize;
        let target = (current as isize).saturating_add(steps).clamp(0, last) as usize;
        if target == current {
            return None;
        }
        self.column(columns[target])?.active_window()
    }

    pub fn column_width_px(&self, column: &Column, tiling_width: f64) -> f64 {
        (tiling_width * self.settings.clamp_ratio(column.width_ratio)).max(1.0)
    }

    pub fn strip(&self, ws: WorkspaceId, tiling_width: f64, gap: f64, active: usize) -> ColumnStrip {
        let widths = self
            .columns(ws)
            .iter()
            .filter_map(|c| self.column(*c))
            .map(|c| self.column_width_px(c, tiling_width))
            .collect();
        ColumnStrip::new(widths, gap, tiling_width, active)
    }

    /// Computes frames for every window of `ws` and records them on the nodes.
    pub(super) fn layout(
        &mut self,
        ws: WorkspaceId,
        tiling: Rect,
        gaps: &GapSettings,
        view_offset: f64,
    ) -> Vec<TileFrame> {
        let gap_x = gaps.inner.horizontal;
        let gap_y = gaps.inner.vertical;
        let columns = self.columns(ws).to_vec();
        let mut out = Vec::with_capacity(columns.len());
        let mut strip_cursor = 0.0;

        for column_id in columns {
            let Some(column) = self.column(column_id) else { continue };
            let width = self.column_width_px(column, tiling.size.width);
            let display = column.display;
            let children = column.windows.clone();
            let hidden: Vec<bool> = (0..children.len()).map(|i| column.hides_tile(i)).collect();

            let x = tiling.origin.x + strip_cursor - view_offset;
            strip_cursor += width + gap_x;
            let column_frame = Rect::from_xywh(x, tiling.origin.y, width, tiling.size.height);
            if let Some(n) = self.nodes.get_mut(column_id) {
                n.frame = column_frame;
            }

            let weights: Vec<f64> = children
                .iter()
                .map(|c| self.window(*c).map_or(1.0, |w| w.height_weight))
                .collect();
            let rects = tile_rects(column_frame, &weights, gap_y, display);

            for ((child, rect), hidden) in children.into_iter().zip(rects).zip(hidden) {
                let Some(node) = self.nodes.get_mut(child) else { continue };
                let frame = rect.round();
                node.frame = frame;
                let NodeKind::Window(w) = &node.kind else { continue };
                out.push(TileFrame {
                    node: child,
                    window: w.window,
                    frame: frame.translate(w.appearance.render_offset()),
                    alpha: w.appearance.alpha(),
                    hidden,
                });
            }
        }
        out
    }

    fn visible_windows(&self, ws: WorkspaceId) -> impl Iterator<Item = (NodeId, &LayoutNode)> + '_ {
        self.columns(ws)
            .iter()
            .filter_map(|c| self.column(*c))
            .flat_map(|c| c.windows.iter().enumerate().filter(move |(i, _)| !c.hides_tile(*i)))
            .filter_map(|(_, w)| Some((*w, self.nodes.get(*w)?)))
    }

    /// Window whose last laid-out frame contains `point`. Hidden tabs never match.
    pub fn hit_test_tiled(&self, point: Point, ws: WorkspaceId) -> Option<NodeId> {
        self.visible_windows(ws)
            .find(|(_, node)| node.frame.contains(point))
            .map(|(id, _)| id)
    }

    /// Resize edges grabbed at `point`, if it lies within the edge threshold of a tile.
    pub fn hit_test_resize(&self, point: Point, ws: WorkspaceId) -> Option<ResizeHit> {
        self.visible_windows(ws).find_map(|(id, node)| {
            let frame = node.frame;
            if frame.is_empty() || !frame.outset(RESIZE_EDGE_THRESHOLD).contains(point) {
                return None;
            }
            let mut edges = ResizeEdge::empty();
            if (point.x - frame.min_x()).abs() <= RESIZE_EDGE_THRESHOLD {
                edges |= ResizeEdge::LEFT;
            } else if (point.x - frame.max_x()).abs() <= RESIZE_EDGE_THRESHOLD {
                edges |= ResizeEdge::RIGHT;
            }
            if (point.y - frame.min_y()).abs() <= RESIZE_EDGE_THRESHOLD {
                edges |= ResizeEdge::TOP;
            } else if (point.y - frame.max_y()).abs() <= RESIZE_EDGE_THRESHOLD {
                edges |= ResizeEdge::BOTTOM;
            }
            (!edges.is_empty()).then_some(ResizeHit { node: id, edges })
        })
    }

    /// Frame of the drop indicator shown while a dragged window hovers `target`.
    ///
    /// Insertions get a bar half a column wide centered on the gap before or
    /// after the target's column; swaps highlight the whole column.
    pub fn insertion_dropzone_frame(
        &self,
        target: NodeId,
        position: InsertPosition,
        ws: WorkspaceId,
        gaps: &GapSettings,
    ) -> Option<Rect> {
        self.window(target)?;
        let column = self.find_column(target, ws)?;
        let frame = self.nodes.get(column)?.frame;
        if frame.is_empty() {
            return None;
        }
        let bar_width = frame.size.width / 2.0;
        let gap = gaps.inner.horizontal;
        let center = match position {
            InsertPosition::Swap => return Some(frame),
            InsertPosition::Before => frame.min_x() - gap / 2.0,
            InsertPosition::After => frame.max_x() + gap / 2.0,
        };
        Some(Rect::from_xywh(
            center - bar_width / 2.0,
            frame.origin.y,
            bar_width,
            frame.size.height,
        ))
    }

    pub fn draw_tree(&self, ws: WorkspaceId, selected: Option<NodeId>) -> String {
        let columns = self
            .columns(ws)
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| Some((idx, self.column(*id)?)))
            .map(|(idx, column)| {
                let rows = column
                    .windows
                    .iter()
                    .enumerate()
                    .filter_map(|(row, id)| {
                        let w = self.window(*id)?;
                        let marker = if Some(*id) == selected { "*" } else { "" };
                        let hidden = if column.hides_tile(row) { " (hidden)" } else { "" };
                        Some(format!("{marker}{:?}{hidden}", w.window))
                    })
                    .collect();
                Tree::Node(
                    format!(
                        "Column {idx} [{}, width {:.2}]",
                        column.display.as_ref(),
                        column.width_ratio
                    ),
                    vec![Tree::Leaf(rows)],
                )
            })
            .collect();
        let mut out = String::new();
        let _ = ascii_tree::write_tree(&mut out, &Tree::Node(format!("{ws:?}"), columns));
        out
    }
}
