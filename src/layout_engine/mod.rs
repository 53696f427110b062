use serde::{Deserialize, Serialize};

mod column;
mod engine;
mod interactive;
mod tree;
pub mod utils;
mod viewport;

pub use column::{Column, ColumnDisplay, TileAppearance};
pub use engine::{EventResponse, LayoutCommand, LayoutEngine, WorkspaceState};
pub use interactive::{
    CursorShape, HoverTarget, InsertPosition, MIN_TILE_SIZE, MoveSession, RESIZE_EDGE_THRESHOLD,
    ResizeEdge, ResizeHit, ResizeSession,
};
pub use tree::{LayoutNode, LayoutTree, NodeKind, TileFrame, WindowNode};
pub use viewport::{ColumnStrip, ViewOffset, ViewOffsetMode, ViewportState};

slotmap::new_key_type! {
    /// Stable identity of a window or column node in the layout arena.
    pub struct NodeId;
    pub struct WorkspaceId;
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Column steps for horizontal directions, `None` for vertical ones.
    pub fn column_steps(self) -> Option<isize> {
        match self {
            Direction::Left => Some(-1),
            Direction::Right => Some(1),
            Direction::Up | Direction::Down => None,
        }
    }
}
