use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::model::WindowId;
use crate::sys::geometry::Point;

/// Distance from a tile edge, in pixels, within which the pointer grabs that edge.
pub const RESIZE_EDGE_THRESHOLD: f64 = 8.0;

/// Smallest width or height a tile can be resized down to.
pub const MIN_TILE_SIZE: f64 = 50.0;

bitflags! {
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResizeEdge: u8 {
        const TOP = 1 << 0;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;

        const TOP_LEFT = Self::TOP.bits() | Self::LEFT.bits();
        const BOTTOM_LEFT = Self::BOTTOM.bits() | Self::LEFT.bits();
        const TOP_RIGHT = Self::TOP.bits() | Self::RIGHT.bits();
        const BOTTOM_RIGHT = Self::BOTTOM.bits() | Self::RIGHT.bits();

        const LEFT_RIGHT = Self::LEFT.bits() | Self::RIGHT.bits();
        const TOP_BOTTOM = Self::TOP.bits() | Self::BOTTOM.bits();
    }
}

/// Cursor requested from the platform layer while hovering or dragging edges.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CursorShape {
    #[default]
    Default,
    ResizeLeftRight,
    ResizeUpDown,
    ResizeNorthWestSouthEast,
    ResizeNorthEastSouthWest,
}

impl ResizeEdge {
    pub fn cursor(self) -> CursorShape {
        let horizontal = self.intersects(Self::LEFT_RIGHT);
        let vertical = self.intersects(Self::TOP_BOTTOM);
        match (horizontal, vertical) {
            (false, false) => CursorShape::Default,
            (true, false) => CursorShape::ResizeLeftRight,
            (false, true) => CursorShape::ResizeUpDown,
            (true, true) => {
                if self.contains(Self::TOP_LEFT) || self.contains(Self::BOTTOM_RIGHT) {
                    CursorShape::ResizeNorthWestSouthEast
                } else {
                    CursorShape::ResizeNorthEastSouthWest
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeHit {
    pub node: NodeId,
    pub edges: ResizeEdge,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Before,
    After,
    Swap,
}

/// Where a dragged window would land if released now.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Window {
        node: NodeId,
        window: WindowId,
        position: InsertPosition,
    },
}

impl HoverTarget {
    pub fn node(&self) -> NodeId {
        match self {
            HoverTarget::Window { node, .. } => *node,
        }
    }

    pub fn position(&self) -> InsertPosition {
        match self {
            HoverTarget::Window { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub node: NodeId,
    pub edges: ResizeEdge,
    pub start_location: Point,
    pub(super) last_location: Point,
}

impl ResizeSession {
    pub(super) fn new(node: NodeId, edges: ResizeEdge, start_location: Point) -> Self {
        Self {
            node,
            edges,
            start_location,
            last_location: start_location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveSession {
    pub node: NodeId,
    pub window: WindowId,
    pub start_location: Point,
    pub is_insert_mode: bool,
    pub hover: Option<HoverTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_edges_map_to_straight_cursors() {
        assert_eq!(ResizeEdge::LEFT.cursor(), CursorShape::ResizeLeftRight);
        assert_eq!(ResizeEdge::RIGHT.cursor(), CursorShape::ResizeLeftRight);
        assert_eq!(ResizeEdge::TOP.cursor(), CursorShape::ResizeUpDown);
        assert_eq!(ResizeEdge::BOTTOM.cursor(), CursorShape::ResizeUpDown);
        assert_eq!(ResizeEdge::empty().cursor(), CursorShape::Default);
    }

    #[test]
    fn corners_map_to_diagonal_cursors() {
        assert_eq!(ResizeEdge::TOP_LEFT.cursor(), CursorShape::ResizeNorthWestSouthEast);
        assert_eq!(ResizeEdge::BOTTOM_RIGHT.cursor(), CursorShape::ResizeNorthWestSouthEast);
        assert_eq!(ResizeEdge::TOP_RIGHT.cursor(), CursorShape::ResizeNorthEastSouthWest);
        assert_eq!(ResizeEdge::BOTTOM_LEFT.cursor(), CursorShape::ResizeNorthEastSouthWest);
        assert_eq!(CursorShape::ResizeNorthEastSouthWest.as_ref(), "resize_north_east_south_west");
    }
}
