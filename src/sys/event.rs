//! Normalized input delivered by the platform event layer.
//!
//! Locations are already converted into the same screen space the layout uses;
//! touch positions are normalized to the trackpad surface (`0.0..=1.0`).

use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::geometry::Point;

bitflags! {
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Move,
    Down,
    Drag,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub location: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, location: Point, modifiers: Modifiers) -> Self {
        Self { kind, location, modifiers }
    }
}

/// Phase of a scroll or gesture stream. `None` marks events that are not part
/// of a stream, i.e. a physical wheel notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Began,
    Changed,
    Ended,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollWheelEvent {
    /// Pixels for trackpad scrolls, notches for wheels. Positive `x` reveals
    /// columns to the right.
    pub delta: Point,
    pub phase: EventPhase,
    pub momentum_phase: EventPhase,
    pub timestamp: Duration,
}

impl ScrollWheelEvent {
    /// Trackpad scrolls carry a phase; wheel notches never do.
    pub fn is_trackpad(&self) -> bool {
        self.phase != EventPhase::None || self.momentum_phase != EventPhase::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

impl TouchPhase {
    pub fn is_active(self) -> bool { matches!(self, TouchPhase::Began | TouchPhase::Moved) }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub phase: TouchPhase,
    pub normalized_position: Point,
}

impl Touch {
    pub fn new(phase: TouchPhase, x: f64, y: f64) -> Self {
        Self { phase, normalized_position: Point::new(x, y) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub phase: EventPhase,
    pub touches: Vec<Touch>,
    pub timestamp: Duration,
}
