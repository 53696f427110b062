//! Layout core of a scrolling-tile window manager.
//!
//! Workspaces hold a strip of columns, each column a stack (or a tab group) of
//! windows. The strip scrolls horizontally under a viewport whose offset can be
//! static, animating, or driven by a live gesture. Platform event capture and
//! window manipulation live outside this crate: callers deliver normalized
//! input through [`LayoutEngine`] and apply the [`TileFrame`]s it returns.

pub mod animation;
pub mod common;
pub mod input;
pub mod layout_engine;
pub mod model;
pub mod sys;

pub use layout_engine::{EventResponse, LayoutCommand, LayoutEngine, TileFrame};
