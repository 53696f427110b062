use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

#[allow(non_camel_case_types)]
pub type pid_t = i32;

/// Opaque handle of a platform window: owning process plus a per-process index.
///
/// The layout core never resolves this to a live window; it only hands it back
/// to the window-manipulation layer alongside computed frames.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId {
    pub pid: pid_t,
    pub idx: NonZeroU32,
}

impl WindowId {
    pub fn new(pid: pid_t, idx: u32) -> Option<Self> {
        Some(Self { pid, idx: NonZeroU32::new(idx)? })
    }
}

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({}, {})", self.pid, self.idx)
    }
}
