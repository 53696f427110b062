//! Recognizers that turn raw platform input streams into layout input.

mod gesture;
mod swipe_tracker;

pub use gesture::{
    GESTURE_COMMIT_THRESHOLD, GESTURE_GAIN, GestureAction, GesturePhase, GestureRecognizer,
};
pub use swipe_tracker::SwipeTracker;
