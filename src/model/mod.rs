mod window;

pub use window::{WindowId, pid_t};
