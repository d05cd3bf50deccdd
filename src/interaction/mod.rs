//! Adapters that turn pointer input into engine and spring calls.

pub mod drag;
pub mod snap;

pub use drag::{DragController, DragOptions};
pub use snap::MagneticSnap;
