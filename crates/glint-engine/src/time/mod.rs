//! Frame timing.
//!
//! One [`FrameTicker`] per render loop; call `tick()` once per presented frame.

mod ticker;

pub use ticker::{FrameTicker, Tick};
