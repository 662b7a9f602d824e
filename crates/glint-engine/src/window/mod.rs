//! Window + runtime loop.
//!
//! Owns the `winit` event loop and wires the single window to the GL device,
//! the pipeline state and the [`App`](crate::core::App).

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
