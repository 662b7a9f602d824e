//! Global GPU pipeline state, made explicit.
//!
//! GL keeps the selected program, the bound vertex array, the clear color,
//! the viewport and the blend/cull switches as hidden per-context globals.
//! [`PipelineState`] owns the backend handle and mirrors that state so the
//! rest of the crate can pass it around by `&mut` and query it.

mod setup;
mod state;
mod viewport;

pub use setup::{BlendFactor, BlendMode, PipelineSetup};
pub use state::{BoundGeometry, PipelineState};
pub use viewport::Viewport;
