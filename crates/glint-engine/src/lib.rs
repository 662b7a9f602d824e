//! Glint engine crate.
//!
//! A small OpenGL rendering core (shader programs, geometry buffers, explicit
//! pipeline state and a per-frame renderer) over a thin [`backend::GlBackend`]
//! seam, plus the platform glue that opens a window and drives an app.

pub mod backend;
pub mod geometry;
pub mod pipeline;
pub mod render;
pub mod shader;

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod paint;
