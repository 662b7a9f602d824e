//! GL context + window surface management.
//!
//! This module is responsible for:
//! - creating the window together with a matching GL config
//! - creating the context, making it current and loading entry points
//! - resizing the surface and presenting frames

mod gl;
mod init;

pub use gl::GlDevice;
pub use init::GlInit;
