//! GPU-resident geometry.
//!
//! A [`GeometryBuffer`] owns a vertex array object, its vertex storage and an
//! optional index storage. The [`VertexLayout`] describes how the raw vertex
//! bytes map to shader inputs; it must match what the selected program's
//! vertex stage declares. That match is not checked.

mod buffer;
mod error;
mod layout;

pub use buffer::GeometryBuffer;
pub use error::GeometryError;
pub use layout::{ComponentType, VertexAttribute, VertexLayout};
