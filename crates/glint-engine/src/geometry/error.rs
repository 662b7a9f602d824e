/// Geometry upload failures.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// The driver could not allocate an object.
    #[error("failed to allocate {object}: {message}")]
    Allocation { object: &'static str, message: String },

    /// The layout cannot be expressed to GL.
    #[error("invalid vertex layout: {0}")]
    InvalidLayout(String),
}
