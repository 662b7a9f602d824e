use super::ShaderStage;

/// A stage failed to compile. `diagnostic` is the driver's info log.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{stage} shader failed to compile: {diagnostic}")]
pub struct CompileError {
    pub stage: ShaderStage,
    pub diagnostic: String,
}

/// A program failed to link. `diagnostic` is the driver's info log, or a
/// description of why linking was not attempted.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("shader program {} failed to link: {diagnostic}", .label.as_deref().unwrap_or("<unnamed>"))]
pub struct LinkError {
    pub label: Option<String>,
    pub diagnostic: String,
}

/// Either failure of a one-shot source-to-program build.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ShaderError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Drivers are allowed to return an empty log; callers always get text.
pub(super) fn non_empty(log: String, fallback: impl FnOnce() -> String) -> String {
    let trimmed = log.trim_end();
    if trimmed.is_empty() {
        fallback()
    } else {
        trimmed.to_string()
    }
}
