//! Shader stages and programs.
//!
//! Lifecycle:
//! - a [`ShaderSource`] is wrapped in a [`ShaderUnit`] (`Uncompiled`)
//! - `ShaderUnit::compile` moves it to `Compiled` or `CompileFailed`
//! - compiled units are attached to a [`ShaderProgramBuilder`] and linked
//!   into a [`ShaderProgram`]; a link failure yields a [`LinkError`]
//!
//! Failed states are terminal. Fix the source and build a new unit.

mod error;
mod program;
mod source;
mod unit;

pub use error::{CompileError, LinkError, ShaderError};
pub use program::{ShaderProgram, ShaderProgramBuilder};
pub use source::{ShaderSource, ShaderStage};
pub use unit::{ShaderUnit, StageState};
