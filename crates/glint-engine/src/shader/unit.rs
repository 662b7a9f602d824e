use std::rc::Rc;

use crate::backend::GlBackend;
use crate::pipeline::PipelineState;

use super::error::non_empty;
use super::{CompileError, ShaderSource, ShaderStage};

/// Compilation state of a [`ShaderUnit`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StageState {
    Uncompiled,
    Compiled,
    /// Terminal. Holds the driver diagnostic.
    CompileFailed(String),
}

/// One shader stage and its GPU-side stage object.
///
/// The stage object exists only while the unit is `Compiled`; it is deleted
/// when the unit is dropped. Programs linked from the unit keep working after
/// that (GL keeps the linked code with the program).
pub struct ShaderUnit<B: GlBackend> {
    gl: Rc<B>,
    source: ShaderSource,
    handle: Option<B::Shader>,
    state: StageState,
}

impl<B: GlBackend> ShaderUnit<B> {
    /// Wraps `source` without touching the driver.
    pub fn new(state: &PipelineState<B>, source: ShaderSource) -> Self {
        Self {
            gl: Rc::clone(state.gl()),
            source,
            handle: None,
            state: StageState::Uncompiled,
        }
    }

    /// Creates and compiles a unit in one step.
    pub fn compiled(state: &PipelineState<B>, source: ShaderSource) -> Result<Self, CompileError> {
        let mut unit = Self::new(state, source);
        unit.compile()?;
        Ok(unit)
    }

    /// Compiles the stage.
    ///
    /// Calling this on a `Compiled` unit returns the existing handle. Calling it
    /// on a `CompileFailed` unit returns the recorded error again; compilation
    /// is never retried.
    pub fn compile(&mut self) -> Result<B::Shader, CompileError> {
        match &self.state {
            StageState::Compiled => {
                if let Some(handle) = self.handle {
                    return Ok(handle);
                }
            }
            StageState::CompileFailed(diagnostic) => {
                return Err(CompileError {
                    stage: self.stage(),
                    diagnostic: diagnostic.clone(),
                });
            }
            StageState::Uncompiled => {}
        }

        let stage = self.stage();
        let shader = match self.gl.create_shader(stage) {
            Ok(shader) => shader,
            Err(message) => return Err(self.fail(format!("failed to create {stage} shader object: {message}"))),
        };

        self.gl.shader_source(shader, self.source.text());
        self.gl.compile_shader(shader);

        if !self.gl.shader_compile_status(shader) {
            let diagnostic = non_empty(self.gl.shader_info_log(shader), || {
                format!("{stage} shader failed to compile (driver returned no log)")
            });
            self.gl.delete_shader(shader);
            return Err(self.fail(diagnostic));
        }

        log::debug!("compiled {stage} shader {shader:?}");
        self.handle = Some(shader);
        self.state = StageState::Compiled;
        Ok(shader)
    }

    fn fail(&mut self, diagnostic: String) -> CompileError {
        log::warn!("{} shader compile failed: {diagnostic}", self.stage());
        self.state = StageState::CompileFailed(diagnostic.clone());
        CompileError {
            stage: self.stage(),
            diagnostic,
        }
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.source.stage()
    }

    #[inline]
    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    #[inline]
    pub fn state(&self) -> &StageState {
        &self.state
    }

    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.state == StageState::Compiled
    }

    /// The stage object; `Some` only while `Compiled`.
    #[inline]
    pub fn handle(&self) -> Option<B::Shader> {
        self.handle
    }
}

impl<B: GlBackend> Drop for ShaderUnit<B> {
    fn drop(&mut self) {
        if let Some(shader) = self.handle.take() {
            self.gl.delete_shader(shader);
        }
    }
}

impl<B: GlBackend> std::fmt::Debug for ShaderUnit<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderUnit")
            .field("stage", &self.stage())
            .field("handle", &self.handle)
            .field("state", &self.state)
            .finish()
    }
}
