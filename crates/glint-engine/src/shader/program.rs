use std::rc::Rc;

use crate::backend::GlBackend;
use crate::pipeline::PipelineState;

use super::error::non_empty;
use super::{LinkError, ShaderError, ShaderSource, ShaderUnit};

/// A linked GPU program.
///
/// A value of this type is always linked: unlinked programs only exist as a
/// [`ShaderProgramBuilder`], and a failed link never produces one. The
/// program object is deleted on drop.
pub struct ShaderProgram<B: GlBackend> {
    gl: Rc<B>,
    handle: B::Program,
    label: Option<String>,
}

impl<B: GlBackend> ShaderProgram<B> {
    /// Starts assembling a program from compiled units.
    pub fn builder<'a>(state: &PipelineState<B>) -> ShaderProgramBuilder<'a, B> {
        ShaderProgramBuilder::new(state)
    }

    /// Compiles a vertex and a fragment stage and links them.
    ///
    /// The stage objects are released before returning, whatever the outcome.
    pub fn from_sources(
        state: &PipelineState<B>,
        label: &str,
        vertex: ShaderSource,
        fragment: ShaderSource,
    ) -> Result<Self, ShaderError> {
        let vs = ShaderUnit::compiled(state, vertex)?;
        let fs = ShaderUnit::compiled(state, fragment)?;

        let program = Self::builder(state).label(label).attach(&vs).attach(&fs).link()?;
        Ok(program)
    }

    /// Makes this program current for all following draws.
    #[inline]
    pub fn select(&self, state: &mut PipelineState<B>) {
        state.select_program(self);
    }

    #[inline]
    pub fn handle(&self) -> B::Program {
        self.handle
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<B: GlBackend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        log::debug!("deleting program {}", self.label().unwrap_or("<unnamed>"));
        self.gl.delete_program(self.handle);
    }
}

impl<B: GlBackend> std::fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("label", &self.label)
            .finish()
    }
}

/// Collects compiled stages and links them into a [`ShaderProgram`].
///
/// Units are borrowed, so one vertex unit can feed several programs:
///
/// ```ignore
/// let red = ShaderProgram::builder(&state).label("solid-red").attach(&vs).attach(&red_fs).link()?;
/// let blue = ShaderProgram::builder(&state).label("solid-blue").attach(&vs).attach(&blue_fs).link()?;
/// ```
pub struct ShaderProgramBuilder<'a, B: GlBackend> {
    gl: Rc<B>,
    label: Option<String>,
    stages: Vec<&'a ShaderUnit<B>>,
}

impl<'a, B: GlBackend> ShaderProgramBuilder<'a, B> {
    pub fn new(state: &PipelineState<B>) -> Self {
        Self {
            gl: Rc::clone(state.gl()),
            label: None,
            stages: Vec::with_capacity(2),
        }
    }

    /// Name used in logs and errors.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn attach(mut self, unit: &'a ShaderUnit<B>) -> Self {
        self.stages.push(unit);
        self
    }

    /// Links the attached stages.
    ///
    /// Every stage must be compiled; otherwise the driver linker is not called
    /// and the error names the offending stage. Stage-kind completeness is left
    /// to the driver linker. After linking, stages are detached so the units
    /// stay free to be dropped or reused.
    pub fn link(self) -> Result<ShaderProgram<B>, LinkError> {
        let Self { gl, label, stages } = self;
        let name = label.clone().unwrap_or_else(|| "<unnamed>".to_string());

        let mut handles = Vec::with_capacity(stages.len());
        for unit in &stages {
            match unit.handle() {
                Some(handle) if unit.is_compiled() => handles.push(handle),
                _ => {
                    let diagnostic = format!("{} stage is not compiled", unit.stage());
                    log::warn!("program {name}: {diagnostic}");
                    return Err(LinkError { label, diagnostic });
                }
            }
        }

        let program = gl.create_program().map_err(|message| LinkError {
            label: label.clone(),
            diagnostic: format!("failed to create program object: {message}"),
        })?;

        for &shader in &handles {
            gl.attach_shader(program, shader);
        }
        gl.link_program(program);
        let linked = gl.program_link_status(program);

        for &shader in &handles {
            gl.detach_shader(program, shader);
        }

        if !linked {
            let diagnostic = non_empty(gl.program_info_log(program), || {
                "program failed to link (driver returned no log)".to_string()
            });
            gl.delete_program(program);
            log::warn!("program {name} link failed: {diagnostic}");
            return Err(LinkError { label, diagnostic });
        }

        log::debug!("linked program {name} from {} stage(s)", handles.len());
        Ok(ShaderProgram { gl, handle: program, label })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{GlCall, ObjectKind, RecordingBackend};
    use crate::shader::StageState;

    const VS: &str = "#version 330 core
layout (location = 0) in vec3 pos;
void main() { gl_Position = vec4(pos, 1.0); }
";
    const RED_FS: &str = "#version 330 core
out vec4 frag;
void main() { frag = vec4(1.0, 0.0, 0.0, 1.0); }
";
    const BLUE_FS: &str = "#version 330 core
out vec4 frag;
void main() { frag = vec4(0.0, 0.0, 1.0, 1.0); }
";
    const TINTED_FS: &str = "#version 330 core
in vec3 tint;
out vec4 frag;
void main() { frag = vec4(tint, 1.0); }
";

    fn state() -> PipelineState<RecordingBackend> {
        PipelineState::new(Rc::new(RecordingBackend::new()))
    }

    // ── link success ──────────────────────────────────────────────────────

    #[test]
    fn valid_pair_links() {
        let state = state();
        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let fs = ShaderUnit::compiled(&state, ShaderSource::fragment(RED_FS)).unwrap();

        let program = ShaderProgram::builder(&state)
            .label("solid-red")
            .attach(&vs)
            .attach(&fs)
            .link()
            .unwrap();

        assert_eq!(program.label(), Some("solid-red"));
        assert!(state.gl().program_link_status(program.handle()));
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn link_detaches_stages() {
        let state = state();
        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let fs = ShaderUnit::compiled(&state, ShaderSource::fragment(RED_FS)).unwrap();
        state.gl().take_calls();

        let program = ShaderProgram::builder(&state).attach(&vs).attach(&fs).link().unwrap();
        let p = program.handle();
        let (v, f) = (vs.handle().unwrap(), fs.handle().unwrap());

        assert_eq!(
            state.gl().calls(),
            vec![
                GlCall::CreateProgram { program: p },
                GlCall::AttachShader { program: p, shader: v },
                GlCall::AttachShader { program: p, shader: f },
                GlCall::LinkProgram { program: p },
                GlCall::DetachShader { program: p, shader: v },
                GlCall::DetachShader { program: p, shader: f },
            ]
        );
    }

    #[test]
    fn shared_vertex_stage_feeds_two_programs() {
        let state = state();
        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let red = ShaderUnit::compiled(&state, ShaderSource::fragment(RED_FS)).unwrap();
        let blue = ShaderUnit::compiled(&state, ShaderSource::fragment(BLUE_FS)).unwrap();

        let a = ShaderProgram::builder(&state).attach(&vs).attach(&red).link().unwrap();
        let b = ShaderProgram::builder(&state).attach(&vs).attach(&blue).link().unwrap();
        assert_ne!(a.handle(), b.handle());
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn program_outlives_its_units() {
        let state = state();
        let program =
            ShaderProgram::from_sources(&state, "red", ShaderSource::vertex(VS), ShaderSource::fragment(RED_FS))
                .unwrap();
        // Only the program object remains.
        assert_eq!(state.gl().live_objects(), 1);
        drop(program);
        assert_eq!(state.gl().live_objects(), 0);
    }

    // ── link failure ──────────────────────────────────────────────────────

    #[test]
    fn uncompiled_unit_never_reaches_linker() {
        let state = state();
        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let mut bad = ShaderUnit::new(&state, ShaderSource::fragment("#error no\n"));
        assert!(bad.compile().is_err());
        assert!(matches!(bad.state(), StageState::CompileFailed(_)));
        state.gl().take_calls();

        let err = ShaderProgram::builder(&state).attach(&vs).attach(&bad).link().unwrap_err();
        assert!(err.diagnostic.contains("fragment"));
        assert!(state.gl().calls().is_empty());
    }

    #[test]
    fn never_compiled_unit_is_rejected() {
        let state = state();
        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let fs = ShaderUnit::new(&state, ShaderSource::fragment(RED_FS));
        let err = ShaderProgram::builder(&state).attach(&vs).attach(&fs).link().unwrap_err();
        assert_eq!(err.diagnostic, "fragment stage is not compiled");
    }

    #[test]
    fn driver_link_failure_reports_log_and_deletes_program() {
        let state = state();
        // Fragment stage reads `tint`, which the vertex stage never writes.
        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let fs = ShaderUnit::compiled(&state, ShaderSource::fragment(TINTED_FS)).unwrap();

        let err = ShaderProgram::builder(&state)
            .label("tinted")
            .attach(&vs)
            .attach(&fs)
            .link()
            .unwrap_err();

        assert_eq!(err.label.as_deref(), Some("tinted"));
        assert!(err.diagnostic.contains("tint"));
        assert!(err.to_string().contains("tinted"));
        // Units remain, program is gone.
        assert_eq!(state.gl().live_objects(), 2);
    }

    #[test]
    fn program_allocation_failure_leaves_units_untouched() {
        let state = state();
        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let fs = ShaderUnit::compiled(&state, ShaderSource::fragment(RED_FS)).unwrap();
        state.gl().take_calls();
        state.gl().fail_next_create(ObjectKind::Program);

        let err = ShaderProgram::builder(&state)
            .label("solid-red")
            .attach(&vs)
            .attach(&fs)
            .link()
            .unwrap_err();

        assert_eq!(err.label.as_deref(), Some("solid-red"));
        assert!(err.diagnostic.contains("failed to create program object"));
        assert!(state.gl().calls().is_empty());
        assert!(vs.is_compiled() && fs.is_compiled());
        assert_eq!(state.gl().live_objects(), 2);
    }

    #[test]
    fn missing_fragment_stage_is_left_to_driver() {
        let state = state();
        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let err = ShaderProgram::builder(&state).attach(&vs).link().unwrap_err();
        assert!(err.diagnostic.contains("fragment"));
        assert!(state.gl().calls().iter().any(|c| matches!(c, GlCall::LinkProgram { .. })));
    }

    #[test]
    fn from_sources_surfaces_compile_error() {
        let state = state();
        let err = ShaderProgram::from_sources(
            &state,
            "broken",
            ShaderSource::vertex("#error nope\n"),
            ShaderSource::fragment(RED_FS),
        )
        .unwrap_err();
        assert!(matches!(err, ShaderError::Compile(_)));
        assert_eq!(state.gl().live_objects(), 0);
    }
}
