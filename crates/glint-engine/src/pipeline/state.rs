use std::rc::Rc;

use crate::backend::{GlBackend, IndexType};
use crate::geometry::GeometryBuffer;
use crate::paint::Rgba;
use crate::render::Topology;
use crate::shader::ShaderProgram;

use super::{PipelineSetup, Viewport};

/// The vertex array currently feeding draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BoundGeometry<V> {
    pub vertex_array: V,
    /// Draws go through the element buffer recorded in the vertex array.
    pub indexed: bool,
}

/// Owner of the backend and mirror of the context's global state.
///
/// Every mutating call forwards to the backend first and then updates the
/// mirror, so queries always describe what the context was last told.
/// Nothing is cached or skipped: selecting the current program again issues
/// the call again.
pub struct PipelineState<B: GlBackend> {
    gl: Rc<B>,

    program: Option<B::Program>,
    geometry: Option<BoundGeometry<B::VertexArray>>,

    clear_color: Rgba,
    viewport: Option<Viewport>,
    setup: Option<PipelineSetup>,
}

impl<B: GlBackend> PipelineState<B> {
    /// Wraps the backend. Issues no calls.
    pub fn new(gl: Rc<B>) -> Self {
        Self {
            gl,
            program: None,
            geometry: None,
            clear_color: Rgba::TRANSPARENT,
            viewport: None,
            setup: None,
        }
    }

    #[inline]
    pub fn gl(&self) -> &Rc<B> {
        &self.gl
    }

    /// Applies blending and back-face culling.
    pub fn configure(&mut self, setup: &PipelineSetup) {
        self.gl.set_blend(setup.blend);
        self.gl.set_back_face_culling(setup.cull_back_faces);
        log::debug!(
            "pipeline configured: blend {:?}, back-face culling {}",
            setup.blend,
            if setup.cull_back_faces { "on" } else { "off" }
        );
        self.setup = Some(*setup);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.gl.viewport(viewport);
        self.viewport = Some(viewport);
    }

    pub fn set_clear_color(&mut self, color: Rgba) {
        self.gl.clear_color(color);
        self.clear_color = color;
    }

    /// Clears the color buffer to the current clear color.
    #[inline]
    pub fn clear(&mut self) {
        self.gl.clear();
    }

    /// Makes `program` current for all following draws.
    pub fn select_program(&mut self, program: &ShaderProgram<B>) {
        self.gl.use_program(Some(program.handle()));
        self.program = Some(program.handle());
    }

    /// Makes `geometry` the source for following draws.
    pub fn bind_geometry(&mut self, geometry: &GeometryBuffer<B>) {
        self.bind_vertex_array(Some(geometry.vertex_array()), geometry.is_indexed());
    }

    pub(crate) fn bind_vertex_array(&mut self, vertex_array: Option<B::VertexArray>, indexed: bool) {
        self.gl.bind_vertex_array(vertex_array);
        self.geometry = vertex_array.map(|vertex_array| BoundGeometry { vertex_array, indexed });
    }

    /// Draws `count` vertices starting at `offset` from the bound geometry.
    ///
    /// For indexed geometry both are counted in indices (`u32`), so the byte
    /// offset handed to the backend is `offset * 4`. Otherwise they count
    /// vertices directly.
    ///
    /// GL takes signed sizes: a count or offset past `i32::MAX` is clamped
    /// to it with a warning, and the backend then sees a different range.
    pub fn draw(&mut self, topology: Topology, offset: u32, count: u32) {
        let count = clamp_i32("count", count);
        match self.geometry {
            Some(BoundGeometry { indexed: true, .. }) => {
                let byte_offset = clamp_i32("byte offset", offset.saturating_mul(IndexType::U32.byte_size()));
                self.gl.draw_elements(topology, count, IndexType::U32, byte_offset);
            }
            _ => self.gl.draw_arrays(topology, clamp_i32("offset", offset), count),
        }
    }

    /// Unbinds the program and the vertex array.
    pub fn reset(&mut self) {
        self.gl.use_program(None);
        self.gl.bind_vertex_array(None);
        self.program = None;
        self.geometry = None;
    }

    /// The program last selected.
    ///
    /// Resources do not report their drop here, so the handle can name a
    /// program that has been deleted since. Select another program or
    /// [`reset`](Self::reset) before relying on it after a drop.
    #[inline]
    pub fn current_program(&self) -> Option<B::Program> {
        self.program
    }

    /// The geometry last bound. Like [`current_program`](Self::current_program),
    /// it can outlive the [`GeometryBuffer`] it came from.
    #[inline]
    pub fn bound_geometry(&self) -> Option<BoundGeometry<B::VertexArray>> {
        self.geometry
    }

    #[inline]
    pub fn clear_color(&self) -> Rgba {
        self.clear_color
    }

    /// `None` until the first `set_viewport`.
    #[inline]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// `None` until `configure` has run.
    #[inline]
    pub fn setup(&self) -> Option<&PipelineSetup> {
        self.setup.as_ref()
    }
}

impl<B: GlBackend> std::fmt::Debug for PipelineState<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineState")
            .field("program", &self.program)
            .field("geometry", &self.geometry)
            .field("clear_color", &self.clear_color)
            .field("viewport", &self.viewport)
            .field("setup", &self.setup)
            .finish()
    }
}

fn clamp_i32(what: &str, v: u32) -> i32 {
    i32::try_from(v).unwrap_or_else(|_| {
        log::warn!("draw {what} {v} exceeds i32::MAX; clamped");
        i32::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{GlCall, RecordingBackend};
    use crate::geometry::VertexLayout;
    use crate::pipeline::BlendMode;
    use crate::shader::ShaderSource;

    const VS: &str = "#version 330 core\nlayout (location = 0) in vec3 pos;\nvoid main() { gl_Position = vec4(pos, 1.0); }\n";
    const FS: &str = "#version 330 core\nout vec4 frag;\nvoid main() { frag = vec4(1.0); }\n";

    const QUAD: [f32; 12] = [0.5, 0.5, 0.0, -0.5, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0];

    fn state() -> PipelineState<RecordingBackend> {
        PipelineState::new(Rc::new(RecordingBackend::new()))
    }

    #[test]
    fn new_issues_no_calls() {
        let state = state();
        assert!(state.gl().calls().is_empty());
        assert!(state.current_program().is_none());
        assert!(state.bound_geometry().is_none());
        assert!(state.viewport().is_none());
        assert!(state.setup().is_none());
    }

    #[test]
    fn configure_forwards_blend_then_culling() {
        let mut state = state();
        state.configure(&PipelineSetup::default());

        assert_eq!(
            state.gl().calls(),
            vec![
                GlCall::SetBlend(Some(BlendMode::ALPHA_OVER)),
                GlCall::SetBackFaceCulling(true),
            ]
        );
        assert_eq!(state.setup(), Some(&PipelineSetup::default()));
    }

    #[test]
    fn viewport_and_clear_color_are_mirrored() {
        let mut state = state();
        state.set_viewport(Viewport::new(672, 392));
        state.set_clear_color(Rgba::rgb(0.1, 0.1, 0.1));
        state.clear();

        assert_eq!(state.viewport(), Some(Viewport::new(672, 392)));
        assert_eq!(state.clear_color(), Rgba::rgb(0.1, 0.1, 0.1));
        assert_eq!(state.gl().calls().last(), Some(&GlCall::Clear));
    }

    #[test]
    fn indexed_draw_offsets_are_in_indices() {
        let mut state = state();
        let program =
            ShaderProgram::from_sources(&state, "p", ShaderSource::vertex(VS), ShaderSource::fragment(FS)).unwrap();
        let geo = GeometryBuffer::create(
            &mut state,
            &QUAD,
            VertexLayout::interleaved(&[(0, 3)]),
            Some(&[0, 1, 2, 3, 0, 2]),
        )
        .unwrap();

        state.select_program(&program);
        state.bind_geometry(&geo);
        assert_eq!(
            state.bound_geometry(),
            Some(BoundGeometry { vertex_array: geo.vertex_array(), indexed: true })
        );

        state.draw(Topology::Triangles, 3, 3);
        assert_eq!(
            state.gl().draw_calls(),
            vec![GlCall::DrawElements {
                topology: Topology::Triangles,
                count: 3,
                index_type: IndexType::U32,
                byte_offset: 12,
            }]
        );
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn plain_draw_uses_vertex_order() {
        let mut state = state();
        let program =
            ShaderProgram::from_sources(&state, "p", ShaderSource::vertex(VS), ShaderSource::fragment(FS)).unwrap();
        let geo = GeometryBuffer::create(&mut state, &QUAD, VertexLayout::interleaved(&[(0, 3)]), None).unwrap();

        program.select(&mut state);
        geo.bind(&mut state);
        state.draw(Topology::TriangleFan, 0, 4);

        assert_eq!(
            state.gl().draw_calls(),
            vec![GlCall::DrawArrays { topology: Topology::TriangleFan, first: 0, count: 4 }]
        );
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn draw_past_index_buffer_is_reported_by_backend() {
        let mut state = state();
        let program =
            ShaderProgram::from_sources(&state, "p", ShaderSource::vertex(VS), ShaderSource::fragment(FS)).unwrap();
        let geo = GeometryBuffer::create(
            &mut state,
            &QUAD,
            VertexLayout::interleaved(&[(0, 3)]),
            Some(&[0, 1, 2]),
        )
        .unwrap();

        state.select_program(&program);
        state.bind_geometry(&geo);
        state.draw(Topology::Triangles, 0, 6);
        assert_eq!(state.gl().errors().len(), 1);
    }

    #[test]
    fn reset_unbinds_everything() {
        let mut state = state();
        let program =
            ShaderProgram::from_sources(&state, "p", ShaderSource::vertex(VS), ShaderSource::fragment(FS)).unwrap();
        state.select_program(&program);
        assert_eq!(state.current_program(), Some(program.handle()));

        state.reset();
        assert!(state.current_program().is_none());
        assert!(state.bound_geometry().is_none());
        let calls = state.gl().calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[GlCall::UseProgram { program: None }, GlCall::BindVertexArray { vertex_array: None }]
        );
    }

    #[test]
    fn oversized_draw_is_clamped_and_range_checked() {
        let mut state = state();
        let program =
            ShaderProgram::from_sources(&state, "p", ShaderSource::vertex(VS), ShaderSource::fragment(FS)).unwrap();
        let geo = GeometryBuffer::create(&mut state, &QUAD, VertexLayout::interleaved(&[(0, 3)]), None).unwrap();
        program.select(&mut state);
        geo.bind(&mut state);

        state.draw(Topology::Points, u32::MAX, 2);

        assert_eq!(
            state.gl().draw_calls(),
            vec![GlCall::DrawArrays { topology: Topology::Points, first: i32::MAX, count: 2 }]
        );
        let errors = state.gl().errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("GL_INVALID_VALUE"));
    }

    #[test]
    fn dropped_resources_stay_mirrored_until_reset() {
        let mut state = state();
        let program =
            ShaderProgram::from_sources(&state, "p", ShaderSource::vertex(VS), ShaderSource::fragment(FS)).unwrap();
        let geo = GeometryBuffer::create(&mut state, &QUAD, VertexLayout::interleaved(&[(0, 3)]), None).unwrap();
        let (handle, vertex_array) = (program.handle(), geo.vertex_array());
        state.select_program(&program);
        state.bind_geometry(&geo);

        drop(program);
        drop(geo);
        assert_eq!(state.current_program(), Some(handle));
        assert_eq!(state.bound_geometry().map(|g| g.vertex_array), Some(vertex_array));

        state.reset();
        assert!(state.current_program().is_none());
        assert!(state.bound_geometry().is_none());
        assert!(state.gl().errors().is_empty());
        assert_eq!(state.gl().live_objects(), 0);
    }
}
