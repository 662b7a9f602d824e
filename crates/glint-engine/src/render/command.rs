use crate::backend::GlBackend;
use crate::geometry::GeometryBuffer;
use crate::shader::ShaderProgram;

use super::Topology;

/// One draw: which program, which geometry, and which slice of it.
///
/// `count` and `offset` are in indices for indexed geometry and in vertices
/// otherwise. Commands borrow their resources and are meant to be rebuilt
/// every frame.
pub struct DrawCommand<'a, B: GlBackend> {
    pub program: &'a ShaderProgram<B>,
    pub geometry: &'a GeometryBuffer<B>,
    pub topology: Topology,
    pub count: u32,
    pub offset: u32,
}

impl<'a, B: GlBackend> DrawCommand<'a, B> {
    pub fn new(
        program: &'a ShaderProgram<B>,
        geometry: &'a GeometryBuffer<B>,
        topology: Topology,
        count: u32,
    ) -> Self {
        Self {
            program,
            geometry,
            topology,
            count,
            offset: 0,
        }
    }

    pub fn triangles(program: &'a ShaderProgram<B>, geometry: &'a GeometryBuffer<B>, count: u32) -> Self {
        Self::new(program, geometry, Topology::Triangles, count)
    }

    pub fn line_strip(program: &'a ShaderProgram<B>, geometry: &'a GeometryBuffer<B>, count: u32) -> Self {
        Self::new(program, geometry, Topology::LineStrip, count)
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

impl<B: GlBackend> Clone for DrawCommand<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: GlBackend> Copy for DrawCommand<'_, B> {}

impl<B: GlBackend> std::fmt::Debug for DrawCommand<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawCommand")
            .field("program", &self.program.label())
            .field("topology", &self.topology)
            .field("count", &self.count)
            .field("offset", &self.offset)
            .finish()
    }
}
