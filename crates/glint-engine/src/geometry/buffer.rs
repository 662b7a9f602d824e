use std::rc::Rc;

use crate::backend::{BufferTarget, BufferUsage, GlBackend};
use crate::pipeline::PipelineState;

use super::{GeometryError, VertexLayout};

/// Static vertex (and optional index) data uploaded once.
///
/// Owns its vertex array object, vertex buffer and index buffer; all three are
/// released on drop. Index values are not checked against the vertex count.
pub struct GeometryBuffer<B: GlBackend> {
    gl: Rc<B>,
    vertex_array: B::VertexArray,
    vertex_buffer: B::Buffer,
    index_buffer: Option<B::Buffer>,

    layout: VertexLayout,
    vertex_count: u32,
    index_count: Option<u32>,
}

impl<B: GlBackend> GeometryBuffer<B> {
    /// Uploads `vertices` (interleaved per `layout`) and optional `indices`.
    ///
    /// The vertex array is bound while the layout is recorded and unbound
    /// before returning, so `state` reports no bound geometry afterwards.
    pub fn create(
        state: &mut PipelineState<B>,
        vertices: &[f32],
        layout: VertexLayout,
        indices: Option<&[u32]>,
    ) -> Result<Self, GeometryError> {
        layout.validate()?;

        let gl = Rc::clone(state.gl());
        let stride = layout.stride();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        if vertex_bytes.len() % stride as usize != 0 {
            log::warn!(
                "vertex data is {} bytes, not a multiple of the {stride}-byte stride; trailing bytes are unused",
                vertex_bytes.len()
            );
        }
        let vertex_count = (vertex_bytes.len() / stride as usize) as u32;

        let vertex_array = gl.create_vertex_array().map_err(|message| GeometryError::Allocation {
            object: "vertex array",
            message,
        })?;

        let vertex_buffer = match gl.create_buffer() {
            Ok(buffer) => buffer,
            Err(message) => {
                gl.delete_vertex_array(vertex_array);
                return Err(GeometryError::Allocation { object: "vertex buffer", message });
            }
        };

        let index_buffer = match indices.map(|_| gl.create_buffer()).transpose() {
            Ok(buffer) => buffer,
            Err(message) => {
                gl.delete_buffer(vertex_buffer);
                gl.delete_vertex_array(vertex_array);
                return Err(GeometryError::Allocation { object: "index buffer", message });
            }
        };

        state.bind_vertex_array(Some(vertex_array), false);

        gl.bind_buffer(BufferTarget::Array, Some(vertex_buffer));
        gl.buffer_data(BufferTarget::Array, vertex_bytes, BufferUsage::StaticDraw);

        if let (Some(buffer), Some(indices)) = (index_buffer, indices) {
            gl.bind_buffer(BufferTarget::ElementArray, Some(buffer));
            gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(indices), BufferUsage::StaticDraw);
        }

        for attribute in layout.attributes() {
            gl.vertex_attrib_pointer(attribute);
            gl.enable_vertex_attrib_array(attribute.index);
        }

        // The attribute pointers captured the vertex buffer, so it can be
        // unbound now. The element binding belongs to the vertex array and
        // must stay; unbinding the vertex array first keeps it intact.
        gl.bind_buffer(BufferTarget::Array, None);
        state.bind_vertex_array(None, false);

        let index_count = indices.map(|i| i.len() as u32);
        log::debug!(
            "uploaded geometry: {vertex_count} vertices, {} indices, {} attributes",
            index_count.unwrap_or(0),
            layout.attributes().len()
        );

        Ok(Self {
            gl,
            vertex_array,
            vertex_buffer,
            index_buffer,
            layout,
            vertex_count,
            index_count,
        })
    }

    /// Makes this buffer (layout + index storage) the active draw source.
    #[inline]
    pub fn bind(&self, state: &mut PipelineState<B>) {
        state.bind_geometry(self);
    }

    #[inline]
    pub fn vertex_array(&self) -> B::VertexArray {
        self.vertex_array
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// `None` when drawing from raw vertex order.
    #[inline]
    pub fn index_count(&self) -> Option<u32> {
        self.index_count
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }
}

impl<B: GlBackend> Drop for GeometryBuffer<B> {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.vertex_array);
        self.gl.delete_buffer(self.vertex_buffer);
        if let Some(buffer) = self.index_buffer.take() {
            self.gl.delete_buffer(buffer);
        }
    }
}

impl<B: GlBackend> std::fmt::Debug for GeometryBuffer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBuffer")
            .field("vertex_array", &self.vertex_array)
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count)
            .finish()
    }
}
