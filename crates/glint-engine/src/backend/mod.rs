//! Raw GL entry points used by the core.
//!
//! [`GlBackend`] is deliberately thin: one method per GL call the shader,
//! geometry and draw layers need. Everything above it (state tracking,
//! lifecycle, error shaping) lives in the core and is backend-agnostic.
//!
//! Implementations:
//! - `glow::Context` (see the `native` submodule) for a real driver
//! - [`recording::RecordingBackend`] for headless runs and tests
//!
//! All methods assume the GL context is current on the calling thread.

mod native;
pub mod recording;

use std::fmt::Debug;

use crate::geometry::VertexAttribute;
use crate::paint::Rgba;
use crate::pipeline::{BlendMode, Viewport};
use crate::render::Topology;
use crate::shader::ShaderStage;

/// Backend used by the runtime: a real driver through `glow`.
pub type NativeBackend = glow::Context;

/// Buffer binding points used by geometry upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute storage.
    Array,
    /// Index storage. The binding is recorded in the bound vertex array.
    ElementArray,
}

/// Usage hint passed with buffer uploads.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

/// Index element type for indexed draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    #[inline]
    pub const fn byte_size(self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Thin, safe view over a GL context.
///
/// Handle types are opaque and cheap to copy. Object creation can fail on
/// allocation and returns the driver's message; every other call is
/// fire-and-forget, exactly as in GL.
pub trait GlBackend {
    type Shader: Copy + Debug + Eq;
    type Program: Copy + Debug + Eq;
    type Buffer: Copy + Debug + Eq;
    type VertexArray: Copy + Debug + Eq;

    // ── shader stages ─────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    // ── vertex arrays + buffers ───────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Describes `attribute` against the bound vertex array and array buffer.
    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute);
    fn enable_vertex_attrib_array(&self, index: u32);

    // ── frame ops ─────────────────────────────────────────────────────────

    fn clear_color(&self, color: Rgba);
    /// Clears the color buffer only.
    fn clear(&self);
    fn viewport(&self, viewport: Viewport);
    fn set_blend(&self, blend: Option<BlendMode>);
    fn set_back_face_culling(&self, enabled: bool);

    fn draw_arrays(&self, topology: Topology, first: i32, count: i32);
    /// `byte_offset` is relative to the start of the bound element buffer.
    fn draw_elements(&self, topology: Topology, count: i32, index_type: IndexType, byte_offset: i32);
}
