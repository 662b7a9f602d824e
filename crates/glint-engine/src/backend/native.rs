use glow::HasContext;

use crate::geometry::{ComponentType, VertexAttribute};
use crate::paint::Rgba;
use crate::pipeline::{BlendFactor, BlendMode, Viewport};
use crate::render::Topology;
use crate::shader::ShaderStage;

use super::{BufferTarget, BufferUsage, GlBackend, IndexType};

// Every call below goes straight to the driver through glow's function
// pointers. The safety contract is the one glow documents: the context the
// pointers were loaded from must be current on this thread, and handles must
// come from that context. `device::GlDevice` upholds both for the runtime.
impl GlBackend for glow::Context {
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type Buffer = <glow::Context as HasContext>::Buffer;
    type VertexArray = <glow::Context as HasContext>::VertexArray;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage_enum(stage)) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { HasContext::get_shader_compile_status(self, shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { HasContext::get_shader_info_log(self, shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { HasContext::get_program_link_status(self, program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { HasContext::get_program_info_log(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, target_enum(target), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe { HasContext::buffer_data_u8_slice(self, target_enum(target), data, usage_enum(usage)) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute) {
        // glVertexAttribPointer converts integer components to float; integer
        // shader inputs would need the *IPointer variant, which nothing here uses.
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self,
                attribute.index,
                i32::from(attribute.components),
                component_enum(attribute.component_type),
                attribute.normalized,
                attribute.stride as i32,
                attribute.offset as i32,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn clear_color(&self, color: Rgba) {
        unsafe { HasContext::clear_color(self, color.r, color.g, color.b, color.a) }
    }

    fn clear(&self) {
        unsafe { HasContext::clear(self, glow::COLOR_BUFFER_BIT) }
    }

    fn viewport(&self, viewport: Viewport) {
        unsafe {
            HasContext::viewport(
                self,
                viewport.x,
                viewport.y,
                viewport.width as i32,
                viewport.height as i32,
            )
        }
    }

    fn set_blend(&self, blend: Option<BlendMode>) {
        unsafe {
            match blend {
                Some(mode) => {
                    HasContext::enable(self, glow::BLEND);
                    HasContext::blend_func(self, factor_enum(mode.src), factor_enum(mode.dst));
                }
                None => HasContext::disable(self, glow::BLEND),
            }
        }
    }

    fn set_back_face_culling(&self, enabled: bool) {
        unsafe {
            if enabled {
                HasContext::enable(self, glow::CULL_FACE);
                HasContext::cull_face(self, glow::BACK);
            } else {
                HasContext::disable(self, glow::CULL_FACE);
            }
        }
    }

    fn draw_arrays(&self, topology: Topology, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, topology_enum(topology), first, count) }
    }

    fn draw_elements(&self, topology: Topology, count: i32, index_type: IndexType, byte_offset: i32) {
        let element_type = match index_type {
            IndexType::U16 => glow::UNSIGNED_SHORT,
            IndexType::U32 => glow::UNSIGNED_INT,
        };
        unsafe {
            HasContext::draw_elements(self, topology_enum(topology), count, element_type, byte_offset)
        }
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn usage_enum(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
        BufferUsage::StreamDraw => glow::STREAM_DRAW,
    }
}

fn component_enum(ty: ComponentType) -> u32 {
    match ty {
        ComponentType::F32 => glow::FLOAT,
        ComponentType::F16 => glow::HALF_FLOAT,
        ComponentType::I8 => glow::BYTE,
        ComponentType::U8 => glow::UNSIGNED_BYTE,
        ComponentType::I16 => glow::SHORT,
        ComponentType::U16 => glow::UNSIGNED_SHORT,
        ComponentType::I32 => glow::INT,
        ComponentType::U32 => glow::UNSIGNED_INT,
    }
}

fn factor_enum(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
    }
}

fn topology_enum(topology: Topology) -> u32 {
    match topology {
        Topology::Points => glow::POINTS,
        Topology::Lines => glow::LINES,
        Topology::LineStrip => glow::LINE_STRIP,
        Topology::LineLoop => glow::LINE_LOOP,
        Topology::Triangles => glow::TRIANGLES,
        Topology::TriangleStrip => glow::TRIANGLE_STRIP,
        Topology::TriangleFan => glow::TRIANGLE_FAN,
    }
}
