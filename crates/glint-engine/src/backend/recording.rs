//! Headless backend that records GL calls and models just enough GL state to
//! catch misuse.
//!
//! `RecordingBackend` never touches a driver. It hands out integer handles,
//! keeps a log of every call in issue order ([`GlCall`]), and tracks vertex
//! array, buffer and program state so that draws can be checked the way a
//! strict driver would. Errors are collected (see [`RecordingBackend::errors`])
//! rather than raised, matching `glGetError` semantics.
//!
//! Its compiler and linker are deliberately small:
//! - a stage fails to compile if its source is blank or contains an `#error`
//!   directive (the diagnostic carries the directive's message)
//! - a program fails to link if a stage is missing, duplicated or not
//!   compiled, or if a fragment `in` has no matching vertex `out`
//!
//! Object creation can be made to fail on demand
//! ([`RecordingBackend::fail_create_after`]) to drive allocation error paths.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::geometry::VertexAttribute;
use crate::paint::Rgba;
use crate::pipeline::{BlendMode, Viewport};
use crate::render::Topology;
use crate::shader::ShaderStage;

use super::{BufferTarget, BufferUsage, GlBackend, IndexType};

/// One recorded backend call. Handles are the integers this backend issued.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader { shader: u32, stage: ShaderStage },
    ShaderSource { shader: u32 },
    CompileShader { shader: u32 },
    DeleteShader { shader: u32 },

    CreateProgram { program: u32 },
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram { program: u32 },
    DeleteProgram { program: u32 },
    UseProgram { program: Option<u32> },

    CreateVertexArray { vertex_array: u32 },
    BindVertexArray { vertex_array: Option<u32> },
    DeleteVertexArray { vertex_array: u32 },

    CreateBuffer { buffer: u32 },
    BindBuffer { target: BufferTarget, buffer: Option<u32> },
    BufferData { target: BufferTarget, len: usize, usage: BufferUsage },
    DeleteBuffer { buffer: u32 },

    VertexAttribPointer(VertexAttribute),
    EnableVertexAttribArray { index: u32 },

    ClearColor(Rgba),
    Clear,
    Viewport(Viewport),
    SetBlend(Option<BlendMode>),
    SetBackFaceCulling(bool),

    DrawArrays { topology: Topology, first: i32, count: i32 },
    DrawElements { topology: Topology, count: i32, index_type: IndexType, byte_offset: i32 },
}

impl GlCall {
    #[inline]
    pub fn is_draw(&self) -> bool {
        matches!(self, GlCall::DrawArrays { .. } | GlCall::DrawElements { .. })
    }
}

#[derive(Debug)]
struct StageRecord {
    stage: ShaderStage,
    source: String,
    compiled: Option<Result<(), String>>,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    attached: Vec<u32>,
    link: Option<Result<(), String>>,
}

#[derive(Debug, Clone, Copy)]
struct AttribRecord {
    attribute: VertexAttribute,
    buffer: u32,
    enabled: bool,
}

#[derive(Debug, Default)]
struct VertexArrayRecord {
    element_buffer: Option<u32>,
    attribs: HashMap<u32, AttribRecord>,
}

#[derive(Debug, Default)]
struct Model {
    shaders: HashMap<u32, StageRecord>,
    programs: HashMap<u32, ProgramRecord>,
    vertex_arrays: HashMap<u32, VertexArrayRecord>,
    buffers: HashMap<u32, Vec<u8>>,

    current_program: Option<u32>,
    bound_vertex_array: Option<u32>,
    bound_array_buffer: Option<u32>,
}

/// Kinds of object the backend allocates.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ObjectKind {
    Shader,
    Program,
    VertexArray,
    Buffer,
}

/// Backend that records calls instead of executing them.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_handle: Cell<u32>,
    calls: RefCell<Vec<GlCall>>,
    errors: RefCell<Vec<String>>,
    model: RefCell<Model>,
    /// Creations of each kind still allowed to succeed before one fails.
    fail_after: RefCell<HashMap<ObjectKind, u32>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every call recorded so far.
    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    /// Drains the call log.
    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Only the draw calls, in issue order.
    pub fn draw_calls(&self) -> Vec<GlCall> {
        self.calls.borrow().iter().filter(|c| c.is_draw()).cloned().collect()
    }

    /// GL-style errors raised by invalid calls, in the order they occurred.
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    /// Number of live (created, not deleted) objects of any kind.
    pub fn live_objects(&self) -> usize {
        let m = self.model.borrow();
        m.shaders.len() + m.programs.len() + m.vertex_arrays.len() + m.buffers.len()
    }

    /// Makes the next creation of `kind` fail, as a driver out of memory would.
    pub fn fail_next_create(&self, kind: ObjectKind) {
        self.fail_create_after(kind, 0);
    }

    /// Lets `successes` more creations of `kind` through, then fails the one
    /// after. The switch clears once it fires.
    pub fn fail_create_after(&self, kind: ObjectKind, successes: u32) {
        self.fail_after.borrow_mut().insert(kind, successes);
    }

    /// Source text uploaded for `shader`, if it is alive.
    pub fn shader_text(&self, shader: u32) -> Option<String> {
        self.model.borrow().shaders.get(&shader).map(|s| s.source.clone())
    }

    fn allocate(&self, kind: ObjectKind) -> Result<u32, String> {
        let mut pending = self.fail_after.borrow_mut();
        if let Some(left) = pending.get(&kind).copied() {
            if left == 0 {
                pending.remove(&kind);
                return Err(format!("out of memory allocating {kind:?}"));
            }
            pending.insert(kind, left - 1);
        }
        Ok(self.issue())
    }

    fn issue(&self) -> u32 {
        let id = self.next_handle.get() + 1;
        self.next_handle.set(id);
        id
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn error(&self, msg: impl Into<String>) {
        let msg = msg.into();
        log::debug!("recording backend: {msg}");
        self.errors.borrow_mut().push(msg);
    }

    /// Checks that a draw reading `vertices` from the bound vertex array is valid.
    fn validate_draw(&self, max_vertex: Option<u32>) {
        let m = self.model.borrow();
        if m.current_program.is_none() {
            self.error("GL_INVALID_OPERATION: draw without a program in use");
        }
        let Some(vao) = m.bound_vertex_array.and_then(|v| m.vertex_arrays.get(&v)) else {
            self.error("GL_INVALID_OPERATION: draw without a vertex array bound");
            return;
        };
        let Some(max_vertex) = max_vertex else { return };

        let available = vao
            .attribs
            .values()
            .filter(|a| a.enabled)
            .map(|a| {
                let len = m.buffers.get(&a.buffer).map_or(0, Vec::len) as u64;
                attribute_vertex_capacity(&a.attribute, len)
            })
            .min();

        if let Some(available) = available {
            if u64::from(max_vertex) >= available {
                self.error(format!(
                    "GL_INVALID_OPERATION: vertex {max_vertex} is out of range ({available} vertices in buffer)"
                ));
            }
        }
    }

    fn compile_rule(source: &str) -> Result<(), String> {
        if source.trim().is_empty() {
            return Err("0:1(1): error: syntax error, unexpected end of file".to_string());
        }
        for (n, line) in source.lines().enumerate() {
            if let Some(rest) = line.trim_start().strip_prefix("#error") {
                return Err(format!("0:{}(1): error: {}", n + 1, rest.trim()));
            }
        }
        Ok(())
    }

    fn link_rule(stages: &[&StageRecord]) -> Result<(), String> {
        if stages.is_empty() {
            return Err("error: linking with no shaders attached".to_string());
        }
        if let Some(s) = stages.iter().find(|s| !matches!(s.compiled, Some(Ok(())))) {
            return Err(format!("error: linking with uncompiled {} shader", s.stage));
        }

        let vertex: Vec<_> = stages.iter().filter(|s| s.stage == ShaderStage::Vertex).collect();
        let fragment: Vec<_> = stages.iter().filter(|s| s.stage == ShaderStage::Fragment).collect();

        match (vertex.as_slice(), fragment.as_slice()) {
            ([], _) => Err("error: program lacks a vertex shader".to_string()),
            (_, []) => Err("error: program lacks a fragment shader".to_string()),
            ([vs], [fs]) => {
                let outputs = declared(&vs.source, "out");
                for input in declared(&fs.source, "in") {
                    if !outputs.contains(&input) {
                        return Err(format!(
                            "error: fragment shader input `{input}' has no matching output in the previous stage"
                        ));
                    }
                }
                Ok(())
            }
            _ => Err("error: main function defined multiple times".to_string()),
        }
    }
}

/// Names declared with a bare `qualifier type name;` line (e.g. `out vec3 color;`).
fn declared(source: &str, qualifier: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix(qualifier)?.strip_prefix(' ')?;
            let decl = rest.trim_end().strip_suffix(';')?;
            decl.split_whitespace().last().map(str::to_string)
        })
        .collect()
}

/// How many whole vertices `attribute` can read from a buffer of `len` bytes.
fn attribute_vertex_capacity(attribute: &VertexAttribute, len: u64) -> u64 {
    let end = u64::from(attribute.offset) + u64::from(attribute.byte_size());
    if len < end {
        return 0;
    }
    let stride = u64::from(attribute.stride.max(1));
    (len - end) / stride + 1
}

impl GlBackend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let shader = self.allocate(ObjectKind::Shader)?;
        self.model.borrow_mut().shaders.insert(
            shader,
            StageRecord { stage, source: String::new(), compiled: None },
        );
        self.record(GlCall::CreateShader { shader, stage });
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.record(GlCall::ShaderSource { shader });
        match self.model.borrow_mut().shaders.get_mut(&shader) {
            Some(s) => s.source = source.to_string(),
            None => self.error("GL_INVALID_VALUE: shader_source on unknown shader"),
        }
    }

    fn compile_shader(&self, shader: u32) {
        self.record(GlCall::CompileShader { shader });
        match self.model.borrow_mut().shaders.get_mut(&shader) {
            Some(s) => s.compiled = Some(Self::compile_rule(&s.source)),
            None => self.error("GL_INVALID_VALUE: compile_shader on unknown shader"),
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let m = self.model.borrow();
        matches!(m.shaders.get(&shader).and_then(|s| s.compiled.as_ref()), Some(Ok(())))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let m = self.model.borrow();
        match m.shaders.get(&shader).and_then(|s| s.compiled.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.record(GlCall::DeleteShader { shader });
        if self.model.borrow_mut().shaders.remove(&shader).is_none() {
            self.error("GL_INVALID_VALUE: delete_shader on unknown shader");
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        let program = self.allocate(ObjectKind::Program)?;
        self.model.borrow_mut().programs.insert(program, ProgramRecord::default());
        self.record(GlCall::CreateProgram { program });
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::AttachShader { program, shader });
        let mut m = self.model.borrow_mut();
        if !m.shaders.contains_key(&shader) {
            self.error("GL_INVALID_VALUE: attach_shader with unknown shader");
            return;
        }
        match m.programs.get_mut(&program) {
            Some(p) if p.attached.contains(&shader) => {
                self.error("GL_INVALID_OPERATION: shader already attached");
            }
            Some(p) => p.attached.push(shader),
            None => {
                self.error("GL_INVALID_VALUE: attach_shader on unknown program");
            }
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::DetachShader { program, shader });
        let mut m = self.model.borrow_mut();
        let detached = m
            .programs
            .get_mut(&program)
            .and_then(|p| p.attached.iter().position(|&s| s == shader).map(|i| p.attached.remove(i)));
        if detached.is_none() {
            self.error("GL_INVALID_OPERATION: detach_shader of a shader that is not attached");
        }
    }

    fn link_program(&self, program: u32) {
        self.record(GlCall::LinkProgram { program });
        let mut m = self.model.borrow_mut();
        let Some(attached) = m.programs.get(&program).map(|p| p.attached.clone()) else {
            self.error("GL_INVALID_VALUE: link_program on unknown program");
            return;
        };
        let stages: Vec<&StageRecord> = attached.iter().filter_map(|s| m.shaders.get(s)).collect();
        let result = Self::link_rule(&stages);
        if let Some(p) = m.programs.get_mut(&program) {
            p.link = Some(result);
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        let m = self.model.borrow();
        matches!(m.programs.get(&program).and_then(|p| p.link.as_ref()), Some(Ok(())))
    }

    fn program_info_log(&self, program: u32) -> String {
        let m = self.model.borrow();
        match m.programs.get(&program).and_then(|p| p.link.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_program(&self, program: u32) {
        self.record(GlCall::DeleteProgram { program });
        let mut m = self.model.borrow_mut();
        let removed = m.programs.remove(&program).is_some();
        if m.current_program == Some(program) {
            m.current_program = None;
        }
        if !removed {
            self.error("GL_INVALID_VALUE: delete_program on unknown program");
        }
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram { program });
        let mut m = self.model.borrow_mut();
        if let Some(p) = program {
            let linked = matches!(m.programs.get(&p).and_then(|r| r.link.as_ref()), Some(Ok(())));
            if !linked {
                self.error("GL_INVALID_OPERATION: use_program on a program that is not linked");
                return;
            }
        }
        m.current_program = program;
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let vertex_array = self.allocate(ObjectKind::VertexArray)?;
        self.model.borrow_mut().vertex_arrays.insert(vertex_array, VertexArrayRecord::default());
        self.record(GlCall::CreateVertexArray { vertex_array });
        Ok(vertex_array)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(GlCall::BindVertexArray { vertex_array });
        let mut m = self.model.borrow_mut();
        if let Some(v) = vertex_array {
            if !m.vertex_arrays.contains_key(&v) {
                self.error("GL_INVALID_OPERATION: bind_vertex_array with unknown vertex array");
                return;
            }
        }
        m.bound_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.record(GlCall::DeleteVertexArray { vertex_array });
        let mut m = self.model.borrow_mut();
        let removed = m.vertex_arrays.remove(&vertex_array).is_some();
        if m.bound_vertex_array == Some(vertex_array) {
            m.bound_vertex_array = None;
        }
        if !removed {
            self.error("GL_INVALID_VALUE: delete_vertex_array on unknown vertex array");
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let buffer = self.allocate(ObjectKind::Buffer)?;
        self.model.borrow_mut().buffers.insert(buffer, Vec::new());
        self.record(GlCall::CreateBuffer { buffer });
        Ok(buffer)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        self.record(GlCall::BindBuffer { target, buffer });
        let mut m = self.model.borrow_mut();
        match target {
            BufferTarget::Array => m.bound_array_buffer = buffer,
            BufferTarget::ElementArray => {
                let Some(vao) = m.bound_vertex_array else {
                    self.error("GL_INVALID_OPERATION: element buffer bound without a vertex array");
                    return;
                };
                if let Some(record) = m.vertex_arrays.get_mut(&vao) {
                    record.element_buffer = buffer;
                }
            }
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(GlCall::BufferData { target, len: data.len(), usage });
        let mut m = self.model.borrow_mut();
        let bound = match target {
            BufferTarget::Array => m.bound_array_buffer,
            BufferTarget::ElementArray => m
                .bound_vertex_array
                .and_then(|v| m.vertex_arrays.get(&v))
                .and_then(|r| r.element_buffer),
        };
        match bound.and_then(|b| m.buffers.get_mut(&b)) {
            Some(storage) => *storage = data.to_vec(),
            None => {
                self.error(format!("GL_INVALID_OPERATION: buffer_data with no {target:?} buffer bound"));
            }
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(GlCall::DeleteBuffer { buffer });
        let mut m = self.model.borrow_mut();
        let removed = m.buffers.remove(&buffer).is_some();
        if m.bound_array_buffer == Some(buffer) {
            m.bound_array_buffer = None;
        }
        if !removed {
            self.error("GL_INVALID_VALUE: delete_buffer on unknown buffer");
        }
    }

    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute) {
        self.record(GlCall::VertexAttribPointer(*attribute));
        let mut m = self.model.borrow_mut();
        let (Some(vao), Some(buffer)) = (m.bound_vertex_array, m.bound_array_buffer) else {
            self.error("GL_INVALID_OPERATION: vertex_attrib_pointer needs a vertex array and array buffer");
            return;
        };
        if let Some(record) = m.vertex_arrays.get_mut(&vao) {
            let enabled = record.attribs.get(&attribute.index).is_some_and(|a| a.enabled);
            record
                .attribs
                .insert(attribute.index, AttribRecord { attribute: *attribute, buffer, enabled });
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray { index });
        let mut m = self.model.borrow_mut();
        let Some(vao) = m.bound_vertex_array else {
            self.error("GL_INVALID_OPERATION: enable_vertex_attrib_array without a vertex array");
            return;
        };
        match m.vertex_arrays.get_mut(&vao).and_then(|r| r.attribs.get_mut(&index)) {
            Some(a) => a.enabled = true,
            None => {
                self.error(format!("attribute {index} enabled before it was described"));
            }
        }
    }

    fn clear_color(&self, color: Rgba) {
        self.record(GlCall::ClearColor(color));
    }

    fn clear(&self) {
        self.record(GlCall::Clear);
    }

    fn viewport(&self, viewport: Viewport) {
        self.record(GlCall::Viewport(viewport));
    }

    fn set_blend(&self, blend: Option<BlendMode>) {
        self.record(GlCall::SetBlend(blend));
    }

    fn set_back_face_culling(&self, enabled: bool) {
        self.record(GlCall::SetBackFaceCulling(enabled));
    }

    fn draw_arrays(&self, topology: Topology, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { topology, first, count });
        if first < 0 || count < 0 {
            self.error("GL_INVALID_VALUE: negative first or count");
            return;
        }
        let Some(end) = first.checked_add(count) else {
            self.error(format!("GL_INVALID_VALUE: vertex range {first}+{count} overflows"));
            return;
        };
        let last = (count > 0).then(|| (end - 1) as u32);
        self.validate_draw(last);
    }

    fn draw_elements(&self, topology: Topology, count: i32, index_type: IndexType, byte_offset: i32) {
        self.record(GlCall::DrawElements { topology, count, index_type, byte_offset });
        if count < 0 || byte_offset < 0 {
            self.error("GL_INVALID_VALUE: negative count or offset");
            return;
        }

        let indices = {
            let m = self.model.borrow();
            m.bound_vertex_array
                .and_then(|v| m.vertex_arrays.get(&v))
                .and_then(|r| r.element_buffer)
                .and_then(|b| m.buffers.get(&b))
                .cloned()
        };
        let Some(bytes) = indices else {
            self.validate_draw(None);
            self.error("GL_INVALID_OPERATION: draw_elements without an element buffer");
            return;
        };

        let size = index_type.byte_size() as usize;
        let start = byte_offset as usize;
        let end = start as u64 + count as u64 * size as u64;
        if end > bytes.len() as u64 {
            self.validate_draw(None);
            self.error(format!(
                "GL_INVALID_OPERATION: index range {start}..{end} exceeds element buffer of {} bytes",
                bytes.len()
            ));
            return;
        }

        let max_index = bytes[start..end as usize]
            .chunks_exact(size)
            .map(|c| match index_type {
                IndexType::U16 => u32::from(u16::from_ne_bytes([c[0], c[1]])),
                IndexType::U32 => u32::from_ne_bytes([c[0], c[1], c[2], c[3]]),
            })
            .max();
        self.validate_draw(max_index);
    }
}
