use crate::backend::GlBackend;
use crate::geometry::GeometryBuffer;
use crate::paint::Rgba;
use crate::pipeline::PipelineState;

use super::{DrawCommand, Topology};

/// What one frame submitted.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub program_selections: u32,
}

/// Turns an ordered command list into backend calls.
///
/// Stateless apart from a frame counter; all GPU state lives in the
/// [`PipelineState`] handed to each call.
#[derive(Debug, Default)]
pub struct FrameRenderer {
    frames: u64,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears to `clear`, then runs `commands` in order.
    ///
    /// Each command selects its program and binds its geometry before
    /// drawing, even when they match the previous command.
    pub fn render_frame<B: GlBackend>(
        &mut self,
        state: &mut PipelineState<B>,
        clear: Rgba,
        commands: &[DrawCommand<'_, B>],
    ) -> FrameStats {
        state.set_clear_color(clear);
        state.clear();

        let mut stats = FrameStats::default();
        for cmd in commands {
            cmd.program.select(state);
            stats.program_selections += 1;

            cmd.geometry.bind(state);
            state.draw(cmd.topology, cmd.offset, cmd.count);
            stats.draw_calls += 1;
        }

        self.frames += 1;
        log::trace!(
            "frame {}: {} draw(s), {} program selection(s)",
            self.frames,
            stats.draw_calls,
            stats.program_selections
        );
        stats
    }

    /// Draws `count` triangle vertices from `geometry` with the selected program.
    pub fn draw_triangles<B: GlBackend>(
        &mut self,
        state: &mut PipelineState<B>,
        geometry: &GeometryBuffer<B>,
        offset: u32,
        count: u32,
    ) {
        geometry.bind(state);
        state.draw(Topology::Triangles, offset, count);
    }

    /// Draws a connected line through `count` vertices with the selected program.
    pub fn draw_line_strip<B: GlBackend>(
        &mut self,
        state: &mut PipelineState<B>,
        geometry: &GeometryBuffer<B>,
        offset: u32,
        count: u32,
    ) {
        geometry.bind(state);
        state.draw(Topology::LineStrip, offset, count);
    }

    /// Frames rendered so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::backend::recording::{GlCall, RecordingBackend};
    use crate::backend::IndexType;
    use crate::geometry::VertexLayout;
    use crate::paint::palette;
    use crate::pipeline::{BlendMode, PipelineSetup};
    use crate::shader::{ShaderProgram, ShaderSource, ShaderUnit};

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
    const COLOR_VS: &str = "#version 330 core
layout (location = 0) in vec3 pos;
layout (location = 1) in vec3 vertex_color;
out vec3 color;
void main() { gl_Position = vec4(pos, 1.0); color = vertex_color; }
";
    const COLOR_FS: &str = "#version 330 core
in vec3 color;
out vec4 frag;
void main() { frag = vec4(color, 1.0); }
";

    const TRIANGLE: [f32; 18] = [
        -0.5, -0.5, 0.0, 1.0, 0.0, 0.0, //
        0.5, -0.5, 0.0, 0.0, 1.0, 0.0, //
        0.0, 0.5, 0.0, 0.0, 0.0, 1.0, //
    ];
    const RECT: [f32; 12] = [0.5, 0.5, 0.0, -0.5, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0];
    const RECT_INDICES: [u32; 6] = [0, 1, 2, 3, 0, 2];

    fn state() -> PipelineState<RecordingBackend> {
        PipelineState::new(Rc::new(RecordingBackend::new()))
    }

    fn rect(state: &mut PipelineState<RecordingBackend>) -> GeometryBuffer<RecordingBackend> {
        GeometryBuffer::create(state, &RECT, VertexLayout::interleaved(&[(0, 3)]), Some(&RECT_INDICES)).unwrap()
    }

    fn solid(state: &PipelineState<RecordingBackend>, label: &str, fs: &'static str) -> ShaderProgram<RecordingBackend> {
        ShaderProgram::from_sources(state, label, ShaderSource::vertex(VS), ShaderSource::fragment(fs)).unwrap()
    }

    #[test]
    fn empty_frame_only_clears() {
        let mut state = state();
        let mut renderer = FrameRenderer::new();

        let stats = renderer.render_frame(&mut state, palette::DEEP_GRAVEL, &[]);

        assert_eq!(stats, FrameStats::default());
        assert_eq!(
            state.gl().calls(),
            vec![GlCall::ClearColor(palette::DEEP_GRAVEL), GlCall::Clear]
        );
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn commands_draw_in_submission_order() {
        let mut state = state();
        let geo = rect(&mut state);
        let a = solid(&state, "a", RED_FS);
        let b = solid(&state, "b", BLUE_FS);
        state.gl().take_calls();

        let stats = FrameRenderer::new().render_frame(
            &mut state,
            Rgba::BLACK,
            &[DrawCommand::triangles(&a, &geo, 6), DrawCommand::triangles(&b, &geo, 6)],
        );
        assert_eq!(stats, FrameStats { draw_calls: 2, program_selections: 2 });

        let order: Vec<GlCall> = state
            .gl()
            .calls()
            .into_iter()
            .filter(|c| c.is_draw() || matches!(c, GlCall::UseProgram { .. }))
            .collect();
        let draw = GlCall::DrawElements {
            topology: Topology::Triangles,
            count: 6,
            index_type: IndexType::U32,
            byte_offset: 0,
        };
        assert_eq!(
            order,
            vec![
                GlCall::UseProgram { program: Some(a.handle()) },
                draw.clone(),
                GlCall::UseProgram { program: Some(b.handle()) },
                draw,
            ]
        );
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn triangle_draws_once_without_index_buffer() {
        let mut state = state();
        let red = solid(&state, "triangle", RED_FS);
        let positions = [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];
        let geo = GeometryBuffer::create(&mut state, &positions, VertexLayout::interleaved(&[(0, 3)]), None).unwrap();

        FrameRenderer::new().render_frame(&mut state, Rgba::BLACK, &[DrawCommand::triangles(&red, &geo, 3)]);

        let calls = state.gl().calls();
        assert!(!calls.iter().any(|c| matches!(
            c,
            GlCall::BindBuffer { target: crate::backend::BufferTarget::ElementArray, .. }
        )));
        assert_eq!(
            state.gl().draw_calls(),
            vec![GlCall::DrawArrays { topology: Topology::Triangles, first: 0, count: 3 }]
        );
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn vertex_colored_triangle_draws_three_vertices() {
        let mut state = state();
        let program = ShaderProgram::from_sources(
            &state,
            "vertex-color",
            ShaderSource::vertex(COLOR_VS),
            ShaderSource::fragment(COLOR_FS),
        )
        .unwrap();
        let geo = GeometryBuffer::create(&mut state, &TRIANGLE, VertexLayout::interleaved(&[(0, 3), (1, 3)]), None)
            .unwrap();
        assert_eq!(geo.vertex_count(), 3);

        FrameRenderer::new().render_frame(&mut state, Rgba::BLACK, &[DrawCommand::triangles(&program, &geo, 3)]);

        assert_eq!(
            state.gl().draw_calls(),
            vec![GlCall::DrawArrays { topology: Topology::Triangles, first: 0, count: 3 }]
        );
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn rect_count_selects_how_much_is_drawn() {
        let mut state = state();
        let geo = rect(&mut state);
        let red = solid(&state, "solid-red", RED_FS);

        let mut renderer = FrameRenderer::new();
        renderer.render_frame(&mut state, Rgba::BLACK, &[DrawCommand::triangles(&red, &geo, 6)]);
        renderer.render_frame(&mut state, Rgba::BLACK, &[DrawCommand::triangles(&red, &geo, 3)]);

        let counts: Vec<i32> = state
            .gl()
            .draw_calls()
            .iter()
            .map(|c| match c {
                GlCall::DrawElements { count, .. } => *count,
                other => panic!("unexpected draw {other:?}"),
            })
            .collect();
        assert_eq!(counts, vec![6, 3]);
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn fill_then_outline_composites_blue_over_red() {
        let mut state = state();
        state.configure(&PipelineSetup::default());

        let vs = ShaderUnit::compiled(&state, ShaderSource::vertex(VS)).unwrap();
        let red_fs = ShaderUnit::compiled(&state, ShaderSource::fragment(RED_FS)).unwrap();
        let blue_fs = ShaderUnit::compiled(&state, ShaderSource::fragment(BLUE_FS)).unwrap();
        let red = ShaderProgram::builder(&state).label("solid-red").attach(&vs).attach(&red_fs).link().unwrap();
        let blue = ShaderProgram::builder(&state).label("solid-blue").attach(&vs).attach(&blue_fs).link().unwrap();
        let geo = rect(&mut state);

        FrameRenderer::new().render_frame(
            &mut state,
            palette::DEEP_GRAVEL,
            &[DrawCommand::triangles(&red, &geo, 6), DrawCommand::line_strip(&blue, &geo, 5)],
        );

        let calls = state.gl().calls();
        let pos = |wanted: &GlCall| calls.iter().position(|c| c == wanted).unwrap();

        let blend = pos(&GlCall::SetBlend(Some(BlendMode::ALPHA_OVER)));
        let red_use = pos(&GlCall::UseProgram { program: Some(red.handle()) });
        let blue_use = pos(&GlCall::UseProgram { program: Some(blue.handle()) });
        let clear = pos(&GlCall::Clear);
        assert!(blend < clear && clear < red_use && red_use < blue_use);

        assert_eq!(
            state.gl().draw_calls(),
            vec![
                GlCall::DrawElements {
                    topology: Topology::Triangles,
                    count: 6,
                    index_type: IndexType::U32,
                    byte_offset: 0,
                },
                GlCall::DrawElements {
                    topology: Topology::LineStrip,
                    count: 5,
                    index_type: IndexType::U32,
                    byte_offset: 0,
                },
            ]
        );
        assert!(state.gl().errors().is_empty());
    }

    #[test]
    fn offset_draws_stay_within_index_buffer() {
        let mut state = state();
        let geo = rect(&mut state);
        let red = solid(&state, "solid-red", RED_FS);
        red.select(&mut state);

        let mut renderer = FrameRenderer::new();
        renderer.draw_triangles(&mut state, &geo, 3, 3);
        renderer.draw_line_strip(&mut state, &geo, 1, 5);
        assert!(state.gl().errors().is_empty());

        renderer.draw_triangles(&mut state, &geo, 3, 6);
        assert_eq!(state.gl().errors().len(), 1);
    }
}
