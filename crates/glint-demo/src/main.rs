use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use glint_engine::backend::NativeBackend;
use glint_engine::core::{App, AppControl, FrameCtx};
use glint_engine::device::GlInit;
use glint_engine::geometry::{GeometryBuffer, VertexLayout};
use glint_engine::logging::{init_logging, LoggingConfig};
use glint_engine::paint::palette;
use glint_engine::pipeline::PipelineState;
use glint_engine::render::DrawCommand;
use glint_engine::shader::{ShaderProgram, ShaderSource, ShaderUnit};
use glint_engine::window::{Runtime, RuntimeConfig};

const POSITION_VS: &str = "#version 330 core
layout (location = 0) in vec3 pos;
void main() {
    gl_Position = vec4(pos, 1.0);
}
";

const SOLID_RED_FS: &str = "#version 330 core
out vec4 frag;
void main() {
    frag = vec4(1.0, 0.0, 0.0, 1.0);
}
";

const SOLID_BLUE_FS: &str = "#version 330 core
out vec4 frag;
void main() {
    frag = vec4(0.0, 0.0, 1.0, 1.0);
}
";

const VERTEX_COLOR_VS: &str = "#version 330 core
layout (location = 0) in vec3 pos;
layout (location = 1) in vec3 vertex_color;
out vec3 color;
void main() {
    gl_Position = vec4(pos, 1.0);
    color = vertex_color;
}
";

const VERTEX_COLOR_FS: &str = "#version 330 core
in vec3 color;
out vec4 frag;
void main() {
    frag = vec4(color, 1.0);
}
";

// position (xyz) + color (rgb), counter-clockwise
#[rustfmt::skip]
const TRIANGLE: [f32; 18] = [
    -0.9, -0.5, 0.0,   1.0, 0.0, 0.0,
    -0.1, -0.5, 0.0,   0.0, 1.0, 0.0,
    -0.5,  0.5, 0.0,   0.0, 0.0, 1.0,
];

#[rustfmt::skip]
const RECT: [f32; 12] = [
    0.9,  0.5, 0.0, // top right
    0.1,  0.5, 0.0, // top left
    0.1, -0.5, 0.0, // bottom left
    0.9, -0.5, 0.0, // bottom right
];

// Two CCW triangles. The first five indices also trace the outline.
const RECT_INDICES: [u32; 6] = [0, 1, 2, 3, 0, 2];

struct Scene {
    vertex_color: ShaderProgram<NativeBackend>,
    solid_red: ShaderProgram<NativeBackend>,
    solid_blue: ShaderProgram<NativeBackend>,
    triangle: GeometryBuffer<NativeBackend>,
    rect: GeometryBuffer<NativeBackend>,
}

#[derive(Default)]
struct Demo {
    scene: Option<Scene>,
}

impl App for Demo {
    fn setup(&mut self, state: &mut PipelineState<NativeBackend>) -> Result<()> {
        let vertex_color = ShaderProgram::from_sources(
            state,
            "vertex-color",
            ShaderSource::vertex(VERTEX_COLOR_VS),
            ShaderSource::fragment(VERTEX_COLOR_FS),
        )?;

        // One vertex stage shared by both solid programs.
        let position_vs = ShaderUnit::compiled(state, ShaderSource::vertex(POSITION_VS))?;
        let red_fs = ShaderUnit::compiled(state, ShaderSource::fragment(SOLID_RED_FS))?;
        let blue_fs = ShaderUnit::compiled(state, ShaderSource::fragment(SOLID_BLUE_FS))?;

        let solid_red = ShaderProgram::builder(state)
            .label("solid-red")
            .attach(&position_vs)
            .attach(&red_fs)
            .link()?;
        let solid_blue = ShaderProgram::builder(state)
            .label("solid-blue")
            .attach(&position_vs)
            .attach(&blue_fs)
            .link()?;

        let triangle = GeometryBuffer::create(state, &TRIANGLE, VertexLayout::interleaved(&[(0, 3), (1, 3)]), None)?;
        let rect = GeometryBuffer::create(state, &RECT, VertexLayout::interleaved(&[(0, 3)]), Some(&RECT_INDICES))?;

        log::info!("scene ready");
        self.scene = Some(Scene {
            vertex_color,
            solid_red,
            solid_blue,
            triangle,
            rect,
        });
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let Some(scene) = &self.scene else {
            return AppControl::Continue;
        };

        let stats = ctx.render(
            palette::DEEP_GRAVEL,
            &[
                DrawCommand::triangles(&scene.vertex_color, &scene.triangle, 3),
                DrawCommand::triangles(&scene.solid_red, &scene.rect, 6),
                DrawCommand::line_strip(&scene.solid_blue, &scene.rect, 5),
            ],
        );

        if ctx.tick.index % 600 == 0 {
            log::debug!(
                "frame {} ({:.3} ms): {} draws",
                ctx.tick.index,
                ctx.tick.dt * 1000.0,
                stats.draw_calls
            );
        }
        AppControl::Continue
    }

    fn shutdown(&mut self) {
        // GL objects must go while the context is still current.
        self.scene = None;
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "glint demo".to_string(),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GlInit::default(), Demo::default())
}
