use std::rc::Rc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::backend::NativeBackend;
use crate::core::{App, AppControl, FrameCtx};
use crate::device::{GlDevice, GlInit};
use crate::pipeline::{PipelineState, Viewport};
use crate::render::FrameRenderer;
use crate::time::FrameTicker;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Borderless fullscreen on the primary monitor.
    pub fullscreen: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "glint".to_string(),
            initial_size: LogicalSize::new(672.0, 392.0),
            fullscreen: false,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    ///
    /// Errors from context creation, `App::setup` or presenting abort the
    /// loop and are returned here.
    pub fn run<A>(config: RuntimeConfig, init: GlInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut handler = Handler::new(config, init, app);

        event_loop
            .run_app(&mut handler)
            .context("winit event loop terminated with error")?;

        match handler.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Everything that only exists while the context does.
///
/// Field order is drop order: the pipeline's backend handle goes before the
/// device that owns the context.
struct Session {
    renderer: FrameRenderer,
    ticker: FrameTicker,
    pipeline: PipelineState<NativeBackend>,
    device: GlDevice,
}

struct Handler<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    init: GlInit,
    app: A,

    session: Option<Session>,
    app_live: bool,
    failure: Option<anyhow::Error>,
}

impl<A> Handler<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, init: GlInit, app: A) -> Self {
        Self {
            config,
            init,
            app,
            session: None,
            app_live: false,
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let device = GlDevice::new(event_loop, &self.config, &self.init).context("failed to create GL device")?;

        let mut pipeline = PipelineState::new(Rc::clone(device.gl()));
        pipeline.configure(&self.init.setup);
        pipeline.set_viewport(viewport_for(device.size()));

        // The session is stored first so a failing setup still reaches
        // `shutdown` with the context alive.
        let session = self.session.insert(Session {
            renderer: FrameRenderer::new(),
            ticker: FrameTicker::new(),
            pipeline,
            device,
        });
        self.app_live = true;
        self.app.setup(&mut session.pipeline).context("application setup failed")?;

        session.device.window().request_redraw();
        Ok(())
    }

    /// Runs `App::shutdown` while the context is alive, then drops it.
    fn teardown(&mut self) {
        if self.app_live {
            self.app.shutdown();
            self.app_live = false;
        }
        if let Some(session) = self.session.take() {
            log::debug!("tearing down after {} frame(s)", session.renderer.frames());
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.teardown();
        event_loop.exit();
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        self.teardown();
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<AppControl> {
        let Some(session) = self.session.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let tick = session.ticker.tick();
        let viewport = session.pipeline.viewport().unwrap_or_default();
        if !can_present(session.device.size()) {
            return Ok(AppControl::Continue);
        }

        let control = {
            let mut ctx = FrameCtx {
                tick,
                viewport,
                state: &mut session.pipeline,
                renderer: &mut session.renderer,
            };
            self.app.on_frame(&mut ctx)
        };

        session.device.swap_buffers()?;
        Ok(control)
    }
}

impl<A> ApplicationHandler for Handler<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.as_mut() {
            session.ticker.reset();
            return;
        }

        log_primary_monitor(event_loop);
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw while there is something to present. Minimised
        // windows never swap, so nothing would throttle the loop; the next
        // resize requests a redraw again.
        if let Some(session) = &self.session {
            if can_present(session.device.size()) {
                session.device.window().request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.session.is_none() {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.stop(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.stop(event_loop),

            WindowEvent::Resized(new_size) => {
                if let Some(session) = self.session.as_mut() {
                    session.device.resize(new_size);
                    let viewport = viewport_for(new_size);
                    if viewport.is_valid() {
                        session.pipeline.set_viewport(viewport);
                    }
                    log::info!("resized to {}x{} px", new_size.width, new_size.height);
                    session.device.window().request_redraw();
                }
            }

            WindowEvent::RedrawRequested => match self.redraw() {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => self.stop(event_loop),
                Err(err) => self.fail(event_loop, err),
            },

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

fn viewport_for(size: PhysicalSize<u32>) -> Viewport {
    Viewport::new(size.width, size.height)
}

/// Frames are only drawn and presented into a surface with area.
fn can_present(size: PhysicalSize<u32>) -> bool {
    viewport_for(size).is_valid()
}

fn log_primary_monitor(event_loop: &ActiveEventLoop) {
    let Some(monitor) = event_loop.primary_monitor() else {
        log::info!("no primary monitor reported");
        return;
    };
    let size = monitor.size();
    let name = monitor.name().unwrap_or_else(|| "<unnamed>".to_string());
    match monitor.refresh_rate_millihertz() {
        Some(mhz) => log::info!(
            "primary monitor {name}: {}x{} @ {:.2} Hz",
            size.width,
            size.height,
            f64::from(mhz) / 1000.0
        ),
        None => log::info!("primary monitor {name}: {}x{}", size.width, size.height),
    }
}
