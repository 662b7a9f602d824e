use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use glow::HasContext;
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window};

use crate::window::RuntimeConfig;

use super::GlInit;

/// Owns the window, its GL surface and the current context.
///
/// Field order is drop order: the surface goes before the context, and both
/// before the window they render into. GPU resources created through
/// [`gl`](Self::gl) must be dropped before this device.
pub struct GlDevice {
    gl: Rc<glow::Context>,

    /// Surface bound to `window`.
    surface: Surface<WindowSurface>,

    /// Context made current on the thread that created the device.
    context: PossiblyCurrentContext,

    window: Window,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl GlDevice {
    /// Creates the window and a current GL context for it.
    pub fn new(event_loop: &ActiveEventLoop, config: &RuntimeConfig, init: &GlInit) -> Result<Self> {
        let mut attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs.clone()))
            .build(event_loop, template, pick_config)
            .map_err(|e| anyhow!("failed to find a GL config: {e}"))?;

        let window = match window {
            Some(window) => window,
            None => glutin_winit::finalize_window(event_loop, attrs, &gl_config)
                .context("failed to create window for GL config")?,
        };

        let raw_window_handle = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();

        let (major, minor) = init.version;
        let context_attrs = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_debug(init.debug_output)
            .build(Some(raw_window_handle));

        let display = gl_config.display();

        // SAFETY: the raw window handle comes from `window`, which outlives
        // the context (see field order).
        let not_current = unsafe { display.create_context(&gl_config, &context_attrs) }
            .with_context(|| format!("failed to create OpenGL {major}.{minor} core context"))?;

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .context("failed to describe window surface")?;

        // SAFETY: as above, the surface never outlives `window`.
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attrs) }
            .context("failed to create window surface")?;

        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        let interval = if init.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("failed to set swap interval {interval:?}: {e}");
        }

        // SAFETY: the context is current on this thread and stays current
        // for the lifetime of the device.
        let mut gl = unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };

        log_context_info(&gl);
        if init.debug_output {
            install_debug_output(&mut gl);
        }

        let size = window.inner_size();
        log::info!("GL device ready: {}x{} px, vsync {}", size.width, size.height, init.vsync);

        Ok(Self {
            gl: Rc::new(gl),
            surface,
            context,
            window,
            size,
        })
    }

    /// Shared handle for building a [`PipelineState`](crate::pipeline::PipelineState).
    #[inline]
    pub fn gl(&self) -> &Rc<glow::Context> {
        &self.gl
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Returns the current drawable size (physical pixels).
    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resizes the surface. Zero-sized requests (minimised windows) are
    /// recorded but not forwarded.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        let (Some(w), Some(h)) = (NonZeroU32::new(new_size.width), NonZeroU32::new(new_size.height)) else {
            return;
        };
        self.surface.resize(&self.context, w, h);
    }

    /// Presents the back buffer.
    pub fn swap_buffers(&self) -> Result<()> {
        self.window.pre_present_notify();
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}

/// Prefers the config with the most samples; ties keep the first offered.
///
/// glutin-winit requires the picker to return a `Config` and gives it no
/// error channel. Most displays fail `find_configs` with `BadConfig` before
/// the picker runs; an empty list that still gets here has nothing to
/// return, so it panics.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
        .expect("display offered no GL configs")
}

fn log_context_info(gl: &glow::Context) {
    // SAFETY: called with the context current, straight after loading.
    let (version, renderer) = unsafe {
        (
            gl.get_parameter_string(glow::VERSION),
            gl.get_parameter_string(glow::RENDERER),
        )
    };
    log::info!("OpenGL {version} on {renderer}");
}

fn install_debug_output(gl: &mut glow::Context) {
    if !gl.supports_debug() {
        log::warn!("GL debug output requested but not supported by this context");
        return;
    }

    // SAFETY: the callback only forwards to `log`, which is thread-safe,
    // and the context is current.
    unsafe {
        gl.enable(glow::DEBUG_OUTPUT);
        gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(|source, kind, id, severity, message| {
            let level = match severity {
                glow::DEBUG_SEVERITY_HIGH => log::Level::Error,
                glow::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
                glow::DEBUG_SEVERITY_LOW => log::Level::Info,
                _ => log::Level::Trace,
            };
            log::log!(target: "glint_engine::gl", level, "[{source:#x}/{kind:#x}/{id}] {message}");
        });
    }
    log::debug!("GL debug output enabled");
}
