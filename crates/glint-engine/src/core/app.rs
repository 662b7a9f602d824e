use anyhow::Result;
use winit::event::WindowEvent;

use crate::backend::NativeBackend;
use crate::pipeline::PipelineState;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
///
/// GPU resources (programs, geometry) belong to the app. They are created in
/// `setup` and must be released in `shutdown`, which runs while the context
/// is still current.
pub trait App {
    /// Called once the context exists, before the first frame.
    ///
    /// An error aborts the run and is returned from `Runtime::run`.
    fn setup(&mut self, state: &mut PipelineState<NativeBackend>) -> Result<()>;

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called before the context is torn down.
    fn shutdown(&mut self) {}
}
