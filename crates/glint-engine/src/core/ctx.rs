use crate::backend::NativeBackend;
use crate::paint::Rgba;
use crate::pipeline::{PipelineState, Viewport};
use crate::render::{DrawCommand, FrameRenderer, FrameStats};
use crate::time::Tick;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
pub struct FrameCtx<'a> {
    pub tick: Tick,
    pub viewport: Viewport,
    pub(crate) state: &'a mut PipelineState<NativeBackend>,
    pub(crate) renderer: &'a mut FrameRenderer,
}

impl<'a> FrameCtx<'a> {
    /// Clears to `clear` and submits `commands` in order.
    ///
    /// The runtime swaps buffers after `on_frame` returns.
    pub fn render(&mut self, clear: Rgba, commands: &[DrawCommand<'_, NativeBackend>]) -> FrameStats {
        self.renderer.render_frame(self.state, clear, commands)
    }

    /// Direct access for draws outside [`render`](Self::render).
    pub fn state(&mut self) -> &mut PipelineState<NativeBackend> {
        self.state
    }

    pub fn renderer(&mut self) -> &mut FrameRenderer {
        self.renderer
    }
}
