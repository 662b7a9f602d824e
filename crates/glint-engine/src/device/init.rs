use crate::pipeline::PipelineSetup;

/// Initialization parameters for the GL layer.
///
/// Only a core-profile desktop context is requested; `version` is the
/// minimum the driver must provide.
#[derive(Debug, Clone)]
pub struct GlInit {
    /// `(major, minor)` of the requested context.
    pub version: (u8, u8),

    /// Wait for vertical blank on swap.
    pub vsync: bool,

    /// Request a debug context and forward `GL_KHR_debug` messages to `log`.
    ///
    /// Drivers may ignore the request; a warning is logged when the
    /// extension is missing.
    pub debug_output: bool,

    /// Blend and cull switches applied once the context is current.
    pub setup: PipelineSetup,
}

impl Default for GlInit {
    fn default() -> Self {
        Self {
            version: (3, 3),
            vsync: true,
            debug_output: cfg!(debug_assertions),
            setup: PipelineSetup::default(),
        }
    }
}
