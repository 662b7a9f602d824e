/// Multiplier applied to the source or destination color while blending.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// `result = src * src_factor + dst * dst_factor`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendMode {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendMode {
    /// Classic "over" compositing for straight alpha.
    pub const ALPHA_OVER: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };

    /// Later draws replace earlier ones.
    pub const REPLACE: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::Zero,
    };
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::ALPHA_OVER
    }
}

/// Fixed-function switches applied once after the context is created.
///
/// `blend: None` disables blending entirely.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PipelineSetup {
    pub blend: Option<BlendMode>,
    pub cull_back_faces: bool,
}

impl Default for PipelineSetup {
    fn default() -> Self {
        Self {
            blend: Some(BlendMode::ALPHA_OVER),
            cull_back_faces: true,
        }
    }
}
