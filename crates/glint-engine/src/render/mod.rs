//! Per-frame drawing.
//!
//! A frame is a clear followed by an ordered list of [`DrawCommand`]s. Each
//! command selects its program, binds its geometry and issues one draw; later
//! commands composite over earlier ones using the blend mode configured on the
//! [`PipelineState`](crate::pipeline::PipelineState). Commands are never
//! sorted or merged.

mod command;
mod frame;

use std::fmt;

pub use command::DrawCommand;
pub use frame::{FrameRenderer, FrameStats};

/// How consecutive vertices are assembled into primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Topology::Points => "points",
            Topology::Lines => "lines",
            Topology::LineStrip => "line-strip",
            Topology::LineLoop => "line-loop",
            Topology::Triangles => "triangles",
            Topology::TriangleStrip => "triangle-strip",
            Topology::TriangleFan => "triangle-fan",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
