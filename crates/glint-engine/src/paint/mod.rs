//! Color types.
//!
//! `Rgba` is the color passed to clears; `palette` holds the named colors the
//! demo and tests use.

mod color;
pub mod palette;

pub use color::Rgba;
