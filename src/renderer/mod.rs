//! Rendering
//!
//! The scene builds a backend-independent draw list every frame; backends
//! turn it into pixels (WebGPU) or just statistics (headless runs).

pub mod draw;
pub mod font;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod stats;
pub mod vertex;

pub use draw::{Align, Color, DrawCmd, DrawList};
pub use pipeline::{GpuRenderer, RenderState, Viewport};
pub use stats::FrameStats;

/// Consumer of finished frames
pub trait Renderer {
    /// Draw one complete frame; drawing is synchronous within the frame
    fn present(&mut self, frame: &DrawList);
}
