//! # Core Module
//!
//! wgpu context management and frame timing.

mod clock;
mod context;

pub use clock::{FrameClock, MAX_FRAME_DELTA};
pub use context::{Context, ContextError};

/// Render configuration options.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Power preference for GPU selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (vsync).
    pub present_mode: wgpu::PresentMode,
    /// Clear color.
    pub clear_color: wgpu::Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::AutoVsync,
            clear_color: wgpu::Color::BLACK,
        }
    }
}
