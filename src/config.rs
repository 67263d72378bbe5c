use crate::buffer::Topology;
use crate::camera::Framing;
use crate::gradient::CallState;

pub const WINDOW_TITLE: &str = "Call gradient";

// portrait, like the call screen the backdrop was made for
pub const WINDOW_WIDTH: u32 = 450;
pub const WINDOW_HEIGHT: u32 = 800;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Gaussian blur over the finished frame, in pixels.
pub const BLUR_SIGMA: f32 = 10.0;

/// 60 degrees per second.
pub const DEFAULT_ANGULAR_VELOCITY: f32 = std::f32::consts::PI / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingPreset {
    /// Primitive drawn straight in normalized device coordinates.
    Flat,
    /// Oversized gradient quad seen through a perspective projection.
    Backdrop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinnerConfig {
    pub angular_velocity: f32,
    pub initial_state: CallState,
    pub framing: FramingPreset,
    pub topology: Topology,
    /// Zero turns the blur off.
    pub blur_sigma: f32,
}

impl SpinnerConfig {
    pub fn framing(&self, width: u32, height: u32) -> Framing {
        match self.framing {
            FramingPreset::Flat => Framing::flat(),
            FramingPreset::Backdrop => Framing::backdrop(width, height),
        }
    }
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        Self {
            angular_velocity: DEFAULT_ANGULAR_VELOCITY,
            initial_state: CallState::InitiatingCall,
            framing: FramingPreset::Backdrop,
            topology: Topology::TriangleStrip,
            blur_sigma: BLUR_SIGMA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Projection;

    #[test]
    fn test_default_matches_backdrop() {
        let config = SpinnerConfig::default();
        assert!((config.angular_velocity.to_degrees() - 60.0).abs() < 1e-4);
        assert_eq!(config.topology, Topology::TriangleStrip);
        assert_eq!(config.blur_sigma, 10.0);

        let framing = config.framing(WINDOW_WIDTH, WINDOW_HEIGHT);
        assert!(matches!(framing.projection, Projection::Perspective { .. }));
    }
}
