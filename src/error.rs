use std::fmt;

/// Failures surfaced by the draw pipeline. None of them are retried internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The backend is not configured yet, or the pipeline was disposed.
    PipelineUnavailable,
    /// The vertex set is empty or does not fit the configured topology.
    InvalidBuffer { vertex_count: usize, reason: &'static str },
    /// The surface failed to hand out a frame.
    Surface(wgpu::SurfaceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::PipelineUnavailable => write!(f, "render pipeline is unavailable"),
            RenderError::InvalidBuffer {
                vertex_count,
                reason,
            } => write!(f, "invalid vertex buffer ({vertex_count} vertices): {reason}"),
            RenderError::Surface(e) => write!(f, "surface error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        RenderError::Surface(e)
    }
}
