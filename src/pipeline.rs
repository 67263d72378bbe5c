use log::{debug, info, log_enabled, trace, Level};

use crate::backend::RenderBackend;
use crate::buffer::VertexBuffer;
use crate::camera::{Framing, SceneUniform};
use crate::error::RenderError;
use crate::rotation::RotationState;
use crate::vertex::transform_vertices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// The backend exists but cannot take frames yet.
    Uninitialized,
    Ready,
    /// Inside `render_frame`.
    Rendering,
    /// Torn down, every further frame fails.
    Disposed,
}

/// Combines a static vertex buffer with the current rotation and submits it
/// to the backend once per frame.
pub struct DrawPipeline<B: RenderBackend> {
    backend: Option<B>,
    state: PipelineState,
    framing: Framing,
}

impl<B: RenderBackend> DrawPipeline<B> {
    pub fn new(backend: B, framing: Framing) -> Self {
        let state = if backend.is_ready() {
            PipelineState::Ready
        } else {
            PipelineState::Uninitialized
        };
        info!(
            "draw pipeline created ({:?}, {:?})",
            backend.topology(),
            state
        );

        Self {
            backend: Some(backend),
            state,
            framing,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn framing_mut(&mut self) -> &mut Framing {
        &mut self.framing
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// Advances `rotation` by `delta_time` and draws `buffer` with the new angle.
    ///
    /// Availability and the buffer are checked first, so a rejected frame
    /// leaves the rotation untouched. The vertex count is checked against the
    /// topology the backend rasterizes with.
    pub fn render_frame(
        &mut self,
        buffer: &mut VertexBuffer<B::Buffer>,
        rotation: &mut RotationState,
        delta_time: f32,
    ) -> Result<(), RenderError> {
        let Some(backend) = self.backend.as_mut() else {
            return Err(RenderError::PipelineUnavailable);
        };

        if !backend.is_ready() {
            self.state = PipelineState::Uninitialized;
            return Err(RenderError::PipelineUnavailable);
        }
        if self.state == PipelineState::Uninitialized {
            debug!("backend became ready");
        }
        self.state = PipelineState::Ready;

        backend.topology().validate(buffer.len())?;

        rotation.advance(delta_time);
        let scene = SceneUniform::new(&self.framing, rotation.transform());

        if log_enabled!(Level::Trace) {
            match transform_vertices(buffer.vertices(), &scene.transform()) {
                Some(drawn) => trace!("drawing {:?}", drawn),
                None => trace!("a vertex projects to infinity"),
            }
        }

        self.state = PipelineState::Rendering;
        let vertex_count = buffer.len() as u32;
        let handle = buffer.gpu_handle(|vertices| backend.upload(vertices));
        let result = backend.draw(handle, vertex_count, &scene);
        self.state = PipelineState::Ready;

        result
    }

    /// Releases the backend. The pipeline cannot render afterwards.
    pub fn dispose(&mut self) {
        if self.backend.take().is_some() {
            info!("draw pipeline disposed");
        }
        self.state = PipelineState::Disposed;
    }
}
