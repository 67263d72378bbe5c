use crate::error::RenderError;
use crate::vertex::Vertex;

/// How consecutive vertices are joined into triangles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    #[default]
    TriangleList,
    TriangleStrip,
}

impl Topology {
    /// Checks that `vertex_count` vertices make whole primitives.
    pub fn validate(self, vertex_count: usize) -> Result<(), RenderError> {
        let invalid = |reason| RenderError::InvalidBuffer {
            vertex_count,
            reason,
        };

        if vertex_count == 0 {
            return Err(invalid("buffer is empty"));
        }
        if vertex_count < 3 {
            return Err(invalid("a triangle needs at least 3 vertices"));
        }
        match self {
            Topology::TriangleList if vertex_count % 3 != 0 => {
                Err(invalid("triangle list needs a multiple of 3 vertices"))
            }
            _ => Ok(()),
        }
    }

    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// An immutable set of vertices in model space.
///
/// The data is uploaded lazily the first time a backend draws it, and the
/// upload is reused for every later frame. To change the shape, build a new
/// buffer; the old GPU allocation is released when this value drops.
#[derive(Debug)]
pub struct VertexBuffer<H> {
    vertices: Vec<Vertex>,
    gpu: Option<H>,
}

impl<H> VertexBuffer<H> {
    pub fn new(vertices: impl Into<Vec<Vertex>>) -> Result<Self, RenderError> {
        let vertices = vertices.into();
        if vertices.is_empty() {
            return Err(RenderError::InvalidBuffer {
                vertex_count: 0,
                reason: "buffer is empty",
            });
        }

        Ok(Self {
            vertices,
            gpu: None,
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Returns the GPU copy, running `upload` only if there is none yet.
    pub fn gpu_handle(&mut self, upload: impl FnOnce(&[Vertex]) -> H) -> &H {
        let vertices = &self.vertices;
        self.gpu.get_or_insert_with(|| upload(vertices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::{Vertex, TRIANGLE};

    #[test]
    fn test_empty_buffer_rejected() {
        let result = VertexBuffer::<()>::new(Vec::<Vertex>::new());
        assert!(matches!(
            result,
            Err(RenderError::InvalidBuffer { vertex_count: 0, .. })
        ));
    }

    #[test]
    fn test_topology_minimums() {
        for topology in [Topology::TriangleList, Topology::TriangleStrip] {
            assert!(topology.validate(0).is_err());
            assert!(topology.validate(2).is_err());
            assert!(topology.validate(3).is_ok());
        }

        assert!(Topology::TriangleList.validate(4).is_err());
        assert!(Topology::TriangleList.validate(6).is_ok());
        assert!(Topology::TriangleStrip.validate(4).is_ok());
        assert!(Topology::TriangleStrip.validate(5).is_ok());
    }

    #[test]
    fn test_upload_runs_once() {
        let mut buffer = VertexBuffer::new(TRIANGLE).unwrap();
        let mut uploads = 0;
        assert!(!buffer.is_uploaded());

        for _ in 0..3 {
            let handle = *buffer.gpu_handle(|vertices| {
                uploads += 1;
                vertices.len()
            });
            assert_eq!(handle, 3);
        }

        assert_eq!(uploads, 1);
        assert!(buffer.is_uploaded());
    }

    #[test]
    fn test_vertices_survive_upload() {
        let mut buffer = VertexBuffer::new(TRIANGLE).unwrap();
        buffer.gpu_handle(|vertices| vertices.len());

        assert_eq!(buffer.vertices(), TRIANGLE);
        assert_eq!(buffer.len(), 3);
    }
}
