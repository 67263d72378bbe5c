use cgmath::{Matrix4, Vector4};

#[repr(C)] // make 'C-like' memory storage so the shader can bind fields by offset
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    /// Layout of one vertex as seen by `shader.wgsl`: position at location 0, color at location 1.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Applies `transform` to the position only, then the perspective divide,
    /// the same way the vertex stage and rasterizer do.
    ///
    /// Returns `None` when the point lands at infinity (w == 0).
    pub fn transformed(&self, transform: &Matrix4<f32>) -> Option<Vertex> {
        let [x, y, z] = self.position;
        let p = transform * Vector4::new(x, y, z, 1.0);
        if p.w == 0.0 {
            return None;
        }

        Some(Vertex {
            position: [p.x / p.w, p.y / p.w, p.z / p.w],
            color: self.color,
        })
    }
}

/// CPU reference of the vertex stage, handy for tests and trace output.
/// `None` if any vertex projects to infinity.
pub fn transform_vertices(vertices: &[Vertex], transform: &Matrix4<f32>) -> Option<Vec<Vertex>> {
    vertices.iter().map(|v| v.transformed(transform)).collect()
}

// Red, green, blue triangle in normalized device space
pub const TRIANGLE: &[Vertex] = &[
    Vertex::new([0.0, 1.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
    Vertex::new([-1.0, -1.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
    Vertex::new([1.0, -1.0, 0.0], [0.0, 0.0, 1.0, 1.0]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Rad, SquareMatrix};

    #[test]
    fn test_packed_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 7 * 4);

        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn test_byte_order() {
        let vertex = Vertex::new([1.0, 2.0, 3.0], [0.1, 0.2, 0.3, 0.4]);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));

        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_identity_keeps_vertices() {
        let out = transform_vertices(TRIANGLE, &Matrix4::identity()).unwrap();
        assert_eq!(out, TRIANGLE);
    }

    #[test]
    fn test_rotation_leaves_color_alone() {
        let out = transform_vertices(TRIANGLE, &Matrix4::from_angle_z(Rad(1.234))).unwrap();

        for (before, after) in TRIANGLE.iter().zip(out.iter()) {
            assert_eq!(before.color, after.color);
        }
    }

    #[test]
    fn test_point_on_eye_plane_has_no_position() {
        // a perspective projection sends w to -z, so z == 0 lands at infinity
        let projection = cgmath::perspective(cgmath::Deg(65.0f32), 1.0, 4.0, 10.0);

        assert_eq!(TRIANGLE[0].transformed(&projection), None);
        assert_eq!(transform_vertices(TRIANGLE, &projection), None);

        let pushed_back = projection * Matrix4::from_translation(cgmath::Vector3::new(0.0, 0.0, -6.0));
        assert!(transform_vertices(TRIANGLE, &pushed_back).is_some());
    }
}
