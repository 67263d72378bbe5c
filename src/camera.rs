use cgmath::*;

/// cgmath builds OpenGL clip space (z in -1..1), wgpu wants z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Positions are already in normalized device coordinates.
    Identity,
    Perspective {
        fovy: Deg<f32>,
        aspect: f32,
        znear: f32,
        zfar: f32,
    },
}

impl Projection {
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Projection::Perspective { aspect, .. } = self {
            if width > 0 && height > 0 {
                *aspect = width as f32 / height as f32;
            }
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        match *self {
            Projection::Identity => Matrix4::identity(),
            Projection::Perspective {
                fovy,
                aspect,
                znear,
                zfar,
            } => OPENGL_TO_WGPU_MATRIX * perspective(fovy, aspect, znear, zfar),
        }
    }
}

/// Where the spinning primitive sits in the view: translate * rotate * scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub projection: Projection,
    pub translation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Framing {
    /// Pure rotation in normalized device coordinates.
    pub fn flat() -> Self {
        Self {
            projection: Projection::Identity,
            translation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Oversized quad pushed back into a narrow perspective frustum. On a
    /// portrait surface the quad edges stay off screen and only the gradient shows.
    pub fn backdrop(width: u32, height: u32) -> Self {
        let mut projection = Projection::Perspective {
            fovy: Deg(65.0),
            aspect: 1.0,
            znear: 4.0,
            zfar: 10.0,
        };
        projection.resize(width, height);

        Self {
            projection,
            translation: Vector3::new(0.0, 0.0, -6.0),
            scale: Vector3::new(4.5, 4.5, 1.0),
        }
    }

    pub fn model_view(&self, rotation: Matrix4<f32>) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * rotation
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self::flat()
    }
}

/// The scene uniform contains the matrices passed to the vertex shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
}

impl SceneUniform {
    /// Builds the uniform for one frame from the framing and the rotation transform.
    pub fn new(framing: &Framing, rotation: Matrix4<f32>) -> Self {
        Self {
            projection: convert_matrix4_to_array(framing.projection.matrix()),
            model_view: convert_matrix4_to_array(framing.model_view(rotation)),
        }
    }

    /// The full position transform the shader applies.
    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from(self.projection) * Matrix4::from(self.model_view)
    }
}

impl Default for SceneUniform {
    fn default() -> Self {
        Self {
            projection: convert_matrix4_to_array(Matrix4::identity()),
            model_view: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_framing_is_rotation() {
        let rotation = Matrix4::from_angle_z(Rad(0.7f32));
        let uniform = SceneUniform::new(&Framing::flat(), rotation);

        assert_eq!(uniform.transform(), rotation);
    }

    #[test]
    fn test_backdrop_fills_view() {
        let framing = Framing::backdrop(720, 1280);
        let uniform = SceneUniform::new(&framing, Matrix4::identity());
        let transform = uniform.transform();

        // the quad corner lands well outside the visible square
        let corner = transform * Vector4::new(1.0, 1.0, 0.0, 1.0);
        assert!(corner.x / corner.w > 1.0);
        assert!(corner.y / corner.w > 1.0);

        // and stays inside the depth range
        let depth = corner.z / corner.w;
        assert!((0.0..=1.0).contains(&depth), "depth = {depth}");
    }

    #[test]
    fn test_resize_ignores_zero() {
        let mut projection = Framing::backdrop(800, 400).projection;
        projection.resize(0, 0);

        match projection {
            Projection::Perspective { aspect, .. } => assert_eq!(aspect, 2.0),
            Projection::Identity => unreachable!(),
        }
    }
}
