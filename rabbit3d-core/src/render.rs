/// The seam between the scene and whatever actually rasterizes it
use nalgebra::{Matrix4, Point3};

use crate::geometry::Mesh;
use crate::object::Light;
use crate::shader::{Shader, Uniforms};

/// Scene state handed to every object while a frame is being drawn
#[derive(Clone, Copy)]
pub struct DrawContext<'a> {
    pub view: &'a Matrix4<f32>,
    pub projection: &'a Matrix4<f32>,
    pub camera_position: Point3<f32>,
    pub light: Option<&'a Light>,
    /// Seconds since the scene started
    pub time: f32,
}

/// One mesh submission with everything needed to shade it
pub struct DrawCall<'a> {
    pub shader: &'static dyn Shader,
    pub mesh: &'a Mesh,
    /// Local model with the scene's scale factor already applied
    pub model: Matrix4<f32>,
    pub view: &'a Matrix4<f32>,
    pub projection: &'a Matrix4<f32>,
    pub uniforms: Uniforms,
}

impl DrawCall<'_> {
    pub fn mvp(&self) -> Matrix4<f32> {
        self.projection * self.view * self.model
    }
}

/// Consumer of draw calls, implemented by the frame driver
pub trait RenderTarget {
    fn submit(&mut self, call: &DrawCall<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{load_cached_shader, ShaderKind};
    use crate::transform::Transform;
    use nalgebra::Vector3;

    #[test]
    fn test_mvp_applies_model_first() {
        let mesh = Mesh::cube(1.0);
        let view = Transform::translation(&Vector3::new(0.0, 0.0, -5.0));
        let projection = Transform::uniform_scale(2.0);
        let call = DrawCall {
            shader: load_cached_shader(ShaderKind::Flat),
            mesh: &mesh,
            model: Transform::translation(&Vector3::new(1.0, 0.0, 0.0)),
            view: &view,
            projection: &projection,
            uniforms: Uniforms::default(),
        };

        let p = call.mvp().transform_point(&Point3::origin());
        assert!((p - Point3::new(2.0, 0.0, -10.0)).norm() < 1e-6);
        assert_eq!(call.mvp(), projection * view * call.model);
    }
}
