/// Model matrix builders and the scene's world normalisation
use nalgebra::{Matrix3, Matrix4, Point3, Unit, Vector3};

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation of `radians` about `axis`; the axis need not be normalised
    pub fn axis_angle(axis: &Vector3<f32>, radians: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Unit::new_normalize(*axis), radians)
    }

    /// Create a translation matrix
    pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    pub fn uniform_scale(factor: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(factor)
    }

    /// Compose an authored local model with a uniform scale applied last,
    /// i.e. `local * scale`, so vertices are scaled before the local
    /// rotation and translation act on them.
    pub fn scaled_model(local: &Matrix4<f32>, factor: f32) -> Matrix4<f32> {
        local * Self::uniform_scale(factor)
    }

    /// Inverse-transpose of the upper 3x3 block, for carrying normals to world space
    pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
        let linear = model.fixed_view::<3, 3>(0, 0).into_owned();
        linear
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear)
    }

    pub fn transform_point(model: &Matrix4<f32>, point: &Point3<f32>) -> Point3<f32> {
        model.transform_point(point)
    }

    /// Carry a model-space point through `mvp` to viewport pixels plus NDC depth.
    ///
    /// Returns `None` for points behind the eye or outside the clip volume.
    pub fn project_to_viewport(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let ndc = to_ndc(mvp, point)?;
        if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }
        Some(ndc_to_viewport(&ndc, width, height))
    }

    /// Like [`Transform::project_to_viewport`], but only points behind the
    /// eye are rejected. Off-screen points and depths beyond the near/far
    /// planes come back as-is for the rasterizer to clip per pixel.
    pub fn project_unclipped(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let ndc = to_ndc(mvp, point)?;
        Some(ndc_to_viewport(&ndc, width, height))
    }
}

fn to_ndc(mvp: &Matrix4<f32>, point: &Point3<f32>) -> Option<Vector3<f32>> {
    let clip = mvp * point.to_homogeneous();

    // Prevent division by near-zero or negative w
    if clip.w < 1e-6 {
        return None;
    }
    Some(clip.xyz() / clip.w)
}

fn ndc_to_viewport(ndc: &Vector3<f32>, width: u32, height: u32) -> (f32, f32, f32) {
    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
    (screen_x, screen_y, ndc.z)
}
