/// Free-flying perspective camera
use nalgebra::{Matrix4, Point3, Vector3};

use crate::transform::Transform;

/// Camera with an eagerly maintained view and projection.
///
/// Every mutator recomputes the state that depends on it before returning:
/// `target` tracks `position + front`, the view matrix tracks
/// `(position, target, up)` and the projection tracks
/// `(fov, width / height, near, far)`.
///
/// Inputs are not validated. `set_front` trusts the caller to pass a unit
/// vector, and a zero `height` produces an infinite aspect ratio and a
/// degenerate projection rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Point3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    target: Point3<f32>,

    /// Vertical field of view in degrees
    fov: f32,
    width: f32,
    height: f32,
    near: f32,
    far: f32,

    view: Matrix4<f32>,
    projection: Matrix4<f32>,

    speed: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        let position = Point3::new(0.0, 0.0, 3.0);
        let front = Vector3::new(0.0, 0.0, -1.0);

        let mut camera = Self {
            position,
            front,
            up: Vector3::new(0.0, 1.0, 0.0),
            target: position + front,
            fov: 45.0,
            width,
            height,
            near: 0.1,
            far: 100.0,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            speed: 5.0,
        };
        camera.update_view();
        camera.update_projection();
        camera
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        self.update_target();
        self.update_view();
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    /// `front` must already be unit length; it is stored as given.
    pub fn set_front(&mut self, front: Vector3<f32>) {
        self.front = front;
        self.update_target();
        self.update_view();
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn set_up(&mut self, up: Vector3<f32>) {
        self.up = up;
        self.update_view();
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        self.target = target;
        self.update_front();
        self.update_view();
    }

    pub fn back(&self) -> Vector3<f32> {
        -self.front
    }

    pub fn down(&self) -> Vector3<f32> {
        -self.up
    }

    pub fn left(&self) -> Vector3<f32> {
        self.up.cross(&self.front).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.front.cross(&self.up).normalize()
    }

    /// Heading of `front` in the XZ plane, in degrees
    pub fn yaw(&self) -> f32 {
        self.front.z.atan2(self.front.x).to_degrees()
    }

    /// Elevation of `front` above the XZ plane, in degrees
    pub fn pitch(&self) -> f32 {
        self.front.y.clamp(-1.0, 1.0).asin().to_degrees()
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.update_projection();
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.update_projection();
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        self.update_projection();
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.update_projection();
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
        self.update_projection();
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
        self.update_projection();
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    /// Movement speed in world units per second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Project a model-space point to viewport pixels plus NDC depth.
    ///
    /// Returns `None` for points behind the eye or outside the clip volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection * self.view * model_matrix;
        Transform::project_to_viewport(&mvp, point, width, height)
    }

    fn update_front(&mut self) {
        self.front = (self.target - self.position).normalize();
    }

    fn update_target(&mut self) {
        self.target = self.position + self.front;
    }

    fn update_view(&mut self) {
        self.view = Matrix4::look_at_rh(&self.position, &self.target, &self.up);
    }

    fn update_projection(&mut self) {
        self.projection = perspective(self.fov.to_radians(), self.aspect(), self.near, self.far);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Right-handed perspective with clip-space depth in [-1, 1].
///
/// Built by hand so degenerate inputs produce non-finite entries instead of
/// tripping assertions.
fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let tan_half = (fovy / 2.0).tan();
    let mut m = Matrix4::zeros();
    m[(0, 0)] = 1.0 / (aspect * tan_half);
    m[(1, 1)] = 1.0 / tan_half;
    m[(2, 2)] = (far + near) / (near - far);
    m[(2, 3)] = 2.0 * far * near / (near - far);
    m[(3, 2)] = -1.0;
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_close(a: &Matrix4<f32>, b: &Matrix4<f32>) {
        assert!((a - b).norm() < EPS, "{a} != {b}");
    }

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::default();
        assert_eq!(camera.position(), Point3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.front(), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(camera.up(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(camera.target(), Point3::new(0.0, 0.0, 2.0));
        assert_eq!(camera.fov(), 45.0);
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
        assert!((camera.yaw() + 90.0).abs() < 1e-4);
        assert!(camera.pitch().abs() < 1e-6);
    }

    #[test]
    fn test_view_matches_look_at() {
        let mut camera = Camera::default();
        camera.set_position(Point3::new(1.0, 2.0, 3.0));

        let expected = Matrix4::look_at_rh(
            &Point3::new(1.0, 2.0, 3.0),
            &Point3::new(1.0, 2.0, 2.0),
            &Vector3::y(),
        );
        assert_close(camera.view(), &expected);
    }

    #[test]
    fn test_projection_matches_nalgebra() {
        let mut camera = Camera::new(1920.0, 1080.0);
        camera.set_fov(60.0);
        camera.set_near(0.5);
        camera.set_far(50.0);

        let expected = Matrix4::new_perspective(1920.0 / 1080.0, 60f32.to_radians(), 0.5, 50.0);
        assert_close(camera.projection(), &expected);
    }

    #[test]
    fn test_projection_follows_size() {
        let mut camera = Camera::default();
        let before = *camera.projection();

        camera.set_size(1000.0, 500.0);
        assert_ne!(*camera.projection(), before);
        assert_eq!(camera.size(), (1000.0, 500.0));

        let expected = Matrix4::new_perspective(2.0, 45f32.to_radians(), 0.1, 100.0);
        assert_close(camera.projection(), &expected);
    }

    #[test]
    fn test_front_stays_unit_and_target_follows() {
        let mut camera = Camera::default();
        let fronts = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0).normalize(),
            Vector3::new(-0.3, 0.2, 0.9).normalize(),
            Vector3::new(0.0, -1.0, 1.0).normalize(),
        ];

        for (i, front) in fronts.iter().enumerate() {
            camera.set_front(*front);
            assert!((camera.front().norm() - 1.0).abs() < EPS);
            assert!((camera.target() - (camera.position() + camera.front())).norm() < EPS);

            camera.set_position(Point3::new(i as f32, 2.0 * i as f32, -1.0));
            assert!((camera.target() - (camera.position() + camera.front())).norm() < EPS);

            camera.set_up(Vector3::new(0.0, 1.0, 0.1).normalize());
            assert!((camera.target() - (camera.position() + camera.front())).norm() < EPS);
        }
    }

    #[test]
    fn test_set_target_normalizes_front() {
        let mut camera = Camera::default();
        camera.set_position(Point3::new(0.0, 0.0, 0.0));
        camera.set_target(Point3::new(10.0, 0.0, 0.0));

        assert!((camera.front() - Vector3::x()).norm() < EPS);
        assert_eq!(camera.target(), Point3::new(10.0, 0.0, 0.0));

        // Moving afterwards re-derives target from the unit front
        camera.set_position(Point3::new(0.0, 1.0, 0.0));
        assert!((camera.target() - Point3::new(1.0, 1.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_set_up_only_touches_view() {
        let mut camera = Camera::default();
        let front = camera.front();
        let target = camera.target();
        let view = *camera.view();

        camera.set_up(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(camera.front(), front);
        assert_eq!(camera.target(), target);
        assert_ne!(*camera.view(), view);
    }

    #[test]
    fn test_basis_directions() {
        let camera = Camera::default();
        assert!((camera.right() - Vector3::x()).norm() < EPS);
        assert!((camera.left() + Vector3::x()).norm() < EPS);
        assert!((camera.back() - Vector3::z()).norm() < EPS);
        assert!((camera.down() + Vector3::y()).norm() < EPS);
    }

    #[test]
    fn test_yaw_pitch_round_trip() {
        let mut camera = Camera::default();
        let (yaw, pitch) = (30f32.to_radians(), 20f32.to_radians());
        camera.set_front(Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        ));

        assert!((camera.yaw() - 30.0).abs() < 1e-3);
        assert!((camera.pitch() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_height_is_degenerate_not_a_panic() {
        // Known sharp edge: the aspect ratio divides by height unguarded
        let mut camera = Camera::default();
        camera.set_height(0.0);

        assert!(camera.aspect().is_infinite());
        assert_eq!(camera.projection()[(0, 0)], 0.0);

        camera.set_width(0.0);
        assert!(camera.aspect().is_nan());
        assert!(camera.projection()[(0, 0)].is_nan());
    }

    #[test]
    fn test_project_center_point() {
        let camera = Camera::new(80.0, 40.0);
        let (x, y, depth) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 80, 40)
            .unwrap();

        assert!((x - 40.0).abs() < 1e-3);
        assert!((y - 20.0).abs() < 1e-3);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_project_behind_camera() {
        let camera = Camera::default();
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 80, 40)
            .is_none());
    }
}
