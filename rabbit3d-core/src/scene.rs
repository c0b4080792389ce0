/// Scene graph: owned objects, the camera and world normalisation
use log::trace;
use nalgebra::Matrix4;

use crate::camera::Camera;
use crate::controller::{FrameInput, FreeCameraController};
use crate::object::{Light, SceneObject};
use crate::render::{DrawContext, RenderTarget};
use crate::transform::Transform;

/// Stable handle to an object owned by a [`Scene`].
///
/// Handles compare by identity: two objects with identical contents still
/// get distinct handles, and a handle is never reused within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

/// Owns every scene object plus the camera, and maps the logical world
/// extent onto a roughly unit-sized world.
///
/// `scale_factor = 1 / max(width, height, depth)` is recomputed on every
/// extent change and applied uniformly to each object's local model at draw
/// time. Extents are expected to be positive; zero gives an infinite factor
/// and negative values give meaningless scales.
#[derive(Debug)]
pub struct Scene {
    width: f32,
    height: f32,
    depth: f32,
    scale_factor: f32,

    camera: Camera,
    objects: Vec<(ObjectId, SceneObject)>,
    next_id: u64,
    light: ObjectId,

    time: f32,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_extent(1.0, 1.0, 1.0)
    }

    /// Create a scene whose logical world spans `width x height x depth` units
    pub fn with_extent(width: f32, height: f32, depth: f32) -> Self {
        let mut scene = Self {
            width,
            height,
            depth,
            scale_factor: 1.0,
            camera: Camera::default(),
            objects: Vec::new(),
            next_id: 0,
            light: ObjectId(0),
            time: 0.0,
        };
        scene.update_scale_factor();
        scene.light = scene.add_object(Light::new());
        scene
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.update_scale_factor();
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        self.update_scale_factor();
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
        self.update_scale_factor();
    }

    pub fn extent(&self) -> (f32, f32, f32) {
        (self.width, self.height, self.depth)
    }

    pub fn set_extent(&mut self, width: f32, height: f32, depth: f32) {
        self.width = width;
        self.height = height;
        self.depth = depth;
        self.update_scale_factor();
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The scene's light, unless it has been removed from the object list
    pub fn light(&self) -> Option<&Light> {
        self.object(self.light).and_then(SceneObject::as_light)
    }

    pub fn light_mut(&mut self) -> Option<&mut Light> {
        let id = self.light;
        self.object_mut(id).and_then(SceneObject::as_light_mut)
    }

    pub fn light_id(&self) -> ObjectId {
        self.light
    }

    /// Seconds of simulated time accumulated through [`Scene::advance`]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Objects in insertion order
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> + '_ {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Take ownership of `object`, appending it to the draw order
    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push((id, object.into()));
        id
    }

    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.position_of(id).map(|index| &self.objects[index].1)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.position_of(id).map(|index| &mut self.objects[index].1)
    }

    /// Drop the object behind `id`; unknown handles are ignored
    pub fn remove_object(&mut self, id: ObjectId) {
        self.objects.retain(|(candidate, _)| *candidate != id);
    }

    /// Hand ownership of the object behind `id` back to the caller
    pub fn take_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.position_of(id)?;
        Some(self.objects.remove(index).1)
    }

    /// `local * uniform_scale(scale_factor)`, the matrix an object is drawn with
    pub fn scaled_model_matrix(&self, object: &SceneObject) -> Matrix4<f32> {
        Transform::scaled_model(object.model(), self.scale_factor)
    }

    /// Apply one frame of input to the camera and move animations forward
    pub fn process_frame(&mut self, input: &FrameInput, controller: &mut FreeCameraController) {
        controller.update(&mut self.camera, input);
        self.advance(input.delta_seconds);
    }

    pub fn advance(&mut self, delta_seconds: f32) {
        self.time += delta_seconds;
        let time = self.time;
        for (_, object) in &mut self.objects {
            object.animate(time);
        }
    }

    /// Submit every object to `target` in insertion order
    pub fn draw_objects(&self, target: &mut dyn RenderTarget) {
        let ctx = DrawContext {
            view: self.camera.view(),
            projection: self.camera.projection(),
            camera_position: self.camera.position(),
            light: self.light(),
            time: self.time,
        };

        for (id, object) in &self.objects {
            trace!("drawing {id:?}");
            object.draw(&ctx, self.scaled_model_matrix(object), target);
        }
    }

    fn position_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|(candidate, _)| *candidate == id)
    }

    fn update_scale_factor(&mut self) {
        self.scale_factor = 1.0 / self.width.max(self.height).max(self.depth);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use nalgebra::{Point3, Vector3, Vector4};

    use super::*;
    use crate::controller::KeyState;
    use crate::geometry::Mesh;
    use crate::object::ModelObject;
    use crate::render::DrawCall;
    use crate::shader::ShaderKind;

    /// Records what a frame driver would have been asked to draw
    #[derive(Default)]
    struct DrawLog {
        calls: Vec<(ShaderKind, usize, Matrix4<f32>, [f32; 4])>,
    }

    impl RenderTarget for DrawLog {
        fn submit(&mut self, call: &DrawCall<'_>) {
            self.calls.push((
                call.shader.kind(),
                call.mesh.facet_count(),
                call.model,
                call.uniforms.object_color,
            ));
        }
    }

    fn still_model(size: f32) -> ModelObject {
        ModelObject::new(Rc::new(Mesh::cube(size))).with_spin(None)
    }

    #[test]
    fn test_scale_factor_from_extent() {
        for (w, h, d) in [(1.0, 1.0, 1.0), (50.0, 50.0, 50.0), (4.0, 16.0, 8.0), (0.5, 0.25, 2.0)] {
            let scene = Scene::with_extent(w, h, d);
            let max: f32 = [w, h, d].into_iter().fold(f32::MIN, f32::max);
            assert_eq!(scene.scale_factor(), 1.0 / max);
        }
    }

    #[test]
    fn test_scale_factor_follows_each_dimension() {
        let mut scene = Scene::new();
        assert_eq!(scene.scale_factor(), 1.0);

        scene.set_width(10.0);
        assert_eq!(scene.scale_factor(), 0.1);
        scene.set_depth(20.0);
        assert_eq!(scene.scale_factor(), 1.0 / 20.0);
        scene.set_height(40.0);
        assert_eq!(scene.scale_factor(), 1.0 / 40.0);
        scene.set_extent(2.0, 1.0, 1.0);
        assert_eq!(scene.scale_factor(), 0.5);
        assert_eq!(scene.extent(), (2.0, 1.0, 1.0));
    }

    #[test]
    fn test_zero_extent_is_degenerate() {
        // Known sharp edge: zero extent is not rejected
        let scene = Scene::with_extent(0.0, 0.0, 0.0);
        assert!(scene.scale_factor().is_infinite());
    }

    #[test]
    fn test_scaled_identity_is_uniform_scale() {
        let mut scene = Scene::with_extent(4.0, 2.0, 8.0);
        let id = scene.add_object(ModelObject::empty());
        let object = scene.object(id).unwrap();

        let expected = Matrix4::from_diagonal(&Vector4::new(0.125, 0.125, 0.125, 1.0));
        assert_eq!(scene.scaled_model_matrix(object), expected);
    }

    #[test]
    fn test_scaled_model_keeps_local_translation() {
        let mut scene = Scene::with_extent(10.0, 10.0, 10.0);
        let mut object = SceneObject::from(ModelObject::empty());
        object.set_model(Transform::translation(&Vector3::new(1.0, 2.0, 3.0)));
        let id = scene.add_object(object);

        let scaled = scene.scaled_model_matrix(scene.object(id).unwrap());
        let p = scaled.transform_point(&Point3::new(10.0, 0.0, 0.0));
        assert!((p - Point3::new(2.0, 2.0, 3.0)).norm() < 1e-6);
    }

    #[test]
    fn test_new_scene_owns_light() {
        let scene = Scene::new();
        assert_eq!(scene.len(), 1);
        assert!(scene.contains_object(scene.light_id()));
        assert!(scene.light().is_some());
    }

    #[test]
    fn test_removal_is_by_identity() {
        let mut scene = Scene::new();
        let a = scene.add_object(still_model(1.0));
        let b = scene.add_object(still_model(1.0));
        assert_eq!(scene.object(a).unwrap().model(), scene.object(b).unwrap().model());

        scene.remove_object(a);
        assert!(!scene.contains_object(a));
        assert!(scene.contains_object(b));
        assert_eq!(scene.objects().filter(|(_, o)| o.as_model().is_some()).count(), 1);
    }

    #[test]
    fn test_missing_handles_are_no_ops() {
        let mut scene = Scene::new();
        let id = scene.add_object(still_model(1.0));
        scene.remove_object(id);

        scene.remove_object(id);
        assert!(scene.take_object(id).is_none());
        assert!(scene.object(id).is_none());
        assert!(scene.object_mut(id).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_take_object_transfers_ownership() {
        let mut scene = Scene::new();
        let id = scene.add_object(still_model(3.0));

        let taken = scene.take_object(id).unwrap();
        assert!(!scene.contains_object(id));
        assert_eq!(
            taken.as_model().and_then(ModelObject::mesh).map(|m| m.facet_count()),
            Some(12)
        );

        // Re-adding gives a fresh handle
        let again = scene.add_object(taken);
        assert_ne!(again, id);
    }

    #[test]
    fn test_removing_light_clears_light_accessor() {
        let mut scene = Scene::new();
        let light = scene.light_id();
        scene.remove_object(light);
        assert!(scene.light().is_none());
        assert!(scene.light_mut().is_none());
    }

    #[test]
    fn test_draw_order_and_skips() {
        let mut scene = Scene::with_extent(2.0, 2.0, 2.0);
        scene.add_object(still_model(1.0).with_color([1.0, 0.0, 0.0, 1.0]));
        scene.add_object(ModelObject::new(Rc::new(Mesh::new())));
        scene.add_object(ModelObject::empty());
        scene.add_object(still_model(1.0).with_color([0.0, 0.0, 1.0, 1.0]));

        let mut log = DrawLog::default();
        scene.draw_objects(&mut log);

        // Hidden lamp and meshless/empty objects submit nothing
        assert_eq!(log.calls.len(), 2);
        assert_eq!(log.calls[0].0, ShaderKind::Phong);
        assert_eq!(log.calls[0].3, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(log.calls[1].3, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(log.calls[0].2, Transform::uniform_scale(0.5));
    }

    #[test]
    fn test_visible_lamp_draws_flat() {
        let mut scene = Scene::with_extent(50.0, 50.0, 50.0);
        scene.light_mut().unwrap().set_lamp_visible(true);

        let mut log = DrawLog::default();
        scene.draw_objects(&mut log);

        assert_eq!(log.calls.len(), 1);
        let (kind, facets, model, _) = log.calls[0];
        assert_eq!(kind, ShaderKind::Flat);
        assert_eq!(facets, 12);
        let expected = Transform::translation(&Vector3::new(1.0, 1.0, 1.0))
            * Transform::uniform_scale(1.0 / 50.0);
        assert!((model - expected).norm() < 1e-6);
    }

    #[test]
    fn test_process_frame_moves_camera_and_spins() {
        let mut scene = Scene::new();
        let id = scene.add_object(ModelObject::new(Rc::new(Mesh::cube(1.0))));
        let mut controller = FreeCameraController::new();

        let input = FrameInput {
            keys: KeyState {
                forward: true,
                ..Default::default()
            },
            cursor: None,
            delta_seconds: 0.2,
        };
        scene.process_frame(&input, &mut controller);

        assert!((scene.camera().position() - Point3::new(0.0, 0.0, 2.0)).norm() < 1e-5);
        assert!((scene.time() - 0.2).abs() < 1e-6);
        assert_ne!(*scene.object(id).unwrap().model(), Matrix4::identity());
    }
}
