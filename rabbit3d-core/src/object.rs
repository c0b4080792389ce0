/// Drawable scene objects: meshes and the point light
use std::rc::Rc;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Mesh;
use crate::render::{DrawCall, DrawContext, RenderTarget};
use crate::shader::{load_cached_shader, ShaderKind, Uniforms};
use crate::transform::Transform;

/// Edge length of the cube drawn at the light's position
pub const LAMP_SIZE: f32 = 2.0;

/// Constant rotation about a fixed axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub axis: Vector3<f32>,
    pub degrees_per_second: f32,
}

impl Spin {
    pub fn model_at(&self, time: f32) -> Matrix4<f32> {
        Transform::axis_angle(&self.axis, (time * self.degrees_per_second).to_radians())
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self {
            axis: Vector3::new(0.5, 1.0, 0.0),
            degrees_per_second: 50.0,
        }
    }
}

/// A mesh drawn with Phong shading
#[derive(Debug, Clone)]
pub struct ModelObject {
    model: Matrix4<f32>,
    mesh: Option<Rc<Mesh>>,
    spin: Option<Spin>,
    color: Option<[f32; 4]>,
}

impl ModelObject {
    /// A spinning, colour-cycling object drawing `mesh`
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self {
            model: Matrix4::identity(),
            mesh: Some(mesh),
            spin: Some(Spin::default()),
            color: None,
        }
    }

    /// An object with no mesh attached; it draws nothing
    pub fn empty() -> Self {
        Self {
            model: Matrix4::identity(),
            mesh: None,
            spin: None,
            color: None,
        }
    }

    pub fn with_spin(mut self, spin: Option<Spin>) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn mesh(&self) -> Option<&Rc<Mesh>> {
        self.mesh.as_ref()
    }

    pub fn set_mesh(&mut self, mesh: Option<Rc<Mesh>>) {
        self.mesh = mesh;
    }

    pub fn spin(&self) -> Option<&Spin> {
        self.spin.as_ref()
    }

    pub fn set_spin(&mut self, spin: Option<Spin>) {
        self.spin = spin;
    }

    /// Fixed colour if one was set, otherwise a slow cycle through hues
    pub fn color_at(&self, time: f32) -> [f32; 4] {
        self.color.unwrap_or_else(|| {
            [
                time.sin() / 2.0 + 0.3,
                time.cos() / 2.0 + 0.4,
                time.sin() / 2.0 + 0.5,
                1.0,
            ]
        })
    }

    pub fn set_color(&mut self, color: Option<[f32; 4]>) {
        self.color = color;
    }

    fn animate(&mut self, time: f32) {
        if let Some(spin) = &self.spin {
            self.model = spin.model_at(time);
        }
    }

    fn draw(&self, ctx: &DrawContext<'_>, model: Matrix4<f32>, target: &mut dyn RenderTarget) {
        let Some(mesh) = self.mesh.as_deref() else {
            return;
        };
        if mesh.is_empty() {
            return;
        }

        let mut uniforms = Uniforms {
            object_color: self.color_at(ctx.time),
            camera_position: ctx.camera_position,
            ..Default::default()
        };
        if let Some(light) = ctx.light {
            uniforms.light_color = light.color();
            uniforms.light_position = light.position();
            uniforms.ambient_strength = light.ambient_strength();
            uniforms.specular_strength = light.specular_strength();
        }

        target.submit(&DrawCall {
            shader: load_cached_shader(ShaderKind::Phong),
            mesh,
            model,
            view: ctx.view,
            projection: ctx.projection,
            uniforms,
        });
    }
}

/// The scene's single point light, optionally drawn as a small lamp cube
#[derive(Debug, Clone)]
pub struct Light {
    model: Matrix4<f32>,
    position: Point3<f32>,
    color: [f32; 4],
    ambient_strength: f32,
    specular_strength: f32,
    lamp_visible: bool,
    lamp: Rc<Mesh>,
}

impl Light {
    pub fn new() -> Self {
        let mut light = Self {
            model: Matrix4::identity(),
            position: Point3::new(1.0, 1.0, 1.0),
            color: [1.0, 1.0, 1.0, 1.0],
            ambient_strength: 0.1,
            specular_strength: 0.5,
            lamp_visible: false,
            lamp: Rc::new(Mesh::cube(LAMP_SIZE)),
        };
        light.update_model();
        light
    }

    pub fn is_lamp_visible(&self) -> bool {
        self.lamp_visible
    }

    pub fn set_lamp_visible(&mut self, visible: bool) {
        self.lamp_visible = visible;
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        self.update_model();
    }

    pub fn ambient_strength(&self) -> f32 {
        self.ambient_strength
    }

    pub fn set_ambient_strength(&mut self, ambient_strength: f32) {
        self.ambient_strength = ambient_strength;
    }

    pub fn specular_strength(&self) -> f32 {
        self.specular_strength
    }

    pub fn set_specular_strength(&mut self, specular_strength: f32) {
        self.specular_strength = specular_strength;
    }

    pub fn lamp(&self) -> &Mesh {
        &self.lamp
    }

    fn update_model(&mut self) {
        self.model = Transform::translation(&self.position.coords);
    }

    fn draw(&self, ctx: &DrawContext<'_>, model: Matrix4<f32>, target: &mut dyn RenderTarget) {
        if !self.lamp_visible {
            return;
        }

        target.submit(&DrawCall {
            shader: load_cached_shader(ShaderKind::Flat),
            mesh: &self.lamp,
            model,
            view: ctx.view,
            projection: ctx.projection,
            uniforms: Uniforms {
                light_color: self.color,
                light_position: self.position,
                camera_position: ctx.camera_position,
                ..Default::default()
            },
        });
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything the scene can own and draw
#[derive(Debug, Clone)]
pub enum SceneObject {
    Model(ModelObject),
    Light(Light),
}

impl SceneObject {
    /// The authored local transform, before the scene's scale factor
    pub fn model(&self) -> &Matrix4<f32> {
        match self {
            Self::Model(object) => &object.model,
            Self::Light(light) => &light.model,
        }
    }

    pub fn set_model(&mut self, model: Matrix4<f32>) {
        match self {
            Self::Model(object) => object.model = model,
            Self::Light(light) => light.model = model,
        }
    }

    pub fn as_model(&self) -> Option<&ModelObject> {
        match self {
            Self::Model(object) => Some(object),
            Self::Light(_) => None,
        }
    }

    pub fn as_model_mut(&mut self) -> Option<&mut ModelObject> {
        match self {
            Self::Model(object) => Some(object),
            Self::Light(_) => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match self {
            Self::Light(light) => Some(light),
            Self::Model(_) => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match self {
            Self::Light(light) => Some(light),
            Self::Model(_) => None,
        }
    }

    /// Advance any authored animation to `time` seconds
    pub fn animate(&mut self, time: f32) {
        if let Self::Model(object) = self {
            object.animate(time);
        }
    }

    /// Submit this object's draw calls using an already scaled model matrix
    pub fn draw(&self, ctx: &DrawContext<'_>, model: Matrix4<f32>, target: &mut dyn RenderTarget) {
        match self {
            Self::Model(object) => object.draw(ctx, model, target),
            Self::Light(light) => light.draw(ctx, model, target),
        }
    }
}

impl From<ModelObject> for SceneObject {
    fn from(object: ModelObject) -> Self {
        Self::Model(object)
    }
}

impl From<Light> for SceneObject {
    fn from(light: Light) -> Self {
        Self::Light(light)
    }
}
