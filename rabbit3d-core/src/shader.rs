/// Shading programs and their process-wide registry
use std::sync::OnceLock;

use log::debug;
use nalgebra::{Point3, Vector3};

/// Shader programs known to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Ambient + diffuse + specular from a single point light
    Phong,
    /// Solid light colour, used for the lamp marker
    Flat,
}

/// Per-draw values a shader reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub object_color: [f32; 4],
    pub light_color: [f32; 4],
    pub light_position: Point3<f32>,
    pub camera_position: Point3<f32>,
    pub ambient_strength: f32,
    pub specular_strength: f32,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            object_color: [1.0; 4],
            light_color: [1.0; 4],
            light_position: Point3::new(1.0, 1.0, 1.0),
            camera_position: Point3::new(0.0, 0.0, 3.0),
            ambient_strength: 0.1,
            specular_strength: 0.5,
        }
    }
}

/// A surface sample in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

/// A program that turns a fragment into a linear RGB colour
pub trait Shader: Send + Sync {
    fn kind(&self) -> ShaderKind;

    fn shade(&self, fragment: &Fragment, uniforms: &Uniforms) -> [f32; 3];
}

#[derive(Debug)]
pub struct PhongShader {
    pub shininess: f32,
}

impl PhongShader {
    pub fn new() -> Self {
        Self { shininess: 32.0 }
    }
}

impl Default for PhongShader {
    fn default() -> Self {
        Self::new()
    }
}

impl Shader for PhongShader {
    fn kind(&self) -> ShaderKind {
        ShaderKind::Phong
    }

    fn shade(&self, fragment: &Fragment, uniforms: &Uniforms) -> [f32; 3] {
        let light = rgb(&uniforms.light_color);
        let object = rgb(&uniforms.object_color);

        let normal = fragment.normal.normalize();
        let light_dir = (uniforms.light_position - fragment.position).normalize();
        let view_dir = (uniforms.camera_position - fragment.position).normalize();
        let reflect_dir = reflect(&-light_dir, &normal);

        let ambient = uniforms.ambient_strength;
        let diffuse = normal.dot(&light_dir).max(0.0);
        // No highlight on faces turned away from the light
        let specular = if diffuse > 0.0 {
            uniforms.specular_strength * view_dir.dot(&reflect_dir).max(0.0).powf(self.shininess)
        } else {
            0.0
        };

        let lit = light * (ambient + diffuse + specular);
        let color = lit.component_mul(&object);
        [color.x, color.y, color.z]
    }
}

#[derive(Debug, Default)]
pub struct FlatShader;

impl Shader for FlatShader {
    fn kind(&self) -> ShaderKind {
        ShaderKind::Flat
    }

    fn shade(&self, _fragment: &Fragment, uniforms: &Uniforms) -> [f32; 3] {
        let [r, g, b, _] = uniforms.light_color;
        [r, g, b]
    }
}

/// Fetch the shared instance for `kind`, building it on first request.
///
/// Instances live until process exit and are never evicted.
pub fn load_cached_shader(kind: ShaderKind) -> &'static dyn Shader {
    static PHONG: OnceLock<PhongShader> = OnceLock::new();
    static FLAT: OnceLock<FlatShader> = OnceLock::new();

    match kind {
        ShaderKind::Phong => PHONG.get_or_init(|| {
            debug!("compiling {kind:?} shader");
            PhongShader::new()
        }),
        ShaderKind::Flat => FLAT.get_or_init(|| {
            debug!("compiling {kind:?} shader");
            FlatShader
        }),
    }
}

fn rgb(color: &[f32; 4]) -> Vector3<f32> {
    Vector3::new(color[0], color[1], color[2])
}

fn reflect(incident: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(incident))
}
