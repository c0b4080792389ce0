/// Rabbit3D Core Library - mesh loading, camera and scene graph
///
/// This library holds everything a frame driver needs to show an STL model:
/// the ASCII STL parser, the free-flying camera, the scene graph with its
/// world normalisation, and the draw-call seam the driver rasterizes from.

pub mod camera;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod object;
pub mod render;
pub mod scene;
pub mod shader;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use camera::Camera;
pub use controller::{FrameInput, FreeCameraController, KeyState};
pub use error::Error;
pub use geometry::{BoundingBox, Facet, Mesh};
pub use object::{Light, ModelObject, SceneObject, Spin};
pub use render::{DrawCall, DrawContext, RenderTarget};
pub use scene::{ObjectId, Scene};
pub use shader::{load_cached_shader, Fragment, Shader, ShaderKind, Uniforms};
pub use transform::Transform;
