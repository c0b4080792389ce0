/// Free-camera update policy: WASD-style movement and mouse-look
use nalgebra::Vector3;

use crate::camera::Camera;

/// Degrees of yaw/pitch per unit of cursor travel
pub const MOUSE_SENSITIVITY: f32 = 0.1;

/// Pitch limit in degrees, short of the poles where the basis flips
pub const PITCH_LIMIT: f32 = 89.0;

/// Keys held during the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub quit: bool,
}

/// Everything the driver samples from the input layer once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub keys: KeyState,
    /// Absolute cursor position, if the input layer has reported one
    pub cursor: Option<(f64, f64)>,
    pub delta_seconds: f32,
}

/// Cursor history carried between frames by the frame driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeCameraController {
    last_cursor: Option<(f64, f64)>,
    sensitivity: f32,
}

impl FreeCameraController {
    pub fn new() -> Self {
        Self {
            last_cursor: None,
            sensitivity: MOUSE_SENSITIVITY,
        }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    /// Forget the last cursor sample; the next one will not move the view
    pub fn reset_cursor(&mut self) {
        self.last_cursor = None;
    }

    pub fn update(&mut self, camera: &mut Camera, input: &FrameInput) {
        self.apply_movement(camera, &input.keys, input.delta_seconds);
        if let Some(cursor) = input.cursor {
            self.apply_cursor(camera, cursor);
        }
    }

    /// Move along the camera basis for every held key, then commit once
    pub fn apply_movement(&self, camera: &mut Camera, keys: &KeyState, delta_seconds: f32) {
        let speed = camera.speed() * delta_seconds;
        let moves: [(bool, fn(&Camera) -> Vector3<f32>); 6] = [
            (keys.forward, Camera::front),
            (keys.back, Camera::back),
            (keys.left, Camera::left),
            (keys.right, Camera::right),
            (keys.up, Camera::up),
            (keys.down, Camera::down),
        ];

        let mut position = camera.position();
        for (held, direction) in moves {
            if held {
                position += direction(camera) * speed;
            }
        }
        camera.set_position(position);
    }

    /// Turn the camera by the cursor travel since the last sample.
    ///
    /// Returns the `(yaw, pitch)` in degrees that were committed, or `None`
    /// when the cursor has not moved. The first sample only seeds the history.
    pub fn apply_cursor(&mut self, camera: &mut Camera, cursor: (f64, f64)) -> Option<(f32, f32)> {
        let (last_x, last_y) = *self.last_cursor.get_or_insert(cursor);

        // Screen y grows downwards, pitch grows upwards
        let dx = (cursor.0 - last_x) as f32;
        let dy = (last_y - cursor.1) as f32;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        self.last_cursor = Some(cursor);

        let yaw = camera.yaw() + dx * self.sensitivity;
        let pitch = (camera.pitch() + dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        camera.set_front(front_from_angles(yaw, pitch));

        Some((yaw, pitch))
    }
}

impl Default for FreeCameraController {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit front vector for a yaw/pitch pair in degrees
pub fn front_from_angles(yaw: f32, pitch: f32) -> Vector3<f32> {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vector3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}
