use cgmath::{vec3, Vector3};
use std::f32::consts::FRAC_PI_2;

/// Camera depth when the scene starts
pub const INITIAL_DEPTH: f32 = 5.0;

/// World units travelled per unit of wheel delta
const ZOOM_PER_WHEEL_UNIT: f32 = 0.01;

/// How quickly the camera catches up with its zoom target (1/s)
const ZOOM_DAMPING: f32 = 8.0;

/// Pitch stops just short of straight up/down
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

/// Depths the viewpoint may move between
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelRange {
    pub min: f32,
    pub max: f32,
}

impl TravelRange {
    /// `[min(initial, furthest), max(initial, furthest)]`, where `furthest` is the
    /// smallest object depth. Without objects the range collapses to `initial`.
    pub fn from_depths(initial_depth: f32, object_depths: impl IntoIterator<Item = f32>) -> Self {
        let furthest = object_depths
            .into_iter()
            .fold(None, |acc: Option<f32>, depth| {
                Some(acc.map_or(depth, |min| min.min(depth)))
            })
            .unwrap_or(initial_depth);

        Self {
            min: initial_depth.min(furthest),
            max: initial_depth.max(furthest),
        }
    }

    pub fn clamp(&self, depth: f32) -> f32 {
        depth.clamp(self.min, self.max)
    }

    pub fn contains(&self, depth: f32) -> bool {
        (self.min..=self.max).contains(&depth)
    }
}

/// The camera: a position, a look direction and a smoothed zoom along Z
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    pub position: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    initial_depth: f32,
    target_depth: f32,
    aspect_ratio: f32,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::new(INITIAL_DEPTH)
    }
}

impl Viewpoint {
    pub fn new(initial_depth: f32) -> Self {
        Self {
            position: vec3(0.0, 0.0, initial_depth),
            yaw: 0.0,
            pitch: 0.0,
            initial_depth,
            target_depth: initial_depth,
            aspect_ratio: 1.0,
        }
    }

    pub fn initial_depth(&self) -> f32 {
        self.initial_depth
    }

    /// Depth the camera is easing towards
    pub fn target_depth(&self) -> f32 {
        self.target_depth
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Unit view direction. Yaw 0, pitch 0 looks down -Z.
    pub fn forward(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        vec3(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// Turn the view direction (radians). Pitch is clamped short of the poles.
    pub fn turn(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Wheel movement: push the zoom target by `delta` and keep it inside `range`.
    /// The current position is clamped too, in case the range shrank.
    pub fn zoom(&mut self, delta: f32, range: TravelRange) {
        self.target_depth = range.clamp(self.target_depth + delta * ZOOM_PER_WHEEL_UNIT);
        self.position.z = range.clamp(self.position.z);
    }

    /// Integration step: ease the camera towards its zoom target
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let t = 1.0 - (-ZOOM_DAMPING * dt).exp();
        self.position.z += (self.target_depth - self.position.z) * t;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }
}
