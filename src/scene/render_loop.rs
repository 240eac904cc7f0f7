use cgmath::Rad;
use std::f32::consts::FRAC_PI_4;

use super::manager::SceneState;

/// Largest tilt of a floating image around its vertical axis (45°)
pub const MAX_TILT: Rad<f32> = Rad(FRAC_PI_4);

/// Angular frequency of the tilt (rad/s)
pub const TILT_SPEED: f32 = 0.15;

/// Angular frequency of the sideways drift (rad/s)
pub const DRIFT_SPEED: f32 = 0.1;

/// Sideways drift applied per frame at the peak of the oscillation
pub const DRIFT_STEP: f32 = 0.001;

/// Anything that can draw the scene (a wgpu renderer, a canvas bridge, a test recorder)
pub trait FrameSink {
    fn draw(&mut self, scene: &SceneState);
}

/// Timing of one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Seconds since the previous frame
    pub delta: f64,
    /// Seconds since the first frame
    pub elapsed: f64,
    /// Frames rendered so far, this one included
    pub frame: u64,
}

/// Per-frame animation driver.
///
/// The host calls [`RenderLoop::frame`] from its display callback with a wall-clock
/// timestamp. There is no pause or stop; the loop ends when the host stops calling.
#[derive(Debug, Default)]
pub struct RenderLoop {
    start: Option<f64>,
    last: f64,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance animation to `now` (seconds) and submit the scene for drawing
    pub fn frame<S: FrameSink + ?Sized>(
        &mut self,
        now: f64,
        scene: &mut SceneState,
        sink: &mut S,
    ) -> FrameStats {
        let start = *self.start.get_or_insert(now);
        let delta = if self.frames == 0 {
            0.0
        } else {
            (now - self.last).max(0.0)
        };
        self.last = now;
        self.frames += 1;

        let elapsed = (now - start).max(0.0);
        let t = elapsed as f32;

        let (objects, viewpoint) = scene.animation_parts();
        for obj in objects.iter_mut() {
            obj.transform.rotation.y = MAX_TILT * (t * TILT_SPEED).sin();
            obj.transform.position.x += (t * DRIFT_SPEED).sin() * DRIFT_STEP;
        }
        viewpoint.step(delta as f32);

        sink.draw(scene);

        FrameStats {
            delta,
            elapsed,
            frame: self.frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::manager::DroppedImage;
    use crate::storage::ImageUpload;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder {
        draws: usize,
        objects_seen: Vec<usize>,
    }

    impl FrameSink for Recorder {
        fn draw(&mut self, scene: &SceneState) {
            self.draws += 1;
            self.objects_seen.push(scene.len());
        }
    }

    fn scene_with_assets(n: usize) -> SceneState {
        let mut scene = SceneState::with_rng(StdRng::seed_from_u64(11));
        let assets: Vec<String> = (0..n).map(|i| format!("images/{i}.jpg")).collect();
        scene.seed_from_assets(&assets);
        scene
    }

    #[test]
    fn test_every_frame_is_drawn() {
        let mut scene = scene_with_assets(3);
        let mut sink = Recorder::default();
        let mut render = RenderLoop::new();

        for i in 0..10 {
            render.frame(100.0 + i as f64 / 60.0, &mut scene, &mut sink);
        }

        assert_eq!(sink.draws, 10);
        assert_eq!(sink.objects_seen, vec![3; 10]);
    }

    #[test]
    fn test_timing() {
        let mut scene = scene_with_assets(0);
        let mut sink = Recorder::default();
        let mut render = RenderLoop::new();

        let first = render.frame(10.0, &mut scene, &mut sink);
        assert_eq!(first, FrameStats { delta: 0.0, elapsed: 0.0, frame: 1 });

        let second = render.frame(10.5, &mut scene, &mut sink);
        assert_eq!(second, FrameStats { delta: 0.5, elapsed: 0.5, frame: 2 });

        // A clock going backwards never produces a negative step
        let third = render.frame(10.25, &mut scene, &mut sink);
        assert_eq!(third.delta, 0.0);
    }

    #[test]
    fn test_tilt_is_bounded_and_time_driven() {
        let mut scene = scene_with_assets(4);
        let mut sink = Recorder::default();
        let mut render = RenderLoop::new();

        for i in 0..2000 {
            render.frame(i as f64 * 0.1, &mut scene, &mut sink);
            for obj in scene.objects() {
                assert!(obj.transform.rotation.y.0.abs() <= MAX_TILT.0 + 1e-6);
            }
        }

        // Rotation depends on elapsed time only, so all objects agree
        let tilts: Vec<f32> = scene
            .objects()
            .iter()
            .map(|obj| obj.transform.rotation.y.0)
            .collect();
        let expected = MAX_TILT.0 * (199.9_f32 * TILT_SPEED).sin();
        for tilt in tilts {
            assert!((tilt - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_drift_is_tiny_and_leaves_depth_alone() {
        let mut scene = scene_with_assets(2);
        let before: Vec<_> = scene.objects().iter().map(|o| o.transform.position).collect();
        let mut sink = Recorder::default();
        let mut render = RenderLoop::new();

        for i in 0..60 {
            render.frame(5.0 + i as f64 / 60.0, &mut scene, &mut sink);
        }

        for (obj, start) in scene.objects().iter().zip(before) {
            assert!((obj.transform.position.x - start.x).abs() <= 60.0 * DRIFT_STEP);
            assert_eq!(obj.transform.position.y, start.y);
            assert_eq!(obj.transform.position.z, start.z);
        }
    }

    #[test]
    fn test_viewpoint_integrates_during_frames() {
        let mut scene = scene_with_assets(5);
        let mut sink = Recorder::default();
        let mut render = RenderLoop::new();
        let range = scene.on_wheel(-100_000.0);

        for i in 0..600 {
            render.frame(i as f64 / 60.0, &mut scene, &mut sink);
        }

        assert!((scene.viewpoint().position.z - range.min).abs() < 1e-3);
    }

    #[test]
    fn test_objects_dropped_mid_loop_are_animated() {
        let mut scene = scene_with_assets(0);
        let mut sink = Recorder::default();
        let mut render = RenderLoop::new();

        render.frame(0.0, &mut scene, &mut sink);
        let pending = scene.drop_image(DroppedImage {
            upload: ImageUpload {
                bytes: bytes::Bytes::from_static(b"img"),
                original_name: "x.png".into(),
                content_type: "image/png".into(),
            },
            preview: "blob:x".into(),
        });
        assert!(pending.is_some());
        render.frame(3.0, &mut scene, &mut sink);

        assert_eq!(sink.objects_seen, vec![0, 1]);
        let expected = MAX_TILT.0 * (3.0_f32 * TILT_SPEED).sin();
        assert!((scene.objects()[0].transform.rotation.y.0 - expected).abs() < 1e-6);
    }
}
