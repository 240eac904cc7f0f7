/// Initial placement of display objects
///
/// Two strategies:
/// - scattered through an ellipsoidal cloud around the origin (startup seeding)
/// - straight ahead of the viewpoint (drag-and-drop), so the new image is visible at once
use cgmath::{vec3, Vector3};
use rand::Rng;
use std::f32::consts::TAU;

use super::viewpoint::Viewpoint;

/// How far ahead of the viewpoint a dropped image appears
pub const DROP_DISTANCE: f32 = 3.0;

/// Shape of the random cloud seeded objects are scattered through
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsoidPlacement {
    /// Largest horizontal distance from the Z axis
    pub max_radius_x: f32,
    /// Largest vertical distance from the Z axis
    pub max_radius_y: f32,
    /// Total depth of the cloud, centered on the origin
    pub depth_spread: f32,
}

impl Default for EllipsoidPlacement {
    fn default() -> Self {
        Self {
            max_radius_x: 6.0,
            max_radius_y: 4.0,
            depth_spread: 20.0,
        }
    }
}

impl EllipsoidPlacement {
    /// Nearest and furthest depth a seeded object can get
    pub fn depth_bounds(&self) -> (f32, f32) {
        let half = self.depth_spread.abs() / 2.0;
        (-half, half)
    }

    /// Pick a position: uniform angle, independent radial extent on X and Y, uniform depth
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f32> {
        let angle = rng.gen_range(0.0..TAU);
        let radius_x = rng.gen_range(0.0..=self.max_radius_x.abs());
        let radius_y = rng.gen_range(0.0..=self.max_radius_y.abs());
        let (near, far) = self.depth_bounds();
        let depth = rng.gen_range(near..=far);

        vec3(angle.cos() * radius_x, angle.sin() * radius_y, depth)
    }
}

/// A point `distance` units along the viewpoint's view direction
pub fn in_front_of(viewpoint: &Viewpoint, distance: f32) -> Vector3<f32> {
    viewpoint.position + viewpoint.forward() * distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_stay_inside_ellipsoid_and_depth_spread() {
        let placement = EllipsoidPlacement::default();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let p = placement.sample(&mut rng);
            let nx = p.x / placement.max_radius_x;
            let ny = p.y / placement.max_radius_y;
            assert!(nx.abs() <= 1.0 + 1e-5 && ny.abs() <= 1.0 + 1e-5);
            assert!((-10.0..=10.0).contains(&p.z));
        }
    }

    #[test]
    fn test_samples_cover_both_sides() {
        let placement = EllipsoidPlacement::default();
        let mut rng = StdRng::seed_from_u64(7);
        let points: Vec<_> = (0..200).map(|_| placement.sample(&mut rng)).collect();

        assert!(points.iter().any(|p| p.x < 0.0) && points.iter().any(|p| p.x > 0.0));
        assert!(points.iter().any(|p| p.z < 0.0) && points.iter().any(|p| p.z > 0.0));
    }

    #[test]
    fn test_flat_cloud_puts_everything_at_origin_depth() {
        let placement = EllipsoidPlacement {
            depth_spread: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(placement.sample(&mut rng).z, 0.0);
    }

    #[test]
    fn test_in_front_of_default_viewpoint() {
        let viewpoint = Viewpoint::default();
        let p = in_front_of(&viewpoint, DROP_DISTANCE);

        assert!((p - vec3(0.0, 0.0, viewpoint.position.z - DROP_DISTANCE)).magnitude() < 1e-6);
    }

    #[test]
    fn test_in_front_of_follows_view_direction() {
        let mut viewpoint = Viewpoint::default();
        viewpoint.turn(std::f32::consts::FRAC_PI_2, 0.0);

        let p = in_front_of(&viewpoint, 2.0);

        assert!(((p - viewpoint.position).magnitude() - 2.0).abs() < 1e-5);
        assert!((p - viewpoint.position).normalize().dot(viewpoint.forward()) > 0.999);
    }
}
