//! Flythrough camera path.
//!
//! The camera drifts down the road at a constant z step per frame (the same
//! frame-rate-dependent model the rain uses), with sinusoidal lateral sway
//! and vertical bob driven by elapsed wall-clock time. When z passes the
//! wrap threshold it jumps back to the reset value: a finite repeating loop.

use glam::Vec3;

use crate::config::CameraConfig;

/// Camera position and look-at target for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// Compute the pose for one frame.
///
/// Pure: identical `(elapsed, prev_z)` inputs produce bit-identical output.
/// Returns the pose and the z value to carry into the next frame.
pub fn compute_pose(cfg: &CameraConfig, elapsed: f32, prev_z: f32) -> (CameraPose, f32) {
    let mut z = prev_z - cfg.z_step;
    if z < cfg.wrap_threshold {
        z = cfg.wrap_reset;
    }

    let x = (elapsed * cfg.sway_frequency).sin() * cfg.sway_amplitude;
    let y = cfg.base_height + (elapsed * cfg.bob_frequency).sin() * cfg.bob_amplitude;

    let pose = CameraPose {
        position: Vec3::new(x, y, z),
        look_at: Vec3::new(0.0, cfg.look_height, z - cfg.look_ahead),
    };
    (pose, z)
}

/// Owns the single piece of path state (current z) and feeds the pure
/// function each frame.
pub struct FlightPath {
    cfg: CameraConfig,
    z: f32,
}

impl FlightPath {
    pub fn new(cfg: CameraConfig) -> Self {
        let z = cfg.wrap_reset;
        Self { cfg, z }
    }

    /// Step the path by one frame and return the new pose.
    pub fn advance(&mut self, elapsed: f32) -> CameraPose {
        let (pose, z) = compute_pose(&self.cfg, elapsed, self.z);
        self.z = z;
        pose
    }

    /// Current z coordinate of the path.
    #[inline]
    pub fn z(&self) -> f32 {
        self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cfg() -> CameraConfig {
        CameraConfig {
            z_step: 0.4,
            wrap_threshold: -400.0,
            wrap_reset: 400.0,
            ..CameraConfig::default()
        }
    }

    #[test]
    fn pose_is_deterministic() {
        let cfg = test_cfg();
        let (a, za) = compute_pose(&cfg, 12.375, -31.6);
        let (b, zb) = compute_pose(&cfg, 12.375, -31.6);
        assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
        assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
        assert_eq!(a.position.z.to_bits(), b.position.z.to_bits());
        assert_eq!(a.look_at, b.look_at);
        assert_eq!(za.to_bits(), zb.to_bits());
    }

    #[test]
    fn z_decreases_by_the_configured_step() {
        let cfg = test_cfg();
        let (pose, z) = compute_pose(&cfg, 0.0, 100.0);
        assert!((z - 99.6).abs() < 1e-5);
        assert_eq!(pose.position.z, z);
    }

    #[test]
    fn z_wraps_after_the_full_loop() {
        let cfg = test_cfg();
        // From z=0 the threshold is one step further than 400/0.4 frames away.
        let expected = (-cfg.wrap_threshold / cfg.z_step) as u32 + 1;

        let mut z = 0.0f32;
        let mut wrapped_at = None;
        for frame in 1..=expected + 2 {
            let (_, next) = compute_pose(&cfg, 0.0, z);
            if next > z {
                wrapped_at = Some((frame, next));
                break;
            }
            z = next;
        }

        let (frame, next) = wrapped_at.expect("camera never wrapped");
        assert_eq!(next, cfg.wrap_reset);
        // One frame of tolerance for accumulated float error.
        assert!(frame.abs_diff(expected) <= 1, "wrapped at frame {}", frame);
    }

    #[test]
    fn look_at_tracks_ahead_of_the_camera() {
        let cfg = test_cfg();
        let (pose, z) = compute_pose(&cfg, 3.0, 50.0);
        assert_eq!(pose.look_at.z, z - cfg.look_ahead);
        assert_eq!(pose.look_at.y, cfg.look_height);
        assert_eq!(pose.look_at.x, 0.0);
    }

    #[test]
    fn sway_stays_within_amplitude() {
        let cfg = test_cfg();
        for i in 0..500 {
            let (pose, _) = compute_pose(&cfg, i as f32 * 0.137, 0.0);
            assert!(pose.position.x.abs() <= cfg.sway_amplitude + 1e-4);
            assert!((pose.position.y - cfg.base_height).abs() <= cfg.bob_amplitude + 1e-4);
        }
    }
}
