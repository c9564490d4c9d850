//! Camera choreography.
//!
//! Two behaviours, switched on the discrete formation state rather than the
//! continuous progress:
//!
//! * **Dispersed**: orbit the origin on a horizontal circle.
//! * **Formed**: ease toward a framed view offset by the hand position,
//!   giving a parallax feel as the hand moves.
//!
//! The switch is a hard cut; flipping back to the orbit snaps the camera
//! onto the circle at the current elapsed angle.

use nalgebra::{Isometry3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::formation::HandPosition;
use crate::progress::damp_f32;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub orbit_radius:  f32,
    /// Radians per second.
    pub orbit_rate:    f32,
    /// Per-second damping rate toward the framed target.
    pub follow_rate:   f32,
    /// Horizontal travel per unit of hand x (negative mirrors the webcam).
    pub parallax_x:    f32,
    pub parallax_y:    f32,
    pub lift:          f32,
    pub floor:         f32,
    pub height_offset: f32,
    pub initial:       [f32; 3],
    /// Vertical field of view, degrees.
    pub fov_deg:       f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            orbit_radius:  25.0,
            orbit_rate:    0.2,
            // Matches a 0.03-per-frame lerp at 60 fps: -60 ln(0.97).
            follow_rate:   1.8276,
            parallax_x:    -10.0,
            parallax_y:    5.0,
            lift:          2.0,
            floor:         0.0,
            height_offset: 4.0,
            initial:       [0.0, 4.0, 20.0],
            fov_deg:       45.0,
        }
    }
}

/// Where the camera sits and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f32>,
    pub target:   Point3<f32>,
}

impl CameraPose {
    /// Right-handed world → view transform, +Y up.
    pub fn view(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.position, &self.target, &Vector3::y())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraChoreographer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct CameraChoreographer {
    config: CameraConfig,
    pose:   CameraPose,
}

impl CameraChoreographer {
    pub fn new(config: CameraConfig) -> Self {
        let [x, y, z] = config.initial;
        CameraChoreographer {
            config,
            pose: CameraPose {
                position: Point3::new(x, y, z),
                target:   Point3::origin(),
            },
        }
    }

    pub fn pose(&self) -> CameraPose { self.pose }

    pub fn config(&self) -> &CameraConfig { &self.config }

    /// Framed-view target for a hand position: `(x, y)` only.
    pub fn framed_target(&self, hand: HandPosition) -> (f32, f32) {
        let c = &self.config;
        let x = (hand.x - 0.5) * c.parallax_x;
        let y = ((hand.y - 0.5) * c.parallax_y + c.lift).max(c.floor) + c.height_offset;
        (x, y)
    }

    /// Advance one frame and return the new pose.
    pub fn update(&mut self, dt: f32, elapsed: f32, hand: HandPosition, is_formed: bool) -> CameraPose {
        if is_formed {
            let (tx, ty) = self.framed_target(hand);
            let rate = self.config.follow_rate;
            let pos = &mut self.pose.position;
            pos.x = damp_f32(pos.x, tx, rate, dt);
            pos.y = damp_f32(pos.y, ty, rate, dt);
        } else {
            let angle = elapsed * self.config.orbit_rate;
            let radius = self.config.orbit_radius;
            let pos = &mut self.pose.position;
            pos.x = angle.sin() * radius;
            pos.z = angle.cos() * radius;
        }
        self.pose.target = Point3::origin();
        self.pose
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn choreographer() -> CameraChoreographer {
        CameraChoreographer::new(CameraConfig::default())
    }

    #[test]
    fn orbit_keeps_fixed_radius() {
        let mut c = choreographer();
        for i in 0..50 {
            let p = c.update(1.0 / 60.0, i as f32 * 0.7, HandPosition::default(), false);
            let r = (p.position.x.powi(2) + p.position.z.powi(2)).sqrt();
            assert_relative_eq!(r, 25.0, epsilon = 1e-3);
            assert_eq!(p.target, Point3::origin());
        }
    }

    #[test]
    fn orbit_angle_follows_elapsed_time() {
        let mut c = choreographer();
        let p = c.update(0.016, 5.0, HandPosition::default(), false);
        assert_relative_eq!(p.position.x, (1.0f32).sin() * 25.0, epsilon = 1e-4);
        assert_relative_eq!(p.position.z, (1.0f32).cos() * 25.0, epsilon = 1e-4);
        assert_relative_eq!(p.position.y, 4.0);
    }

    #[test]
    fn framed_target_formula() {
        let c = choreographer();
        let (x, y) = c.framed_target(HandPosition::new(0.5, 0.5));
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 6.0);
        let (x, y) = c.framed_target(HandPosition::new(1.0, 1.0));
        assert_relative_eq!(x, -5.0);
        assert_relative_eq!(y, 8.5);
        // Far below the frame the floor clamp kicks in before the offset.
        let (_, y) = c.framed_target(HandPosition::new(0.5, -1.0));
        assert_relative_eq!(y, 4.0);
    }

    #[test]
    fn formed_camera_converges_without_overshoot() {
        let mut c = choreographer();
        let hand = HandPosition::new(0.9, 0.2);
        let (tx, ty) = c.framed_target(hand);
        let mut prev_gap = f32::MAX;
        for _ in 0..600 {
            let p = c.update(1.0 / 60.0, 0.0, hand, true);
            let gap = (p.position.x - tx).abs() + (p.position.y - ty).abs();
            assert!(gap <= prev_gap + 1e-5);
            prev_gap = gap;
        }
        assert!(prev_gap < 1e-2);
        assert_relative_eq!(c.pose().position.z, 20.0);
    }

    #[test]
    fn follow_is_frame_rate_independent() {
        let hand = HandPosition::new(0.0, 1.0);
        let mut fast = choreographer();
        let mut slow = choreographer();
        for _ in 0..120 { fast.update(1.0 / 120.0, 0.0, hand, true); }
        for _ in 0..30  { slow.update(1.0 / 30.0,  0.0, hand, true); }
        assert_relative_eq!(fast.pose().position.x, slow.pose().position.x, epsilon = 1e-3);
        assert_relative_eq!(fast.pose().position.y, slow.pose().position.y, epsilon = 1e-3);
    }

    #[test]
    fn view_looks_at_origin() {
        let pose = CameraPose { position: Point3::new(0.0, 0.0, 10.0), target: Point3::origin() };
        let v = pose.view() * Point3::origin();
        assert_relative_eq!(v.z, -10.0, epsilon = 1e-5);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-5);
    }
}
