//! Per-entity transform evaluation.
//!
//! [`evaluate`] is a pure function of (record, progress, elapsed): it holds
//! no state and never writes to the record, so calling it twice with the same
//! arguments yields the same transform.

use std::f32::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};

use crate::easing::EasingPolicy;
use crate::population::{EntityRecord, PopulationKind};

/// Foliage jitters once raw progress passes this.
pub const SETTLE_THRESHOLD: f32 = 0.8;
/// Cards face the trunk once their eased time passes this.
pub const CARD_FACING_THRESHOLD: f32 = 0.8;

pub const EMERALD: u32 = 0x005C29;
pub const IVORY:   u32 = 0xFFFFF0;

/// Everything the renderer needs for one entity this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityTransform {
    pub position:    Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub scale:       f32,
    /// Packed `0x00RRGGBB`.
    pub color:       u32,
    pub alpha:       f32,
    /// Screen-space size hint for point sprites.
    pub point_size:  f32,
    /// The eased blend factor that produced `position`.
    pub blend:       f32,
}

/// Transform for `record` of population `kind`.
pub fn evaluate(kind: PopulationKind, record: &EntityRecord, progress: f32, elapsed: f32) -> EntityTransform {
    match kind {
        PopulationKind::Foliage  => foliage(record, progress, elapsed),
        PopulationKind::Ornament => ornament(record, progress, elapsed),
        PopulationKind::Card     => card(record, progress, elapsed),
    }
}

fn foliage(record: &EntityRecord, progress: f32, elapsed: f32) -> EntityTransform {
    let e = EasingPolicy::FOLIAGE.eased(progress, record.phase);
    let mut position = record.chaos.lerp(&record.target, e);

    if progress > SETTLE_THRESHOLD {
        position.x += (elapsed * 2.0 + position.y).sin() * 0.05 * e;
        position.z += (elapsed * 1.5 + position.y).cos() * 0.05 * e;
    }

    EntityTransform {
        position,
        orientation: UnitQuaternion::identity(),
        scale:       1.0,
        color:       EMERALD,
        alpha:       0.6 + 0.4 * e,
        point_size:  4.0 * record.phase + 2.0,
        blend:       e,
    }
}

fn ornament(record: &EntityRecord, progress: f32, elapsed: f32) -> EntityTransform {
    let e = EasingPolicy::ORNAMENT.eased(progress, record.phase);
    let spin = elapsed * record.phase;

    EntityTransform {
        position:    record.chaos.lerp(&record.target, e),
        orientation: euler_xyz(spin, spin, 0.0),
        scale:       record.scale,
        color:       record.color.map(|c| c.rgb()).unwrap_or(0xFFD700),
        alpha:       1.0,
        point_size:  record.scale,
        blend:       e,
    }
}

fn card(record: &EntityRecord, progress: f32, elapsed: f32) -> EntityTransform {
    let e = EasingPolicy::CARD.eased(progress, record.phase);
    let position = record.chaos.lerp(&record.target, e);

    let orientation = if e > CARD_FACING_THRESHOLD {
        face_trunk(&position, record.target.y)
    } else {
        euler_xyz(elapsed * 0.2 * record.phase, 0.0, elapsed * 0.1)
    };

    EntityTransform {
        position,
        orientation,
        scale:      record.scale,
        color:      IVORY,
        alpha:      1.0,
        point_size: 1.0,
        blend:      e,
    }
}

/// Point local +Z at the trunk axis (at height `axis_y`), then turn 180° so
/// the card's front faces outward.
fn face_trunk(position: &Vector3<f32>, axis_y: f32) -> UnitQuaternion<f32> {
    let flip = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI);
    let dir = Vector3::new(-position.x, axis_y - position.y, -position.z);
    let horizontal = (dir.x * dir.x + dir.z * dir.z).sqrt();
    if horizontal < 1e-5 {
        return flip;
    }
    UnitQuaternion::face_towards(&dir, &Vector3::y()) * flip
}

/// Intrinsic X-then-Y-then-Z rotation.
fn euler_xyz(x: f32, y: f32, z: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x)
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
