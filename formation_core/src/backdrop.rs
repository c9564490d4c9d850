//! Static backdrop: distant star shell and drifting gold sparkles.
//!
//! Neither reacts to formation progress.

use std::f32::consts::TAU;

use nalgebra::Vector3;
use rand::Rng;

use crate::population::rng_for;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub position:   Vector3<f32>,
    /// Base brightness in [0.3, 1].
    pub brightness: f32,
    pub phase:      f32,
}

/// Stars on a thick shell from `radius` to `radius + depth`.
#[derive(Clone, Debug)]
pub struct StarField {
    pub stars: Vec<Star>,
}

impl StarField {
    pub fn generate(count: usize, radius: f32, depth: f32, seed: Option<u64>) -> Self {
        let mut rng = rng_for(seed.map(|s| s ^ 0x5AA5_0F0F));
        let stars = (0..count).map(|_| {
            let r = radius + rng.gen::<f32>() * depth;
            let theta = rng.gen::<f32>() * TAU;
            let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
            Star {
                position: Vector3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.cos(),
                    r * phi.sin() * theta.sin(),
                ),
                brightness: 0.3 + 0.7 * rng.gen::<f32>(),
                phase: rng.gen::<f32>() * TAU,
            }
        }).collect();
        StarField { stars }
    }

    /// Brightness of `star` at `elapsed`, slowly pulsing around its base.
    pub fn twinkle(star: &Star, elapsed: f32) -> f32 {
        (star.brightness * (0.75 + 0.25 * (elapsed + star.phase).sin())).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sparkle {
    pub anchor: Vector3<f32>,
    pub phase:  f32,
}

/// Gold motes scattered through a cube of side `scale`, bobbing in place.
#[derive(Clone, Debug)]
pub struct Sparkles {
    pub motes: Vec<Sparkle>,
    pub speed: f32,
}

impl Sparkles {
    pub fn generate(count: usize, scale: f32, speed: f32, seed: Option<u64>) -> Self {
        let mut rng = rng_for(seed.map(|s| s ^ 0x0F0F_5AA5));
        let half = scale / 2.0;
        let motes = (0..count).map(|_| Sparkle {
            anchor: Vector3::new(
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
            ),
            phase: rng.gen::<f32>() * TAU,
        }).collect();
        Sparkles { motes, speed }
    }

    /// Drift amplitude is fixed at 0.5 units per axis.
    pub fn position(&self, mote: &Sparkle, elapsed: f32) -> Vector3<f32> {
        let t = elapsed * self.speed + mote.phase;
        mote.anchor + Vector3::new(t.sin(), (t * 0.7).cos(), (t * 1.3).sin()) * 0.5
    }

    /// Opacity flicker in [0, 1].
    pub fn flicker(&self, mote: &Sparkle, elapsed: f32) -> f32 {
        0.5 + 0.5 * (elapsed * self.speed * 4.0 + mote.phase * 3.0).sin()
    }
}
