//! Entity populations: foliage particles, ornaments, photo cards.
//!
//! Each record is generated once at scene setup and never mutated.  Only the
//! transform derived from it each frame changes (see [`crate::transform`]).

use std::f32::consts::{PI, TAU};

use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Radius of the volumetric foliage chaos sphere.
pub const FOLIAGE_CHAOS_RADIUS: f32 = 15.0;
/// Ornaments sit this far outside the tree envelope.
pub const ORNAMENT_SURFACE_OFFSET: f32 = 0.2;
/// Cards sit this far outside the tree envelope.
pub const CARD_SURFACE_OFFSET: f32 = 0.5;
/// Angle advanced per card along the spiral, radians.
pub const CARD_SPIRAL_STEP: f32 = 0.8;
/// Number of distinct card photos cycled by index.
pub const CARD_PHOTO_SLOTS: usize = 6;

// ════════════════════════════════════════════════════════════════════════════
// TreeShape
// ════════════════════════════════════════════════════════════════════════════

/// Cone silhouette centred on the origin: base at `-height/2`, apex at
/// `+height/2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeShape {
    pub height: f32,
    pub radius: f32,
}

impl Default for TreeShape {
    fn default() -> Self { TreeShape { height: 12.0, radius: 4.5 } }
}

impl TreeShape {
    /// Envelope radius at world height `y`; zero outside the tree.
    pub fn radius_at(&self, y: f32) -> f32 {
        let h = y + self.height / 2.0;
        if self.height <= 0.0 || !(0.0..=self.height).contains(&h) {
            return 0.0;
        }
        self.radius * (1.0 - h / self.height)
    }

    /// True when `p` lies within the silhouette, with `eps` slack on radius.
    pub fn contains(&self, p: &Vector3<f32>, eps: f32) -> bool {
        let h = p.y + self.height / 2.0;
        if h < -eps || h > self.height + eps {
            return false;
        }
        let r = (p.x * p.x + p.z * p.z).sqrt();
        r <= self.radius * (1.0 - h / self.height) + eps
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Records
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PopulationKind {
    Foliage,
    Ornament,
    Card,
}

impl PopulationKind {
    pub const ALL: [PopulationKind; 3] =
        [PopulationKind::Foliage, PopulationKind::Ornament, PopulationKind::Card];

    pub fn name(self) -> &'static str {
        match self {
            PopulationKind::Foliage  => "foliage",
            PopulationKind::Ornament => "ornaments",
            PopulationKind::Card     => "cards",
        }
    }
}

/// Luxury ornament palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrnamentColor {
    Gold,
    Wine,
    Silver,
}

impl OrnamentColor {
    /// Packed `0x00RRGGBB`.
    pub fn rgb(self) -> u32 {
        match self {
            OrnamentColor::Gold   => 0xFFD700,
            OrnamentColor::Wine   => 0x800020,
            OrnamentColor::Silver => 0xC0C0C0,
        }
    }

    /// Gold half the time, otherwise wine or silver evenly.
    fn pick<R: Rng>(rng: &mut R) -> Self {
        if rng.gen::<f32>() > 0.5 {
            OrnamentColor::Gold
        } else if rng.gen::<f32>() > 0.5 {
            OrnamentColor::Wine
        } else {
            OrnamentColor::Silver
        }
    }
}

/// One entity.  Positions and attributes are fixed for its lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    pub chaos:  Vector3<f32>,
    pub target: Vector3<f32>,
    /// Random in [0, 1); desynchronises this entity's timing.
    pub phase:  f32,
    /// Ornament palette entry; `None` for other kinds.
    pub color:  Option<OrnamentColor>,
    pub scale:  f32,
    /// Card photo index; zero for other kinds.
    pub slot:   usize,
}

#[derive(Clone, Debug)]
pub struct Population {
    pub kind:    PopulationKind,
    pub records: Vec<EntityRecord>,
}

impl Population {
    pub fn generate(kind: PopulationKind, count: usize, shape: &TreeShape, seed: Option<u64>) -> Self {
        Population { kind, records: generate(kind, count, shape, seed) }
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Generators
// ════════════════════════════════════════════════════════════════════════════

/// Seeded generators are reproducible; `None` draws from OS entropy.
pub fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None    => ChaCha8Rng::from_entropy(),
    }
}

pub fn generate(kind: PopulationKind, count: usize, shape: &TreeShape, seed: Option<u64>) -> Vec<EntityRecord> {
    let mut rng = rng_for(seed);
    match kind {
        PopulationKind::Foliage  => generate_foliage(count, shape, &mut rng),
        PopulationKind::Ornament => generate_ornaments(count, shape, &mut rng),
        PopulationKind::Card     => generate_cards(count, shape, &mut rng),
    }
}

/// Chaos: uniform in a ball of radius 15.  Target: uniform within the cone.
pub fn generate_foliage<R: Rng>(count: usize, shape: &TreeShape, rng: &mut R) -> Vec<EntityRecord> {
    (0..count).map(|_| {
        let r = rng.gen::<f32>().cbrt() * FOLIAGE_CHAOS_RADIUS;
        let chaos = random_direction(rng) * r;

        let h = rng.gen::<f32>() * shape.height;
        let taper = (1.0 - h / shape.height) * shape.radius;
        let angle = rng.gen::<f32>() * TAU;
        let radius = rng.gen::<f32>().sqrt() * taper;
        let target = Vector3::new(
            radius * angle.cos(),
            h - shape.height / 2.0,
            radius * angle.sin(),
        );

        EntityRecord {
            chaos,
            target,
            phase: rng.gen(),
            color: None,
            scale: 1.0,
            slot:  0,
        }
    }).collect()
}

/// Chaos: shell of radius 10–20.  Target: on the tree surface.
pub fn generate_ornaments<R: Rng>(count: usize, shape: &TreeShape, rng: &mut R) -> Vec<EntityRecord> {
    (0..count).map(|_| {
        let r = 10.0 + rng.gen::<f32>() * 10.0;
        let chaos = random_direction(rng) * r;

        let h = rng.gen::<f32>() * shape.height;
        let taper = (1.0 - h / shape.height) * shape.radius;
        let angle = rng.gen::<f32>() * TAU;
        let radius = taper + ORNAMENT_SURFACE_OFFSET;
        let target = Vector3::new(
            radius * angle.cos(),
            h - shape.height / 2.0,
            radius * angle.sin(),
        );

        let color = OrnamentColor::pick(rng);
        let scale = 0.2 + rng.gen::<f32>() * 0.3;
        EntityRecord {
            chaos,
            target,
            phase: rng.gen(),
            color: Some(color),
            scale,
            slot:  0,
        }
    }).collect()
}

/// Chaos: distant shell, radius 20–30.  Target: rising spiral, in index order.
pub fn generate_cards<R: Rng>(count: usize, shape: &TreeShape, rng: &mut R) -> Vec<EntityRecord> {
    let spiral_height = shape.height - 1.0;
    (0..count).map(|i| {
        let r = 20.0 + rng.gen::<f32>() * 10.0;
        let theta = rng.gen::<f32>() * TAU;
        let phi = rng.gen::<f32>() * PI;
        let chaos = Vector3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        );

        let y = (i as f32 / count as f32) * spiral_height - spiral_height / 2.0;
        let radius = (1.0 - (y + spiral_height / 2.0) / shape.height) * shape.radius
            + CARD_SURFACE_OFFSET;
        let angle = i as f32 * CARD_SPIRAL_STEP;
        let target = Vector3::new(radius * angle.cos(), y, radius * angle.sin());

        EntityRecord {
            chaos,
            target,
            phase: rng.gen(),
            color: None,
            scale: 1.0,
            slot:  i % CARD_PHOTO_SLOTS,
        }
    }).collect()
}

/// Unit vector uniform on the sphere (azimuth uniform, polar via acos).
fn random_direction<R: Rng>(rng: &mut R) -> Vector3<f32> {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    Vector3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
