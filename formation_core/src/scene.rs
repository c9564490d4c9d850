//! The whole animated scene: observation consumer, progress integrator,
//! populations, camera and backdrop.
//!
//! Two entry points, matching the two cadences:
//!
//! * [`Scene::observe`]: slow, whenever a classifier result lands.
//! * [`Scene::advance`]: every render frame; returns a [`FrameContext`]
//!   snapshot that the per-entity evaluators read.

use serde::{Deserialize, Serialize};

use crate::backdrop::{Sparkles, StarField};
use crate::camera::{CameraChoreographer, CameraConfig, CameraPose};
use crate::formation::{FormationController, FormationState, HandPosition, Observation};
use crate::population::{Population, PopulationKind, TreeShape};
use crate::progress::{ProgressIntegrator, DEFAULT_RATE};
use crate::transform::{evaluate, EntityTransform};

// ════════════════════════════════════════════════════════════════════════════
// SceneConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub foliage_count:  usize,
    pub ornament_count: usize,
    pub card_count:     usize,
    pub star_count:     usize,
    pub sparkle_count:  usize,
    pub tree:           TreeShape,
    /// Progress damping rate, per second.
    pub progress_rate:  f64,
    pub camera:         CameraConfig,
    /// Fixed seed for reproducible layouts; `None` randomises each run.
    pub seed:           Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            foliage_count:  15_000,
            ornament_count: 150,
            card_count:     30,
            star_count:     5_000,
            sparkle_count:  500,
            tree:           TreeShape::default(),
            progress_rate:  DEFAULT_RATE,
            camera:         CameraConfig::default(),
            seed:           None,
        }
    }
}

impl SceneConfig {
    pub fn count(&self, kind: PopulationKind) -> usize {
        match kind {
            PopulationKind::Foliage  => self.foliage_count,
            PopulationKind::Ornament => self.ornament_count,
            PopulationKind::Card     => self.card_count,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameContext
// ════════════════════════════════════════════════════════════════════════════

/// Read-only state shared by every evaluator during one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    pub progress: f32,
    pub elapsed:  f32,
    pub state:    FormationState,
    pub hand:     HandPosition,
    pub camera:   CameraPose,
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene {
    controller:  FormationController,
    progress:    ProgressIntegrator,
    camera:      CameraChoreographer,
    populations: [Population; 3],
    stars:       StarField,
    sparkles:    Sparkles,
    elapsed:     f64,
}

impl Scene {
    pub fn new(config: &SceneConfig) -> Self {
        // Distinct streams per population so resizing one leaves the others put.
        let seed_for = |i: u64| config.seed.map(|s| s.wrapping_add(i.wrapping_mul(0x9E37_79B9_7F4A_7C15)));
        let populations = PopulationKind::ALL.map(|kind| {
            Population::generate(kind, config.count(kind), &config.tree, seed_for(kind as u64))
        });

        Scene {
            controller:  FormationController::new(),
            progress:    ProgressIntegrator::new(config.progress_rate),
            camera:      CameraChoreographer::new(config.camera),
            populations,
            stars:       StarField::generate(config.star_count, 100.0, 50.0, config.seed),
            sparkles:    Sparkles::generate(config.sparkle_count, 20.0, 0.4, config.seed),
            elapsed:     0.0,
        }
    }

    /// Apply a classifier observation.  Returns true when the state flipped.
    pub fn observe(&mut self, obs: Observation) -> bool {
        self.controller.observe(obs)
    }

    /// Advance one render frame by `dt` seconds.
    pub fn advance(&mut self, dt: f64) -> FrameContext {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.elapsed += dt;

        let state = self.controller.state();
        let hand  = self.controller.hand();
        self.progress.tick(dt, state);
        let camera = self.camera.update(dt as f32, self.elapsed as f32, hand, state.is_formed());

        FrameContext {
            progress: self.progress.snapshot(),
            elapsed:  self.elapsed as f32,
            state,
            hand,
            camera,
        }
    }

    /// Transforms for one population under `ctx`.
    pub fn transforms(&self, kind: PopulationKind, ctx: &FrameContext)
        -> impl Iterator<Item = EntityTransform> + '_
    {
        let (progress, elapsed) = (ctx.progress, ctx.elapsed);
        self.population(kind).records.iter()
            .map(move |r| evaluate(kind, r, progress, elapsed))
    }

    pub fn population(&self, kind: PopulationKind) -> &Population {
        &self.populations[kind as usize]
    }

    pub fn state(&self)    -> FormationState { self.controller.state() }
    pub fn hand(&self)     -> HandPosition   { self.controller.hand() }
    pub fn progress(&self) -> f64            { self.progress.value() }
    pub fn elapsed(&self)  -> f64            { self.elapsed }
    pub fn camera(&self)   -> CameraPose     { self.camera.pose() }
    pub fn fov_deg(&self)  -> f32            { self.camera.config().fov_deg }
    pub fn stars(&self)    -> &StarField     { &self.stars }
    pub fn sparkles(&self) -> &Sparkles      { &self.sparkles }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::Gesture;

    fn small() -> SceneConfig {
        SceneConfig {
            foliage_count:  400,
            ornament_count: 40,
            card_count:     12,
            star_count:     50,
            sparkle_count:  20,
            seed:           Some(8),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn populations_sized_from_config() {
        let s = Scene::new(&small());
        assert_eq!(s.population(PopulationKind::Foliage).len(), 400);
        assert_eq!(s.population(PopulationKind::Ornament).len(), 40);
        assert_eq!(s.population(PopulationKind::Card).len(), 12);
    }

    #[test]
    fn observation_stream_end_to_end() {
        let mut s = Scene::new(&small());

        s.observe(Observation::new(Gesture::Open, 0.5, 0.5));
        for _ in 0..60 { s.advance(1.0 / 60.0); }
        assert_eq!(s.state(), FormationState::Chaos);
        assert_eq!(s.progress(), 0.0);

        s.observe(Observation::new(Gesture::Closed, 0.5, 0.5));
        let mut prev = s.progress();
        for _ in 0..240 {
            let ctx = s.advance(1.0 / 60.0);
            assert!(s.progress() >= prev);
            assert!(s.progress() < 1.0);
            assert!(ctx.progress <= 1.0);
            prev = s.progress();
        }
        assert!(prev > 0.99);

        // Nothing observed: the state holds and progress keeps its course.
        s.observe(Observation::neutral());
        s.advance(1.0 / 60.0);
        assert_eq!(s.state(), FormationState::Formed);
    }

    #[test]
    fn formed_scene_lands_ornaments_on_targets() {
        let mut s = Scene::new(&small());
        s.observe(Observation::new(Gesture::Closed, 0.5, 0.5));
        let mut ctx = s.advance(0.0);
        for _ in 0..1200 { ctx = s.advance(1.0 / 60.0); }
        let recs = &s.population(PopulationKind::Ornament).records;
        for (t, r) in s.transforms(PopulationKind::Ornament, &ctx).zip(recs) {
            assert!((t.position - r.target).norm() < 1e-3);
        }
    }

    #[test]
    fn seeded_scenes_match() {
        let a = Scene::new(&small());
        let b = Scene::new(&small());
        for kind in PopulationKind::ALL {
            assert_eq!(a.population(kind).records, b.population(kind).records);
        }
    }

    #[test]
    fn bad_dt_does_not_advance_time() {
        let mut s = Scene::new(&small());
        s.advance(f64::NAN);
        s.advance(-2.0);
        assert_eq!(s.elapsed(), 0.0);
    }

    #[test]
    fn config_fills_missing_fields() {
        let cfg: SceneConfig = serde_json::from_str(r#"{"card_count": 6, "tree": {"height": 10.0}}"#).unwrap();
        assert_eq!(cfg.card_count, 6);
        assert_eq!(cfg.foliage_count, 15_000);
        assert_eq!(cfg.tree.height, 10.0);
        assert_eq!(cfg.tree.radius, 4.5);
    }
}
