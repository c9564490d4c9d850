//! # formation_core
//!
//! The animation core of the Grand Tree installation: a cloud of particles,
//! ornaments and photo cards that collapses into a Christmas tree when a
//! closed hand is observed, and bursts back into chaos on an open hand.
//!
//! No windowing, no I/O.  Everything here is deterministic given a seed.
//!
//! ## Data flow
//!
//! ```text
//! Observation ──► FormationController ──► FormationState, HandPosition
//!                                              │
//!       every frame: ProgressIntegrator ◄──────┘──────► CameraChoreographer
//!                          │                                   │
//!                          ▼                                   ▼
//!          transform::evaluate(kind, record, progress, t)   CameraPose
//! ```
//!
//! ## Timing
//!
//! | Population | Local time | Easing | Secondary motion |
//! |---|---|---|---|
//! | Foliage | progress | smoothstep | jitter past 80 % |
//! | Ornaments | `p(1 + ½φ) − ⅕φ` | smoothstep | constant spin ∝ φ |
//! | Cards | `1.2p − 0.2 + 0.1φ` | cubic in-out | tumble, then face trunk |
//!
//! ## Quick start
//!
//! ```rust
//! use formation_core::{Scene, SceneConfig, Observation, Gesture, PopulationKind};
//!
//! let mut scene = Scene::new(&SceneConfig { seed: Some(1), ..SceneConfig::default() });
//! scene.observe(Observation::new(Gesture::Closed, 0.5, 0.5));
//! let ctx = scene.advance(1.0 / 60.0);
//! let first = scene.transforms(PopulationKind::Card, &ctx).next();
//! assert!(first.is_some());
//! ```

pub mod formation;
pub mod progress;
pub mod easing;
pub mod population;
pub mod transform;
pub mod camera;
pub mod backdrop;
pub mod scene;

pub use formation::{FormationController, FormationState, Gesture, HandPosition, Observation};
pub use progress::{damp, ProgressIntegrator};
pub use easing::{Easing, EasingPolicy, TimeRemap};
pub use population::{EntityRecord, OrnamentColor, Population, PopulationKind, TreeShape};
pub use transform::{evaluate, EntityTransform};
pub use camera::{CameraChoreographer, CameraConfig, CameraPose};
pub use backdrop::{Sparkles, StarField};
pub use scene::{FrameContext, Scene, SceneConfig};
