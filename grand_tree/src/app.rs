//! Top-level application state machine.
//!
//! `AppState` owns the [`Scene`] and the status line.  Classifier results
//! arrive through the [`ObservationPoller`]; every frame the scene is
//! advanced by the measured wall-clock delta and handed to the visualizer.

use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

use formation_core::{FormationState, FrameContext, Gesture, Observation, Scene};
use tracing::{debug, info};

use crate::config::{AppConfig, ClassifierKind};
use crate::error::AppError;
use crate::gesture::{GestureClassifier, SimClassifier, SimInput};
use crate::poller::{ObservationPoller, PollStats};
use crate::visualizer::{Frame, Visualizer};

/// Upper bound on one frame's delta.
const MAX_FRAME_DT: f64 = 0.25;

pub const STATUS_OPEN:    &str = "OPEN HAND - CHAOS UNLEASHED";
pub const STATUS_CLOSED:  &str = "CLOSED HAND - TREE FORMED";
pub const STATUS_NO_HAND: &str = "NO HAND DETECTED";
pub const STATUS_WAITING: &str = "WAITING FOR FIRST OBSERVATION";

/// Status text shown for the gesture of the latest observation.
pub fn status_for(gesture: Gesture) -> &'static str {
    match gesture {
        Gesture::Open   => STATUS_OPEN,
        Gesture::Closed => STATUS_CLOSED,
        Gesture::NoHand => STATUS_NO_HAND,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    scene:       Scene,
    status:      &'static str,
    last:        Option<Observation>,
    transitions: u64,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        AppState {
            scene:       Scene::new(&cfg.scene),
            status:      STATUS_WAITING,
            last:        None,
            transitions: 0,
        }
    }

    // ── process one observation ──────────────────────────────────────────

    pub fn handle_observation(&mut self, obs: Observation) {
        self.status = status_for(obs.gesture);
        self.last = Some(obs);
        if self.scene.observe(obs) {
            self.transitions += 1;
            info!(
                gesture = obs.gesture.label(),
                state   = state_label(self.scene.state()),
                "formation state changed",
            );
        } else {
            debug!(gesture = obs.gesture.label(), x = obs.x, y = obs.y, "observation");
        }
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, dt: f64) -> FrameContext {
        self.scene.advance(dt.min(MAX_FRAME_DT))
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn scene(&self)       -> &Scene               { &self.scene }
    pub fn status(&self)      -> &'static str         { self.status }
    pub fn last(&self)        -> Option<Observation>  { self.last }
    pub fn transitions(&self) -> u64                  { self.transitions }
}

pub fn state_label(state: FormationState) -> &'static str {
    match state {
        FormationState::Chaos  => "CHAOS",
        FormationState::Formed => "FORMED",
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier selection
// ════════════════════════════════════════════════════════════════════════════

/// Build the classifier named in `cfg`.  The simulated one reads the
/// window's key/pointer events from `sim_rx`.
fn build_classifier(
    cfg: &AppConfig,
    sim_rx: mpsc::Receiver<SimInput>,
) -> Result<Box<dyn GestureClassifier>, AppError> {
    match cfg.observation.classifier {
        ClassifierKind::Sim => Ok(Box::new(SimClassifier::new(sim_rx))),

        #[cfg(feature = "remote")]
        ClassifierKind::Remote => {
            use crate::classifier::{RemoteClassifier, StillFrameSource};
            let remote = &cfg.observation.remote;
            let frames = StillFrameSource::new(remote.frame_path.clone());
            Ok(Box::new(RemoteClassifier::new(remote, frames)?))
        }

        #[cfg(not(feature = "remote"))]
        ClassifierKind::Remote => Err(AppError::Unavailable("remote")),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application until the window closes or `Q` is pressed.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let (sim_tx, sim_rx): (Sender<SimInput>, _) = mpsc::channel();
    let classifier = build_classifier(&cfg, sim_rx)?;
    let mut vis = Visualizer::new(&cfg.window, sim_tx)?;
    let mut app = AppState::new(&cfg);

    let interval = Duration::from_millis(cfg.observation.interval_ms);
    let start = Instant::now();
    let mut poller = ObservationPoller::spawn(classifier, interval, start);
    let mut last_frame = start;

    info!(
        foliage   = cfg.scene.foliage_count,
        ornaments = cfg.scene.ornament_count,
        cards     = cfg.scene.card_count,
        "scene ready",
    );

    while vis.is_open() {
        if !vis.poll_input() { break; }

        let now = Instant::now();
        if let Some(obs) = poller.pump(now) {
            app.handle_observation(obs);
        }

        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;
        let ctx = app.tick(dt);

        vis.render(&Frame {
            scene:  app.scene(),
            ctx:    &ctx,
            status: app.status(),
            busy:   poller.is_busy(),
            stats:  poller.stats(),
        })?;
    }

    let PollStats { dispatched, completed, skipped } = poller.stats();
    info!(dispatched, completed, skipped, transitions = app.transitions(), "shutting down");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use formation_core::SceneConfig;

    fn make_app() -> AppState {
        let cfg = AppConfig {
            scene: SceneConfig {
                foliage_count:  200,
                ornament_count: 20,
                card_count:     6,
                star_count:     10,
                sparkle_count:  10,
                seed:           Some(5),
                ..SceneConfig::default()
            },
            ..AppConfig::default()
        };
        AppState::new(&cfg)
    }

    #[test]
    fn starts_waiting_in_chaos() {
        let app = make_app();
        assert_eq!(app.status(), STATUS_WAITING);
        assert_eq!(app.scene().state(), FormationState::Chaos);
        assert!(app.last().is_none());
    }

    #[test]
    fn closed_hand_forms_tree() {
        let mut app = make_app();
        app.handle_observation(Observation::new(Gesture::Closed, 0.4, 0.6));
        assert_eq!(app.status(), STATUS_CLOSED);
        assert_eq!(app.scene().state(), FormationState::Formed);
        assert_eq!(app.transitions(), 1);
    }

    #[test]
    fn open_hand_scatters() {
        let mut app = make_app();
        app.handle_observation(Observation::new(Gesture::Closed, 0.5, 0.5));
        app.handle_observation(Observation::new(Gesture::Open, 0.5, 0.5));
        assert_eq!(app.status(), STATUS_OPEN);
        assert_eq!(app.scene().state(), FormationState::Chaos);
        assert_eq!(app.transitions(), 2);
    }

    #[test]
    fn no_hand_keeps_state_but_updates_status() {
        let mut app = make_app();
        app.handle_observation(Observation::new(Gesture::Closed, 0.5, 0.5));
        app.handle_observation(Observation::neutral());
        assert_eq!(app.status(), STATUS_NO_HAND);
        assert_eq!(app.scene().state(), FormationState::Formed);
        assert_eq!(app.transitions(), 1);
    }

    #[test]
    fn repeated_gesture_is_not_a_transition() {
        let mut app = make_app();
        for _ in 0..3 {
            app.handle_observation(Observation::new(Gesture::Closed, 0.5, 0.5));
        }
        assert_eq!(app.transitions(), 1);
    }

    #[test]
    fn long_frame_is_clamped() {
        let mut app = make_app();
        app.handle_observation(Observation::new(Gesture::Closed, 0.5, 0.5));
        app.tick(10.0);
        assert!((app.scene().elapsed() - MAX_FRAME_DT).abs() < 1e-12);
        assert!(app.scene().progress() < 0.5);
    }

    #[test]
    fn tick_advances_progress_toward_formed() {
        let mut app = make_app();
        app.handle_observation(Observation::new(Gesture::Closed, 0.5, 0.5));
        let mut ctx = app.tick(0.0);
        for _ in 0..120 { ctx = app.tick(1.0 / 60.0); }
        assert!(ctx.progress > 0.9);
        assert_eq!(ctx.state, FormationState::Formed);
    }

    #[test]
    fn remote_without_feature_or_key_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.observation.classifier = ClassifierKind::Remote;
        cfg.observation.remote.api_key = None;
        let (_tx, rx) = mpsc::channel();
        assert!(build_classifier(&cfg, rx).is_err());
    }

    #[test]
    fn status_texts() {
        assert_eq!(status_for(Gesture::Open), "OPEN HAND - CHAOS UNLEASHED");
        assert_eq!(status_for(Gesture::Closed), "CLOSED HAND - TREE FORMED");
        assert_eq!(status_for(Gesture::NoHand), "NO HAND DETECTED");
    }
}
