//! Discrete formation state and the smoothed hand position.
//!
//! Observations arrive slowly (nominally every 800 ms) from whatever
//! classifies the camera frame.  [`FormationController::observe`] is the
//! only writer of both [`FormationState`] and [`HandPosition`].

use serde::{Deserialize, Serialize};

/// Weight of a fresh observation in the hand-position blend.
pub const HAND_SMOOTHING: f32 = 0.3;

// ════════════════════════════════════════════════════════════════════════════
// Gesture / Observation
// ════════════════════════════════════════════════════════════════════════════

/// Hand classification reported by the external classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    /// Fingers spread, palm visible.  Unleashes the chaos cloud.
    #[serde(rename = "OPEN")]
    Open,
    /// Fist, pinch or fingers together.  Assembles the tree.
    #[serde(rename = "CLOSED")]
    Closed,
    /// No hand clearly visible.
    #[serde(rename = "NONE")]
    NoHand,
}

impl Gesture {
    /// The state this gesture latches, or `None` when it leaves the state alone.
    pub fn target_state(self) -> Option<FormationState> {
        match self {
            Gesture::Open   => Some(FormationState::Chaos),
            Gesture::Closed => Some(FormationState::Formed),
            Gesture::NoHand => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gesture::Open   => "OPEN",
            Gesture::Closed => "CLOSED",
            Gesture::NoHand => "NONE",
        }
    }
}

/// One classifier result: gesture plus hand centre in normalised frame
/// coordinates (0,0 top-left, 1,1 bottom-right).
///
/// `x`/`y` are not validated; out-of-range values only skew the camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub gesture: Gesture,
    pub x:       f32,
    pub y:       f32,
}

impl Observation {
    pub fn new(gesture: Gesture, x: f32, y: f32) -> Self {
        Observation { gesture, x, y }
    }

    /// What every failing observation source must report instead of an error.
    pub fn neutral() -> Self {
        Observation { gesture: Gesture::NoHand, x: 0.5, y: 0.5 }
    }
}

impl Default for Observation {
    fn default() -> Self { Observation::neutral() }
}

// ════════════════════════════════════════════════════════════════════════════
// FormationState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationState {
    #[default]
    Chaos,
    Formed,
}

impl FormationState {
    /// Progress value the integrator damps toward in this state.
    pub fn target_progress(self) -> f64 {
        match self {
            FormationState::Chaos  => 0.0,
            FormationState::Formed => 1.0,
        }
    }

    pub fn is_formed(self) -> bool { self == FormationState::Formed }
}

// ════════════════════════════════════════════════════════════════════════════
// HandPosition
// ════════════════════════════════════════════════════════════════════════════

/// Exponentially smoothed hand centre.  Only ever overwritten, never decays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPosition {
    pub x: f32,
    pub y: f32,
}

impl Default for HandPosition {
    fn default() -> Self { HandPosition { x: 0.5, y: 0.5 } }
}

impl HandPosition {
    pub fn new(x: f32, y: f32) -> Self { HandPosition { x, y } }

    /// `new = old * 0.7 + observed * 0.3` on each axis.
    pub fn smooth_toward(&mut self, x: f32, y: f32) {
        let keep = 1.0 - HAND_SMOOTHING;
        self.x = self.x * keep + x * HAND_SMOOTHING;
        self.y = self.y * keep + y * HAND_SMOOTHING;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FormationController
// ════════════════════════════════════════════════════════════════════════════

/// Consumer of classifier observations.
#[derive(Clone, Debug, Default)]
pub struct FormationController {
    state: FormationState,
    hand:  HandPosition,
}

impl FormationController {
    pub fn new() -> Self { Self::default() }

    pub fn with_state(state: FormationState) -> Self {
        FormationController { state, hand: HandPosition::default() }
    }

    /// Apply one observation.
    ///
    /// OPEN → Chaos, CLOSED → Formed, NONE leaves the state alone.  The hand
    /// position is blended toward the supplied coordinates in every case.
    /// Returns true when the discrete state changed.
    pub fn observe(&mut self, obs: Observation) -> bool {
        self.hand.smooth_toward(obs.x, obs.y);
        match obs.gesture.target_state() {
            Some(next) if next != self.state => {
                self.state = next;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> FormationState { self.state }
    pub fn hand(&self)  -> HandPosition   { self.hand }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn open_always_sets_chaos() {
        for start in [FormationState::Chaos, FormationState::Formed] {
            let mut c = FormationController::with_state(start);
            c.observe(Observation::new(Gesture::Open, 0.1, 0.9));
            assert_eq!(c.state(), FormationState::Chaos);
        }
    }

    #[test]
    fn closed_always_sets_formed() {
        for start in [FormationState::Chaos, FormationState::Formed] {
            let mut c = FormationController::with_state(start);
            c.observe(Observation::new(Gesture::Closed, 0.1, 0.9));
            assert_eq!(c.state(), FormationState::Formed);
        }
    }

    #[test]
    fn no_hand_keeps_state_but_moves_hand() {
        let mut c = FormationController::with_state(FormationState::Formed);
        let changed = c.observe(Observation::new(Gesture::NoHand, 1.0, 0.0));
        assert!(!changed);
        assert_eq!(c.state(), FormationState::Formed);
        assert_relative_eq!(c.hand().x, 0.65, epsilon = 1e-6);
        assert_relative_eq!(c.hand().y, 0.35, epsilon = 1e-6);
    }

    #[test]
    fn hand_blend_is_exact() {
        let mut h = HandPosition::new(0.0, 0.0);
        h.smooth_toward(1.0, 1.0);
        assert_relative_eq!(h.x, 0.3, epsilon = 1e-6);
        assert_relative_eq!(h.y, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn observe_reports_changes_only() {
        let mut c = FormationController::new();
        assert!(!c.observe(Observation::new(Gesture::Open, 0.5, 0.5)));
        assert!(c.observe(Observation::new(Gesture::Closed, 0.5, 0.5)));
        assert!(!c.observe(Observation::new(Gesture::Closed, 0.5, 0.5)));
    }

    #[test]
    fn garbage_coordinates_are_tolerated() {
        let mut c = FormationController::new();
        c.observe(Observation::new(Gesture::Closed, 40.0, -12.0));
        assert_eq!(c.state(), FormationState::Formed);
        assert!(c.hand().x.is_finite() && c.hand().y.is_finite());
    }

    #[test]
    fn gesture_wire_names() {
        let obs: Observation =
            serde_json::from_str(r#"{"gesture":"CLOSED","x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(obs.gesture, Gesture::Closed);
        let none: Gesture = serde_json::from_str(r#""NONE""#).unwrap();
        assert_eq!(none, Gesture::NoHand);
    }
}
