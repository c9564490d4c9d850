//! Gesture classification: simulated from the viewer window, or remote
//! (see [`crate::classifier`], feature `remote`).
//!
//! Consumers only see [`GestureClassifier::classify`], which always yields an
//! [`Observation`].  A classifier that fails internally must report
//! [`Observation::neutral`] instead of an error.

use std::sync::mpsc::{Receiver, TryRecvError};

use formation_core::{Gesture, Observation};
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier trait: unified interface for sim and remote
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can classify "the current frame" into an [`Observation`].
///
/// Called from the poller's worker thread, so it may block (e.g. on a
/// network round-trip) without stalling rendering.
pub trait GestureClassifier: Send + 'static {
    fn classify(&mut self) -> Observation;

    /// Short name for logs and the status bar.
    fn name(&self) -> &'static str;
}

impl GestureClassifier for Box<dyn GestureClassifier> {
    fn classify(&mut self) -> Observation { (**self).classify() }
    fn name(&self) -> &'static str { (**self).name() }
}

// ════════════════════════════════════════════════════════════════════════════
// SimClassifier: keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the viewer window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    /// Pointer position, normalised to the window (0,0 top-left).
    Pointer { x: f32, y: f32 },
}

/// Simulated hand poses (mapped from minifb keys).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    OpenHand,   // O
    ClosedHand, // C
    NoHand,     // N
}

impl SimKey {
    fn gesture(self) -> Gesture {
        match self {
            SimKey::OpenHand   => Gesture::Open,
            SimKey::ClosedHand => Gesture::Closed,
            SimKey::NoHand     => Gesture::NoHand,
        }
    }
}

/// Reports whatever pose the user last selected in the window, at the last
/// pointer position.  The pose stays latched until another key is pressed,
/// the way a held hand stays in front of a camera.
pub struct SimClassifier {
    rx:      Receiver<SimInput>,
    latched: Observation,
}

impl SimClassifier {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimClassifier { rx, latched: Observation::neutral() }
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::KeyDown(key) => {
                self.latched.gesture = key.gesture();
                debug!(gesture = key.gesture().label(), "sim pose latched");
            }
            SimInput::Pointer { x, y } => {
                self.latched.x = x;
                self.latched.y = y;
            }
        }
    }
}

impl GestureClassifier for SimClassifier {
    fn classify(&mut self) -> Observation {
        loop {
            match self.rx.try_recv() {
                Ok(input) => self.apply(input),
                Err(TryRecvError::Empty) => break,
                // Window gone: nothing more will arrive, keep the last pose.
                Err(TryRecvError::Disconnected) => break,
            }
        }
        self.latched
    }

    fn name(&self) -> &'static str { "simulated" }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
