//! Low-frequency observation polling, decoupled from the render loop.
//!
//! The classifier runs on its own worker thread.  The render loop calls
//! [`ObservationPoller::pump`] once per frame; `pump` never blocks.  At
//! most one request is in flight: a tick that comes due while the previous
//! request is still outstanding is skipped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use formation_core::Observation;
use tracing::{debug, info, warn};

use crate::gesture::GestureClassifier;

/// Counters for the status bar and shutdown log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    pub dispatched: u64,
    pub completed:  u64,
    /// Ticks that came due while a request was outstanding (or while the
    /// render loop was stalled) and were dropped.
    pub skipped:    u64,
}

pub struct ObservationPoller {
    request_tx: Sender<()>,
    result_rx:  Receiver<Observation>,
    cancel:     Arc<AtomicBool>,
    interval:   Duration,
    next_due:   Instant,
    busy:       bool,
    worker_alive: bool,
    stats:      PollStats,
}

impl ObservationPoller {
    /// Spawn the worker thread owning `classifier`.  The first request goes
    /// out one `interval` after `now`.
    pub fn spawn<C: GestureClassifier>(mut classifier: C, interval: Duration, now: Instant) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let (request_tx, request_rx) = mpsc::channel::<()>();
        let (result_tx, result_rx) = mpsc::channel::<Observation>();
        let cancel = Arc::new(AtomicBool::new(false));

        let worker_cancel = Arc::clone(&cancel);
        let name = classifier.name();
        thread::spawn(move || {
            for () in request_rx {
                if worker_cancel.load(Ordering::Acquire) { break; }
                let obs = classifier.classify();
                // Torn down while the request was in flight: drop the result.
                if worker_cancel.load(Ordering::Acquire) { break; }
                if result_tx.send(obs).is_err() { break; }
            }
            debug!(classifier = name, "observation worker exiting");
        });

        info!(classifier = name, interval_ms = interval.as_millis() as u64, "observation poller started");

        ObservationPoller {
            request_tx,
            result_rx,
            cancel,
            interval,
            next_due: now + interval,
            busy: false,
            worker_alive: true,
            stats: PollStats::default(),
        }
    }

    /// Collect a finished observation, if any, and dispatch the next request
    /// when one is due and none is outstanding.
    pub fn pump(&mut self, now: Instant) -> Option<Observation> {
        let mut landed = None;
        match self.result_rx.try_recv() {
            Ok(obs) => {
                self.busy = false;
                self.stats.completed += 1;
                landed = Some(obs);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                if self.worker_alive {
                    warn!("observation worker stopped; no further observations");
                    self.worker_alive = false;
                }
                self.busy = false;
            }
        }

        if now >= self.next_due {
            let mut due = 0u64;
            while self.next_due <= now {
                self.next_due += self.interval;
                due += 1;
            }
            // Only one dispatch per pump; the rest of a backlog is dropped.
            self.stats.skipped += due - 1;

            if self.busy {
                self.stats.skipped += 1;
                debug!("observation tick skipped; request outstanding");
            } else if self.worker_alive && self.request_tx.send(()).is_ok() {
                self.busy = true;
                self.stats.dispatched += 1;
            }
        }

        landed
    }

    pub fn is_busy(&self) -> bool { self.busy }

    pub fn stats(&self) -> PollStats { self.stats }

    /// Flag raised when the poller is torn down.
    pub fn cancellation(&self) -> Arc<AtomicBool> { Arc::clone(&self.cancel) }
}

impl Drop for ObservationPoller {
    fn drop(&mut self) {
        // The worker may be blocked inside a request; it checks this flag
        // before publishing and exits once the request channel closes.
        self.cancel.store(true, Ordering::Release);
        debug!(
            dispatched = self.stats.dispatched,
            completed  = self.stats.completed,
            skipped    = self.stats.skipped,
            "observation poller stopped",
        );
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use formation_core::Gesture;

    /// Blocks each request until the test releases an observation.
    struct GatedClassifier {
        gate: Receiver<Observation>,
    }

    impl GestureClassifier for GatedClassifier {
        fn classify(&mut self) -> Observation {
            self.gate.recv().unwrap_or_else(|_| Observation::neutral())
        }
        fn name(&self) -> &'static str { "gated" }
    }

    const TICK: Duration = Duration::from_millis(800);

    fn wait_for(poller: &mut ObservationPoller, now: Instant) -> Option<Observation> {
        for _ in 0..500 {
            if let Some(obs) = poller.pump(now) { return Some(obs); }
            thread::sleep(Duration::from_millis(2));
        }
        None
    }

    #[test]
    fn nothing_dispatched_before_first_interval() {
        let (_gate_tx, gate) = mpsc::channel();
        let t0 = Instant::now();
        let mut p = ObservationPoller::spawn(GatedClassifier { gate }, TICK, t0);
        assert!(p.pump(t0 + Duration::from_millis(100)).is_none());
        assert!(!p.is_busy());
        assert_eq!(p.stats().dispatched, 0);
    }

    #[test]
    fn outstanding_request_skips_ticks() {
        let (gate_tx, gate) = mpsc::channel();
        let t0 = Instant::now();
        let mut p = ObservationPoller::spawn(GatedClassifier { gate }, TICK, t0);

        p.pump(t0 + TICK);
        assert!(p.is_busy());
        assert_eq!(p.stats().dispatched, 1);

        // Two more ticks come due while the classifier is still working.
        p.pump(t0 + TICK * 2);
        p.pump(t0 + TICK * 3);
        assert_eq!(p.stats().dispatched, 1);
        assert_eq!(p.stats().skipped, 2);

        gate_tx.send(Observation::new(Gesture::Closed, 0.1, 0.2)).unwrap();
        let obs = wait_for(&mut p, t0 + TICK * 3).expect("result should land");
        assert_eq!(obs.gesture, Gesture::Closed);
        assert!(!p.is_busy());

        // Next tick dispatches again.
        p.pump(t0 + TICK * 4);
        assert_eq!(p.stats().dispatched, 2);
        assert_eq!(p.stats().completed, 1);
    }

    #[test]
    fn stalled_frame_drops_backlog() {
        let (_gate_tx, gate) = mpsc::channel();
        let t0 = Instant::now();
        let mut p = ObservationPoller::spawn(GatedClassifier { gate }, TICK, t0);
        p.pump(t0 + TICK * 5);
        assert_eq!(p.stats().dispatched, 1);
        assert_eq!(p.stats().skipped, 4);
    }

    #[test]
    fn drop_raises_cancellation() {
        let (gate_tx, gate) = mpsc::channel();
        let t0 = Instant::now();
        let mut p = ObservationPoller::spawn(GatedClassifier { gate }, TICK, t0);
        p.pump(t0 + TICK);
        let token = p.cancellation();
        assert!(!token.load(Ordering::Acquire));
        drop(p);
        assert!(token.load(Ordering::Acquire));
        // Worker finishes its request and discards the result without panicking.
        let _ = gate_tx.send(Observation::neutral());
    }
}
