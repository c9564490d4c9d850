//! The shared formation-progress scalar.
//!
//! One [`ProgressIntegrator`] owns the value; everything else receives a
//! copy each frame.  The value moves toward 0 (chaos) or 1 (formed) by an
//! exponential approach whose wall-clock behaviour does not depend on the
//! frame rate.

use crate::formation::FormationState;

/// Default damping rate, per second.  Gap halves every ln 2 / 1.5 ≈ 0.46 s.
pub const DEFAULT_RATE: f64 = 1.5;

/// Move `current` toward `target`, closing `1 - e^(-rate·dt)` of the gap.
///
/// Non-positive or non-finite `dt` returns `current` unchanged.
pub fn damp(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    if !(dt > 0.0) || !dt.is_finite() {
        return current;
    }
    current + (target - current) * (1.0 - (-rate * dt).exp())
}

/// Single-precision [`damp`], for camera axes.
pub fn damp_f32(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    if !(dt > 0.0) || !dt.is_finite() {
        return current;
    }
    current + (target - current) * (1.0 - (-rate * dt).exp())
}

// ════════════════════════════════════════════════════════════════════════════
// ProgressIntegrator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ProgressIntegrator {
    value: f64,
    rate:  f64,
}

impl Default for ProgressIntegrator {
    fn default() -> Self { ProgressIntegrator::new(DEFAULT_RATE) }
}

impl ProgressIntegrator {
    /// Starts fully dispersed.
    pub fn new(rate: f64) -> Self {
        ProgressIntegrator { value: 0.0, rate: rate.max(0.0) }
    }

    pub fn starting_at(value: f64, rate: f64) -> Self {
        ProgressIntegrator { value: value.clamp(0.0, 1.0), rate: rate.max(0.0) }
    }

    /// Advance one render frame toward the target implied by `state`.
    pub fn tick(&mut self, dt: f64, state: FormationState) {
        let next = damp(self.value, state.target_progress(), self.rate, dt);
        self.value = next.clamp(0.0, 1.0);
    }

    pub fn value(&self) -> f64 { self.value }

    /// Snapshot handed to population evaluators.
    pub fn snapshot(&self) -> f32 { self.value as f32 }

    pub fn rate(&self) -> f64 { self.rate }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn half_life_step() {
        let mut p = ProgressIntegrator::new(1.5);
        p.tick(0.46, FormationState::Formed);
        assert!(p.value() >= 0.49, "got {}", p.value());
        assert_relative_eq!(p.value(), 1.0 - (-0.69f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn non_positive_dt_is_noop() {
        let mut p = ProgressIntegrator::starting_at(0.3, 1.5);
        p.tick(0.0, FormationState::Formed);
        p.tick(-1.0, FormationState::Formed);
        p.tick(f64::NAN, FormationState::Formed);
        assert_eq!(p.value(), 0.3);
    }

    #[test]
    fn frame_rate_independent() {
        let mut fast = ProgressIntegrator::new(1.5);
        let mut slow = ProgressIntegrator::new(1.5);
        for _ in 0..120 { fast.tick(1.0 / 120.0, FormationState::Formed); }
        for _ in 0..30  { slow.tick(1.0 / 30.0,  FormationState::Formed); }
        assert_relative_eq!(fast.value(), slow.value(), epsilon = 1e-9);
    }

    #[test]
    fn open_then_closed_scenario() {
        let mut p = ProgressIntegrator::starting_at(0.6, 1.5);

        // OPEN: decays toward 0.
        let mut prev = p.value();
        for _ in 0..120 {
            p.tick(1.0 / 60.0, FormationState::Chaos);
            assert!(p.value() <= prev);
            prev = p.value();
        }
        assert!(p.value() < 0.6 * 0.25);

        // CLOSED: climbs toward 1 without ever getting there.
        for _ in 0..300 {
            p.tick(1.0 / 60.0, FormationState::Formed);
            assert!(p.value() >= prev);
            assert!(p.value() < 1.0);
            prev = p.value();
        }
        assert!(p.value() > 0.99);
    }

    proptest! {
        #[test]
        fn stays_in_unit_interval(
            start in 0.0f64..=1.0,
            dt in 0.0f64..10.0,
            formed in any::<bool>(),
        ) {
            let state = if formed { FormationState::Formed } else { FormationState::Chaos };
            let mut p = ProgressIntegrator::starting_at(start, DEFAULT_RATE);
            p.tick(dt, state);
            prop_assert!((0.0..=1.0).contains(&p.value()));
        }

        #[test]
        fn monotonic_without_overshoot(
            start in 0.0f64..=1.0,
            dts in proptest::collection::vec(0.0f64..0.5, 1..64),
            formed in any::<bool>(),
        ) {
            let state = if formed { FormationState::Formed } else { FormationState::Chaos };
            let target = state.target_progress();
            let mut p = ProgressIntegrator::starting_at(start, DEFAULT_RATE);
            let mut gap = (target - p.value()).abs();
            for dt in dts {
                p.tick(dt, state);
                let next_gap = (target - p.value()).abs();
                prop_assert!(next_gap <= gap);
                if formed { prop_assert!(p.value() <= 1.0); } else { prop_assert!(p.value() >= 0.0); }
                gap = next_gap;
            }
        }
    }
}
