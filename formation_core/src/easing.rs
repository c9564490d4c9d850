//! Per-population timing: a local-time remap followed by an easing curve.
//!
//! The shared progress is the same for every entity; the remap is what lets
//! foliage arrive first, ornaments trail and spread out, and photo cards
//! snap in last.

use crate::population::PopulationKind;

// ════════════════════════════════════════════════════════════════════════════
// Easing
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    /// `t²(3 − 2t)`
    Smoothstep,
    /// Cubic ease-in-out: `4t³` below ½, `1 − (−2t + 2)³ / 2` above.
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear     => t,
            Easing::Smoothstep => t * t * (3.0 - 2.0 * t),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TimeRemap
// ════════════════════════════════════════════════════════════════════════════

/// Maps shared progress + an entity's phase offset to that entity's local
/// time, clamped to [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeRemap {
    /// Shared progress as-is.
    Direct,
    /// `progress · (1 + spread·phase) − lag·phase`
    Staggered { spread: f32, lag: f32 },
    /// `progress · scale + bias + jitter·phase`
    Offset { scale: f32, bias: f32, jitter: f32 },
}

impl TimeRemap {
    pub fn local_time(self, progress: f32, phase: f32) -> f32 {
        let t = match self {
            TimeRemap::Direct => progress,
            TimeRemap::Staggered { spread, lag } =>
                progress * (1.0 + spread * phase) - lag * phase,
            TimeRemap::Offset { scale, bias, jitter } =>
                progress * scale + bias + jitter * phase,
        };
        t.clamp(0.0, 1.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EasingPolicy
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EasingPolicy {
    pub remap:  TimeRemap,
    pub easing: Easing,
}

impl EasingPolicy {
    pub const FOLIAGE: EasingPolicy = EasingPolicy {
        remap:  TimeRemap::Direct,
        easing: Easing::Smoothstep,
    };

    pub const ORNAMENT: EasingPolicy = EasingPolicy {
        remap:  TimeRemap::Staggered { spread: 0.5, lag: 0.2 },
        easing: Easing::Smoothstep,
    };

    pub const CARD: EasingPolicy = EasingPolicy {
        remap:  TimeRemap::Offset { scale: 1.2, bias: -0.2, jitter: 0.1 },
        easing: Easing::CubicInOut,
    };

    pub fn for_kind(kind: PopulationKind) -> EasingPolicy {
        match kind {
            PopulationKind::Foliage  => EasingPolicy::FOLIAGE,
            PopulationKind::Ornament => EasingPolicy::ORNAMENT,
            PopulationKind::Card     => EasingPolicy::CARD,
        }
    }

    /// Eased blend factor for one entity.
    pub fn eased(self, progress: f32, phase: f32) -> f32 {
        self.easing.apply(self.remap.local_time(progress, phase))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn curves_pin_endpoints() {
        for e in [Easing::Linear, Easing::Smoothstep, Easing::CubicInOut] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_relative_eq!(e.apply(1.0), 1.0);
            assert_relative_eq!(e.apply(0.5), 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for e in [Easing::Smoothstep, Easing::CubicInOut] {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = e.apply(i as f32 / 100.0);
                assert!(v >= prev - 1e-6);
                prev = v;
            }
        }
    }

    #[test]
    fn ornament_remap_spreads_by_phase() {
        let r = EasingPolicy::ORNAMENT.remap;
        // Phase 0 tracks progress exactly, phase 1 lags early and catches up.
        assert_relative_eq!(r.local_time(0.4, 0.0), 0.4);
        assert_relative_eq!(r.local_time(0.4, 1.0), 0.4);
        assert_relative_eq!(r.local_time(0.1, 1.0), 0.0);
        assert_relative_eq!(r.local_time(0.9, 1.0), 1.0);
    }

    #[test]
    fn card_remap_holds_back_until_progress_rises() {
        let r = EasingPolicy::CARD.remap;
        assert_eq!(r.local_time(0.1, 0.0), 0.0);
        assert_relative_eq!(r.local_time(0.5, 0.0), 0.4, epsilon = 1e-6);
        assert_relative_eq!(r.local_time(0.5, 1.0), 0.5, epsilon = 1e-6);
        assert_eq!(r.local_time(1.0, 0.0), 1.0);
    }

    #[test]
    fn local_time_is_clamped() {
        for remap in [EasingPolicy::FOLIAGE.remap, EasingPolicy::ORNAMENT.remap, EasingPolicy::CARD.remap] {
            for p in [-3.0, 0.0, 0.5, 1.0, 7.0] {
                for phase in [0.0, 0.5, 1.0] {
                    let t = remap.local_time(p, phase);
                    assert!((0.0..=1.0).contains(&t));
                }
            }
        }
    }

    #[test]
    fn cards_trail_foliage_at_midpoint() {
        let foliage = EasingPolicy::FOLIAGE.eased(0.5, 0.5);
        let card    = EasingPolicy::CARD.eased(0.5, 0.5);
        assert!(card < foliage);
    }
}
