//! Glow pulse driven during a material transition
//!
//! Each member of a transition group runs one pulse: intensity rises to its
//! peak (the midpoint, where the material actually changes) and falls back to
//! zero (settled).

/// Milestone reached during one `advance` step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlowMilestone {
    Midpoint,
    Settled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GlowPhase {
    Rising,
    Falling,
    Settled,
}

/// Rise-then-fall intensity ramp
#[derive(Clone, Debug)]
pub struct GlowPulse {
    intensity: f32,
    /// Intensity change per second, both directions
    rate: f32,
    phase: GlowPhase,
}

impl GlowPulse {
    const PEAK: f32 = 0.99;
    const FLOOR: f32 = 0.01;

    /// A pulse whose half-cycle rate is `glow_speed * change_duration / 2`
    pub fn new(glow_speed: f32, change_duration: f32) -> Self {
        Self {
            intensity: 0.0,
            rate: glow_speed * change_duration / 2.0,
            phase: GlowPhase::Rising,
        }
    }

    pub fn advance(&mut self, dt: f32) -> Option<GlowMilestone> {
        match self.phase {
            GlowPhase::Rising => {
                self.intensity += self.rate * dt;
                if self.intensity >= Self::PEAK {
                    self.intensity = 1.0;
                    self.phase = GlowPhase::Falling;
                    return Some(GlowMilestone::Midpoint);
                }
                None
            }
            GlowPhase::Falling => {
                self.intensity -= self.rate * dt;
                if self.intensity <= Self::FLOOR {
                    self.intensity = 0.0;
                    self.phase = GlowPhase::Settled;
                    return Some(GlowMilestone::Settled);
                }
                None
            }
            GlowPhase::Settled => None,
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn is_settled(&self) -> bool {
        self.phase == GlowPhase::Settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_hits_midpoint_then_settles() {
        let mut pulse = GlowPulse::new(1.0, 2.0);
        let mut milestones = Vec::new();
        for _ in 0..1000 {
            if let Some(m) = pulse.advance(0.1) {
                milestones.push(m);
            }
        }
        assert_eq!(
            milestones,
            vec![GlowMilestone::Midpoint, GlowMilestone::Settled]
        );
        assert!(pulse.is_settled());
        assert_eq!(pulse.intensity(), 0.0);
    }

    #[test]
    fn test_faster_pulse_peaks_sooner() {
        let mut slow = GlowPulse::new(1.0, 2.0);
        let mut fast = GlowPulse::new(2.0, 2.0);
        let mut fast_peaked_first = false;
        for _ in 0..100 {
            let f = fast.advance(0.05);
            let s = slow.advance(0.05);
            if f == Some(GlowMilestone::Midpoint) {
                fast_peaked_first = s.is_none() && !slow.is_settled();
                break;
            }
        }
        assert!(fast_peaked_first);
    }
}
