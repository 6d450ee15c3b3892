//! Fill-level convergence state machine
//!
//! A node's visible fill rises linearly while heating and falls along an
//! accelerating curve while cooling. Completion of either ramp is the point
//! at which the owning node commits its thermal state.

use crate::config::RampConfig;

/// Convergence ramp state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvergenceState {
    #[default]
    Cooled,
    Heating,
    Heated,
    Cooling,
}

/// Continuous 0..1 fill level owned by one node
#[derive(Clone, Debug)]
pub struct Convergence {
    fill: f32,
    target: f32,
    state: ConvergenceState,
    /// Current fall rate; grows each tick while cooling
    cool_speed: f32,
    profile: RampConfig,
}

impl Convergence {
    pub fn new(profile: RampConfig) -> Self {
        Self {
            fill: 0.0,
            target: 0.0,
            state: ConvergenceState::Cooled,
            cool_speed: profile.cool_start_rate,
            profile,
        }
    }

    /// Start rising toward `target`
    ///
    /// Returns `false` (and changes nothing) unless the ramp is cooled.
    pub fn heat(&mut self, target: f32) -> bool {
        if self.state != ConvergenceState::Cooled {
            return false;
        }
        self.target = target.clamp(0.0, 1.0);
        self.state = ConvergenceState::Heating;
        true
    }

    /// Start falling toward zero from the current fill
    ///
    /// Interrupts a rising ramp. Returns `false` if already cooled or cooling.
    pub fn cool(&mut self) -> bool {
        match self.state {
            ConvergenceState::Cooled | ConvergenceState::Cooling => false,
            ConvergenceState::Heating | ConvergenceState::Heated => {
                self.state = ConvergenceState::Cooling;
                self.cool_speed = self.profile.cool_start_rate;
                true
            }
        }
    }

    /// Advance the active ramp by `dt` seconds and return the resulting state
    pub fn advance(&mut self, dt: f32) -> ConvergenceState {
        match self.state {
            ConvergenceState::Heating => {
                self.fill += self.profile.fill_rate * dt;
                if self.fill >= self.target {
                    self.fill = self.target;
                    self.state = ConvergenceState::Heated;
                }
            }
            ConvergenceState::Cooling => {
                self.fill -= self.cool_speed * dt;
                if self.cool_speed < self.profile.fill_rate {
                    self.cool_speed =
                        (self.cool_speed * self.profile.cool_acceleration).min(self.profile.fill_rate);
                }
                if self.fill <= self.profile.cooled_threshold {
                    self.fill = 0.0;
                    self.state = ConvergenceState::Cooled;
                }
            }
            ConvergenceState::Cooled | ConvergenceState::Heated => {}
        }
        self.state
    }

    pub fn state(&self) -> ConvergenceState {
        self.state
    }

    pub fn fill(&self) -> f32 {
        self.fill
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Current fall rate (only meaningful while cooling)
    pub fn cool_speed(&self) -> f32 {
        self.cool_speed
    }
}
