//! Energy budget carried down a propagation path

use serde::{Deserialize, Serialize};

use crate::MaterialState;

/// Scalar resource consumed by node materials along one path
///
/// Budgets are `Copy`: every fan-out hands each child its own value, so one
/// branch spending energy never affects a sibling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyBudget {
    /// Energy left for this path (negative once exhausted)
    pub current: f32,
    /// Energy injected at the source; losses are proportional to this
    pub total: f32,
}

impl EnergyBudget {
    /// A fresh budget with `current == total`
    pub fn new(total: f32) -> Self {
        Self {
            current: total,
            total,
        }
    }

    /// Amount a node of `material` removes from this budget
    pub fn loss_for(&self, material: MaterialState) -> f32 {
        material.loss_factor() * self.total
    }

    /// Budget left after passing through a node of `material`
    pub fn after_loss(self, material: MaterialState) -> Self {
        let loss = self.loss_for(material);
        log::trace!(
            "budget {:.1}/{:.1} loses {:.1} through {}",
            self.current,
            self.total,
            loss,
            material
        );
        Self {
            current: self.current - loss,
            total: self.total,
        }
    }

    /// Whether the path may keep propagating
    pub fn is_sufficient(&self) -> bool {
        self.current >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conductor_keeps_full_budget() {
        let budget = EnergyBudget::new(100.0).after_loss(MaterialState::Conductor);
        assert_eq!(budget.current, 100.0);
        assert!(budget.is_sufficient());
    }

    #[test]
    fn test_absorber_always_exhausts() {
        let fresh = EnergyBudget::new(100.0).after_loss(MaterialState::Absorber);
        assert_eq!(fresh.current, -100.0);
        assert!(!fresh.is_sufficient());
    }

    #[test]
    fn test_insulators_exhaust_on_third_node() {
        let one = EnergyBudget::new(100.0).after_loss(MaterialState::Insulator);
        let two = one.after_loss(MaterialState::Insulator);
        let three = two.after_loss(MaterialState::Insulator);
        assert_eq!(one.current, 50.0);
        assert_eq!(two.current, 0.0);
        assert!(two.is_sufficient());
        assert!(!three.is_sufficient());
    }

    #[test]
    fn test_budget_never_increases() {
        let mut budget = EnergyBudget::new(100.0);
        for material in [
            MaterialState::Conductor,
            MaterialState::Insulator,
            MaterialState::Conductor,
            MaterialState::Absorber,
        ] {
            let next = budget.after_loss(material);
            assert!(next.current <= budget.current);
            assert_eq!(next.total, budget.total);
            budget = next;
        }
    }
}
