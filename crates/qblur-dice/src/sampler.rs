//! Correlated-outcome sampler
//!
//! Resolution is polled, once per frame, until the dice agree:
//!
//! ```text
//! Independent ───────────────────────────────────────────▶ true
//! fewer than two dice ───────────────────────────────────▶ false
//! draw row (a, b) ─▶ set_face(a), set_face(b)
//!                    ├─ either die rolling ──────────────▶ false
//!                    ├─ shown faces != (a, b) ───────────▶ false
//!                    └─ both commands accepted ──────────▶ true
//! ```
//!
//! A failed poll is not an error; the caller polls again on a later tick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qblur_tracing::perf_event;

use crate::die::Die;
use crate::error::{Error, Result};
use crate::regime::{CorrelationRegime, FacePair};

/// Draws joint outcomes for a regime and steers a pair of dice onto them.
#[derive(Debug, Clone)]
pub struct CorrelatedSampler {
    regime: CorrelationRegime,
    rng: StdRng,
    last_pair: Option<FacePair>,
    polls: u64,
}

impl CorrelatedSampler {
    /// Sampler seeded from the operating system
    pub fn new(regime: CorrelationRegime) -> Self {
        Self::from_rng(regime, StdRng::from_entropy())
    }

    /// Reproducible sampler
    pub fn with_seed(regime: CorrelationRegime, seed: u64) -> Self {
        Self::from_rng(regime, StdRng::seed_from_u64(seed))
    }

    fn from_rng(regime: CorrelationRegime, rng: StdRng) -> Self {
        Self {
            regime,
            rng,
            last_pair: None,
            polls: 0,
        }
    }

    pub fn regime(&self) -> CorrelationRegime {
        self.regime
    }

    /// Switch regime. Any resolved pair is forgotten.
    pub fn set_regime(&mut self, regime: CorrelationRegime) {
        tracing::debug!(from = %self.regime, to = %regime, "correlation regime changed");
        self.regime = regime;
        self.last_pair = None;
    }

    /// Pair shown by the dice at the last successful resolution
    pub fn last_pair(&self) -> Option<FacePair> {
        self.last_pair
    }

    /// Number of `try_resolve` calls so far
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Uniformly draw one row of the regime's table.
    pub fn draw(&mut self) -> FacePair {
        let table = self.regime.table();
        table[self.rng.gen_range(0..table.len())]
    }

    /// One resolution poll over `dice`; only the first two dice take part.
    ///
    /// Returns true once both dice are at rest showing the drawn pair. Every
    /// poll draws a fresh row, so the pair that finally sticks is the one
    /// drawn on the successful poll.
    pub fn try_resolve<D: Die>(&mut self, dice: &mut [D]) -> bool {
        self.polls += 1;

        if !self.regime.is_correlated() {
            self.last_pair = match dice {
                [first, second, ..] => first.face().zip(second.face()),
                _ => None,
            };
            return true;
        }

        let [first, second, ..] = dice else {
            tracing::trace!(dice = dice.len(), "correlated roll needs two dice");
            return false;
        };

        let (a, b) = self.draw();
        let accepted_first = first.set_face(a);
        let accepted_second = second.set_face(b);

        if first.is_rolling() || second.is_rolling() {
            tracing::trace!(pair = ?(a, b), "dice still rolling");
            return false;
        }
        if first.face() != Some(a) || second.face() != Some(b) {
            tracing::trace!(
                pair = ?(a, b),
                shown = ?(first.face(), second.face()),
                "dice show a different pair"
            );
            return false;
        }
        if accepted_first && accepted_second {
            self.last_pair = Some((a, b));
            perf_event!("dice_resolved", regime = self.regime.name(), first = a, second = b);
            return true;
        }
        false
    }

    /// Poll until resolved, calling `step` between polls to advance the
    /// dice. Gives up after `max_polls` polls.
    ///
    /// ```
    /// use qblur_dice::{CorrelatedSampler, CorrelationRegime, VirtualDie};
    ///
    /// let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::AntisymmetricEntangled, 7);
    /// let mut dice = vec![VirtualDie::new(3), VirtualDie::new(3)];
    /// let mut rng = rand::thread_rng();
    /// for die in dice.iter_mut() {
    ///     die.throw(&mut rng);
    /// }
    ///
    /// let pair = sampler
    ///     .resolve_with_budget(&mut dice, 10, |dice| dice.iter_mut().for_each(VirtualDie::step))
    ///     .unwrap();
    /// assert_eq!(pair.map(|(a, b)| a + b), Some(7));
    /// ```
    pub fn resolve_with_budget<D, F>(&mut self, dice: &mut [D], max_polls: u32, mut step: F) -> Result<Option<FacePair>>
    where
        D: Die,
        F: FnMut(&mut [D]),
    {
        if self.regime.is_correlated() && dice.len() < 2 {
            return Err(Error::NotEnoughDice {
                required: 2,
                actual: dice.len(),
            });
        }

        for _ in 0..max_polls {
            if self.try_resolve(dice) {
                return Ok(self.last_pair);
            }
            step(dice);
        }

        tracing::warn!(regime = %self.regime, polls = max_polls, "dice did not resolve");
        Err(Error::RetryBudgetExhausted { polls: max_polls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::VirtualDie;

    fn settled_pair() -> Vec<VirtualDie> {
        vec![VirtualDie::new(0), VirtualDie::new(0)]
    }

    #[test]
    fn test_independent_is_immediate_success() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Independent, 1);
        let mut none: Vec<VirtualDie> = Vec::new();
        assert!(sampler.try_resolve(&mut none));
        assert_eq!(sampler.last_pair(), None);

        let mut dice = vec![VirtualDie::showing(2).unwrap(), VirtualDie::showing(5).unwrap()];
        assert!(sampler.try_resolve(&mut dice));
        assert_eq!(sampler.last_pair(), Some((2, 5)));
    }

    #[test]
    fn test_correlated_needs_two_dice() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Symmetric, 1);
        let mut one = vec![VirtualDie::new(0)];
        assert!(!sampler.try_resolve(&mut one));
        assert!(matches!(
            sampler.resolve_with_budget(&mut one, 5, |_| {}),
            Err(Error::NotEnoughDice { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_rolling_dice_defer_resolution() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::SymmetricEntangled, 9);
        let mut dice = vec![VirtualDie::new(2), VirtualDie::new(2)];
        let mut rng = StdRng::seed_from_u64(0);
        dice.iter_mut().for_each(|d| d.throw(&mut rng));

        assert!(!sampler.try_resolve(&mut dice));
        assert_eq!(sampler.last_pair(), None);

        dice.iter_mut().for_each(VirtualDie::step);
        dice.iter_mut().for_each(VirtualDie::step);
        assert!(sampler.try_resolve(&mut dice));
        let (a, b) = sampler.last_pair().unwrap();
        assert_eq!(a, b);
        assert_eq!(dice[0].face(), Some(a));
    }

    #[test]
    fn test_display_mismatch_defers_resolution() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Antisymmetric, 4);
        let mut dice = vec![
            VirtualDie::showing(6).unwrap().with_display_lag(1),
            VirtualDie::showing(6).unwrap(),
        ];
        // The lagging die still shows its old face right after the command,
        // and a 6 never opens an antisymmetric pair.
        assert!(!sampler.try_resolve(&mut dice));
        assert_eq!(sampler.polls(), 1);
    }

    #[test]
    fn test_budget_exhaustion() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Symmetric, 2);
        let mut dice = vec![VirtualDie::new(100), VirtualDie::new(100)];
        let mut rng = StdRng::seed_from_u64(5);
        dice.iter_mut().for_each(|d| d.throw(&mut rng));

        let result = sampler.resolve_with_budget(&mut dice, 10, |dice| dice.iter_mut().for_each(VirtualDie::step));
        assert!(matches!(result, Err(Error::RetryBudgetExhausted { polls: 10 })));
        assert_eq!(sampler.polls(), 10);
    }

    #[test]
    fn test_set_regime_clears_last_pair() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Symmetric, 2);
        let mut dice = settled_pair();
        assert!(sampler.try_resolve(&mut dice));
        assert!(sampler.last_pair().is_some());

        sampler.set_regime(CorrelationRegime::Antisymmetric);
        assert_eq!(sampler.last_pair(), None);
        assert_eq!(sampler.regime(), CorrelationRegime::Antisymmetric);
    }

    #[test]
    fn test_seeded_samplers_agree() {
        let mut a = CorrelatedSampler::with_seed(CorrelationRegime::Independent, 42);
        let mut b = CorrelatedSampler::with_seed(CorrelationRegime::Independent, 42);
        for _ in 0..100 {
            assert_eq!(a.draw(), b.draw());
        }
    }
}
