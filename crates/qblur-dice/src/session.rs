//! Frame-driven roll session
//!
//! A roll is over once the sampler has placed the dice and at least
//! `settle_secs` have passed since the throw. Until then the session keeps
//! polling every frame, so the pair shown can still change while the dice
//! are tumbling.

use serde::{Deserialize, Serialize};

use crate::die::Die;
use crate::error::{Error, Result};
use crate::regime::FacePair;
use crate::sampler::CorrelatedSampler;

/// Timing for a roll session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    /// Minimum time between the throw and the end of the roll
    pub settle_secs: f64,
    /// Give up after this many unresolved polls; `None` polls forever
    pub max_polls: Option<u32>,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            settle_secs: 2.0,
            max_polls: None,
        }
    }
}

/// Whether the current roll has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollStatus {
    Rolling,
    Over,
}

/// Tracks one roll at a time.
#[derive(Debug, Clone)]
pub struct RollSession {
    config: RollConfig,
    elapsed: f64,
    faced_up: bool,
    over: bool,
    failed_polls: u32,
}

impl RollSession {
    pub fn new(config: RollConfig) -> Self {
        Self {
            config,
            elapsed: 0.0,
            faced_up: false,
            over: false,
            failed_polls: 0,
        }
    }

    pub fn config(&self) -> &RollConfig {
        &self.config
    }

    /// Seconds since the throw
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Start a new roll. The caller throws the dice.
    pub fn begin(&mut self) {
        self.elapsed = 0.0;
        self.faced_up = false;
        self.over = false;
        self.failed_polls = 0;
    }

    /// Advance by `elapsed` seconds, polling the sampler while the roll is
    /// unresolved or still inside the settle window.
    pub fn update<D: Die>(
        &mut self,
        elapsed: f64,
        sampler: &mut CorrelatedSampler,
        dice: &mut [D],
    ) -> Result<RollStatus> {
        if self.over {
            return Ok(RollStatus::Over);
        }

        if !self.faced_up || self.elapsed < self.config.settle_secs {
            self.faced_up = sampler.try_resolve(dice);

            if self.faced_up {
                self.failed_polls = 0;
            } else {
                self.failed_polls += 1;
                if let Some(limit) = self.config.max_polls {
                    if self.failed_polls >= limit {
                        tracing::warn!(polls = self.failed_polls, regime = %sampler.regime(), "roll abandoned");
                        return Err(Error::RetryBudgetExhausted {
                            polls: self.failed_polls,
                        });
                    }
                }
            }
        }

        self.elapsed += elapsed.max(0.0);

        if self.faced_up && self.elapsed > self.config.settle_secs {
            self.over = true;
            tracing::debug!(pair = ?sampler.last_pair(), elapsed = self.elapsed, "roll over");
            return Ok(RollStatus::Over);
        }
        Ok(RollStatus::Rolling)
    }

    /// Faces of the dice once the roll is over
    pub fn result<D: Die>(&self, dice: &[D]) -> Option<FacePair> {
        if !self.over {
            return None;
        }
        match dice {
            [first, second, ..] => first.face().zip(second.face()),
            _ => None,
        }
    }
}

impl Default for RollSession {
    fn default() -> Self {
        Self::new(RollConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::VirtualDie;
    use crate::regime::CorrelationRegime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: f64 = 0.25;

    fn thrown(settle_steps: u32, seed: u64) -> Vec<VirtualDie> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut dice = vec![VirtualDie::new(settle_steps), VirtualDie::new(settle_steps)];
        dice.iter_mut().for_each(|d| d.throw(&mut rng));
        dice
    }

    #[test]
    fn test_roll_ends_after_settle_window() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Symmetric, 11);
        let mut session = RollSession::default();
        let mut dice = thrown(2, 1);
        session.begin();

        let mut frames = 0;
        while session.update(FRAME, &mut sampler, &mut dice).unwrap() == RollStatus::Rolling {
            dice.iter_mut().for_each(VirtualDie::step);
            frames += 1;
            assert!(frames < 100);
        }
        // Resolution succeeds early, but the roll is held until more than
        // two seconds have elapsed.
        assert!(session.elapsed() > 2.0);
        let (a, b) = session.result(&dice).unwrap();
        assert!(a <= b);
        assert_eq!(sampler.last_pair(), Some((a, b)));
    }

    #[test]
    fn test_result_is_hidden_while_rolling() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Antisymmetric, 3);
        let mut session = RollSession::default();
        let mut dice = thrown(50, 2);
        assert_eq!(session.update(FRAME, &mut sampler, &mut dice).unwrap(), RollStatus::Rolling);
        assert_eq!(session.result(&dice), None);
    }

    #[test]
    fn test_poll_budget() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Antisymmetric, 3);
        let mut session = RollSession::new(RollConfig {
            settle_secs: 2.0,
            max_polls: Some(4),
        });
        let mut dice = thrown(1_000, 2);
        for _ in 0..3 {
            assert_eq!(session.update(FRAME, &mut sampler, &mut dice).unwrap(), RollStatus::Rolling);
        }
        assert!(matches!(
            session.update(FRAME, &mut sampler, &mut dice),
            Err(Error::RetryBudgetExhausted { polls: 4 })
        ));
    }

    #[test]
    fn test_begin_resets() {
        let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::Independent, 0);
        let mut session = RollSession::new(RollConfig {
            settle_secs: 0.0,
            max_polls: None,
        });
        let mut dice = vec![VirtualDie::showing(3).unwrap(), VirtualDie::showing(4).unwrap()];
        assert_eq!(session.update(FRAME, &mut sampler, &mut dice).unwrap(), RollStatus::Over);
        assert_eq!(session.result(&dice), Some((3, 4)));

        session.begin();
        assert!(!session.is_over());
        assert_eq!(session.elapsed(), 0.0);
    }
}
