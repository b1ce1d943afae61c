//! Gate sequences applied between encode and decode
//!
//! The blur itself is a single X rotation on every qubit. The other effects
//! act on a subset of qubits chosen by a modulo/remainder rule:
//!
//! ```text
//! selection { modulo: 2, remainder: 0 }   qubits 0, 2, 4, ...
//! selection { modulo: 3, remainder: 1 }   qubits 1, 4, 7, ...
//! ```
//!
//! Two-qubit effects walk the register in blocks of `modulo` qubits and pair
//! `block + control_remainder` with `block + target_remainder`; a pair that
//! runs past the last qubit is skipped.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::simulator::StateSimulator;

/// Qubit `i` is selected iff `i % modulo == remainder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitSelection {
    pub modulo: u32,
    pub remainder: u32,
}

impl Default for QubitSelection {
    fn default() -> Self {
        Self::half()
    }
}

impl QubitSelection {
    /// Validated selection
    pub fn new(modulo: u32, remainder: u32) -> Result<Self> {
        let selection = Self { modulo, remainder };
        selection.validate()?;
        Ok(selection)
    }

    /// Every other qubit, starting at 0
    pub const fn half() -> Self {
        Self {
            modulo: 2,
            remainder: 0,
        }
    }

    /// Every qubit
    pub const fn all() -> Self {
        Self {
            modulo: 1,
            remainder: 0,
        }
    }

    /// Reject selections that can never match (`modulo == 0` or
    /// `remainder >= modulo`).
    pub fn validate(&self) -> Result<()> {
        if self.modulo == 0 || self.remainder >= self.modulo {
            return Err(Error::InvalidSelection {
                modulo: self.modulo as usize,
                remainder: self.remainder as usize,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, qubit: u32) -> bool {
        self.modulo != 0 && qubit % self.modulo == self.remainder
    }

    /// Selected qubits of an `num_qubits`-qubit register, ascending.
    pub fn qubits(&self, num_qubits: u32) -> impl Iterator<Item = u32> + '_ {
        (0..num_qubits).filter(move |&q| self.contains(q))
    }
}

/// A gate sequence that can be queued on any [`StateSimulator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum Effect {
    /// X rotation on every qubit
    Rotation { angle: f64 },
    /// X rotation on selected qubits
    PartialRotation { angle: f64, selection: QubitSelection },
    /// Hadamard on one qubit; qubit 0 if `qubit` is not in the register
    Hadamard { qubit: u32 },
    /// Hadamard on selected qubits
    HadamardFraction { selection: QubitSelection },
    /// Controlled-not on paired qubits of every block
    ControlledNotFraction {
        modulo: u32,
        control_remainder: u32,
        target_remainder: u32,
    },
    /// Controlled X rotation on paired qubits of every block
    ControlledRotationFraction {
        angle: f64,
        modulo: u32,
        control_remainder: u32,
        target_remainder: u32,
    },
    /// Several effects, applied in order
    Sequence(Vec<Effect>),
}

impl Default for Effect {
    fn default() -> Self {
        Effect::Rotation { angle: 0.25 }
    }
}

impl Effect {
    /// The blur: X rotation on every qubit.
    pub fn blur(angle: f64) -> Self {
        Effect::Rotation { angle }
    }

    /// Controlled-not with the usual `(0, 1)` pairing in blocks of two
    pub fn controlled_not_pairs() -> Self {
        Effect::ControlledNotFraction {
            modulo: 2,
            control_remainder: 0,
            target_remainder: 1,
        }
    }

    /// Rotation angle, for effects that have one. A sequence reports the
    /// first angle it contains.
    pub fn angle(&self) -> Option<f64> {
        match self {
            Effect::Rotation { angle }
            | Effect::PartialRotation { angle, .. }
            | Effect::ControlledRotationFraction { angle, .. } => Some(*angle),
            Effect::Hadamard { .. } | Effect::HadamardFraction { .. } | Effect::ControlledNotFraction { .. } => None,
            Effect::Sequence(effects) => effects.iter().find_map(Effect::angle),
        }
    }

    /// Copy of this effect with every rotation angle replaced by `angle`.
    /// Effects without an angle are returned unchanged.
    ///
    /// ```
    /// use qblur_core::effects::Effect;
    ///
    /// let swept = Effect::blur(0.0).with_angle(0.4);
    /// assert_eq!(swept.angle(), Some(0.4));
    /// ```
    pub fn with_angle(&self, angle: f64) -> Self {
        match self {
            Effect::Rotation { .. } => Effect::Rotation { angle },
            Effect::PartialRotation { selection, .. } => Effect::PartialRotation {
                angle,
                selection: *selection,
            },
            Effect::ControlledRotationFraction {
                modulo,
                control_remainder,
                target_remainder,
                ..
            } => Effect::ControlledRotationFraction {
                angle,
                modulo: *modulo,
                control_remainder: *control_remainder,
                target_remainder: *target_remainder,
            },
            Effect::Sequence(effects) => Effect::Sequence(effects.iter().map(|e| e.with_angle(angle)).collect()),
            other => other.clone(),
        }
    }

    /// Check parameters that do not depend on the register size.
    pub fn validate(&self) -> Result<()> {
        match self {
            Effect::Rotation { angle } => check_angle(*angle),
            Effect::PartialRotation { angle, selection } => {
                check_angle(*angle)?;
                selection.validate()
            }
            Effect::Hadamard { .. } => Ok(()),
            Effect::HadamardFraction { selection } => selection.validate(),
            Effect::ControlledNotFraction {
                modulo,
                control_remainder,
                target_remainder,
            } => check_pairing(*modulo, *control_remainder, *target_remainder),
            Effect::ControlledRotationFraction {
                angle,
                modulo,
                control_remainder,
                target_remainder,
            } => {
                check_angle(*angle)?;
                check_pairing(*modulo, *control_remainder, *target_remainder)
            }
            Effect::Sequence(effects) => effects.iter().try_for_each(Effect::validate),
        }
    }

    /// Queue this effect's gates on `sim`.
    pub fn apply<S: StateSimulator + ?Sized>(&self, sim: &mut S) -> Result<()> {
        self.validate()?;
        self.queue(sim)
    }

    fn queue<S: StateSimulator + ?Sized>(&self, sim: &mut S) -> Result<()> {
        let n = sim.num_qubits();
        match self {
            Effect::Rotation { angle } => (0..n).try_for_each(|q| sim.rx(q, *angle)),
            Effect::PartialRotation { angle, selection } => {
                selection.qubits(n).try_for_each(|q| sim.rx(q, *angle))
            }
            Effect::Hadamard { qubit } => {
                let target = if *qubit < n {
                    *qubit
                } else {
                    tracing::debug!(qubit, num_qubits = n, "hadamard qubit out of range, using qubit 0");
                    0
                };
                sim.h(target)
            }
            Effect::HadamardFraction { selection } => selection.qubits(n).try_for_each(|q| sim.h(q)),
            Effect::ControlledNotFraction {
                modulo,
                control_remainder,
                target_remainder,
            } => block_pairs(n, *modulo, *control_remainder, *target_remainder).try_for_each(|(c, t)| sim.cx(c, t)),
            Effect::ControlledRotationFraction {
                angle,
                modulo,
                control_remainder,
                target_remainder,
            } => block_pairs(n, *modulo, *control_remainder, *target_remainder)
                .try_for_each(|(c, t)| sim.crx(c, t, *angle)),
            Effect::Sequence(effects) => effects.iter().try_for_each(|e| e.queue(sim)),
        }
    }
}

fn check_angle(angle: f64) -> Result<()> {
    if !angle.is_finite() {
        return Err(Error::InvalidInput(format!("rotation angle must be finite, got {}", angle)));
    }
    Ok(())
}

fn check_pairing(modulo: u32, control_remainder: u32, target_remainder: u32) -> Result<()> {
    for remainder in [control_remainder, target_remainder] {
        QubitSelection { modulo, remainder }.validate()?;
    }
    if control_remainder == target_remainder {
        return Err(Error::InvalidInput(format!(
            "control and target remainder must differ, both are {}",
            control_remainder
        )));
    }
    Ok(())
}

/// `(block + control, block + target)` for every block start, dropping pairs
/// that fall outside the register.
fn block_pairs(num_qubits: u32, modulo: u32, control: u32, target: u32) -> impl Iterator<Item = (u32, u32)> {
    (0..num_qubits)
        .step_by(modulo.max(1) as usize)
        .map(move |block| (block + control, block + target))
        .filter(move |&(c, t)| c < num_qubits && t < num_qubits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{Gate, RegisterSpec, StateVectorSimulator};

    fn sim(qubits: u32) -> StateVectorSimulator {
        StateVectorSimulator::create(RegisterSpec::with_amplitude_access(qubits)).unwrap()
    }

    #[test]
    fn test_selection_rule() {
        let half = QubitSelection::default();
        assert_eq!(half.qubits(5).collect::<Vec<_>>(), vec![0, 2, 4]);

        let thirds = QubitSelection::new(3, 1).unwrap();
        assert_eq!(thirds.qubits(8).collect::<Vec<_>>(), vec![1, 4, 7]);

        assert_eq!(QubitSelection::all().qubits(3).count(), 3);
        assert!(QubitSelection::new(0, 0).is_err());
        assert!(matches!(
            QubitSelection::new(2, 2),
            Err(Error::InvalidSelection { modulo: 2, remainder: 2 })
        ));
    }

    #[test]
    fn test_rotation_touches_every_qubit() {
        let mut s = sim(3);
        Effect::blur(0.3).apply(&mut s).unwrap();
        assert_eq!(s.gates(), &[Gate::Rx(0, 0.3), Gate::Rx(1, 0.3), Gate::Rx(2, 0.3)]);
    }

    #[test]
    fn test_partial_rotation_uses_selection() {
        let mut s = sim(4);
        Effect::PartialRotation {
            angle: 0.5,
            selection: QubitSelection::half(),
        }
        .apply(&mut s)
        .unwrap();
        assert_eq!(s.gates(), &[Gate::Rx(0, 0.5), Gate::Rx(2, 0.5)]);
    }

    #[test]
    fn test_hadamard_falls_back_to_qubit_zero() {
        let mut s = sim(2);
        Effect::Hadamard { qubit: 1 }.apply(&mut s).unwrap();
        Effect::Hadamard { qubit: 9 }.apply(&mut s).unwrap();
        assert_eq!(s.gates(), &[Gate::H(1), Gate::H(0)]);
    }

    #[test]
    fn test_controlled_not_pairs_skip_out_of_range() {
        let mut s = sim(5);
        Effect::controlled_not_pairs().apply(&mut s).unwrap();
        // Block 4 would pair (4, 5), which is outside a 5-qubit register.
        assert_eq!(s.gates(), &[Gate::Cx(0, 1), Gate::Cx(2, 3)]);
    }

    #[test]
    fn test_controlled_rotation_blocks_of_three() {
        let mut s = sim(6);
        Effect::ControlledRotationFraction {
            angle: 0.1,
            modulo: 3,
            control_remainder: 2,
            target_remainder: 0,
        }
        .apply(&mut s)
        .unwrap();
        assert_eq!(s.gates(), &[Gate::Crx(2, 0, 0.1), Gate::Crx(5, 3, 0.1)]);
    }

    #[test]
    fn test_sequence_applies_in_order_and_rebinds_angles() {
        let effect = Effect::Sequence(vec![
            Effect::HadamardFraction {
                selection: QubitSelection::new(2, 1).unwrap(),
            },
            Effect::blur(0.0),
        ]);
        assert_eq!(effect.angle(), Some(0.0));

        let mut s = sim(2);
        effect.with_angle(0.7).apply(&mut s).unwrap();
        assert_eq!(s.gates(), &[Gate::H(1), Gate::Rx(0, 0.7), Gate::Rx(1, 0.7)]);
    }

    #[test]
    fn test_invalid_effects_queue_nothing() {
        let mut s = sim(3);
        let bad = Effect::Sequence(vec![
            Effect::blur(0.1),
            Effect::ControlledNotFraction {
                modulo: 2,
                control_remainder: 1,
                target_remainder: 1,
            },
        ]);
        assert!(bad.apply(&mut s).is_err());
        assert_eq!(s.gate_count(), 0);
        assert!(Effect::blur(f64::INFINITY).apply(&mut s).is_err());
    }

    #[test]
    fn test_serde_tagged_form() {
        let effect: Effect = serde_json::from_str(r#"{"kind":"rotation","params":{"angle":0.25}}"#).unwrap();
        assert_eq!(effect, Effect::blur(0.25));
        assert_eq!(Effect::Hadamard { qubit: 0 }.angle(), None);
    }
}
