//! State simulator interface
//!
//! The codec and drivers only need a narrow capability set from a simulator:
//! build a register, write amplitudes directly, queue gates, drop queued
//! gates, and measure the probability of every basis state. Anything that
//! provides that set can stand in for [`StateVectorSimulator`].
//!
//! ## Qubit ordering
//!
//! Qubit `q` addresses bit `q` of the basis-state index, so qubit 0 toggles
//! between neighbouring amplitudes and the highest qubit splits the buffer
//! in half.

pub mod statevector;

pub use statevector::StateVectorSimulator;

use num_complex::Complex64;
use std::fmt;

use crate::error::{Error, Result};

/// Shape of a register to allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSpec {
    /// Number of qubits; the amplitude buffer has `2^qubits` entries
    pub qubits: u32,
    /// Number of classical bits reserved for measurement results
    pub classical_bits: u32,
    /// Whether the amplitude buffer may be written directly
    pub amplitude_access: bool,
}

impl RegisterSpec {
    /// Register with one classical bit per qubit and amplitude access enabled,
    /// which is what the codec needs.
    pub fn with_amplitude_access(qubits: u32) -> Self {
        Self {
            qubits,
            classical_bits: qubits,
            amplitude_access: true,
        }
    }

    /// Reject empty registers and registers above `max_qubits`.
    pub fn validate(&self, max_qubits: u32) -> Result<()> {
        if self.qubits == 0 {
            return Err(Error::InvalidInput("register needs at least one qubit".to_string()));
        }
        if self.qubits > max_qubits {
            return Err(Error::QubitLimitExceeded {
                requested: self.qubits,
                max: max_qubits,
            });
        }
        Ok(())
    }

    /// Length of the amplitude buffer for this register
    pub fn amplitude_len(&self) -> usize {
        1usize << self.qubits
    }
}

/// Gates the drivers can queue on a register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Rotation about the X axis by `angle` radians
    Rx(u32, f64),
    /// Hadamard
    H(u32),
    /// Controlled-not `(control, target)`
    Cx(u32, u32),
    /// Controlled X rotation `(control, target, angle)`
    Crx(u32, u32, f64),
}

impl Gate {
    /// Short gate mnemonic
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Rx(..) => "rx",
            Gate::H(_) => "h",
            Gate::Cx(..) => "cx",
            Gate::Crx(..) => "crx",
        }
    }

    /// Highest qubit index the gate touches
    fn max_qubit(&self) -> u32 {
        match *self {
            Gate::Rx(q, _) | Gate::H(q) => q,
            Gate::Cx(c, t) | Gate::Crx(c, t, _) => c.max(t),
        }
    }

    /// Check the gate against a register of `num_qubits` qubits.
    pub fn validate(&self, num_qubits: u32) -> Result<()> {
        let qubit = self.max_qubit();
        if qubit >= num_qubits {
            return Err(Error::QubitOutOfRange { qubit, num_qubits });
        }
        match *self {
            Gate::Cx(c, t) | Gate::Crx(c, t, _) if c == t => Err(Error::InvalidInput(format!(
                "{} gate needs distinct control and target, got {}",
                self.name(),
                c
            ))),
            Gate::Rx(_, angle) | Gate::Crx(_, _, angle) if !angle.is_finite() => Err(Error::InvalidInput(format!(
                "{} gate angle must be finite, got {}",
                self.name(),
                angle
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Rx(q, angle) => write!(f, "rx({}) q{}", angle, q),
            Gate::H(q) => write!(f, "h q{}", q),
            Gate::Cx(c, t) => write!(f, "cx q{}, q{}", c, t),
            Gate::Crx(c, t, angle) => write!(f, "crx({}) q{}, q{}", angle, c, t),
        }
    }
}

/// Capability set consumed from a state simulator.
///
/// Implementors hold an amplitude buffer of `2^num_qubits` entries plus a
/// queue of gates. Queued gates take effect when probabilities are
/// measured; [`reset_gates`](Self::reset_gates) empties the queue without
/// touching the amplitudes.
pub trait StateSimulator {
    /// Allocate a register
    fn create(spec: RegisterSpec) -> Result<Self>
    where
        Self: Sized;

    /// Number of qubits in the register
    fn num_qubits(&self) -> u32;

    /// Amplitude buffer as last written
    fn amplitudes(&self) -> &[Complex64];

    /// Mutable amplitude buffer; fails when the register was built without
    /// amplitude access.
    fn amplitudes_mut(&mut self) -> Result<&mut [Complex64]>;

    /// Queue a gate
    fn apply(&mut self, gate: Gate) -> Result<()>;

    /// Number of queued gates
    fn gate_count(&self) -> usize;

    /// Drop all queued gates, leaving amplitudes as they are
    fn reset_gates(&mut self);

    /// Run queued gates against the amplitudes and write the probability of
    /// every basis state into `out`, which must match the buffer length.
    fn probabilities_into(&mut self, out: &mut [f64]) -> Result<()>;

    /// Length of the amplitude buffer
    fn amplitude_len(&self) -> usize {
        1usize << self.num_qubits()
    }

    /// Queue an X rotation
    fn rx(&mut self, qubit: u32, angle: f64) -> Result<()> {
        self.apply(Gate::Rx(qubit, angle))
    }

    /// Queue a Hadamard
    fn h(&mut self, qubit: u32) -> Result<()> {
        self.apply(Gate::H(qubit))
    }

    /// Queue a controlled-not
    fn cx(&mut self, control: u32, target: u32) -> Result<()> {
        self.apply(Gate::Cx(control, target))
    }

    /// Queue a controlled X rotation
    fn crx(&mut self, control: u32, target: u32, angle: f64) -> Result<()> {
        self.apply(Gate::Crx(control, target, angle))
    }

    /// Overwrite every amplitude with a real value.
    fn load_real_amplitudes(&mut self, real: &[f64]) -> Result<()> {
        let amplitudes = self.amplitudes_mut()?;
        if amplitudes.len() != real.len() {
            return Err(Error::BufferSizeMismatch {
                expected: amplitudes.len(),
                actual: real.len(),
            });
        }
        for (amplitude, &value) in amplitudes.iter_mut().zip(real) {
            *amplitude = Complex64::new(value, 0.0);
        }
        Ok(())
    }

    /// Scale the amplitudes to unit norm and return the sum of squared
    /// magnitudes seen before scaling. A zero sum leaves the buffer as is.
    fn normalize(&mut self) -> Result<f64> {
        let amplitudes = self.amplitudes_mut()?;
        let sum = amplitudes.iter().fold(0.0, |acc, a| acc + a.norm_sqr());
        if sum > 0.0 {
            let scale = sum.sqrt();
            for amplitude in amplitudes.iter_mut() {
                *amplitude /= scale;
            }
        }
        Ok(sum)
    }

    /// Allocating convenience over [`probabilities_into`](Self::probabilities_into).
    fn probabilities(&mut self) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.amplitude_len()];
        self.probabilities_into(&mut out)?;
        Ok(out)
    }
}
