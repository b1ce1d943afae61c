//! Dense state-vector simulator
//!
//! Keeps the loaded amplitudes separate from a scratch vector that queued
//! gates are applied to at measurement time. That split is what makes
//! `reset_gates` free: the loaded state is never mutated by a gate, so an
//! animation can re-measure the same state under a new angle every frame
//! without rewriting it.

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use super::{Gate, RegisterSpec, StateSimulator};
use crate::error::{Error, Result};

type Matrix2 = [[Complex64; 2]; 2];

/// Reference dense simulator with f64 complex amplitudes.
///
/// # Example
///
/// ```
/// use qblur_core::simulator::{RegisterSpec, StateSimulator, StateVectorSimulator};
///
/// let mut sim = StateVectorSimulator::create(RegisterSpec::with_amplitude_access(1)).unwrap();
/// sim.h(0).unwrap();
/// let probs = sim.probabilities().unwrap();
/// assert!((probs[0] - 0.5).abs() < 1e-12);
/// assert!((probs[1] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct StateVectorSimulator {
    spec: RegisterSpec,
    amplitudes: Vec<Complex64>,
    scratch: Vec<Complex64>,
    gates: Vec<Gate>,
}

impl StateVectorSimulator {
    /// Largest register this simulator will allocate (1 GiB of amplitudes).
    pub const MAX_QUBITS: u32 = 26;

    /// Classical bits reserved on creation
    pub fn classical_bits(&self) -> u32 {
        self.spec.classical_bits
    }

    /// Queued gates in application order
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }
}

impl StateSimulator for StateVectorSimulator {
    fn create(spec: RegisterSpec) -> Result<Self> {
        spec.validate(Self::MAX_QUBITS)?;
        let len = spec.amplitude_len();
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); len];
        amplitudes[0] = Complex64::new(1.0, 0.0);

        tracing::trace!(qubits = spec.qubits, amplitudes = len, "register allocated");

        Ok(Self {
            spec,
            amplitudes,
            scratch: vec![Complex64::new(0.0, 0.0); len],
            gates: Vec::new(),
        })
    }

    fn num_qubits(&self) -> u32 {
        self.spec.qubits
    }

    fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    fn amplitudes_mut(&mut self) -> Result<&mut [Complex64]> {
        if !self.spec.amplitude_access {
            return Err(Error::AmplitudeAccessDisabled);
        }
        Ok(&mut self.amplitudes)
    }

    fn apply(&mut self, gate: Gate) -> Result<()> {
        gate.validate(self.spec.qubits)?;
        self.gates.push(gate);
        Ok(())
    }

    fn gate_count(&self) -> usize {
        self.gates.len()
    }

    fn reset_gates(&mut self) {
        self.gates.clear();
    }

    fn probabilities_into(&mut self, out: &mut [f64]) -> Result<()> {
        if out.len() != self.amplitudes.len() {
            return Err(Error::BufferSizeMismatch {
                expected: self.amplitudes.len(),
                actual: out.len(),
            });
        }

        self.scratch.copy_from_slice(&self.amplitudes);
        for gate in &self.gates {
            match *gate {
                Gate::Rx(q, angle) => apply_matrix(&mut self.scratch, q, None, &rx_matrix(angle)),
                Gate::H(q) => apply_matrix(&mut self.scratch, q, None, &hadamard_matrix()),
                Gate::Cx(c, t) => apply_matrix(&mut self.scratch, t, Some(c), &pauli_x_matrix()),
                Gate::Crx(c, t, angle) => apply_matrix(&mut self.scratch, t, Some(c), &rx_matrix(angle)),
            }
        }

        for (p, amplitude) in out.iter_mut().zip(&self.scratch) {
            *p = amplitude.norm_sqr();
        }
        Ok(())
    }
}

fn rx_matrix(angle: f64) -> Matrix2 {
    let (sin, cos) = (angle / 2.0).sin_cos();
    let c = Complex64::new(cos, 0.0);
    let s = Complex64::new(0.0, -sin);
    [[c, s], [s, c]]
}

fn hadamard_matrix() -> Matrix2 {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

fn pauli_x_matrix() -> Matrix2 {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    [[zero, one], [one, zero]]
}

/// Apply a 2x2 unitary to `target`, restricted to basis states whose
/// `control` bit is set when a control is given.
fn apply_matrix(state: &mut [Complex64], target: u32, control: Option<u32>, m: &Matrix2) {
    let bit = 1usize << target;
    let control_mask = control.map_or(0, |c| 1usize << c);

    for i in 0..state.len() {
        if i & bit != 0 || i & control_mask != control_mask {
            continue;
        }
        let j = i | bit;
        let (a0, a1) = (state[i], state[j]);
        state[i] = m[0][0] * a0 + m[0][1] * a1;
        state[j] = m[1][0] * a0 + m[1][1] * a1;
    }
}
