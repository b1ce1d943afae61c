//! Single-shot transform driver
//!
//! ```text
//! data ──encode──▶ amplitudes ──load──▶ simulator ──effect──▶ measure ──decode──▶ data
//! ```
//!
//! The driver only sequences the steps. Gate execution and measurement are
//! delegated to whatever [`StateSimulator`] the caller picks.

use std::time::Instant;

use qblur_tracing::performance::record_transform;
use qblur_tracing::perf_span;

use crate::codec::{encode, AmplitudeLayout, Encoding, SampleSink};
use crate::effects::Effect;
use crate::error::{Error, Result};
use crate::simulator::{RegisterSpec, StateSimulator, StateVectorSimulator};

/// Allocate a simulator sized for `layout`, refusing registers above
/// `max_qubits`.
pub fn register_for<S: StateSimulator>(layout: &AmplitudeLayout, max_qubits: u32) -> Result<S> {
    let qubits = layout.num_qubits();
    if qubits > max_qubits {
        return Err(Error::QubitLimitExceeded {
            requested: qubits,
            max: max_qubits,
        });
    }
    S::create(RegisterSpec::with_amplitude_access(qubits))
}

/// Load `amplitudes`, queue `effect` and measure into `probabilities`.
///
/// Gates queued by an earlier call are dropped first, so repeated calls on
/// the same simulator are independent of each other. Nothing is allocated.
pub fn apply_transform<S: StateSimulator + ?Sized>(
    sim: &mut S,
    amplitudes: &[f64],
    effect: &Effect,
    probabilities: &mut [f64],
) -> Result<()> {
    let start = Instant::now();

    sim.reset_gates();
    sim.load_real_amplitudes(amplitudes)?;
    effect.apply(sim)?;
    sim.probabilities_into(probabilities)?;

    record_transform(sim.num_qubits(), sim.gate_count(), start.elapsed().as_micros() as u64);
    Ok(())
}

/// Encode `data`, transform it on a fresh `S` and decode the result back
/// into `data`. Returns the encoding that was used.
pub fn transform_in_place<S, T>(data: &mut T, effect: &Effect, max_qubits: u32) -> Result<Encoding>
where
    S: StateSimulator,
    T: SampleSink + ?Sized,
{
    let _span = perf_span!(
        "transform",
        items = data.item_count(),
        slots = data.slot_count()
    );
    effect.validate()?;

    let (encoding, amplitudes) = encode(&*data)?.into_parts();
    let mut sim: S = register_for(encoding.layout(), max_qubits)?;
    let mut probabilities = vec![0.0; amplitudes.len()];

    apply_transform(&mut sim, &amplitudes, effect, &mut probabilities)?;
    encoding.decode_into(&probabilities, data)?;
    Ok(encoding)
}

/// Blur `data` in place with an X rotation of `angle` on every qubit, using
/// the built-in [`StateVectorSimulator`].
///
/// ```
/// use qblur_core::codec::SampleGrid;
/// use qblur_core::transform::blur_in_place;
///
/// let mut grid = SampleGrid::column(vec![1.0, 2.0, 3.0, 4.0]);
/// blur_in_place(&mut grid, 0.0, 24).unwrap();
/// for (blurred, original) in grid.values().iter().zip([1.0, 2.0, 3.0, 4.0]) {
///     assert!((blurred - original).abs() < 1e-9);
/// }
/// ```
pub fn blur_in_place<T: SampleSink + ?Sized>(data: &mut T, angle: f64, max_qubits: u32) -> Result<Encoding> {
    transform_in_place::<StateVectorSimulator, T>(data, &Effect::blur(angle), max_qubits)
}
