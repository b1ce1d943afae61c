//! Amplitude encoding and decoding
//!
//! Data is viewed as a two-dimensional grid of samples: `item_count` items
//! (vertices, image columns) by `slot_count` slots (x/y/z, image rows). Each
//! axis gets its own locality table, and sample `(i, s)` lives at
//!
//! ```text
//! address(i, s) = item_code[i] * slot_width + slot_code[s]
//! slot_width    = 2^ceil(log2(slot_count))
//! ```
//!
//! so the register has `item_qubits + slot_qubits` qubits and unused slots
//! (the fourth slot of a vertex) stay at zero amplitude.
//!
//! ## Pipeline
//!
//! ```text
//! encode:  a[address] = sqrt(raw - offset[slot])     then normalize
//! decode:  raw        = p[address] * S + offset[slot]
//! ```
//!
//! Encode takes a square root and decode does not: the simulator hands back
//! probabilities (squared amplitudes), which after multiplying by the
//! pre-normalization sum `S` are directly the offset values again.

use std::sync::Arc;

use qblur_tracing::perf_span;

use crate::error::{Error, Result};
use crate::locality::{qubits_for, LOCALITY_TABLES};
use crate::normalization::{normalize, NormalizationRecord};

/// Read access to a grid of samples.
pub trait SampleSource {
    /// Number of items (outer axis)
    fn item_count(&self) -> usize;

    /// Number of meaningful slots per item (inner axis)
    fn slot_count(&self) -> usize;

    /// Raw value of slot `slot` of item `item`
    fn sample(&self, item: usize, slot: usize) -> f64;
}

/// Write access to a grid of samples, used as a decode target.
pub trait SampleSink: SampleSource {
    /// Overwrite slot `slot` of item `item`
    fn set_sample(&mut self, item: usize, slot: usize, value: f64);
}

/// Plain row-major grid of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    items: usize,
    slots: usize,
    values: Vec<f64>,
}

impl SampleGrid {
    /// All-zero grid
    pub fn zeros(items: usize, slots: usize) -> Self {
        Self {
            items,
            slots,
            values: vec![0.0; items * slots],
        }
    }

    /// Wrap row-major `values` (`items * slots` of them).
    pub fn from_values(items: usize, slots: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != items * slots {
            return Err(Error::BufferSizeMismatch {
                expected: items * slots,
                actual: values.len(),
            });
        }
        Ok(Self { items, slots, values })
    }

    /// Single-slot grid, one item per value
    pub fn column(values: Vec<f64>) -> Self {
        Self {
            items: values.len(),
            slots: 1,
            values,
        }
    }

    /// Row-major values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `(item, slot)`
    pub fn get(&self, item: usize, slot: usize) -> f64 {
        self.values[item * self.slots + slot]
    }
}

impl SampleSource for SampleGrid {
    fn item_count(&self) -> usize {
        self.items
    }

    fn slot_count(&self) -> usize {
        self.slots
    }

    fn sample(&self, item: usize, slot: usize) -> f64 {
        self.get(item, slot)
    }
}

impl SampleSink for SampleGrid {
    fn set_sample(&mut self, item: usize, slot: usize, value: f64) {
        self.values[item * self.slots + slot] = value;
    }
}

/// Mapping from `(item, slot)` to an amplitude index.
#[derive(Debug, Clone)]
pub struct AmplitudeLayout {
    item_count: usize,
    slot_count: usize,
    item_qubits: u32,
    slot_qubits: u32,
    item_codes: Arc<[usize]>,
    slot_codes: Arc<[usize]>,
}

impl AmplitudeLayout {
    /// Layout for an `item_count` by `slot_count` grid.
    ///
    /// ```
    /// use qblur_core::codec::AmplitudeLayout;
    ///
    /// // Three vertices, x/y/z each: 2 item qubits + 2 slot qubits.
    /// let layout = AmplitudeLayout::new(3, 3).unwrap();
    /// assert_eq!(layout.num_qubits(), 4);
    /// assert_eq!(layout.slot_width(), 4);
    /// assert_eq!(layout.address(2, 2), 3 * 4 + 3);
    /// ```
    pub fn new(item_count: usize, slot_count: usize) -> Result<Self> {
        let item_qubits = qubits_for(item_count)?;
        let slot_qubits = qubits_for(slot_count)?;
        Ok(Self {
            item_count,
            slot_count,
            item_qubits,
            slot_qubits,
            item_codes: LOCALITY_TABLES.get_or_build(item_qubits)?,
            slot_codes: LOCALITY_TABLES.get_or_build(slot_qubits)?,
        })
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn item_qubits(&self) -> u32 {
        self.item_qubits
    }

    pub fn slot_qubits(&self) -> u32 {
        self.slot_qubits
    }

    /// Total register size in qubits
    pub fn num_qubits(&self) -> u32 {
        self.item_qubits + self.slot_qubits
    }

    /// Slots reserved per item, padding included
    pub fn slot_width(&self) -> usize {
        1usize << self.slot_qubits
    }

    /// Length of the amplitude buffer
    pub fn amplitude_len(&self) -> usize {
        1usize << self.num_qubits()
    }

    /// Amplitude index of `(item, slot)`
    #[inline]
    pub fn address(&self, item: usize, slot: usize) -> usize {
        self.item_codes[item] * self.slot_width() + self.slot_codes[slot]
    }

    fn check_shape<S: SampleSource + ?Sized>(&self, data: &S) -> Result<()> {
        let expected = self.item_count * self.slot_count;
        let actual = data.item_count() * data.slot_count();
        if data.item_count() != self.item_count || data.slot_count() != self.slot_count {
            return Err(Error::BufferSizeMismatch { expected, actual });
        }
        Ok(())
    }
}

/// Everything decode needs to invert an encode: the layout, the per-slot
/// offsets and the normalization record.
#[derive(Debug, Clone)]
pub struct Encoding {
    layout: AmplitudeLayout,
    offsets: Vec<f64>,
    record: NormalizationRecord,
}

impl Encoding {
    /// Assemble an encoding from parts, e.g. when decoding a buffer that was
    /// produced elsewhere.
    pub fn from_parts(layout: AmplitudeLayout, offsets: Vec<f64>, record: NormalizationRecord) -> Result<Self> {
        if offsets.len() != layout.slot_count() {
            return Err(Error::BufferSizeMismatch {
                expected: layout.slot_count(),
                actual: offsets.len(),
            });
        }
        Ok(Self { layout, offsets, record })
    }

    pub fn layout(&self) -> &AmplitudeLayout {
        &self.layout
    }

    /// Per-slot offsets; never positive
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn record(&self) -> NormalizationRecord {
        self.record
    }

    /// Write the values encoded by `probabilities` into `sink` in place.
    pub fn decode_into<K: SampleSink + ?Sized>(&self, probabilities: &[f64], sink: &mut K) -> Result<()> {
        let _span = perf_span!(
            "decode",
            items = self.layout.item_count,
            slots = self.layout.slot_count
        );
        if probabilities.len() != self.layout.amplitude_len() {
            return Err(Error::BufferSizeMismatch {
                expected: self.layout.amplitude_len(),
                actual: probabilities.len(),
            });
        }
        self.layout.check_shape(sink)?;

        for item in 0..self.layout.item_count {
            for (slot, offset) in self.offsets.iter().enumerate() {
                let p = probabilities[self.layout.address(item, slot)];
                sink.set_sample(item, slot, self.record.denormalize(p) + offset);
            }
        }
        Ok(())
    }

    /// Decode into a fresh [`SampleGrid`].
    pub fn decode(&self, probabilities: &[f64]) -> Result<SampleGrid> {
        let mut grid = SampleGrid::zeros(self.layout.item_count, self.layout.slot_count);
        self.decode_into(probabilities, &mut grid)?;
        Ok(grid)
    }
}

/// Normalized amplitudes together with the [`Encoding`] that produced them.
#[derive(Debug, Clone)]
pub struct EncodedState {
    encoding: Encoding,
    amplitudes: Vec<f64>,
}

impl EncodedState {
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn layout(&self) -> &AmplitudeLayout {
        &self.encoding.layout
    }

    /// Normalized real amplitudes, `layout().amplitude_len()` of them
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Split into the decode metadata and the amplitude buffer.
    pub fn into_parts(self) -> (Encoding, Vec<f64>) {
        (self.encoding, self.amplitudes)
    }
}

/// Per-slot offsets: the smallest value seen in each slot, or zero when the
/// slot is already non-negative.
pub fn slot_offsets<S: SampleSource + ?Sized>(source: &S) -> Vec<f64> {
    (0..source.slot_count())
        .map(|slot| (0..source.item_count()).map(|item| source.sample(item, slot)).fold(0.0, f64::min))
        .collect()
}

/// Encode `source` into a normalized amplitude buffer.
///
/// # Errors
///
/// - [`Error::EmptyInput`] when the source has no items or no slots
/// - [`Error::InvalidInput`] when a sample is not finite, or the encoded
///   samples are too large for their sum to be represented
///
/// # Example
///
/// ```
/// use qblur_core::codec::{encode, SampleGrid};
///
/// let state = encode(&SampleGrid::column(vec![-3.0, 5.0])).unwrap();
/// assert_eq!(state.encoding().offsets(), &[-3.0]);
/// assert_eq!(state.encoding().record().original_sum(), 8.0);
/// assert!((state.amplitudes()[1] - 1.0).abs() < 1e-12);
/// ```
pub fn encode<S: SampleSource + ?Sized>(source: &S) -> Result<EncodedState> {
    let (items, slots) = (source.item_count(), source.slot_count());
    if items == 0 || slots == 0 {
        return Err(Error::EmptyInput);
    }
    let _span = perf_span!("encode", items = items, slots = slots);

    for item in 0..items {
        for slot in 0..slots {
            let value = source.sample(item, slot);
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "sample ({}, {}) is not finite: {}",
                    item, slot, value
                )));
            }
        }
    }

    let layout = AmplitudeLayout::new(items, slots)?;
    let offsets = slot_offsets(source);

    let mut amplitudes = vec![0.0; layout.amplitude_len()];
    for item in 0..items {
        for (slot, offset) in offsets.iter().enumerate() {
            amplitudes[layout.address(item, slot)] = (source.sample(item, slot) - offset).sqrt();
        }
    }

    let record = normalize(&mut amplitudes);
    if !record.original_sum().is_finite() {
        return Err(Error::InvalidInput(format!(
            "encoded samples sum to {}, which cannot be scaled back on decode",
            record.original_sum()
        )));
    }
    if record.is_degenerate() {
        tracing::debug!(items, slots, "all samples encode to zero; normalization skipped");
    }

    Ok(EncodedState {
        encoding: Encoding {
            layout,
            offsets,
            record,
        },
        amplitudes,
    })
}

/// Decode a probability buffer given the pieces of an encoding.
///
/// ```
/// use qblur_core::codec::decode;
/// use qblur_core::normalization::NormalizationRecord;
///
/// let grid = decode(&[0.0, 1.0], &[-3.0], NormalizationRecord::new(8.0), 2, 1).unwrap();
/// assert_eq!(grid.values(), &[-3.0, 5.0]);
/// ```
pub fn decode(
    probabilities: &[f64],
    offsets: &[f64],
    record: NormalizationRecord,
    item_count: usize,
    slot_count: usize,
) -> Result<SampleGrid> {
    let layout = AmplitudeLayout::new(item_count, slot_count)?;
    Encoding::from_parts(layout, offsets.to_vec(), record)?.decode(probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::sum_of_squares;

    #[test]
    fn test_layout_padding_slots_stay_zero() {
        let grid = SampleGrid::from_values(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let state = encode(&grid).unwrap();
        let layout = state.layout();
        assert_eq!(layout.amplitude_len(), 8);

        let used: Vec<usize> = (0..2)
            .flat_map(|i| (0..3).map(move |s| (i, s)))
            .map(|(i, s)| layout.address(i, s))
            .collect();
        for (index, amp) in state.amplitudes().iter().enumerate() {
            if !used.contains(&index) {
                assert_eq!(*amp, 0.0, "padding amplitude {} should be zero", index);
            }
        }
    }

    #[test]
    fn test_addresses_are_unique() {
        let layout = AmplitudeLayout::new(5, 3).unwrap();
        let mut seen = vec![false; layout.amplitude_len()];
        for i in 0..5 {
            for s in 0..3 {
                let a = layout.address(i, s);
                assert!(!seen[a]);
                seen[a] = true;
            }
        }
    }

    #[test]
    fn test_offsets_are_never_positive() {
        let grid = SampleGrid::from_values(3, 2, vec![1.0, -2.0, 4.0, -7.5, 2.0, 3.0]).unwrap();
        assert_eq!(slot_offsets(&grid), vec![0.0, -7.5]);
    }

    #[test]
    fn test_encoded_buffer_is_normalized() {
        let grid = SampleGrid::column((0..13).map(|i| i as f64 - 4.0).collect());
        let state = encode(&grid).unwrap();
        assert!((sum_of_squares(state.amplitudes()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero_input_skips_normalization() {
        let grid = SampleGrid::zeros(4, 2);
        let state = encode(&grid).unwrap();
        assert!(state.encoding().record().is_degenerate());
        assert!(state.amplitudes().iter().all(|&a| a == 0.0));

        let decoded = state.encoding().decode(&vec![0.0; 8]).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_constant_negative_input_round_trips() {
        // Every value equals its offset, so the encoded data is all zero.
        let grid = SampleGrid::column(vec![-2.0; 3]);
        let state = encode(&grid).unwrap();
        assert!(state.encoding().record().is_degenerate());
        let decoded = state.encoding().decode(&vec![0.0; 4]).unwrap();
        assert_eq!(decoded.values(), &[-2.0, -2.0, -2.0]);
    }

    #[test]
    fn test_single_sample_uses_zero_qubits() {
        let state = encode(&SampleGrid::column(vec![9.0])).unwrap();
        assert_eq!(state.layout().num_qubits(), 0);
        assert_eq!(state.amplitudes(), &[1.0]);
        let decoded = state.encoding().decode(&[1.0]).unwrap();
        assert_eq!(decoded.values(), &[9.0]);
    }

    #[test]
    fn test_rejects_empty_and_non_finite_input() {
        assert!(matches!(encode(&SampleGrid::zeros(0, 3)), Err(Error::EmptyInput)));
        assert!(matches!(encode(&SampleGrid::zeros(3, 0)), Err(Error::EmptyInput)));
        let bad = SampleGrid::column(vec![1.0, f64::NAN]);
        assert!(matches!(encode(&bad), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_samples_whose_sum_overflows() {
        let huge = SampleGrid::column(vec![1e308, 1e308]);
        assert!(matches!(encode(&huge), Err(Error::InvalidInput(_))));

        // Finite samples whose offset shift overflows
        let spread = SampleGrid::column(vec![-1e308, 1e308]);
        assert!(matches!(encode(&spread), Err(Error::InvalidInput(_))));

        let large = SampleGrid::column(vec![1e300, 3e300]);
        let state = encode(&large).unwrap();
        let probabilities: Vec<f64> = state.amplitudes().iter().map(|a| a * a).collect();
        let decoded = state.encoding().decode(&probabilities).unwrap();
        for (d, v) in decoded.values().iter().zip([1e300, 3e300]) {
            assert!((d - v).abs() <= 1e-9 * v, "{} vs {}", d, v);
        }
    }

    #[test]
    fn test_decode_checks_lengths() {
        let state = encode(&SampleGrid::column(vec![1.0, 2.0, 3.0])).unwrap();
        assert!(matches!(
            state.encoding().decode(&[0.0; 3]),
            Err(Error::BufferSizeMismatch { expected: 4, actual: 3 })
        ));

        let mut wrong_shape = SampleGrid::zeros(2, 1);
        assert!(state.encoding().decode_into(&[0.0; 4], &mut wrong_shape).is_err());
    }

    #[test]
    fn test_from_parts_checks_offsets() {
        let layout = AmplitudeLayout::new(2, 3).unwrap();
        assert!(Encoding::from_parts(layout, vec![0.0], NormalizationRecord::new(1.0)).is_err());
    }
}
