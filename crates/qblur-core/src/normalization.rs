//! Normalization of amplitude buffers
//!
//! Encoding writes `sqrt(value)` into each amplitude, so the sum of squared
//! amplitudes equals the sum of the encoded values. Scaling the buffer to
//! unit norm turns every squared amplitude into a probability; keeping that
//! sum around is what lets decode undo the scaling exactly:
//!
//! ```text
//! p = a² / S      =>      value = p · S
//! ```
//!
//! An all-zero buffer has `S = 0` and is left untouched.

use serde::{Deserialize, Serialize};

/// Pre-normalization sum of squared amplitudes, held for the lifetime of one
/// transform or animation run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizationRecord {
    original_sum: f64,
}

impl NormalizationRecord {
    /// Wrap an already computed sum
    pub fn new(original_sum: f64) -> Self {
        Self { original_sum }
    }

    /// Sum of squared amplitudes before scaling
    pub fn original_sum(&self) -> f64 {
        self.original_sum
    }

    /// True when the encoded data was all zeros and no scaling happened
    pub fn is_degenerate(&self) -> bool {
        self.original_sum == 0.0
    }

    /// Map a measured probability back to the encoded (offset) value.
    #[inline]
    pub fn denormalize(&self, probability: f64) -> f64 {
        probability * self.original_sum
    }
}

/// Sum of squares, accumulated front to back.
#[inline]
pub fn sum_of_squares(amplitudes: &[f64]) -> f64 {
    amplitudes.iter().fold(0.0, |acc, a| acc + a * a)
}

/// Scale `amplitudes` to unit norm in place and return the record needed to
/// invert the scaling. A zero sum skips the division.
///
/// ```
/// use qblur_core::normalization::normalize;
///
/// let mut amps = vec![0.0, 8f64.sqrt()];
/// let record = normalize(&mut amps);
/// assert_eq!(record.original_sum(), 8.0);
/// assert!((amps[1] - 1.0).abs() < 1e-12);
///
/// let mut zeros = vec![0.0; 4];
/// assert!(normalize(&mut zeros).is_degenerate());
/// assert!(zeros.iter().all(|&a| a == 0.0));
/// ```
pub fn normalize(amplitudes: &mut [f64]) -> NormalizationRecord {
    let original_sum = sum_of_squares(amplitudes);
    if original_sum > 0.0 {
        let scale = original_sum.sqrt();
        for amplitude in amplitudes.iter_mut() {
            *amplitude /= scale;
        }
    }
    NormalizationRecord::new(original_sum)
}
