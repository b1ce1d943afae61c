//! Performance-focused tracing utilities
//!
//! Timing spans with threshold filtering, plus the standard events the blur
//! pipeline emits per transform and per animation frame.
//!
//! ## Example
//!
//! ```rust
//! use qblur_tracing::performance::{record_transform, PerformanceSpan};
//!
//! let span = PerformanceSpan::new("encode", Some(100));
//! // ... do work ...
//! drop(span); // Logs only if duration > 100μs
//!
//! record_transform(10, 10, 250);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::span::EnteredSpan;
use tracing::{Level, Span};

static ENABLED: AtomicBool = AtomicBool::new(true);

// u64::MAX encodes "no threshold".
static DEFAULT_THRESHOLD_US: AtomicU64 = AtomicU64::new(u64::MAX);

/// Globally enable or disable logging of performance spans.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether performance spans are currently logged.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Threshold applied to spans created without an explicit one.
pub fn set_default_threshold(threshold_us: Option<u64>) {
    DEFAULT_THRESHOLD_US.store(threshold_us.unwrap_or(u64::MAX), Ordering::Relaxed);
}

fn default_threshold() -> Option<u64> {
    match DEFAULT_THRESHOLD_US.load(Ordering::Relaxed) {
        u64::MAX => None,
        value => Some(value),
    }
}

/// RAII guard that measures span duration and conditionally logs based on threshold.
///
/// The guard keeps its span entered for its whole lifetime, so events and
/// child spans emitted by the measured work carry the span's fields.
///
/// ```rust
/// use qblur_tracing::performance::PerformanceSpan;
///
/// {
///     let _span = PerformanceSpan::new("animation_tick", Some(16_000));
///     // ... frame work ...
/// } // Logged only if the frame took longer than 16ms
/// ```
pub struct PerformanceSpan {
    span_name: String,
    threshold_us: Option<u64>,
    start_time: Instant,
    entered: EnteredSpan,
}

impl PerformanceSpan {
    /// Create a new performance span with optional threshold filtering.
    ///
    /// A `None` threshold falls back to the process-wide default set by
    /// [`set_default_threshold`].
    pub fn new(span_name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        Self::with_level(Level::DEBUG, span_name, threshold_us)
    }

    /// Create a new performance span at the specified tracing level.
    pub fn with_level(level: Level, span_name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let span_name = span_name.into();
        let span = match level {
            Level::TRACE => tracing::trace_span!("perf", name = %span_name),
            Level::DEBUG => tracing::debug_span!("perf", name = %span_name),
            Level::INFO => tracing::info_span!("perf", name = %span_name),
            Level::WARN => tracing::warn_span!("perf", name = %span_name),
            Level::ERROR => tracing::error_span!("perf", name = %span_name),
        };
        Self::with_span(span, span_name, threshold_us)
    }

    /// Time the work done inside an already built `span`, entering it until
    /// the guard drops. This is what the `perf_span!` macros use to attach
    /// their fields.
    pub fn with_span(span: Span, span_name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        Self {
            span_name: span_name.into(),
            threshold_us: threshold_us.or_else(default_threshold),
            start_time: Instant::now(),
            entered: span.entered(),
        }
    }

    /// Name of the measured operation.
    pub fn name(&self) -> &str {
        &self.span_name
    }

    /// The span the measured work runs in
    pub fn span(&self) -> &Span {
        &self.entered
    }

    /// Get the elapsed time since span creation.
    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }
}

impl Drop for PerformanceSpan {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_us = self.elapsed_us();
        if self.threshold_us.map_or(true, |t| elapsed_us >= t) {
            tracing::debug!(
                duration_us = elapsed_us,
                duration_ms = elapsed_us as f64 / 1000.0,
                "performance_span_complete"
            );
        }
    }
}

/// Record one simulator round trip: gates applied to a register and measured.
///
/// ```rust
/// use qblur_tracing::performance::record_transform;
///
/// record_transform(12, 12, 900);
/// ```
pub fn record_transform(num_qubits: u32, gate_count: usize, duration_us: u64) {
    let amplitudes = 1usize << num_qubits.min(63);
    let amplitudes_per_sec = if duration_us > 0 {
        (amplitudes as f64 / duration_us as f64) * 1_000_000.0
    } else {
        0.0
    };

    tracing::debug!(
        event = "transform",
        num_qubits = num_qubits,
        amplitudes = amplitudes,
        gate_count = gate_count,
        duration_us = duration_us,
        duration_ms = duration_us as f64 / 1000.0,
        amplitudes_per_sec = amplitudes_per_sec,
        "state_transform"
    );
}

/// Record one animation frame.
///
/// ```rust
/// use qblur_tracing::performance::record_frame;
///
/// record_frame(3, 0.05, 0.25, 1200);
/// ```
pub fn record_frame(frame: u64, angle: f64, progress: f64, duration_us: u64) {
    tracing::debug!(
        event = "frame",
        frame = frame,
        angle = angle,
        progress = progress,
        duration_us = duration_us,
        duration_ms = duration_us as f64 / 1000.0,
        "animation_frame"
    );
}
