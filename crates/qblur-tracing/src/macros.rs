//! Convenience macros for performance tracing

/// Create a performance span, optionally with structured fields. The span
/// stays entered until the returned guard drops, which logs its duration.
///
/// ```rust
/// use qblur_tracing::perf_span;
///
/// {
///     let _span = perf_span!("encode", items = 1024, slots = 3);
///     // ... operation code ...
/// }
/// ```
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {{
        $crate::performance::PerformanceSpan::new($name, None)
    }};
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        $crate::performance::PerformanceSpan::with_span(
            tracing::debug_span!("perf", name = $name, $($field = $value),+),
            $name,
            None,
        )
    }};
}

/// Create a performance span that only logs above `threshold_us`.
///
/// ```rust
/// use qblur_tracing::perf_span_threshold;
///
/// let _span = perf_span_threshold!("animation_tick", 16_000, frame = 7);
/// ```
#[macro_export]
macro_rules! perf_span_threshold {
    ($name:expr, $threshold_us:expr) => {{
        $crate::performance::PerformanceSpan::new($name, Some($threshold_us))
    }};
    ($name:expr, $threshold_us:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        $crate::performance::PerformanceSpan::with_span(
            tracing::debug_span!("perf", name = $name, $($field = $value),+),
            $name,
            Some($threshold_us),
        )
    }};
}

/// Emit a standardized debug-level performance event.
///
/// ```rust
/// use qblur_tracing::perf_event;
///
/// perf_event!("locality_table_built", qubits = 10, entries = 1024);
/// ```
#[macro_export]
macro_rules! perf_event {
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {
        tracing::debug!(
            event = $name,
            $($field = $value),+
        );
    };
}

/// Run a block and return `(result, duration_us)`.
///
/// ```rust
/// use qblur_tracing::timed_block;
///
/// let (sum, _duration_us) = timed_block!("sum", { (1..=100).sum::<i32>() });
/// assert_eq!(sum, 5050);
/// ```
#[macro_export]
macro_rules! timed_block {
    ($name:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration_us = start.elapsed().as_micros() as u64;
        tracing::debug!(
            operation = $name,
            duration_us = duration_us,
            duration_ms = duration_us as f64 / 1000.0,
            "timed_block_complete"
        );
        (result, duration_us)
    }};
}
