//! Animated transform driver
//!
//! The driver is an explicit state machine polled once per scheduling tick:
//!
//! ```text
//!            start                 progress >= 1 (no reverse)
//!   Idle ───────────▶ Running ─────────────────────────────▶ Done
//!                        │ progress >= 1 (reverse)             │ request_reverse
//!                        ▼                                     │
//!                    Reversing ◀───────────────────────────────┘
//!                        │ progress <= 0
//!                        └──────────────────────────────────▶ Done
//! ```
//!
//! Every frame restores the amplitudes captured at [`AnimationDriver::start`]
//! instead of re-encoding, queues the effect with the interpolated angle,
//! measures, and decodes straight into the caller's data. Between two ticks
//! the data always holds a fully decoded frame, so stopping the driver at any
//! point leaves it consistent.
//!
//! Buffers are owned by the caller ([`FrameBuffers`]) and only grow when the
//! register grows, so a running animation does not allocate per frame.

use std::time::Instant;

use qblur_tracing::performance::record_frame;
use qblur_tracing::perf_span;

use crate::codec::{encode, Encoding, SampleSink, SampleSource};
use crate::effects::Effect;
use crate::error::{Error, Result};
use crate::simulator::{StateSimulator, StateVectorSimulator};
use crate::transform::{apply_transform, register_for};

/// Where the driver is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Running,
    Reversing,
    Done,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// More frames follow
    Running,
    /// The last frame has been decoded
    Done,
}

/// Parameters of one animation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    /// Angle at `progress == 0`
    pub start_angle: f64,
    /// Angle at `progress == 1`
    pub end_angle: f64,
    /// Seconds from start to end; non-positive values are replaced by 1
    pub duration_secs: f64,
    /// Play back down to `start_angle` after reaching `end_angle`
    pub reverse: bool,
    /// Largest register the driver may allocate
    pub max_qubits: u32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            start_angle: 0.0,
            end_angle: 0.2,
            duration_secs: 3.0,
            reverse: false,
            max_qubits: 24,
        }
    }
}

impl AnimationSettings {
    /// Duration actually used by the driver.
    pub fn effective_duration(&self) -> f64 {
        if self.duration_secs > 0.0 && self.duration_secs.is_finite() {
            self.duration_secs
        } else {
            1.0
        }
    }
}

/// Linear interpolation between `start` and `end`.
///
/// Written as `p * end + (1 - p) * start` so that both endpoints are hit
/// exactly.
///
/// ```
/// use qblur_core::animation::interpolate_angle;
///
/// assert_eq!(interpolate_angle(0.0, 0.1, 0.7), 0.1);
/// assert_eq!(interpolate_angle(1.0, 0.1, 0.7), 0.7);
/// ```
#[inline]
pub fn interpolate_angle(progress: f64, start: f64, end: f64) -> f64 {
    progress * end + (1.0 - progress) * start
}

/// What one tick rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRecord {
    /// Zero-based frame index since the last start
    pub index: u64,
    pub angle: f64,
    /// Progress the angle was interpolated from
    pub progress: f64,
}

/// Caller-owned scratch space for an animation.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffers {
    original: Vec<f64>,
    probabilities: Vec<f64>,
}

impl FrameBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for a register of `amplitude_len` amplitudes.
    pub fn with_capacity(amplitude_len: usize) -> Self {
        Self {
            original: Vec::with_capacity(amplitude_len),
            probabilities: Vec::with_capacity(amplitude_len),
        }
    }

    /// Amplitudes captured at start
    pub fn original(&self) -> &[f64] {
        &self.original
    }

    /// Probabilities measured on the last frame
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    fn capture(&mut self, amplitudes: &[f64]) {
        self.original.clear();
        self.original.extend_from_slice(amplitudes);
        self.probabilities.clear();
        self.probabilities.resize(amplitudes.len(), 0.0);
    }
}

/// Time-stepped driver that sweeps an effect's angle over a run.
///
/// # Example
///
/// ```
/// use qblur_core::animation::{AnimationDriver, AnimationSettings, FrameBuffers, TickStatus};
/// use qblur_core::codec::SampleGrid;
/// use qblur_core::effects::Effect;
///
/// let source = SampleGrid::column(vec![1.0, 2.0, 3.0, 4.0]);
/// let mut target = source.clone();
/// let mut buffers = FrameBuffers::new();
///
/// let settings = AnimationSettings { duration_secs: 1.0, ..Default::default() };
/// let mut driver: AnimationDriver = AnimationDriver::new(settings, Effect::blur(0.0));
/// driver.start(&source, &mut buffers).unwrap();
///
/// while driver.tick(0.25, &mut buffers, &mut target).unwrap() == TickStatus::Running {}
/// assert_eq!(driver.frame(), 4);
/// ```
#[derive(Debug)]
pub struct AnimationDriver<S = StateVectorSimulator> {
    settings: AnimationSettings,
    effect: Effect,
    phase: AnimationPhase,
    progress: f64,
    frame: u64,
    last_frame: Option<FrameRecord>,
    encoding: Option<Encoding>,
    simulator: Option<S>,
}

impl<S: StateSimulator> AnimationDriver<S> {
    /// Create an idle driver. `effect` is the gate sequence whose rotation
    /// angle is swept.
    pub fn new(settings: AnimationSettings, effect: Effect) -> Self {
        if settings.duration_secs <= 0.0 || !settings.duration_secs.is_finite() {
            tracing::warn!(
                duration_secs = settings.duration_secs,
                "animation duration must be positive, using 1 second"
            );
        }
        Self {
            settings,
            effect,
            phase: AnimationPhase::Idle,
            progress: 0.0,
            frame: 0,
            last_frame: None,
            encoding: None,
            simulator: None,
        }
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Progress through the run, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Number of frames decoded since the last start
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frame decoded by the most recent tick
    pub fn last_frame(&self) -> Option<FrameRecord> {
        self.last_frame
    }

    /// Angle the current progress maps to
    pub fn current_angle(&self) -> f64 {
        interpolate_angle(self.progress, self.settings.start_angle, self.settings.end_angle)
    }

    /// Encoding captured at start, while a run is active or finished
    pub fn encoding(&self) -> Option<&Encoding> {
        self.encoding.as_ref()
    }

    /// True while ticks still produce frames
    pub fn is_active(&self) -> bool {
        matches!(self.phase, AnimationPhase::Running | AnimationPhase::Reversing)
    }

    /// Encode `source` once, capture its amplitudes into `buffers` and enter
    /// [`AnimationPhase::Running`] at progress 0.
    ///
    /// On error the driver keeps its previous state.
    pub fn start<T: SampleSource + ?Sized>(&mut self, source: &T, buffers: &mut FrameBuffers) -> Result<()> {
        let _span = perf_span!(
            "animation_start",
            items = source.item_count(),
            slots = source.slot_count()
        );
        self.effect.validate()?;

        let state = encode(source)?;
        let qubits = state.layout().num_qubits();
        let reusable = self.simulator.as_ref().is_some_and(|sim| sim.num_qubits() == qubits);
        if !reusable {
            self.simulator = Some(register_for(state.layout(), self.settings.max_qubits)?);
        }

        let (encoding, amplitudes) = state.into_parts();
        buffers.capture(&amplitudes);
        self.encoding = Some(encoding);
        self.phase = AnimationPhase::Running;
        self.progress = 0.0;
        self.frame = 0;
        self.last_frame = None;

        tracing::debug!(
            qubits,
            start_angle = self.settings.start_angle,
            end_angle = self.settings.end_angle,
            duration_secs = self.settings.effective_duration(),
            "animation started"
        );
        Ok(())
    }

    /// Advance by `elapsed` seconds and decode one frame into `target`.
    ///
    /// Ticking an idle or finished driver does nothing and reports
    /// [`TickStatus::Done`].
    pub fn tick<T: SampleSink + ?Sized>(
        &mut self,
        elapsed: f64,
        buffers: &mut FrameBuffers,
        target: &mut T,
    ) -> Result<TickStatus> {
        if !self.is_active() {
            return Ok(TickStatus::Done);
        }
        if !(elapsed >= 0.0 && elapsed.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "elapsed time must be finite and non-negative, got {}",
                elapsed
            )));
        }

        let step = elapsed / self.settings.effective_duration();
        let progress = match self.phase {
            AnimationPhase::Reversing => (self.progress - step).max(0.0),
            _ => (self.progress + step).min(1.0),
        };
        let record = FrameRecord {
            index: self.frame,
            angle: interpolate_angle(progress, self.settings.start_angle, self.settings.end_angle),
            progress,
        };

        self.render(&record, buffers, target)?;

        self.last_frame = Some(record);
        self.progress = progress;
        self.frame += 1;
        self.phase = match self.phase {
            AnimationPhase::Running if progress >= 1.0 && self.settings.reverse => AnimationPhase::Reversing,
            AnimationPhase::Running if progress >= 1.0 => AnimationPhase::Done,
            AnimationPhase::Reversing if progress <= 0.0 => AnimationPhase::Done,
            phase => phase,
        };

        if self.phase == AnimationPhase::Done {
            tracing::debug!(frames = self.frame, "animation finished");
            Ok(TickStatus::Done)
        } else {
            Ok(TickStatus::Running)
        }
    }

    /// Play a finished run back toward the start angle.
    pub fn request_reverse(&mut self) -> Result<()> {
        match self.phase {
            AnimationPhase::Done if self.encoding.is_some() && self.progress > 0.0 => {
                self.phase = AnimationPhase::Reversing;
                Ok(())
            }
            AnimationPhase::Reversing => Ok(()),
            phase => Err(Error::InvalidInput(format!(
                "reverse playback needs a finished forward run, driver is {:?}",
                phase
            ))),
        }
    }

    /// Stop between ticks. The target keeps the last decoded frame.
    pub fn cancel(&mut self) {
        if self.is_active() {
            tracing::debug!(frame = self.frame, progress = self.progress, "animation cancelled");
        }
        self.phase = AnimationPhase::Idle;
        self.encoding = None;
    }

    fn render<T: SampleSink + ?Sized>(
        &mut self,
        record: &FrameRecord,
        buffers: &mut FrameBuffers,
        target: &mut T,
    ) -> Result<()> {
        let start = Instant::now();
        let (Some(encoding), Some(sim)) = (self.encoding.as_ref(), self.simulator.as_mut()) else {
            return Err(Error::MissingCollaborator("animation has not been started".to_string()));
        };

        let expected = encoding.layout().amplitude_len();
        if buffers.original.len() != expected || buffers.probabilities.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: buffers.original.len(),
            });
        }

        let effect = self.effect.with_angle(record.angle);
        apply_transform(sim, &buffers.original, &effect, &mut buffers.probabilities)?;
        encoding.decode_into(&buffers.probabilities, target)?;

        record_frame(record.index, record.angle, record.progress, start.elapsed().as_micros() as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SampleGrid;

    fn driver(settings: AnimationSettings) -> AnimationDriver {
        AnimationDriver::new(settings, Effect::blur(0.0))
    }

    fn settings(duration_secs: f64, reverse: bool) -> AnimationSettings {
        AnimationSettings {
            start_angle: 0.0,
            end_angle: 0.5,
            duration_secs,
            reverse,
            max_qubits: 24,
        }
    }

    #[test]
    fn test_interpolation_hits_endpoints_exactly() {
        for (start, end) in [(0.0, 0.2), (-1.3, 4.7), (0.1, 0.1), (1e-9, -3e5)] {
            assert_eq!(interpolate_angle(0.0, start, end), start);
            assert_eq!(interpolate_angle(1.0, start, end), end);
        }
    }

    #[test]
    fn test_non_positive_duration_becomes_one_second() {
        assert_eq!(settings(0.0, false).effective_duration(), 1.0);
        assert_eq!(settings(-2.0, false).effective_duration(), 1.0);
        assert_eq!(settings(f64::NAN, false).effective_duration(), 1.0);
        assert_eq!(settings(2.5, false).effective_duration(), 2.5);
    }

    #[test]
    fn test_forward_run_reaches_end_angle() {
        let source = SampleGrid::column(vec![1.0, 2.0, 3.0]);
        let mut target = source.clone();
        let mut buffers = FrameBuffers::new();
        let mut d = driver(settings(1.0, false));
        assert_eq!(d.phase(), AnimationPhase::Idle);

        d.start(&source, &mut buffers).unwrap();
        assert_eq!(d.phase(), AnimationPhase::Running);
        assert_eq!(buffers.original().len(), 4);

        assert_eq!(d.tick(0.4, &mut buffers, &mut target).unwrap(), TickStatus::Running);
        assert_eq!(d.tick(0.4, &mut buffers, &mut target).unwrap(), TickStatus::Running);
        assert_eq!(d.tick(0.4, &mut buffers, &mut target).unwrap(), TickStatus::Done);
        assert_eq!(d.phase(), AnimationPhase::Done);
        assert_eq!(d.progress(), 1.0);
        assert_eq!(d.current_angle(), 0.5);
        assert_eq!(d.frame(), 3);

        // Done is sticky.
        assert_eq!(d.tick(0.4, &mut buffers, &mut target).unwrap(), TickStatus::Done);
        assert_eq!(d.frame(), 3);
    }

    #[test]
    fn test_frame_record_carries_the_progress_of_its_angle() {
        let source = SampleGrid::column(vec![1.0, 2.0, 3.0]);
        let mut target = source.clone();
        let mut buffers = FrameBuffers::new();
        let mut d = driver(settings(1.0, true));
        d.start(&source, &mut buffers).unwrap();
        assert_eq!(d.last_frame(), None);

        let mut index = 0;
        while d.tick(0.25, &mut buffers, &mut target).unwrap() == TickStatus::Running {
            let record = d.last_frame().unwrap();
            assert_eq!(record.index, index);
            assert_eq!(record.progress, d.progress());
            assert_eq!(record.angle, d.current_angle());
            index += 1;
        }

        let last = d.last_frame().unwrap();
        assert_eq!(last.progress, 0.0);
        assert_eq!(last.angle, 0.0);
        assert_eq!(last.index + 1, d.frame());

        d.start(&source, &mut buffers).unwrap();
        assert_eq!(d.last_frame(), None);
    }

    #[test]
    fn test_reverse_runs_back_to_start() {
        let source = SampleGrid::column(vec![4.0, 1.0]);
        let mut target = source.clone();
        let mut buffers = FrameBuffers::new();
        let mut d = driver(settings(1.0, true));
        d.start(&source, &mut buffers).unwrap();

        assert_eq!(d.tick(1.0, &mut buffers, &mut target).unwrap(), TickStatus::Running);
        assert_eq!(d.phase(), AnimationPhase::Reversing);
        assert_eq!(d.tick(0.5, &mut buffers, &mut target).unwrap(), TickStatus::Running);
        assert_eq!(d.tick(0.5, &mut buffers, &mut target).unwrap(), TickStatus::Done);
        assert_eq!(d.progress(), 0.0);

        // The last frame used the start angle, which is the identity here.
        for (t, s) in target.values().iter().zip(source.values()) {
            assert!((t - s).abs() < 1e-9);
        }
    }

    #[test]
    fn test_request_reverse_after_done() {
        let source = SampleGrid::column(vec![1.0, 1.0]);
        let mut target = source.clone();
        let mut buffers = FrameBuffers::new();
        let mut d = driver(settings(1.0, false));

        assert!(d.request_reverse().is_err());
        d.start(&source, &mut buffers).unwrap();
        assert!(d.request_reverse().is_err());
        d.tick(2.0, &mut buffers, &mut target).unwrap();
        assert_eq!(d.phase(), AnimationPhase::Done);

        d.request_reverse().unwrap();
        assert_eq!(d.phase(), AnimationPhase::Reversing);
        assert_eq!(d.tick(1.0, &mut buffers, &mut target).unwrap(), TickStatus::Done);
    }

    #[test]
    fn test_cancel_leaves_decoded_frame() {
        let source = SampleGrid::column(vec![2.0, 6.0, 1.0, 3.0]);
        let mut target = source.clone();
        let mut buffers = FrameBuffers::new();
        let mut d = driver(settings(2.0, false));
        d.start(&source, &mut buffers).unwrap();
        d.tick(0.5, &mut buffers, &mut target).unwrap();
        let frame = target.clone();

        d.cancel();
        assert_eq!(d.phase(), AnimationPhase::Idle);
        assert_eq!(d.tick(0.5, &mut buffers, &mut target).unwrap(), TickStatus::Done);
        assert_eq!(target, frame);
    }

    #[test]
    fn test_frames_restore_original_amplitudes() {
        // Same angle twice must give the same frame: gates and amplitudes
        // are reset rather than accumulated.
        let source = SampleGrid::column(vec![3.0, 0.5, 2.0, 8.0]);
        let mut target = source.clone();
        let mut buffers = FrameBuffers::new();
        let mut d: AnimationDriver = AnimationDriver::new(
            AnimationSettings {
                start_angle: 0.3,
                end_angle: 0.3,
                duration_secs: 4.0,
                reverse: false,
                max_qubits: 24,
            },
            Effect::blur(0.0),
        );
        d.start(&source, &mut buffers).unwrap();
        d.tick(1.0, &mut buffers, &mut target).unwrap();
        let first = target.clone();
        d.tick(1.0, &mut buffers, &mut target).unwrap();
        assert_eq!(target, first);
    }

    #[test]
    fn test_rejects_bad_elapsed_and_foreign_buffers() {
        let source = SampleGrid::column(vec![1.0, 2.0]);
        let mut target = source.clone();
        let mut buffers = FrameBuffers::new();
        let mut d = driver(settings(1.0, false));
        d.start(&source, &mut buffers).unwrap();

        assert!(d.tick(-0.1, &mut buffers, &mut target).is_err());
        assert!(d.tick(f64::NAN, &mut buffers, &mut target).is_err());

        let mut other = FrameBuffers::with_capacity(8);
        assert!(matches!(
            d.tick(0.1, &mut other, &mut target),
            Err(Error::BufferSizeMismatch { .. })
        ));
        assert_eq!(d.progress(), 0.0);
        assert_eq!(d.frame(), 0);
    }

    #[test]
    fn test_start_failure_keeps_idle() {
        let mut buffers = FrameBuffers::new();
        let mut d = driver(AnimationSettings {
            max_qubits: 2,
            ..settings(1.0, false)
        });
        let big = SampleGrid::column(vec![1.0; 16]);
        assert!(d.start(&big, &mut buffers).is_err());
        assert_eq!(d.phase(), AnimationPhase::Idle);
        assert!(d.encoding().is_none());
    }
}
