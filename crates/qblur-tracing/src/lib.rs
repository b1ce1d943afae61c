//! Shared tracing configuration for the qblur workspace.
//!
//! Demos, integration tests and host applications install their `tracing`
//! subscriber through this crate so every binary logs the blur pipeline and
//! the dice sampler the same way.

pub mod performance;

#[macro_use]
pub mod macros;

use std::env;

use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// How the workspace subscriber is assembled.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Filter directives such as `qblur_core=debug`. `None` defers to
    /// `RUST_LOG`, then to `info`.
    pub directives: Option<String>,
    pub output: TracingOutput,
    /// Colour codes; always off for JSON
    pub ansi: bool,
    /// Emit a line when spans close, carrying their busy/idle time
    pub log_span_close: bool,
    /// Log `PerformanceSpan` durations at all
    pub enable_performance_tracing: bool,
    /// Only log performance spans slower than this many microseconds
    pub performance_threshold_us: Option<u64>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_local()
    }
}

impl TracingConfig {
    fn preset(output: TracingOutput, performance: bool) -> Self {
        Self {
            directives: None,
            ansi: output != TracingOutput::Json,
            output,
            log_span_close: false,
            enable_performance_tracing: performance,
            performance_threshold_us: None,
        }
    }

    /// Human-readable output; performance spans only in debug builds.
    pub fn for_local() -> Self {
        Self::preset(TracingOutput::Pretty, cfg!(debug_assertions))
    }

    /// JSON lines for CI log collection, no performance spans.
    pub fn for_ci() -> Self {
        Self::preset(TracingOutput::Json, false)
    }

    /// Debug output from the core and dice crates with every span close
    /// logged, for checking the per-frame budget of an animation.
    pub fn for_performance() -> Self {
        Self {
            directives: Some("qblur_core=debug,qblur_dice=debug".to_string()),
            log_span_close: true,
            ..Self::preset(TracingOutput::Json, true)
        }
    }

    /// Start from the `QBLUR_TRACING_PROFILE` preset (`local`, `ci`,
    /// `performance`) and apply overrides from `QBLUR_TRACING_DIRECTIVES`,
    /// `QBLUR_TRACING_FORMAT` (`pretty`, `compact`, `json`),
    /// `QBLUR_PERF_TRACING` and `QBLUR_PERF_THRESHOLD_US`.
    pub fn from_env() -> Self {
        let profile = env_value("QBLUR_TRACING_PROFILE").map(|v| v.to_ascii_lowercase());
        let mut config = match profile.as_deref() {
            Some("ci") => Self::for_ci(),
            Some("performance") => Self::for_performance(),
            _ => Self::for_local(),
        };

        if let Some(directives) = env_value("QBLUR_TRACING_DIRECTIVES") {
            config.directives = Some(directives);
        }
        if let Some(output) = env_value("QBLUR_TRACING_FORMAT").and_then(|v| TracingOutput::parse(&v.to_ascii_lowercase())) {
            config.ansi = config.ansi && output != TracingOutput::Json;
            config.output = output;
        }
        if let Some(flag) = env_value("QBLUR_PERF_TRACING") {
            config.enable_performance_tracing =
                matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(threshold_us) = env_value("QBLUR_PERF_THRESHOLD_US").and_then(|v| v.parse().ok()) {
            config.performance_threshold_us = Some(threshold_us);
        }

        config
    }

    fn filter(&self) -> Result<EnvFilter, TracingSetupError> {
        match &self.directives {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|err| TracingSetupError::InvalidFilter(err.to_string()))
            }
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.log_span_close {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let base = fmt::layer().with_span_events(span_events);

        match self.output {
            TracingOutput::Pretty => Box::new(base.pretty().with_ansi(self.ansi)),
            TracingOutput::Compact => Box::new(base.compact().with_ansi(self.ansi)),
            TracingOutput::Json => Box::new(base.json().with_ansi(false)),
        }
    }
}

/// Trimmed value of a set, non-empty variable
fn env_value(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingSetupError {
    #[error("invalid tracing directive: {0}")]
    InvalidFilter(String),
    /// Usually means a global subscriber is already installed
    #[error("failed to install global tracing subscriber: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Assemble the subscriber described by `config` without installing it.
pub fn build_subscriber(config: &TracingConfig) -> Result<impl Subscriber + Send + Sync, TracingSetupError> {
    let filter = config.filter()?;
    Ok(Registry::default().with(config.fmt_layer()).with(filter))
}

/// Install the subscriber process-wide and apply the performance settings.
pub fn init_global_tracing(config: &TracingConfig) -> Result<(), TracingSetupError> {
    performance::set_enabled(config.enable_performance_tracing);
    performance::set_default_threshold(config.performance_threshold_us);
    build_subscriber(config)?.try_init()?;
    Ok(())
}

/// Formatter output styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingOutput {
    Pretty,
    Compact,
    Json,
}

impl TracingOutput {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}
