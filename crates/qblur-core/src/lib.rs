//! # qblur-core - Quantum Blur Pipeline
//!
//! Maps numeric data (image channels, mesh vertex positions) onto the
//! amplitudes of a qubit register, runs a gate sequence on it, and maps the
//! measured probabilities back. Small rotations give a continuous, fully
//! reproducible blur controlled by a single angle.
//!
//! ## Pipeline
//!
//! ```text
//! raw data ─▶ codec::encode ─▶ normalize ─▶ simulator (effect) ─▶ measure ─▶ codec::decode ─▶ data
//!               │                                                               ▲
//!               └──────── offsets + original sum (Encoding) ───────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`locality`] - reflected binary codes so neighbouring samples differ in one bit
//! - [`normalization`] - unit-norm scaling with an exact inverse
//! - [`codec`] - encode/decode between sample grids and amplitude buffers
//! - [`simulator`] - the simulator capability set plus a dense reference implementation
//! - [`effects`] - gate sequences (rotation, hadamard, controlled gates over qubit fractions)
//! - [`transform`] - single-shot driver
//! - [`animation`] - tick-driven driver that sweeps the angle without reallocating
//! - [`mesh`], [`image`] - data adapters
//! - [`session`] - host-facing session with optional meshes
//! - [`config`] - [`BlurConfig`] from code, JSON or environment
//!
//! ## Example
//!
//! ```
//! use qblur_core::{blur_mesh, Mesh};
//!
//! let plane = Mesh::plane("plane", 4, 4, 1.0);
//! let blurred = blur_mesh(&plane, 0.25, 24)?;
//! assert_eq!(blurred.vertex_count(), 16);
//! # Ok::<(), qblur_core::Error>(())
//! ```

pub mod animation;
pub mod codec;
pub mod config;
pub mod effects;
pub mod error;
pub mod image;
pub mod locality;
pub mod mesh;
pub mod normalization;
pub mod session;
pub mod simulator;
pub mod transform;

// Re-export primary types
pub use animation::{interpolate_angle, AnimationDriver, AnimationPhase, AnimationSettings, FrameBuffers, FrameRecord, TickStatus};
pub use codec::{decode, encode, AmplitudeLayout, EncodedState, Encoding, SampleGrid, SampleSink, SampleSource};
pub use config::BlurConfig;
pub use effects::{Effect, QubitSelection};
pub use error::{Error, Result};
pub use image::{blur_image, ColorChannel, Image, Rgb};
pub use locality::{gray, locality_table, qubits_for, LocalityCache};
pub use mesh::{blur_mesh, Mesh};
pub use normalization::NormalizationRecord;
pub use session::BlurSession;
pub use simulator::{Gate, RegisterSpec, StateSimulator, StateVectorSimulator};
pub use transform::{apply_transform, blur_in_place, transform_in_place};
