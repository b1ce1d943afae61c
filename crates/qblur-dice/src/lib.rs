//! # qblur-dice - Correlated Dice
//!
//! Rolls two dice whose joint outcome follows one of five pairing regimes,
//! from fully independent to "entangled" pairs that always sum to seven.
//! The sampler draws a row of the regime's table and steers the dice onto
//! it; the dice themselves come from the host (a physics engine, or
//! [`VirtualDie`] in tests).
//!
//! ## Modules
//!
//! - [`regime`] - regimes and their joint-outcome tables
//! - [`die`] - the die collaborator trait and an in-memory die
//! - [`sampler`] - draw and resolve correlated pairs
//! - [`session`] - per-frame roll tracking with a settle window
//! - [`craps`] - scoring finished rolls
//!
//! ## Example
//!
//! ```
//! use qblur_dice::{CorrelatedSampler, CorrelationRegime, CrapsTable, VirtualDie};
//!
//! let mut sampler = CorrelatedSampler::with_seed(CorrelationRegime::SymmetricEntangled, 1);
//! let mut dice = vec![VirtualDie::new(0), VirtualDie::new(0)];
//! assert!(sampler.try_resolve(&mut dice));
//!
//! let report = CrapsTable::new().score_dice(&dice)?;
//! assert_eq!(report.faces[0], report.faces[1]);
//! # Ok::<(), qblur_dice::Error>(())
//! ```

pub mod craps;
pub mod die;
pub mod error;
pub mod regime;
pub mod sampler;
pub mod session;

// Re-export primary types
pub use craps::{CrapsOutcome, CrapsTable, RollReport};
pub use die::{check_face, Die, VirtualDie, FACES};
pub use error::{Error, Result};
pub use regime::{CorrelationRegime, FacePair};
pub use sampler::CorrelatedSampler;
pub use session::{RollConfig, RollSession, RollStatus};
