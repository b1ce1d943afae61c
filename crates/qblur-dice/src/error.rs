//! Error types for qblur-dice operations

/// Result type for qblur-dice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the sampler and roll session
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Regime name or code not recognised
    #[error("Invalid correlation regime: {0}")]
    InvalidRegime(String),

    /// Correlated regimes need a pair of dice
    #[error("Not enough dice: need {required}, have {actual}")]
    NotEnoughDice { required: usize, actual: usize },

    /// Face value outside 1..=6
    #[error("Invalid face value: {0}")]
    InvalidFace(u8),

    /// The dice never showed the commanded pair within the poll budget
    #[error("Dice did not settle on a correlated pair within {polls} polls")]
    RetryBudgetExhausted { polls: u32 },
}
