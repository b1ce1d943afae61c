//! Error types for qblur-core operations

/// Result type for qblur-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, transforming or decoding data
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed request (bad counts, bad indices)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Encoding was asked to process zero items or zero slots
    #[error("Empty input: nothing to encode")]
    EmptyInput,

    /// Register would exceed the configured qubit budget
    #[error("Qubit limit exceeded: requested {requested}, maximum {max}")]
    QubitLimitExceeded { requested: u32, max: u32 },

    /// Buffer length does not match the register or layout
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Modulo/remainder selection that can never select a qubit
    #[error("Invalid qubit selection: remainder {remainder} with modulo {modulo}")]
    InvalidSelection { modulo: usize, remainder: usize },

    /// Gate addresses a qubit outside the register
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit register")]
    QubitOutOfRange { qubit: u32, num_qubits: u32 },

    /// Register was created without direct amplitude access
    #[error("Amplitude access is disabled for this register")]
    AmplitudeAccessDisabled,

    /// A required collaborator (input mesh, target, buffer) is not configured
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),

    /// Configuration failed validation or could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}
