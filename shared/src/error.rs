use thiserror::Error;

/// Prefix carried by every message the worker emits when it cannot bring the
/// analysis module up.
pub const INITIALIZATION_PREFIX: &str = "Failed to initialize WebAssembly: ";

/// Everything that can go wrong between the form and the results table.
///
/// Each variant is normalized into display text before it reaches the
/// results area; nothing crosses the presenter boundary as a raw fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GseaError {
    /// The analysis module failed to load or activate. Fatal for the session.
    #[error("{}{}", INITIALIZATION_PREFIX, .0)]
    Initialization(String),
    /// Malformed or inconsistent form input. Blocks dispatch only.
    #[error(transparent)]
    InputParse(#[from] InputParseError),
    /// The module raised while handling a request.
    #[error("{0}")]
    Computation(String),
    /// The worker itself raised outside the message protocol; its request
    /// loop is gone. Fatal for the session.
    #[error("An error occurred in the worker: {0}")]
    WorkerFault(String),
    /// The module returned a payload of unexpected shape.
    #[error("{0}")]
    InvalidResult(String),
}

impl GseaError {
    /// Builds an initialization error from text reported by the worker,
    /// which usually carries the prefix already.
    pub fn initialization(message: &str) -> Self {
        let detail = message.strip_prefix(INITIALIZATION_PREFIX).unwrap_or(message);
        GseaError::Initialization(detail.to_string())
    }

    /// Fatal errors leave the run control disabled for good.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GseaError::Initialization(_) | GseaError::WorkerFault(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputParseError {
    #[error("{field}: '{token}' is not a valid number")]
    InvalidNumber { field: &'static str, token: String },

    #[error("{field}: '{token}' is not a valid integer")]
    InvalidInteger { field: &'static str, token: String },

    #[error("{field}: empty entry at position {position}")]
    EmptyEntry { field: &'static str, position: usize },

    #[error("gene sets: {0}")]
    GeneSets(String),

    #[error("genes and metric differ in length ({genes} genes, {metric} metric values)")]
    LengthMismatch { genes: usize, metric: usize },

    #[error("{field} must be at least {minimum}, got {value}")]
    BelowMinimum {
        field: &'static str,
        minimum: u64,
        value: u64,
    },
}
