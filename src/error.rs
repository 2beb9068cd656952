use thiserror::Error;

pub type Result<T> = std::result::Result<T, TriageError>;

/// Configuration problems detected when a pipeline is built.
/// Bad post data never produces an error; it is normalized instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TriageError {
    #[error("no active keywords configured")]
    NoActiveKeywords,

    #[error("association terms configured for unknown keyword `{keyword}`")]
    UnknownAssociationKeyword { keyword: String },

    #[error("blank term in {location}")]
    BlankTerm { location: String },

    #[error("time window must be positive, got {hours}h")]
    InvalidWindow { hours: i64 },

    #[error("sentiment thresholds must lie in (0, 1], got {value}")]
    InvalidThreshold { value: f32 },
}
