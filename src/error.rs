use thiserror::Error;

/// Why an external query produced no value.
///
/// Every collaborator reports failure through this type instead of panicking;
/// callers log it and fall back to their documented default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("eth_call to {contract} failed: {reason}")]
    CallFailed { contract: String, reason: String },
    #[error("unable to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
    #[error("{0} is not available")]
    Unavailable(String),
}

impl QueryError {
    pub fn decode<E: std::fmt::Display>(what: &'static str, err: E) -> Self {
        QueryError::Decode {
            what,
            reason: err.to_string(),
        }
    }
}
