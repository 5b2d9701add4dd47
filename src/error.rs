use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the parts of the crate that return `Result`.
///
/// Per the validator's error-handling design, data-level validation outcomes
/// are never errors — they are `JustifiedStatus` values (see
/// [`crate::dnssec::status`]). This type only covers the seams around that:
/// malformed configuration, and the extended resolver's dispatch failures.
#[derive(Debug, Clone, Error)]
pub enum SentrySecError {
    #[error("invalid configuration value for `{key}`: `{value}`")]
    InvalidConfigValue { key: String, value: String },

    #[error("query {query_id} timed out before any resolver returned a response")]
    Timeout { query_id: Uuid },

    #[error("query {query_id} exhausted all resolvers: {last_error}")]
    AllResolversExhausted { query_id: Uuid, last_error: String },

    #[error("no resolvers configured")]
    NoResolvers,
}

pub type Result<T> = std::result::Result<T, SentrySecError>;
