//! `JustifiedStatus` (C6): the immutable result of a validation operation.

use std::fmt;

pub use crate::dnssec::rr::SecurityStatus;

/// Extended DNS Error codes (RFC 8914) this crate can produce.
pub mod ede {
    pub const UNSUPPORTED_DNSKEY_ALGORITHM: i32 = 1;
    pub const DNSSEC_BOGUS: i32 = 6;
    pub const SIGNATURE_EXPIRED: i32 = 7;
    pub const SIGNATURE_NOT_YET_VALID: i32 = 8;
    pub const DNSKEY_MISSING: i32 = 9;
    pub const RRSIGS_MISSING: i32 = 10;
    pub const NONE: i32 = -1;
}

/// The result of validating an RRset: a status, an optional Extended DNS
/// Error code, and an optional human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct JustifiedStatus {
    pub status: SecurityStatus,
    pub ede_code: i32,
    pub reason: Option<String>,
}

impl JustifiedStatus {
    pub fn new(status: SecurityStatus, ede_code: i32, reason: impl Into<String>) -> Self {
        Self {
            status,
            ede_code,
            reason: Some(reason.into()),
        }
    }

    pub fn secure() -> Self {
        Self {
            status: SecurityStatus::Secure,
            ede_code: ede::NONE,
            reason: None,
        }
    }

    pub fn insecure(reason: impl Into<String>) -> Self {
        Self::new(SecurityStatus::Insecure, ede::NONE, reason)
    }

    pub fn indeterminate(reason: impl Into<String>) -> Self {
        Self::new(SecurityStatus::Indeterminate, ede::NONE, reason)
    }

    pub fn unchecked(ede_code: i32, reason: impl Into<String>) -> Self {
        Self::new(SecurityStatus::Unchecked, ede_code, reason)
    }

    pub fn bogus(ede_code: i32, reason: impl Into<String>) -> Self {
        Self::new(SecurityStatus::Bogus, ede_code, reason)
    }

    pub fn is_secure(&self) -> bool {
        self.status == SecurityStatus::Secure
    }
}

impl fmt::Display for JustifiedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{:?} (ede={}): {}", self.status, self.ede_code, reason),
            None => write!(f, "{:?}", self.status),
        }
    }
}
