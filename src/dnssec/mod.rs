pub mod algorithm;
pub mod algorithm_requirements;
pub mod config;
pub mod crypto;
pub mod digest;
pub mod key_entry;
pub mod key_tag;
pub mod rr;
pub mod status;
pub mod verifier;

pub use algorithm::DnsSecAlgorithm;
pub use algorithm_requirements::AlgorithmRequirements;
pub use config::ValidatorConfig;
pub use crypto::{CryptoVerifier, RingCryptoVerifier, VerifyOutcome};
pub use digest::digest_rrset;
pub use key_entry::KeyEntry;
pub use key_tag::calculate_key_tag;
pub use rr::{Dnskey, Name, Rr, Rrset, Rrsig, SRrset, SecurityStatus};
pub use status::JustifiedStatus;
pub use verifier::SignatureVerifier;

/// DNSSEC constants (RFC 4035, 4034).
pub mod constants {
    /// DNS UDP payload size for DNSSEC (RFC 4035).
    pub const DNSSEC_UDP_SIZE: u16 = 4096;

    /// DNSSEC OK flag for EDNS0.
    pub const DO_FLAG: u16 = 0x8000;
}
