pub mod dnssec;
pub mod error;
pub mod resolver;

pub use dnssec::{
    AlgorithmRequirements, CryptoVerifier, DnsSecAlgorithm, Dnskey, JustifiedStatus, KeyEntry,
    Name, RingCryptoVerifier, Rr, Rrset, Rrsig, SRrset, SecurityStatus, SignatureVerifier,
    ValidatorConfig, VerifyOutcome,
};
pub use error::{Result, SentrySecError};
pub use resolver::{
    EdnsParams, ExtendedResolver, Message, Query, Resolver, ResolverConfig, TruncationPolicy,
    TsigKey,
};
