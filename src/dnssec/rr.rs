//! Minimal resource-record types the validator operates over.
//!
//! Wire parsing of individual record types, name compression, and
//! base64/base32 decoding are external-collaborator concerns (consumed as a
//! library per the crate's scope). What lands here is the already-decoded
//! shape: an owner name split into labels, a type/class pair, a TTL, and an
//! opaque rdata byte string ready for canonicalization.

use std::fmt;

/// A DNS class. Only IN is meaningfully exercised by DNSSEC in practice, but
/// the field is carried through rather than assumed.
pub type DnsClass = u16;

pub const CLASS_IN: DnsClass = 1;

/// An owner name, stored as lowercase-normalized labels in presentation
/// order (e.g. `www.example.com.` -> `["www", "example", "com"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Name {
    labels: Vec<String>,
}

impl Name {
    pub fn root() -> Self {
        Self { labels: Vec::new() }
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels
                .into_iter()
                .map(|l| l.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn parse(presentation: &str) -> Self {
        let trimmed = presentation.trim_end_matches('.');
        if trimmed.is_empty() {
            return Self::root();
        }
        Self::from_labels(trimmed.split('.'))
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Wire-form encoding: length-prefixed labels terminated by a zero
    /// octet, no compression. Labels are already lowercased at construction.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1);
        for label in &self.labels {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        out.push(0);
        out
    }

    /// True iff `self` is `other` or a descendant of `other` (reflexive).
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        if other.labels.len() > self.labels.len() {
            return false;
        }
        let offset = self.labels.len() - other.labels.len();
        self.labels[offset..] == other.labels[..]
    }

    /// Returns the suffix of `self` consisting of its last `n` labels,
    /// with a leading wildcard label prepended (RRSIG wildcard expansion).
    pub fn wildcard_suffix(&self, labels_covered: usize) -> Name {
        let keep = labels_covered.min(self.labels.len());
        let offset = self.labels.len() - keep;
        let mut labels = vec!["*".to_string()];
        labels.extend_from_slice(&self.labels[offset..]);
        Name { labels }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.labels.join("."))
        }
    }
}

/// One resource record: owner name, type, class, TTL, and opaque rdata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rr {
    pub name: Name,
    pub rtype: u16,
    pub rclass: DnsClass,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

/// A parsed RRSIG record (RFC 4034 §3.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rrsig {
    pub type_covered: u16,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub signature_expiration: u32,
    pub signature_inception: u32,
    pub key_tag: u16,
    pub signer_name: Name,
    pub signature: Vec<u8>,
}

impl Rrsig {
    /// The signed portion of the RRSIG RDATA (everything but the signature
    /// bytes), in wire form.
    pub fn signed_prefix(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(18 + self.signer_name.to_wire().len());
        out.extend_from_slice(&self.type_covered.to_be_bytes());
        out.push(self.algorithm);
        out.push(self.labels);
        out.extend_from_slice(&self.original_ttl.to_be_bytes());
        out.extend_from_slice(&self.signature_expiration.to_be_bytes());
        out.extend_from_slice(&self.signature_inception.to_be_bytes());
        out.extend_from_slice(&self.key_tag.to_be_bytes());
        out.extend_from_slice(&self.signer_name.to_wire());
        out
    }
}

/// A parsed DNSKEY record (RFC 4034 §2.1), with its derived key tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dnskey {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
    pub key_tag: u16,
}

impl Dnskey {
    pub fn new(flags: u16, protocol: u8, algorithm: u8, public_key: Vec<u8>) -> Self {
        let key_tag = super::key_tag::calculate_key_tag(flags, protocol, algorithm, &public_key);
        Self {
            flags,
            protocol,
            algorithm,
            public_key,
            key_tag,
        }
    }
}

/// An unordered set of records sharing (owner name, class, type), plus zero
/// or more attached RRSIGs.
#[derive(Debug, Clone, Default)]
pub struct Rrset {
    pub name: Name,
    pub rclass: DnsClass,
    pub rtype: u16,
    pub records: Vec<Rr>,
    pub rrsigs: Vec<Rrsig>,
}

impl Rrset {
    pub fn new(name: Name, rclass: DnsClass, rtype: u16) -> Self {
        Self {
            name,
            rclass,
            rtype,
            records: Vec::new(),
            rrsigs: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Rr) {
        self.records.push(record);
    }

    pub fn add_rrsig(&mut self, rrsig: Rrsig) {
        self.rrsigs.push(rrsig);
    }

    /// RRSIGs deduplicated by (key_tag, algorithm, signature bytes), per the
    /// spec's open question on duplicate signatures.
    pub fn dedup_rrsigs(&self) -> Vec<&Rrsig> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for sig in &self.rrsigs {
            let key = (sig.key_tag, sig.algorithm, &sig.signature);
            if seen.insert(key) {
                out.push(sig);
            }
        }
        out
    }
}

/// DNSSEC security status of an RRset (RFC 4035 §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SecurityStatus {
    Unchecked,
    Bogus,
    Insecure,
    Secure,
    Indeterminate,
}

/// An RRset augmented with its cached security status and (when known) the
/// name of the zone that signed it.
#[derive(Debug, Clone)]
pub struct SRrset {
    pub rrset: Rrset,
    pub security_status: SecurityStatus,
    pub signer_name: Option<Name>,
    /// Set when this set is a CNAME synthesized from a DNAME that was
    /// itself already validated SECURE; an unsigned synthesized CNAME is
    /// not itself a validation gap in that case (RFC 6672 §3.5).
    pub synthesized_from_secure_dname: bool,
}

impl SRrset {
    pub fn new(rrset: Rrset) -> Self {
        Self {
            rrset,
            security_status: SecurityStatus::Unchecked,
            signer_name: None,
            synthesized_from_secure_dname: false,
        }
    }

    pub fn with_signer(mut self, signer: Name) -> Self {
        self.signer_name = Some(signer);
        self
    }

    pub fn with_status(mut self, status: SecurityStatus) -> Self {
        self.security_status = status;
        self
    }

    pub fn synthesized_from_secure_dname(mut self) -> Self {
        self.synthesized_from_secure_dname = true;
        self
    }
}
