//! `KeyEntry` (C3): a tagged representation of trusted, proven-absent, or
//! bogus key material at an owner name.

use super::rr::{DnsClass, Dnskey, Name, SRrset};
use super::status::{ede, JustifiedStatus};

#[derive(Debug, Clone)]
enum Tag {
    /// A non-empty, trusted DNSKEY set, optionally paired with the list of
    /// algorithms the zone's DS/DNSKEY set signals as in use.
    Good {
        keys: Vec<Dnskey>,
        signalled_algs: Option<Vec<u8>>,
    },
    /// A proven-insecure point in the tree: no keys exist here, and that
    /// absence was itself validated.
    Null,
    /// A validation failure occurred establishing keys at this name.
    Bad,
    /// No trust anchor is configured for this name's zone at all (RFC 4035
    /// §4.3): there is no basis to judge SECURE, INSECURE, or BOGUS.
    Indeterminate,
}

/// Trusted-key material (or its proven absence/failure/indeterminacy) at one
/// owner name.
///
/// Invariants: `Good` always carries a non-empty rrset; the other tags never
/// carry key material; exactly one tag is active at a time.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    pub name: Name,
    pub class: DnsClass,
    pub ttl: u32,
    pub ede_reason: Option<i32>,
    pub bad_reason: Option<String>,
    tag: Tag,
}

impl KeyEntry {
    /// A trusted, non-empty DNSKEY set. Panics in debug builds if `keys` is
    /// empty — a `Good` entry with no keys is a contradiction in terms.
    pub fn good(
        name: Name,
        class: DnsClass,
        ttl: u32,
        keys: Vec<Dnskey>,
        signalled_algs: Option<Vec<u8>>,
    ) -> Self {
        debug_assert!(!keys.is_empty(), "Good key entry must carry at least one key");
        Self {
            name,
            class,
            ttl,
            ede_reason: None,
            bad_reason: None,
            tag: Tag::Good {
                keys,
                signalled_algs,
            },
        }
    }

    /// A proven-insecure point: no keys exist at `name`.
    pub fn null_entry(name: Name, class: DnsClass, ttl: u32) -> Self {
        Self {
            name,
            class,
            ttl,
            ede_reason: None,
            bad_reason: None,
            tag: Tag::Null,
        }
    }

    /// A failure to establish keys at `name`.
    pub fn bad_entry(name: Name, class: DnsClass, ttl: u32) -> Self {
        Self {
            name,
            class,
            ttl,
            ede_reason: None,
            bad_reason: None,
            tag: Tag::Bad,
        }
    }

    /// No trust anchor covers `name` at all; validation cannot proceed in
    /// either direction here (trust anchor acquisition is out of scope for
    /// this crate and is the caller's responsibility).
    pub fn indeterminate_entry(name: Name, class: DnsClass, ttl: u32) -> Self {
        Self {
            name,
            class,
            ttl,
            ede_reason: None,
            bad_reason: None,
            tag: Tag::Indeterminate,
        }
    }

    /// Attach the reason no usable key was found. Applies regardless of
    /// which tag is active.
    pub fn set_bad_reason(&mut self, ede_code: i32, text: impl Into<String>) {
        self.ede_reason = Some(ede_code);
        self.bad_reason = Some(text.into());
    }

    pub fn is_good(&self) -> bool {
        matches!(self.tag, Tag::Good { .. })
    }

    pub fn is_null(&self) -> bool {
        matches!(self.tag, Tag::Null)
    }

    pub fn is_bad(&self) -> bool {
        matches!(self.tag, Tag::Bad)
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self.tag, Tag::Indeterminate)
    }

    /// The trusted DNSKEY set, if this is a `Good` entry.
    pub fn keys(&self) -> Option<&[Dnskey]> {
        match &self.tag {
            Tag::Good { keys, .. } => Some(keys),
            _ => None,
        }
    }

    /// The signalled-algorithm list, if this is a `Good` entry and one was
    /// supplied.
    pub fn signalled_algs(&self) -> Option<&[u8]> {
        match &self.tag {
            Tag::Good { signalled_algs, .. } => signalled_algs.as_deref(),
            _ => None,
        }
    }

    fn bad_reason_text(&self) -> String {
        self.bad_reason
            .clone()
            .unwrap_or_else(|| "no usable key".to_string())
    }

    /// Short-circuit check before signature verification proceeds. Returns
    /// `Some(status)` when the outcome is already determined without
    /// needing to look at any signature; `None` means the caller must
    /// continue into the full verify loop.
    pub fn validate_key_for(&self, set: &SRrset) -> Option<JustifiedStatus> {
        if set.signer_name.is_none() && set.synthesized_from_secure_dname {
            return Some(JustifiedStatus::secure());
        }

        if matches!(self.tag, Tag::Indeterminate) {
            return Some(JustifiedStatus::indeterminate(format!(
                "no trust anchor configured at {}",
                self.name
            )));
        }

        if set.signer_name.is_none() {
            return Some(match &self.tag {
                Tag::Null => JustifiedStatus::insecure(
                    self.bad_reason.clone().unwrap_or_else(|| "insecure unsigned".to_string()),
                ),
                Tag::Good { .. } => {
                    JustifiedStatus::bogus(ede::RRSIGS_MISSING, "no RRSIG and keys are trusted")
                }
                Tag::Bad => JustifiedStatus::bogus(
                    self.ede_reason.unwrap_or(ede::DNSSEC_BOGUS),
                    self.bad_reason_text(),
                ),
                Tag::Indeterminate => unreachable!("filtered above"),
            });
        }

        match &self.tag {
            Tag::Bad => Some(JustifiedStatus::bogus(
                self.ede_reason.unwrap_or(ede::DNSSEC_BOGUS),
                format!("bad key at {}: {}", self.name, self.bad_reason_text()),
            )),
            Tag::Null => Some(JustifiedStatus::insecure(format!(
                "proven insecure at {}",
                self.name
            ))),
            Tag::Good { .. } => None,
            Tag::Indeterminate => unreachable!("filtered above"),
        }
    }
}
