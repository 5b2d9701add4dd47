//! `AlgorithmRequirements` (C4): tracks, for one DS/DNSKEY algorithm set,
//! whether every algorithm present has been satisfied by at least one
//! secure signature (RFC 6840 §5.11 "at least one algorithm must validate").

use std::collections::HashMap;

use super::algorithm::DnsSecAlgorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReqState {
    Pending,
    Secure,
    Bogus,
}

/// Monotone per-algorithm validation tracker for a single RRset's signer set.
///
/// Algorithm ids this crate's `CryptoVerifier` can't back (per
/// [`DnsSecAlgorithm::is_supported`]) are dropped at construction: they can
/// never contribute a secure verification, so counting them would make
/// `all_secure` permanently unreachable for sets that include one.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRequirements {
    needed: HashMap<u8, ReqState>,
}

impl AlgorithmRequirements {
    /// Build from the list of algorithm ids a DS or DNSKEY set declares.
    /// Duplicates collapse onto one entry.
    pub fn init(algorithms: impl IntoIterator<Item = u8>) -> Self {
        let mut needed = HashMap::new();
        for alg in algorithms {
            if DnsSecAlgorithm::from_u8(alg).is_some_and(|a| a.is_supported()) {
                needed.entry(alg).or_insert(ReqState::Pending);
            }
        }
        Self { needed }
    }

    /// Number of distinct algorithms being tracked.
    pub fn num(&self) -> usize {
        self.needed.len()
    }

    /// Mark `algorithm` as satisfied by a secure signature. Returns `true`
    /// iff this call makes every tracked algorithm secure. Once an
    /// algorithm is `Bogus` it cannot move back to `Secure` (monotone).
    pub fn set_secure(&mut self, algorithm: u8) -> bool {
        if let Some(state) = self.needed.get_mut(&algorithm) {
            if *state == ReqState::Pending {
                *state = ReqState::Secure;
            }
        }
        self.all_secure()
    }

    /// Mark `algorithm` as having failed verification, but only if it
    /// hasn't already been satisfied — a later bad signature must never
    /// retract an earlier secure one.
    pub fn set_bogus(&mut self, algorithm: u8) {
        if let Some(state) = self.needed.get_mut(&algorithm) {
            if *state == ReqState::Pending {
                *state = ReqState::Bogus;
            }
        }
    }

    /// True iff every tracked algorithm has reached `Secure`.
    pub fn all_secure(&self) -> bool {
        !self.needed.is_empty() && self.needed.values().all(|s| *s == ReqState::Secure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_algorithm_is_dropped_at_init() {
        // 3 = DSA, recognized but unsupported by ring.
        let reqs = AlgorithmRequirements::init([8, 3]);
        assert_eq!(reqs.num(), 1);
    }

    #[test]
    fn all_secure_requires_every_tracked_algorithm() {
        let mut reqs = AlgorithmRequirements::init([8, 13]);
        assert!(!reqs.set_secure(8));
        assert!(reqs.set_secure(13));
    }

    #[test]
    fn bogus_does_not_unset_a_prior_secure() {
        let mut reqs = AlgorithmRequirements::init([8]);
        assert!(reqs.set_secure(8));
        reqs.set_bogus(8);
        assert!(reqs.all_secure());
    }

    #[test]
    fn empty_set_is_never_all_secure() {
        let reqs = AlgorithmRequirements::init(std::iter::empty());
        assert!(!reqs.all_secure());
    }
}
