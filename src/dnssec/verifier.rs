//! `SignatureVerifier` (C5): orchestrates verification of an RRset given a
//! `KeyEntry` and a point in time.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::algorithm_requirements::AlgorithmRequirements;
use super::crypto::{CryptoVerifier, VerifyOutcome};
use super::digest::digest_rrset;
use super::key_entry::KeyEntry;
use super::rr::{Dnskey, Rrset, SRrset};
use super::status::{ede, JustifiedStatus};

/// Default cap on the number of RRSIGs examined per `verify` call (DNSSEC
/// configuration key `dnsjava.dnssec.max_validate_rrsigs`).
pub const DEFAULT_MAX_VALIDATE_RRSIGS: usize = 8;

pub struct SignatureVerifier {
    crypto: Arc<dyn CryptoVerifier>,
    max_validate_rrsigs: usize,
}

impl SignatureVerifier {
    pub fn new(crypto: Arc<dyn CryptoVerifier>) -> Self {
        Self {
            crypto,
            max_validate_rrsigs: DEFAULT_MAX_VALIDATE_RRSIGS,
        }
    }

    pub fn with_max_validate_rrsigs(mut self, max: usize) -> Self {
        self.max_validate_rrsigs = max;
        self
    }

    /// Verify `set` against `keys` at time `now` (wrapping 32-bit DNSSEC
    /// serial time).
    pub fn verify(&self, set: &SRrset, keys: &KeyEntry, now: u32) -> JustifiedStatus {
        if let Some(status) = keys.validate_key_for(set) {
            trace!(name = %set.rrset.name, "key entry short-circuited verification");
            return status;
        }

        let sigs = set.rrset.dedup_rrsigs();
        if sigs.is_empty() {
            warn!(name = %set.rrset.name, "no RRSIGs cover this RRset");
            return JustifiedStatus::bogus(ede::RRSIGS_MISSING, "no RRSIGs cover this RRset");
        }

        let mut requirements = keys
            .signalled_algs()
            .map(|algs| AlgorithmRequirements::init(algs.iter().copied()));
        if let Some(reqs) = &requirements {
            if reqs.num() == 0 {
                return JustifiedStatus::new(
                    super::status::SecurityStatus::Insecure,
                    ede::UNSUPPORTED_DNSKEY_ALGORITHM,
                    "no signalled algorithm is locally supported",
                );
            }
        }

        let candidate_keys = keys.keys().unwrap_or(&[]);
        let mut last_result: Option<JustifiedStatus> = None;
        let mut verified_count: usize = 0;

        for sig in sigs {
            if !set.rrset.name.is_subdomain_of(&sig.signer_name) {
                warn!(
                    name = %set.rrset.name,
                    signer = %sig.signer_name,
                    "signer is off-tree for this RRset"
                );
                return JustifiedStatus::bogus(
                    ede::DNSSEC_BOGUS,
                    format!(
                        "signer {} is off-tree for {}",
                        sig.signer_name, set.rrset.name
                    ),
                );
            }

            let candidates: Vec<&Dnskey> = candidate_keys
                .iter()
                .filter(|k| k.algorithm == sig.algorithm && k.key_tag == sig.key_tag)
                .collect();

            if candidates.is_empty() {
                debug!(key_tag = sig.key_tag, algorithm = sig.algorithm, "no candidate key for signature");
                last_result = Some(JustifiedStatus::unchecked(
                    ede::DNSKEY_MISSING,
                    "no candidate key for signature",
                ));
            } else {
                let signed_bytes = digest_rrset(sig, &set.rrset);
                let mut sig_secured = false;

                for key in &candidates {
                    let outcome = self.crypto.verify(
                        sig.algorithm,
                        &key.public_key,
                        &signed_bytes,
                        &sig.signature,
                        sig.signature_inception,
                        sig.signature_expiration,
                        now,
                    );

                    match outcome {
                        VerifyOutcome::Ok => {
                            sig_secured = true;
                            if let Some(reqs) = &mut requirements {
                                if reqs.set_secure(sig.algorithm) {
                                    return JustifiedStatus::secure();
                                }
                            } else {
                                return JustifiedStatus::secure();
                            }
                            break;
                        }
                        other => {
                            if let Some(reqs) = &mut requirements {
                                reqs.set_bogus(sig.algorithm);
                            }
                            last_result = Some(outcome_to_status(&other));
                        }
                    }
                }

                if sig_secured {
                    // requirements exist but are not yet fully satisfied;
                    // leave last_result as-is per the spec's fallback rule
                    // and move on to the next signature.
                }
            }

            verified_count += 1;
            if verified_count > self.max_validate_rrsigs {
                warn!(verified_count, "too many signatures examined");
                return JustifiedStatus::bogus(ede::DNSSEC_BOGUS, "too many signatures examined");
            }
        }

        last_result.unwrap_or_else(|| {
            JustifiedStatus::bogus(ede::DNSSEC_BOGUS, "no usable signature found")
        })
    }

    /// Verify `rrset` against a single `dnskey`. Signatures whose key tag
    /// doesn't match `dnskey.key_tag` are skipped without counting against
    /// `max_validate_rrsigs`.
    pub fn verify_with_key(&self, rrset: &Rrset, dnskey: &Dnskey, now: u32) -> JustifiedStatus {
        let candidates: Vec<&super::rr::Rrsig> = rrset
            .dedup_rrsigs()
            .into_iter()
            .filter(|sig| sig.key_tag == dnskey.key_tag)
            .collect();

        if candidates.is_empty() {
            return JustifiedStatus::bogus(ede::DNSKEY_MISSING, "no candidate signature for key");
        }

        let mut last_outcome = VerifyOutcome::KeyMismatch;
        for sig in candidates {
            let signed_bytes = digest_rrset(sig, rrset);
            let outcome = self.crypto.verify(
                sig.algorithm,
                &dnskey.public_key,
                &signed_bytes,
                &sig.signature,
                sig.signature_inception,
                sig.signature_expiration,
                now,
            );
            if outcome == VerifyOutcome::Ok {
                return JustifiedStatus::secure();
            }
            last_outcome = outcome;
        }

        match last_outcome {
            VerifyOutcome::SignatureExpired => {
                JustifiedStatus::bogus(ede::SIGNATURE_EXPIRED, "signature expired")
            }
            VerifyOutcome::SignatureNotYetValid => {
                JustifiedStatus::bogus(ede::SIGNATURE_NOT_YET_VALID, "signature not yet valid")
            }
            _ => JustifiedStatus::bogus(ede::DNSSEC_BOGUS, "no signature validated under this key"),
        }
    }
}

fn outcome_to_status(outcome: &VerifyOutcome) -> JustifiedStatus {
    match outcome {
        VerifyOutcome::SignatureExpired => {
            JustifiedStatus::bogus(ede::SIGNATURE_EXPIRED, "signature expired")
        }
        VerifyOutcome::SignatureNotYetValid => {
            JustifiedStatus::bogus(ede::SIGNATURE_NOT_YET_VALID, "signature not yet valid")
        }
        VerifyOutcome::InvalidKey(code) => JustifiedStatus::bogus(*code, "invalid key"),
        VerifyOutcome::KeyMismatch => JustifiedStatus::bogus(ede::DNSSEC_BOGUS, "key mismatch"),
        VerifyOutcome::UnsupportedAlgorithm => {
            JustifiedStatus::bogus(ede::DNSSEC_BOGUS, "unsupported algorithm")
        }
        VerifyOutcome::MalformedSignature => {
            JustifiedStatus::bogus(ede::DNSSEC_BOGUS, "malformed signature")
        }
        VerifyOutcome::Ok => unreachable!("Ok is handled by the caller before reaching here"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnssec::rr::{Name, Rr, CLASS_IN};

    /// A `CryptoVerifier` stub whose outcome is fixed per test, used to
    /// exercise the orchestration logic independent of `ring`'s algorithm
    /// coverage (in particular, DSA — algorithm 3 — which `ring` cannot
    /// back at all).
    struct StubVerifier {
        outcome: VerifyOutcome,
    }

    impl CryptoVerifier for StubVerifier {
        fn verify(
            &self,
            _algorithm: u8,
            _key_bytes: &[u8],
            _signed_bytes: &[u8],
            _signature_bytes: &[u8],
            _inception: u32,
            _expiration: u32,
            _now: u32,
        ) -> VerifyOutcome {
            self.outcome.clone()
        }
    }

    fn base_rrset() -> Rrset {
        let mut rrset = Rrset::new(Name::parse("example.com"), CLASS_IN, 16);
        rrset.push(Rr {
            name: Name::parse("example.com"),
            rtype: 16,
            rclass: CLASS_IN,
            ttl: 3600,
            rdata: b"\x04data".to_vec(),
        });
        rrset
    }

    fn sig_for(algorithm: u8, key_tag: u16) -> super::super::rr::Rrsig {
        super::super::rr::Rrsig {
            type_covered: 16,
            algorithm,
            labels: 2,
            original_ttl: 3600,
            signature_expiration: 2_000_000_000,
            signature_inception: 1_000_000_000,
            key_tag,
            signer_name: Name::parse("example.com"),
            signature: vec![0u8; 64],
        }
    }

    #[test]
    fn s3_dsa_algorithm_validates_via_pluggable_verifier() {
        // ring has no DSA backing; a caller-supplied CryptoVerifier is
        // exercised here instead, proving the orchestration (not the
        // crypto primitive) handles algorithm 3 correctly end-to-end.
        let verifier = SignatureVerifier::new(Arc::new(StubVerifier {
            outcome: VerifyOutcome::Ok,
        }));

        let dnskey = Dnskey::new(257, 3, 3, vec![9, 9, 9]);
        let mut rrset = base_rrset();
        rrset.add_rrsig(sig_for(3, dnskey.key_tag));

        let set = SRrset::new(rrset).with_signer(Name::parse("example.com"));
        let keys = KeyEntry::good(
            Name::parse("example.com"),
            CLASS_IN,
            3600,
            vec![dnskey],
            None,
        );

        let status = verifier.verify(&set, &keys, 1_500_000_000);
        assert!(status.is_secure());
    }

    #[test]
    fn s4_missing_signatures_is_bogus() {
        let verifier = SignatureVerifier::new(Arc::new(StubVerifier {
            outcome: VerifyOutcome::Ok,
        }));
        let dnskey = Dnskey::new(257, 3, 8, vec![1, 2, 3]);
        let set = SRrset::new(base_rrset()).with_signer(Name::parse("example.com"));
        let keys = KeyEntry::good(
            Name::parse("example.com"),
            CLASS_IN,
            3600,
            vec![dnskey],
            None,
        );

        let status = verifier.verify(&set, &keys, 0);
        assert_eq!(status.ede_code, ede::RRSIGS_MISSING);
    }

    #[test]
    fn s5_unmet_algorithm_requirement_forces_bogus() {
        let verifier = SignatureVerifier::new(Arc::new(StubVerifier {
            outcome: VerifyOutcome::Ok,
        }));

        let dnskey = Dnskey::new(257, 3, 8, vec![1, 2, 3]);
        let mut rrset = base_rrset();
        rrset.add_rrsig(sig_for(8, dnskey.key_tag));

        let set = SRrset::new(rrset).with_signer(Name::parse("example.com"));
        // signals algorithms 8 and 13, but only an algorithm-8 sig exists.
        let keys = KeyEntry::good(
            Name::parse("example.com"),
            CLASS_IN,
            3600,
            vec![dnskey],
            Some(vec![8, 13]),
        );

        let status = verifier.verify(&set, &keys, 1_500_000_000);
        assert!(!status.is_secure());
    }

    #[test]
    fn budget_exceeded_after_max_plus_one_signatures() {
        let verifier = SignatureVerifier::new(Arc::new(StubVerifier {
            outcome: VerifyOutcome::KeyMismatch,
        }))
        .with_max_validate_rrsigs(3);

        let dnskey = Dnskey::new(257, 3, 8, vec![1, 2, 3]);
        let mut rrset = base_rrset();
        for i in 0..5u16 {
            // distinct key tags so every sig counts as a fresh attempt
            // with no matching candidate key (empty-candidate path still
            // increments verified_count per the spec's open question).
            rrset.add_rrsig(sig_for(8, dnskey.key_tag.wrapping_add(i + 1)));
        }

        let set = SRrset::new(rrset).with_signer(Name::parse("example.com"));
        let keys = KeyEntry::good(
            Name::parse("example.com"),
            CLASS_IN,
            3600,
            vec![dnskey],
            None,
        );

        let status = verifier.verify(&set, &keys, 1_500_000_000);
        assert!(!status.is_secure());
        assert_eq!(status.ede_code, ede::DNSSEC_BOGUS);
    }
}
