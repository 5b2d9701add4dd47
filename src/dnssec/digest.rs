//! `CanonicalDigest` (C1): the byte sequence a `CryptoVerifier` is asked to
//! check a signature against, per RFC 4034 §3.1.8.1 / RFC 4035 §5.3.

use super::rr::{Name, Rr, Rrset, Rrsig};

/// Produce the canonical byte stream for `rrset` under `rrsig`.
///
/// Deterministic regardless of the insertion order of `rrset.records`, and
/// independent of any other RRSIGs attached to `rrset` (duplicate RRSIGs
/// differing only in key tag never perturb this output).
pub fn digest_rrset(rrsig: &Rrsig, rrset: &Rrset) -> Vec<u8> {
    let mut rendered: Vec<Vec<u8>> = rrset
        .records
        .iter()
        .map(|record| render_record(rrsig, record))
        .collect();

    // Ascending lexicographic order of the canonical wire form, unsigned
    // byte comparison (Rust's default `Vec<u8>` Ord is exactly this).
    rendered.sort();

    let mut out = rrsig.signed_prefix();
    for record in rendered {
        out.extend_from_slice(&record);
    }
    out
}

/// Render one RR in canonical wire form, substituting the RRSIG's
/// original-TTL and applying wildcard owner-name normalization.
fn render_record(rrsig: &Rrsig, record: &Rr) -> Vec<u8> {
    let owner = canonical_owner_name(rrsig, &record.name);

    let mut out = owner.to_wire();
    out.extend_from_slice(&record.rtype.to_be_bytes());
    out.extend_from_slice(&record.rclass.to_be_bytes());
    out.extend_from_slice(&rrsig.original_ttl.to_be_bytes());
    out.extend_from_slice(&(record.rdata.len() as u16).to_be_bytes());
    out.extend_from_slice(&record.rdata);
    out
}

/// RFC 4035 §5.3.2 wildcard expansion: if the RRSIG's `labels` field is
/// smaller than the record owner's label count, the record was synthesized
/// from a wildcard and must be canonicalized as `*.<suffix>`.
fn canonical_owner_name(rrsig: &Rrsig, owner: &Name) -> Name {
    if (rrsig.labels as usize) < owner.label_count() {
        owner.wildcard_suffix(rrsig.labels as usize)
    } else {
        owner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnssec::rr::CLASS_IN;

    fn sample_rrsig() -> Rrsig {
        Rrsig {
            type_covered: 16, // TXT
            algorithm: 8,
            labels: 2,
            original_ttl: 3600,
            signature_expiration: 2_000_000_000,
            signature_inception: 1_000_000_000,
            key_tag: 12345,
            signer_name: Name::parse("example.com"),
            signature: vec![0xAA, 0xBB],
        }
    }

    fn sample_rrset() -> Rrset {
        let mut rrset = Rrset::new(Name::parse("www.example.com"), CLASS_IN, 16);
        rrset.push(Rr {
            name: Name::parse("www.example.com"),
            rtype: 16,
            rclass: CLASS_IN,
            ttl: 60, // deliberately different from original_ttl
            rdata: b"\x04textA".to_vec(),
        });
        rrset.push(Rr {
            name: Name::parse("www.example.com"),
            rtype: 16,
            rclass: CLASS_IN,
            ttl: 999,
            rdata: b"\x04textB".to_vec(),
        });
        rrset
    }

    #[test]
    fn permutation_stable() {
        let rrsig = sample_rrsig();
        let mut forward = sample_rrset();
        let digest_forward = digest_rrset(&rrsig, &forward);

        forward.records.reverse();
        let digest_reversed = digest_rrset(&rrsig, &forward);

        assert_eq!(digest_forward, digest_reversed);
    }

    #[test]
    fn ttl_is_replaced_with_original_ttl() {
        let rrsig = sample_rrsig();
        let rrset = sample_rrset();
        let digest = digest_rrset(&rrsig, &rrset);

        // original_ttl (3600 = 0x00000E10) must appear in the rendered
        // records; the per-record TTLs (60, 999) must not determine it.
        assert!(digest.windows(4).any(|w| w == 3600u32.to_be_bytes()));
    }

    #[test]
    fn wildcard_expansion_applies_when_labels_field_is_smaller() {
        let mut rrsig = sample_rrsig();
        rrsig.labels = 2; // example.com has 2 labels; www.example.com has 3

        let mut rrset = Rrset::new(Name::parse("www.example.com"), CLASS_IN, 16);
        rrset.push(Rr {
            name: Name::parse("www.example.com"),
            rtype: 16,
            rclass: CLASS_IN,
            ttl: 60,
            rdata: b"\x04data".to_vec(),
        });

        let digest = digest_rrset(&rrsig, &rrset);
        let wildcard_wire = Name::parse("*.example.com").to_wire();
        assert!(
            digest
                .windows(wildcard_wire.len())
                .any(|w| w == wildcard_wire),
            "expected wildcard-expanded owner name in digest"
        );
    }

    #[test]
    fn duplicate_rrsigs_with_different_key_tags_do_not_change_digest() {
        let rrsig_a = sample_rrsig();
        let mut rrsig_b = sample_rrsig();
        rrsig_b.key_tag = rrsig_a.key_tag.wrapping_add(1);

        let rrset = sample_rrset();
        let mut rrset_with_both = rrset.clone();
        rrset_with_both.add_rrsig(rrsig_a.clone());
        rrset_with_both.add_rrsig(rrsig_b);

        assert_eq!(
            digest_rrset(&rrsig_a, &rrset),
            digest_rrset(&rrsig_a, &rrset_with_both)
        );
    }
}
