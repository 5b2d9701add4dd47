//! `CryptoVerifier` (C2): the capability this crate consumes to check one
//! (signed-bytes, signature, key) triple. Pure function of its inputs; no
//! I/O, no shared state.

use ring::signature;

use super::algorithm::DnsSecAlgorithm;

/// Outcome of one cryptographic verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Ok,
    KeyMismatch,
    SignatureExpired,
    SignatureNotYetValid,
    InvalidKey(i32),
    UnsupportedAlgorithm,
    MalformedSignature,
}

/// Capability interface for verifying one RRSIG against one DNSKEY.
///
/// Implementations are pure functions of their inputs: given the same
/// arguments, they must return the same outcome every time. `now` drives the
/// inception/expiration window check, not the wall clock directly, so the
/// verifier itself stays free of hidden time dependence.
pub trait CryptoVerifier: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn verify(
        &self,
        algorithm: u8,
        key_bytes: &[u8],
        signed_bytes: &[u8],
        signature_bytes: &[u8],
        inception: u32,
        expiration: u32,
        now: u32,
    ) -> VerifyOutcome;
}

/// RFC 1982 serial-number comparison: `a` is considered "less than or equal
/// to" `b` if the forward distance from `a` to `b` (mod 2^32) is at most
/// half the serial space. RRSIG inception/expiration timestamps are 32-bit
/// wrapping serials, not plain counters, so naive `u32` comparison breaks
/// near the 2106 wraparound.
fn serial_le(a: u32, b: u32) -> bool {
    let diff = b.wrapping_sub(a);
    diff == 0 || diff < 0x8000_0000
}

fn in_validity_window(now: u32, inception: u32, expiration: u32) -> Result<(), VerifyOutcome> {
    if !serial_le(inception, now) {
        return Err(VerifyOutcome::SignatureNotYetValid);
    }
    if !serial_le(now, expiration) {
        return Err(VerifyOutcome::SignatureExpired);
    }
    Ok(())
}

/// Default `CryptoVerifier` backed by `ring`. Handles the DSA/ECDSA
/// leading-zero padding quirk: some signers emit `r`/`s` (or DSA's `r`/`s`
/// pair) without leading zero bytes, and some emit them with extra leading
/// zero padding; both must be normalized to the algorithm's fixed component
/// width before `ring` will accept them.
#[derive(Debug, Default)]
pub struct RingCryptoVerifier;

impl RingCryptoVerifier {
    pub fn new() -> Self {
        Self
    }
}

impl CryptoVerifier for RingCryptoVerifier {
    fn verify(
        &self,
        algorithm: u8,
        key_bytes: &[u8],
        signed_bytes: &[u8],
        signature_bytes: &[u8],
        inception: u32,
        expiration: u32,
        now: u32,
    ) -> VerifyOutcome {
        let Some(algorithm) = DnsSecAlgorithm::from_u8(algorithm) else {
            return VerifyOutcome::UnsupportedAlgorithm;
        };
        if !algorithm.is_supported() {
            return VerifyOutcome::UnsupportedAlgorithm;
        }

        if let Err(outcome) = in_validity_window(now, inception, expiration) {
            return outcome;
        }

        let signature_bytes = match normalize_signature(algorithm, signature_bytes) {
            Ok(bytes) => bytes,
            Err(()) => return VerifyOutcome::MalformedSignature,
        };

        let Some(verify_alg) = algorithm.ring_algorithm() else {
            return VerifyOutcome::UnsupportedAlgorithm;
        };

        let public_key = signature::UnparsedPublicKey::new(verify_alg, key_bytes);
        match public_key.verify(signed_bytes, &signature_bytes) {
            Ok(()) => VerifyOutcome::Ok,
            Err(_) => VerifyOutcome::KeyMismatch,
        }
    }
}

/// Fixed component width (in bytes) of the r/s (or DSA r/s) pair for
/// algorithms whose signature encoding can arrive under- or over-sized.
fn component_width(algorithm: DnsSecAlgorithm) -> Option<usize> {
    match algorithm {
        DnsSecAlgorithm::DSA | DnsSecAlgorithm::DsaNsec3Sha1 => Some(20),
        DnsSecAlgorithm::EcdsaP256Sha256 => Some(32),
        DnsSecAlgorithm::EcdsaP384Sha384 => Some(48),
        _ => None,
    }
}

/// Re-pad a raw two-component (r, s) signature to `width` bytes per
/// component, trimming any extra leading zero bytes and left-padding any
/// short component with zeros. DSA signatures additionally carry a leading
/// one-byte T value ahead of the (r, s) pair, which is passed through
/// unchanged.
fn normalize_signature(algorithm: DnsSecAlgorithm, raw: &[u8]) -> Result<Vec<u8>, ()> {
    let Some(width) = component_width(algorithm) else {
        return Ok(raw.to_vec());
    };

    let is_dsa = matches!(
        algorithm,
        DnsSecAlgorithm::DSA | DnsSecAlgorithm::DsaNsec3Sha1
    );

    let (t_byte, components) = if is_dsa {
        if raw.is_empty() {
            return Err(());
        }
        (Some(raw[0]), &raw[1..])
    } else {
        (None, raw)
    };

    // A well-formed, already-correct encoding has exactly 2*width bytes; an
    // under/oversized one may differ in either direction per component, so
    // derive the split from the total length rather than assuming it's even.
    if components.is_empty() {
        return Err(());
    }
    let half = components.len() / 2;
    if components.len() % 2 != 0 && t_byte.is_none() {
        // Odd total length with no T byte to absorb it: malformed.
        return Err(());
    }
    let (r, s) = components.split_at(half);

    let r = fit_component(r, width)?;
    let s = fit_component(s, width)?;

    let mut out = Vec::with_capacity(width * 2 + 1);
    if let Some(t) = t_byte {
        out.push(t);
    }
    out.extend_from_slice(&r);
    out.extend_from_slice(&s);
    Ok(out)
}

/// Trim leading zero bytes beyond `width`, or left-pad with zeros up to
/// `width`. Rejects components whose significant digits exceed `width`.
fn fit_component(component: &[u8], width: usize) -> Result<Vec<u8>, ()> {
    let significant_start = component
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(component.len());
    let significant = &component[significant_start..];

    if significant.len() > width {
        return Err(());
    }

    let mut out = vec![0u8; width];
    let offset = width - significant.len();
    out[offset..].copy_from_slice(significant);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    /// The S1 ECDSA P-256 DNSKEY literal decodes to a raw 64-byte
    /// uncompressed point (32-byte x || 32-byte y, RFC 6605 §4), the width
    /// `ring`'s `ECDSA_P256_SHA256_FIXED` expects as a public key.
    #[test]
    fn s1_dnskey_literal_decodes_to_ecdsa_p256_point_width() {
        let key_b64 = "HgcQzDrxDm641ASGyEF0MXrjDji4XDnWzjrY9VoIn5GfAvHpuqI2W8yihplAz6C/56Zxq1XbAHjLZATfhZFmaA==";
        let key_bytes = base64::engine::general_purpose::STANDARD
            .decode(key_b64)
            .unwrap();
        assert_eq!(key_bytes.len(), 64);
    }

    #[test]
    fn serial_comparison_handles_wraparound() {
        assert!(serial_le(10, 20));
        assert!(!serial_le(20, 10));
        // near-wraparound: a small serial is "after" one close to u32::MAX
        assert!(serial_le(u32::MAX - 1, 5));
        assert!(!serial_le(5, u32::MAX - 1));
    }

    #[test]
    fn fit_component_pads_short_input() {
        let out = fit_component(&[0x01, 0x02], 4).unwrap();
        assert_eq!(out, vec![0x00, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn fit_component_trims_long_input() {
        let out = fit_component(&[0x00, 0x00, 0x01, 0x02], 2).unwrap();
        assert_eq!(out, vec![0x01, 0x02]);
    }

    #[test]
    fn fit_component_rejects_overflow() {
        assert!(fit_component(&[0x01, 0x02, 0x03], 2).is_err());
    }

    #[test]
    fn normalize_ecdsa_signature_pads_undersized_components() {
        // 31-byte r, 31-byte s -> should become 32 bytes each for P-256.
        let raw: Vec<u8> = (0..62).map(|i| (i + 1) as u8).collect();
        let normalized = normalize_signature(DnsSecAlgorithm::EcdsaP256Sha256, &raw).unwrap();
        assert_eq!(normalized.len(), 64);
    }
}
