//! ECDSA engine (C4): RFC 6979 deterministic nonce generation, signing,
//! verification, and public-key recovery.

use alloc::string::{String, ToString};

use hmac::{Hmac, Mac};
use log::{debug, trace, warn};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::point::{Point, G};
use crate::pubkey::PublicKey;
use crate::scalar::{Scalar, HALF_N, N};
use crate::signature::{RecoveryId, Signature};
use crate::uint256::Uint256;

type HmacSha256 = Hmac<Sha256>;

/// Which byte order the 32-byte digest is read in when turned into the integer `e`.
/// Bitcoin transaction sighashes are consumed little-endian; most other ECDSA
/// consumers (including this crate's own DER/SEC1 world) use big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

fn digest_to_scalar(h: &[u8; 32], endianness: Endianness) -> Scalar {
    match endianness {
        Endianness::Big => Scalar::from_be_bytes(h),
        Endianness::Little => Scalar::from_le_bytes(h),
    }
}

fn hmac256(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// RFC 6979 deterministic nonce generation (SHA-256 HMAC), with the `badrs` retry
/// extension: after signing once and finding `(r, s)` unusable, the caller re-enters
/// with an incremented `badrs` to skip that many additional candidate `k` values
/// without recomputing anything upstream of `k`.
///
/// Step 3 applies `V <- HMAC(K, V)` twice in a row rather than once, diverging from
/// the canonical RFC 6979 pseudocode. This mirrors this crate's reference
/// implementation's behavior exactly (see `DESIGN.md`) and must not be "fixed" without
/// a test vector proving it is safe to do so: every deterministic signature this crate
/// has ever produced depends on it.
pub fn deterministic_k(h: &[u8; 32], d: &[u8; 32], badrs: u32) -> Scalar {
    let mut v = [0x01u8; 32];
    let mut k = [0x00u8; 32];

    k = hmac256(&k, &[&v, &[0x00], d, h]);
    v = hmac256(&k, &[&v]);

    k = hmac256(&k, &[&v, &[0x01], d, h]);
    v = hmac256(&k, &[&v]);
    v = hmac256(&k, &[&v]);

    let mut remaining = badrs;
    loop {
        let t = Uint256::from_be_bytes(&v);
        let t_in_range = t.cmp(&N) == core::cmp::Ordering::Less && !t.is_zero();
        if t_in_range && remaining == 0 {
            let scalar = Scalar::from_be_bytes(&v);
            v.zeroize();
            k.zeroize();
            return scalar;
        }
        if remaining > 0 {
            remaining -= 1;
        }
        trace!("deterministic_k retrying, {} skips remaining", remaining);
        k = hmac256(&k, &[&v, &[0x00]]);
        v = hmac256(&k, &[&v]);
        v = hmac256(&k, &[&v]);
    }
}

/// Produces a deterministic, low-s-normalized ECDSA signature over `digest`.
///
/// `digest` must be exactly 32 bytes (checked by the caller's type, `&[u8; 32]`, so the
/// only failure mode left is an out-of-range private key).
pub fn sign(
    digest: &[u8; 32],
    privkey: &Scalar,
    compressed: bool,
    endianness: Endianness,
) -> Result<Signature> {
    if !privkey.in_range() {
        return Err(Error::MissingPrivateKey);
    }
    let e = digest_to_scalar(digest, endianness);
    let d_bytes = privkey.to_be_bytes();

    let mut badrs: u32 = 0;
    loop {
        let k = deterministic_k(digest, &d_bytes, badrs);
        badrs += 1;

        let q = G.mul_scalar(&k);
        let r = match q {
            Point::Infinity => {
                trace!("sign: k*G was infinity, retrying with badrs={}", badrs);
                continue;
            }
            Point::Affine { x, .. } => scalar_from_field(x),
        };
        if r.is_zero() {
            trace!("sign: r was zero, retrying with badrs={}", badrs);
            continue;
        }
        let k_inv = k.invert();
        let s = k_inv.mul(&e.add(&privkey.mul(&r)));
        if s.is_zero() {
            trace!("sign: s was zero, retrying with badrs={}", badrs);
            continue;
        }

        let half_n = Scalar::from_be_bytes(&HALF_N.to_be_bytes());
        let s = if s.cmp(&half_n) != core::cmp::Ordering::Greater {
            s
        } else {
            s.negate()
        };
        debug!("sign: produced signature after {} badrs increment(s)", badrs - 1);
        return Signature::new(r, s, compressed);
    }
}

/// Reinterprets a field element (mod P) as a scalar (mod N), per `r = Q.x mod N`.
fn scalar_from_field(x: FieldElement) -> Scalar {
    Scalar::from_be_bytes(&x.to_be_bytes())
}

/// Verifies `signature` over `digest` against `pubkey`. Returns `Ok(())` when valid,
/// `Err(diagnostic)` otherwise — the diagnostic-channel convention used throughout the
/// transaction verifier (§7): verification never panics or returns `Result<_, Error>`,
/// only a human-readable reason the signature is invalid.
pub fn verify(
    digest: &[u8; 32],
    signature: &Signature,
    pubkey: &PublicKey,
    endianness: Endianness,
) -> core::result::Result<(), String> {
    if !signature.r.in_range() || !signature.s.in_range() {
        return Err("signature r or s out of range".to_string());
    }
    if pubkey.validate().is_err() {
        warn!("verify: public key failed validation");
        return Err("public key is invalid".to_string());
    }

    let e = digest_to_scalar(digest, endianness);
    let s_inv = signature.s.invert();
    let u1 = e.mul(&s_inv);
    let u2 = signature.r.mul(&s_inv);

    let p = Point::shamir_sum(&u1, &G, &u2, &pubkey.point());
    let x = match p {
        Point::Infinity => return Err("u1*G + u2*Q was the point at infinity".to_string()),
        Point::Affine { x, .. } => x,
    };
    if scalar_from_field(x).eq(&signature.r) {
        Ok(())
    } else {
        Err("signature r did not match recomputed x coordinate".to_string())
    }
}

/// Convenience boolean wrapper over [`verify`].
pub fn verify_bool(
    digest: &[u8; 32],
    signature: &Signature,
    pubkey: &PublicKey,
    endianness: Endianness,
) -> bool {
    verify(digest, signature, pubkey, endianness).is_ok()
}

/// Recovers the public key that produced `signature` over `digest`, given the
/// recovery id. `compressed` on the returned key follows `signature.compressed`.
pub fn recover_pubkey(
    signature: &Signature,
    recovery: RecoveryId,
    digest: &[u8; 32],
    endianness: Endianness,
) -> Result<PublicKey> {
    if !signature.r.in_range() || !signature.s.in_range() {
        return Err(Error::ScalarOutOfRange);
    }

    let r_uint = Uint256::from_be_bytes(&signature.r.to_be_bytes());
    let x_uint = if recovery.second_key {
        let (sum, carry) = r_uint.carrying_add(&N);
        if carry || sum.cmp(&crate::field::P) != core::cmp::Ordering::Less {
            return Err(Error::PointInvalid);
        }
        sum
    } else {
        r_uint
    };
    let x = FieldElement::from_be_bytes(&x_uint.to_be_bytes());
    let r_point = Point::lift_x(x, recovery.y_odd).ok_or(Error::PointInvalid)?;

    if !r_point.mul_by_uint256(&N).is_infinity() {
        return Err(Error::PointInvalid);
    }

    let e = digest_to_scalar(digest, endianness);
    let s_r = r_point.mul_scalar(&signature.s);
    let e_g = G.mul_scalar(&e);
    let inner = s_r.add(&e_g.negate());
    let r_inv = signature.r.invert();
    let q = inner.mul_scalar(&r_inv);

    PublicKey::from_point(q, signature.compressed)
}

/// Finds which of the four recovery candidates reproduces `expected`, and returns a
/// copy of `signature` with `recovery`/`compressed` populated accordingly.
pub fn calc_recovery(
    signature: &Signature,
    expected: &PublicKey,
    digest: &[u8; 32],
    endianness: Endianness,
) -> Result<Signature> {
    for candidate in 0u8..4 {
        let recovery = RecoveryId::from_u8(candidate).expect("0..4 is always valid");
        let mut trial = *signature;
        trial.compressed = expected.compressed();
        if let Ok(recovered) = recover_pubkey(&trial, recovery, digest, endianness) {
            if recovered.point().eq(&expected.point()) {
                trial.recovery = Some(recovery);
                return Ok(trial);
            }
        }
    }
    Err(Error::RecoveryExhausted)
}
