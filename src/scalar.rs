//! Scalars modulo the secp256k1 curve order N: private keys, nonces `k`, and
//! signature components `r`/`s`.
//!
//! Kept distinct from [`crate::field::FieldElement`] (reduced mod P) per the data
//! model in the spec: a value reduced mod N must never be silently compared against
//! one reduced mod P.

use core::cmp::Ordering;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::uint256::Uint256;

/// The secp256k1 curve order.
pub const N: Uint256 = Uint256([
    0xBFD25E8CD0364141,
    0xBAAEDCE6AF48A03B,
    0xFFFFFFFFFFFFFFFE,
    0xFFFFFFFFFFFFFFFF,
]);

/// `floor(N / 2)`, the low-s boundary: `s <= HALF_N` is the canonical, malleability-free
/// form enforced by [`crate::ecdsa::sign`].
pub const HALF_N: Uint256 = Uint256([
    0xDFE92F46681B20A0,
    0x5D576E7357A4501D,
    0xFFFFFFFFFFFFFFFF,
    0x7FFFFFFFFFFFFFFF,
]);

/// An integer modulo the curve order N, always kept reduced (`0 <= value < N`).
#[derive(Clone, Copy, Debug, Zeroize)]
pub struct Scalar(Uint256);

impl Scalar {
    pub const ZERO: Scalar = Scalar(Uint256::ZERO);
    pub const ONE: Scalar = Scalar(Uint256::ONE);

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Scalar {
        Scalar(Uint256::from_be_bytes(bytes).reduce(&N))
    }

    pub fn from_le_bytes(bytes: &[u8; 32]) -> Scalar {
        Scalar(Uint256::from_le_bytes(bytes).reduce(&N))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True iff the scalar lies in the open interval `(0, N)`, i.e. is nonzero (it is
    /// always already reduced below N by construction).
    pub fn in_range(&self) -> bool {
        !self.is_zero()
    }

    pub fn add(&self, other: &Scalar) -> Scalar {
        let (sum, carry) = self.0.carrying_add(&other.0);
        Scalar(if carry || sum.cmp(&N) != Ordering::Less {
            sum.borrowing_sub(&N).0
        } else {
            sum
        })
    }

    pub fn sub(&self, other: &Scalar) -> Scalar {
        let (diff, borrow) = self.0.borrowing_sub(&other.0);
        Scalar(if borrow { diff + N } else { diff })
    }

    pub fn negate(&self) -> Scalar {
        if self.is_zero() {
            *self
        } else {
            Scalar::ZERO.sub(self)
        }
    }

    pub fn mul(&self, other: &Scalar) -> Scalar {
        Scalar(self.0.widening_mul(&other.0).reduce(&N))
    }

    /// Modular inverse via Fermat's little theorem (`N` is prime): `self^(N-2) mod N`.
    ///
    /// Used on both the nonce `k` (secret) and `s` (public, once produced) during
    /// signing and verification; the square-and-multiply loop always walks all 256
    /// exponent bits regardless of `self`; `other`'s value.is not branched on.
    pub fn invert(&self) -> Scalar {
        if self.is_zero() {
            return Scalar::ZERO;
        }
        let two = Uint256::from_be_bytes(&{
            let mut b = [0u8; 32];
            b[31] = 2;
            b
        });
        let exponent = N - two;
        let mut result = Scalar::ONE;
        let mut acc = *self;
        for i in 0..256 {
            if exponent.bit(i) {
                result = result.mul(&acc);
            }
            acc = acc.mul(&acc);
        }
        result
    }

    /// Constant-time equality. Used wherever a scalar comparison could double as an
    /// authentication decision (not the public r/s range checks, which compare
    /// against the public bound N and do not need to hide timing).
    pub fn ct_eq(&self, other: &Scalar) -> bool {
        self.to_be_bytes().ct_eq(&other.to_be_bytes()).into()
    }

    pub fn eq(&self, other: &Scalar) -> bool {
        self.0.cmp(&other.0) == Ordering::Equal
    }

    pub fn cmp(&self, other: &Scalar) -> Ordering {
        self.0.cmp(&other.0)
    }
}
