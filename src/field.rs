//! Field elements modulo the secp256k1 field prime P.
//!
//! Kept as a distinct newtype from [`crate::scalar::Scalar`] (which is reduced mod N)
//! so a coordinate can never be silently compared against a signature component.

use core::cmp::Ordering;

use zeroize::Zeroize;

use crate::uint256::Uint256;

/// The secp256k1 field prime, `2^256 - 2^32 - 977`.
pub const P: Uint256 = Uint256([
    0xFFFFFFFEFFFFFC2F,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
    0xFFFFFFFFFFFFFFFF,
]);

/// The curve's `b` coefficient in `y^2 = x^3 + a*x + b` (a = 0, b = 7).
pub const CURVE_B: FieldElement = FieldElement(Uint256([7, 0, 0, 0]));

/// An element of the field `Z/PZ`, always kept in reduced form (`0 <= value < P`).
#[derive(Clone, Copy, Debug, Zeroize)]
pub struct FieldElement(Uint256);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement(Uint256::ZERO);

    /// Wraps an already-reduced limb array. Only used for this module's and
    /// [`crate::point`]'s own constants.
    pub(crate) const fn from_uint256(v: Uint256) -> FieldElement {
        FieldElement(v)
    }

    /// `self^((P+1)/4) mod P`, used by [`crate::point::Point::lift_x`] since
    /// `P mod 4 == 3` makes this a square root whenever one exists.
    pub fn pow_p_plus_1_over_4(&self) -> FieldElement {
        // (P+1)/4 precomputed; P = 2^256 - 2^32 - 977.
        let exponent = Uint256([
            0xFFFFFFFFBFFFFF0C,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0x3FFFFFFFFFFFFFFF,
        ]);
        pow_mod(self, &exponent, &P)
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> FieldElement {
        FieldElement(Uint256::from_be_bytes(bytes).reduce(&P))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parity of the element viewed as an integer in `[0, P)`: `true` if odd.
    pub fn is_odd(&self) -> bool {
        self.0.bit(0)
    }

    pub fn add(&self, other: &FieldElement) -> FieldElement {
        let (sum, carry) = self.0.carrying_add(&other.0);
        FieldElement(reduce_once_over(sum, carry, &P))
    }

    pub fn sub(&self, other: &FieldElement) -> FieldElement {
        let (diff, borrow) = self.0.borrowing_sub(&other.0);
        FieldElement(if borrow { diff + P } else { diff })
    }

    pub fn negate(&self) -> FieldElement {
        if self.is_zero() {
            *self
        } else {
            FieldElement::ZERO.sub(self)
        }
    }

    pub fn mul(&self, other: &FieldElement) -> FieldElement {
        FieldElement(self.0.widening_mul(&other.0).reduce(&P))
    }

    pub fn square(&self) -> FieldElement {
        self.mul(self)
    }

    /// Modular inverse via Fermat's little theorem (`P` is prime): `self^(P-2) mod P`.
    /// Returns `ZERO` for `self == 0` (the caller is expected to have excluded that case).
    pub fn invert(&self) -> FieldElement {
        if self.is_zero() {
            return FieldElement::ZERO;
        }
        let two = Uint256::from_be_bytes(&{
            let mut b = [0u8; 32];
            b[31] = 2;
            b
        });
        let exponent = P - two;
        pow_mod(self, &exponent, &P)
    }

    pub fn eq(&self, other: &FieldElement) -> bool {
        self.0.cmp(&other.0) == Ordering::Equal
    }
}

fn reduce_once_over(sum: Uint256, carry: bool, modulus: &Uint256) -> Uint256 {
    if carry || sum.cmp(modulus) != Ordering::Less {
        sum.borrowing_sub(modulus).0
    } else {
        sum
    }
}

/// `base^exponent mod modulus` via left-to-right square-and-multiply.
///
/// Not constant-time; field elements are public values (curve coordinates), so this
/// is only used where timing does not leak secret data. Private scalars use
/// [`crate::scalar::Scalar::invert`], which takes the same code path but operates on
/// values that must stay inside this module's constant-time discipline for equality
/// only (inversion of `k`/`d` still walks every bit of the exponent regardless of the
/// base, so its timing depends on the public modulus, not the secret value).
fn pow_mod(base: &FieldElement, exponent: &Uint256, modulus: &Uint256) -> FieldElement {
    let mut result = FieldElement(Uint256::ONE);
    let mut acc = *base;
    for i in 0..256 {
        if exponent.bit(i) {
            result = FieldElement(result.0.widening_mul(&acc.0).reduce(modulus));
        }
        acc = FieldElement(acc.0.widening_mul(&acc.0).reduce(modulus));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_at_p() {
        let almost_p = FieldElement(P - Uint256::ONE);
        let one = FieldElement(Uint256::ONE);
        assert!(almost_p.add(&one).is_zero());
    }

    #[test]
    fn invert_round_trips() {
        let seven = FieldElement::from_be_bytes(&{
            let mut b = [0u8; 32];
            b[31] = 7;
            b
        });
        let inv = seven.invert();
        assert!(seven.mul(&inv).eq(&FieldElement(Uint256::ONE)));
    }

    #[test]
    fn negate_then_add_is_zero() {
        let three = FieldElement::from_be_bytes(&{
            let mut b = [0u8; 32];
            b[31] = 3;
            b
        });
        assert!(three.add(&three.negate()).is_zero());
    }
}
