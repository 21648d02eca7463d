//! Fixed-width 256-bit unsigned integer with carrying arithmetic.
//!
//! This is the shared carrier for [`crate::scalar::Scalar`] (values mod the curve
//! order N) and [`crate::field::FieldElement`] (values mod the curve prime P). It
//! knows nothing about either modulus; reduction lives one layer up.

use core::cmp::Ordering;
use core::ops::{Add, Sub};

/// A 256-bit unsigned integer stored as four 64-bit limbs, least-significant first.
#[derive(Clone, Copy, Debug, Default, Eq, Zeroize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Uint256(pub [u64; 4]);

// `PartialEq` outside of tests is implemented manually via constant-time comparison
// in `Scalar`/`FieldElement`; `Uint256` itself only needs it for test assertions.
#[cfg(not(test))]
impl PartialEq for Uint256 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

use zeroize::Zeroize;

/// A 512-bit unsigned integer, the full-width result of multiplying two [`Uint256`]s.
#[derive(Clone, Copy, Debug)]
pub struct Uint512(pub [u64; 8]);

impl Uint256 {
    pub const ZERO: Uint256 = Uint256([0, 0, 0, 0]);
    pub const ONE: Uint256 = Uint256([1, 0, 0, 0]);

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&limb| limb == 0)
    }

    /// Returns the bit at position `i` (0 = least significant), for `i` in 0..256.
    pub fn bit(&self, i: usize) -> bool {
        let limb = i / 64;
        let offset = i % 64;
        (self.0[limb] >> offset) & 1 == 1
    }

    pub fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Carrying addition; returns the wrapped sum and whether a carry fell off the top.
    pub fn carrying_add(&self, other: &Self) -> (Uint256, bool) {
        let mut result = [0u64; 4];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let sum = self.0[i] as u128 + other.0[i] as u128 + carry;
            result[i] = sum as u64;
            carry = sum >> 64;
        }
        (Uint256(result), carry != 0)
    }

    /// Carrying subtraction; returns the wrapped (mod 2^256) difference and whether
    /// the subtraction borrowed (i.e. `self < other`).
    pub fn borrowing_sub(&self, other: &Self) -> (Uint256, bool) {
        let mut result = [0u64; 4];
        let mut borrow: i128 = 0;
        for i in 0..4 {
            let diff = self.0[i] as i128 - other.0[i] as i128 - borrow;
            if diff < 0 {
                result[i] = (diff + (1i128 << 64)) as u64;
                borrow = 1;
            } else {
                result[i] = diff as u64;
                borrow = 0;
            }
        }
        (Uint256(result), borrow != 0)
    }

    /// Shifts left by one bit within the 256-bit register, returning the overflowed top bit.
    pub fn shl1(&self) -> (Uint256, bool) {
        let mut result = [0u64; 4];
        let mut carry_in = 0u64;
        for i in 0..4 {
            let carry_out = self.0[i] >> 63;
            result[i] = (self.0[i] << 1) | carry_in;
            carry_in = carry_out;
        }
        (Uint256(result), carry_in != 0)
    }

    /// Shifts right by one bit, discarding the bottom bit.
    pub fn shr1(&self) -> Uint256 {
        let mut result = [0u64; 4];
        let mut carry_in = 0u64;
        for i in (0..4).rev() {
            let carry_out = self.0[i] & 1;
            result[i] = (self.0[i] >> 1) | (carry_in << 63);
            carry_in = carry_out;
        }
        Uint256(result)
    }

    fn set_bit0(&mut self, bit: bool) {
        if bit {
            self.0[0] |= 1;
        } else {
            self.0[0] &= !1u64;
        }
    }

    /// Schoolbook widening multiplication, `self * other` as a 512-bit result.
    pub fn widening_mul(&self, other: &Self) -> Uint512 {
        let mut result = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let idx = i + j;
                let prod =
                    (self.0[i] as u128) * (other.0[j] as u128) + result[idx] as u128 + carry;
                result[idx] = prod as u64;
                carry = prod >> 64;
            }
            let mut k = i + 4;
            while carry > 0 {
                let sum = result[k] as u128 + carry;
                result[k] = sum as u64;
                carry = sum >> 64;
                k += 1;
            }
        }
        Uint512(result)
    }

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Uint256 {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let start = (3 - i) * 8;
            limbs[i] = u64::from_be_bytes(bytes[start..start + 8].try_into().unwrap());
        }
        Uint256(limbs)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            let start = (3 - i) * 8;
            out[start..start + 8].copy_from_slice(&self.0[i].to_be_bytes());
        }
        out
    }

    pub fn from_le_bytes(bytes: &[u8; 32]) -> Uint256 {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let start = i * 8;
            limbs[i] = u64::from_le_bytes(bytes[start..start + 8].try_into().unwrap());
        }
        Uint256(limbs)
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            let start = i * 8;
            out[start..start + 8].copy_from_slice(&self.0[i].to_le_bytes());
        }
        out
    }

    /// Reduces an arbitrary [`Uint256`] modulo `modulus` (which must be nonzero).
    pub fn reduce(&self, modulus: &Uint256) -> Uint256 {
        let wide = Uint512([self.0[0], self.0[1], self.0[2], self.0[3], 0, 0, 0, 0]);
        wide.reduce(modulus)
    }
}

impl Add for Uint256 {
    type Output = Uint256;
    fn add(self, rhs: Uint256) -> Uint256 {
        self.carrying_add(&rhs).0
    }
}

impl Sub for Uint256 {
    type Output = Uint256;
    fn sub(self, rhs: Uint256) -> Uint256 {
        self.borrowing_sub(&rhs).0
    }
}

impl Uint512 {
    pub fn bit(&self, i: usize) -> bool {
        let limb = i / 64;
        let offset = i % 64;
        (self.0[limb] >> offset) & 1 == 1
    }

    /// Binary long division, keeping only the remainder mod `modulus`.
    ///
    /// `modulus` must be nonzero and, as used throughout this crate, close enough to
    /// 2^256 that the remainder never needs more than one conditional subtraction per
    /// bit (true for both the secp256k1 field prime and curve order).
    pub fn reduce(&self, modulus: &Uint256) -> Uint256 {
        let mut rem = Uint256::ZERO;
        for i in (0..512).rev() {
            let bit = self.bit(i);
            let (mut shifted, carry) = rem.shl1();
            shifted.set_bit0(bit);
            rem = if carry {
                // Virtual value is 2^256 + shifted; since `rem` was < modulus before
                // the shift, 2^256 + shifted - modulus always fits in 256 bits and the
                // wrapping subtraction below computes exactly that.
                shifted.borrowing_sub(modulus).0
            } else if shifted.cmp(modulus) != Ordering::Less {
                shifted.borrowing_sub(modulus).0
            } else {
                shifted
            };
        }
        rem
    }
}
