//! ECDSA signatures: the `(r, s)` pair, the DER wire form, and the Bitcoin-specific
//! compressed-flag/recovery-byte bookkeeping that rides alongside it internally.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::scalar::{Scalar, HALF_N};

/// Which of the four recovery candidates (§4.2, `sig2pubkey`) produced this signature,
/// kept as three explicit orthogonal bits rather than folded into a wire byte until the
/// BSM boundary needs one (design notes, §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryId {
    pub y_odd: bool,
    pub second_key: bool,
}

impl RecoveryId {
    pub fn from_u8(v: u8) -> Option<RecoveryId> {
        if v > 3 {
            return None;
        }
        Some(RecoveryId {
            y_odd: v & 1 == 1,
            second_key: (v >> 1) & 1 == 1,
        })
    }

    pub fn to_u8(self) -> u8 {
        (self.y_odd as u8) | ((self.second_key as u8) << 1)
    }
}

/// An ECDSA signature over secp256k1, plus the Bitcoin-specific bookkeeping (compressed
/// flag, optional recovery id) that travels with it but is not part of the DER wire form.
#[derive(Clone, Copy, Debug)]
pub struct Signature {
    pub r: Scalar,
    pub s: Scalar,
    pub compressed: bool,
    pub recovery: Option<RecoveryId>,
}

impl Signature {
    pub fn new(r: Scalar, s: Scalar, compressed: bool) -> Result<Signature> {
        if !r.in_range() || !s.in_range() {
            return Err(Error::ScalarOutOfRange);
        }
        Ok(Signature {
            r,
            s,
            compressed,
            recovery: None,
        })
    }

    /// `true` iff `s <= floor(N/2)`, the canonical low-s form enforced by `sign`.
    pub fn is_low_s(&self) -> bool {
        self.s.cmp(&Scalar::from_be_bytes(&HALF_N.to_be_bytes())) != core::cmp::Ordering::Greater
    }

    /// DER (BER-minimal) encoding of `(r, s)` as an ASN.1 `SEQUENCE` of two `INTEGER`s.
    /// The compressed flag and recovery id are not part of this wire form.
    pub fn to_der(&self) -> Vec<u8> {
        let r = encode_der_integer(&self.r.to_be_bytes());
        let s = encode_der_integer(&self.s.to_be_bytes());
        let mut body = Vec::with_capacity(r.len() + s.len());
        body.extend_from_slice(&r);
        body.extend_from_slice(&s);

        let mut out = Vec::with_capacity(body.len() + 2);
        out.push(0x30);
        push_der_length(&mut out, body.len());
        out.extend_from_slice(&body);
        out
    }

    /// Parses a DER-encoded `SEQUENCE` of two `INTEGER`s into `(r, s)`. `compressed` is
    /// supplied by the caller since it is not carried on the wire.
    pub fn from_der(bytes: &[u8], compressed: bool) -> Result<Signature> {
        let mut cursor = DerCursor::new(bytes);
        cursor.expect_tag(0x30)?;
        let seq_len = cursor.read_length()?;
        let seq_end = cursor.pos + seq_len;
        if seq_end > bytes.len() {
            return Err(Error::ScalarOutOfRange);
        }
        let r_bytes = cursor.read_integer()?;
        let s_bytes = cursor.read_integer()?;
        let r = Scalar::from_be_bytes(&pad_or_truncate(&r_bytes));
        let s = Scalar::from_be_bytes(&pad_or_truncate(&s_bytes));
        Signature::new(r, s, compressed)
    }
}

fn pad_or_truncate(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    if bytes.len() >= 32 {
        out.copy_from_slice(&bytes[bytes.len() - 32..]);
    } else {
        out[32 - bytes.len()..].copy_from_slice(bytes);
    }
    out
}

/// Encodes a 32-byte big-endian unsigned integer as a minimal DER `INTEGER`: strips
/// leading zero bytes but keeps one if the high bit would otherwise flip the sign.
fn encode_der_integer(value: &[u8; 32]) -> Vec<u8> {
    let mut start = 0;
    while start < 31 && value[start] == 0 {
        start += 1;
    }
    let mut body = Vec::new();
    if value[start] & 0x80 != 0 {
        body.push(0);
    }
    body.extend_from_slice(&value[start..]);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(0x02);
    push_der_length(&mut out, body.len());
    out.extend_from_slice(&body);
    out
}

fn push_der_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let len_bytes = len.to_be_bytes();
        let first_nonzero = len_bytes.iter().position(|&b| b != 0).unwrap_or(7);
        let significant = &len_bytes[first_nonzero..];
        out.push(0x80 | significant.len() as u8);
        out.extend_from_slice(significant);
    }
}

struct DerCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DerCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        DerCursor { bytes, pos: 0 }
    }

    fn expect_tag(&mut self, tag: u8) -> Result<()> {
        if self.bytes.get(self.pos) != Some(&tag) {
            return Err(Error::ScalarOutOfRange);
        }
        self.pos += 1;
        Ok(())
    }

    fn read_length(&mut self) -> Result<usize> {
        let first = *self.bytes.get(self.pos).ok_or(Error::ScalarOutOfRange)?;
        self.pos += 1;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let n = (first & 0x7f) as usize;
        if n == 0 || n > 8 {
            return Err(Error::ScalarOutOfRange);
        }
        let slice = self
            .bytes
            .get(self.pos..self.pos + n)
            .ok_or(Error::ScalarOutOfRange)?;
        self.pos += n;
        let mut len: usize = 0;
        for &b in slice {
            len = (len << 8) | b as usize;
        }
        Ok(len)
    }

    fn read_integer(&mut self) -> Result<Vec<u8>> {
        self.expect_tag(0x02)?;
        let len = self.read_length()?;
        let slice = self
            .bytes
            .get(self.pos..self.pos + len)
            .ok_or(Error::ScalarOutOfRange)?;
        self.pos += len;
        Ok(slice.to_vec())
    }
}
