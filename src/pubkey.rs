//! SEC1 public-key codec (C3): compressed/uncompressed/hybrid encode-decode, the
//! canonical-encoding predicate, and the fast internal (worker-boundary) buffer form.

use alloc::vec::Vec;

use log::{trace, warn};

use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::point::{Point, G};
use crate::scalar::Scalar;

/// A secp256k1 public key: a validated curve point plus the serialization flag that
/// does not change its semantics, only how `to_der` renders it.
#[derive(Clone, Copy, Debug)]
pub struct PublicKey {
    point: Point,
    compressed: bool,
}

const UNCOMPRESSED_TAG: u8 = 0x04;
const COMPRESSED_EVEN_TAG: u8 = 0x02;
const COMPRESSED_ODD_TAG: u8 = 0x03;
const HYBRID_EVEN_TAG: u8 = 0x06;
const HYBRID_ODD_TAG: u8 = 0x07;

impl PublicKey {
    /// `point = privkey * G`.
    pub fn from_privkey(privkey: &Scalar, compressed: bool) -> Result<PublicKey> {
        if !privkey.in_range() {
            return Err(Error::ScalarOutOfRange);
        }
        let point = G.mul_scalar(privkey);
        PublicKey::from_point(point, compressed)
    }

    /// Wraps an already-computed point, validating it first.
    pub fn from_point(point: Point, compressed: bool) -> Result<PublicKey> {
        let key = PublicKey { point, compressed };
        key.validate()?;
        Ok(key)
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// Fails if the point is at infinity, equals `(0, 0)`, or is off-curve.
    pub fn validate(&self) -> Result<()> {
        match self.point {
            Point::Infinity => {
                warn!("public key validation failed: point at infinity");
                Err(Error::PointInvalid)
            }
            Point::Affine { x, y } => {
                if x.is_zero() && y.is_zero() {
                    warn!("public key validation failed: point is (0, 0)");
                    return Err(Error::PointInvalid);
                }
                if !self.point.is_on_curve() {
                    warn!("public key validation failed: point off curve");
                    return Err(Error::PointInvalid);
                }
                Ok(())
            }
        }
    }

    /// Decodes a SEC1 byte string. Hybrid prefixes (`0x06`/`0x07`) are accepted only
    /// when `strict` is `false`.
    pub fn from_der(bytes: &[u8], strict: bool) -> Result<PublicKey> {
        let Some(&prefix) = bytes.first() else {
            return Err(Error::CodecInvalidLength);
        };
        let point = match prefix {
            UNCOMPRESSED_TAG => {
                if bytes.len() != 65 {
                    return Err(Error::CodecInvalidLength);
                }
                let x = FieldElement::from_be_bytes(&bytes[1..33].try_into().unwrap());
                let y = FieldElement::from_be_bytes(&bytes[33..65].try_into().unwrap());
                Point::Affine { x, y }
            }
            COMPRESSED_EVEN_TAG | COMPRESSED_ODD_TAG => {
                if bytes.len() != 33 {
                    return Err(Error::CodecInvalidLength);
                }
                let x = FieldElement::from_be_bytes(&bytes[1..33].try_into().unwrap());
                let y_odd = prefix - COMPRESSED_EVEN_TAG == 1;
                Point::lift_x(x, y_odd).ok_or(Error::PointInvalid)?
            }
            HYBRID_EVEN_TAG | HYBRID_ODD_TAG => {
                if strict {
                    trace!("rejecting hybrid public key encoding under strict decoding");
                    return Err(Error::CodecHybridRejected);
                }
                if bytes.len() != 65 {
                    return Err(Error::CodecInvalidLength);
                }
                // Hybrid: the embedded y is used as-is, not re-derived from parity.
                let x = FieldElement::from_be_bytes(&bytes[1..33].try_into().unwrap());
                let y = FieldElement::from_be_bytes(&bytes[33..65].try_into().unwrap());
                Point::Affine { x, y }
            }
            _ => return Err(Error::CodecInvalidPrefix),
        };
        let compressed = matches!(prefix, COMPRESSED_EVEN_TAG | COMPRESSED_ODD_TAG);
        PublicKey::from_point(point, compressed)
    }

    /// Encodes as SEC1, compressed or uncompressed per `compressed` (defaults to this
    /// key's own flag when `None`).
    pub fn to_der(&self, compressed: Option<bool>) -> Vec<u8> {
        let compressed = compressed.unwrap_or(self.compressed);
        match self.point {
            Point::Infinity => Vec::new(),
            Point::Affine { x, y } => {
                if compressed {
                    let mut out = Vec::with_capacity(33);
                    out.push(if y.is_odd() {
                        COMPRESSED_ODD_TAG
                    } else {
                        COMPRESSED_EVEN_TAG
                    });
                    out.extend_from_slice(&x.to_be_bytes());
                    out
                } else {
                    let mut out = Vec::with_capacity(65);
                    out.push(UNCOMPRESSED_TAG);
                    out.extend_from_slice(&x.to_be_bytes());
                    out.extend_from_slice(&y.to_be_bytes());
                    out
                }
            }
        }
    }

    /// Internal worker-boundary form: a prefix byte (0 or 1, the compressed flag)
    /// followed by the uncompressed 65-byte SEC1 encoding. An empty buffer is "unset".
    pub fn to_fast_buffer(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(66);
        out.push(self.compressed as u8);
        out.extend_from_slice(&self.to_der(Some(false)));
        out
    }

    pub fn from_fast_buffer(bytes: &[u8]) -> Result<Option<PublicKey>> {
        if bytes.is_empty() {
            return Ok(None);
        }
        if bytes.len() != 66 {
            return Err(Error::CodecInvalidFastBuffer);
        }
        let compressed = match bytes[0] {
            0 => false,
            1 => true,
            _ => return Err(Error::CodecInvalidFastBuffer),
        };
        let point_bytes = &bytes[1..];
        let key = PublicKey::from_der(point_bytes, true)?;
        Ok(Some(PublicKey {
            point: key.point,
            compressed,
        }))
    }

    /// `true` iff `bytes` is one of the two non-hybrid canonical SEC1 forms: a 65-byte
    /// `0x04` encoding or a 33-byte `0x02`/`0x03` encoding. Hybrid prefixes always fail.
    pub fn is_canonical_encoding(bytes: &[u8]) -> bool {
        match bytes.first() {
            Some(&UNCOMPRESSED_TAG) => bytes.len() == 65,
            Some(&COMPRESSED_EVEN_TAG) | Some(&COMPRESSED_ODD_TAG) => bytes.len() == 33,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn privkey_of(byte: u8) -> Scalar {
        let mut b = [0u8; 32];
        b[31] = byte;
        Scalar::from_be_bytes(&b)
    }

    #[test]
    fn der_round_trips_compressed_and_uncompressed() {
        let key = PublicKey::from_privkey(&privkey_of(7), true).unwrap();
        let der = key.to_der(None);
        assert_eq!(der.len(), 33);
        let parsed = PublicKey::from_der(&der, true).unwrap();
        assert!(parsed.point.eq(&key.point));
        assert!(parsed.compressed);

        let uncompressed = key.to_der(Some(false));
        assert_eq!(uncompressed.len(), 65);
        let parsed_u = PublicKey::from_der(&uncompressed, true).unwrap();
        assert!(!parsed_u.compressed);
    }

    #[test]
    fn fast_buffer_round_trips() {
        let key = PublicKey::from_privkey(&privkey_of(11), true).unwrap();
        let buf = key.to_fast_buffer();
        let parsed = PublicKey::from_fast_buffer(&buf).unwrap().unwrap();
        assert!(parsed.point.eq(&key.point));
        assert_eq!(parsed.compressed, key.compressed);
    }

    #[test]
    fn empty_fast_buffer_is_unset() {
        assert!(PublicKey::from_fast_buffer(&[]).unwrap().is_none());
    }

    #[test]
    fn hybrid_rejected_when_strict() {
        let key = PublicKey::from_privkey(&privkey_of(3), false).unwrap();
        let mut uncompressed = key.to_der(Some(false));
        uncompressed[0] = HYBRID_EVEN_TAG | (uncompressed[0] & 1);
        assert!(PublicKey::from_der(&uncompressed, true).is_err());
        assert!(PublicKey::from_der(&uncompressed, false).is_ok());
    }

    #[test]
    fn canonical_encoding_predicate() {
        let mut compressed_buf = [0u8; 33];
        compressed_buf[0] = COMPRESSED_EVEN_TAG;
        assert!(PublicKey::is_canonical_encoding(&compressed_buf));

        let mut hybrid_buf = [0u8; 33];
        hybrid_buf[0] = HYBRID_EVEN_TAG;
        assert!(!PublicKey::is_canonical_encoding(&hybrid_buf));

        assert!(!PublicKey::is_canonical_encoding(&[0u8; 32]));
    }
}
