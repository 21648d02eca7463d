//! Bitcoin Signed Message (BSM) wire convention: the single recovery/compressed byte
//! that prepends a signature's `(r, s)` before base64 encoding.
//!
//! This module only handles the byte <-> `RecoveryId`/`compressed` packing and the
//! base64 framing; producing the signed-message digest itself (the `"\x18Bitcoin
//! Signed Message:\n" + varint-len + message`, double-SHA256'd) is a transaction/
//! message-hashing concern that belongs to the (out-of-scope) `Tx`/message
//! collaborator, not this codec.

use alloc::string::String;
use alloc::vec::Vec;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{Error, Result};
use crate::scalar::Scalar;
use crate::signature::{RecoveryId, Signature};

const BSM_HEADER_BASE: u8 = 27;
const BSM_COMPRESSED_BIT: u8 = 4;

/// Packs a recovery id and compressed flag into the single header byte that precedes
/// `r || s` in a Bitcoin-signed-message signature: `27 + recovery + (4 if compressed)`.
pub fn pack_header_byte(recovery: RecoveryId, compressed: bool) -> u8 {
    BSM_HEADER_BASE + recovery.to_u8() + if compressed { BSM_COMPRESSED_BIT } else { 0 }
}

/// Inverse of [`pack_header_byte`].
pub fn unpack_header_byte(byte: u8) -> Result<(RecoveryId, bool)> {
    if !(27..=34).contains(&byte) {
        return Err(Error::ScalarOutOfRange);
    }
    let mut offset = byte - BSM_HEADER_BASE;
    let compressed = offset >= BSM_COMPRESSED_BIT;
    if compressed {
        offset -= BSM_COMPRESSED_BIT;
    }
    let recovery = RecoveryId::from_u8(offset).ok_or(Error::ScalarOutOfRange)?;
    Ok((recovery, compressed))
}

/// Encodes `signature` (which must already carry a recovery id) as the base64 form
/// used in Bitcoin signed messages: `base64(header_byte || r(32) || s(32))`.
pub fn to_base64(signature: &Signature) -> Result<String> {
    let recovery = signature.recovery.ok_or(Error::RecoveryExhausted)?;
    let mut body = Vec::with_capacity(65);
    body.push(pack_header_byte(recovery, signature.compressed));
    body.extend_from_slice(&signature.r.to_be_bytes());
    body.extend_from_slice(&signature.s.to_be_bytes());
    Ok(BASE64.encode(body))
}

/// Decodes the base64 form produced by [`to_base64`].
pub fn from_base64(encoded: &str) -> Result<Signature> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|_| Error::ScalarOutOfRange)?;
    if bytes.len() != 65 {
        return Err(Error::ScalarOutOfRange);
    }
    let (recovery, compressed) = unpack_header_byte(bytes[0])?;
    let r = Scalar::from_be_bytes(&bytes[1..33].try_into().unwrap());
    let s = Scalar::from_be_bytes(&bytes[33..65].try_into().unwrap());
    let mut sig = Signature::new(r, s, compressed)?;
    sig.recovery = Some(recovery);
    Ok(sig)
}
