//! Reference `Transaction`/`TxIn`/`TxOut` types and the `Transaction` trait the
//! verifier (C5) is written against.
//!
//! Per §1, block/transaction parsing and the transaction builder are out of scope for
//! this crate's real job; what's here is the minimal bytes-in/bytes-out reference
//! implementation SPEC_FULL.md calls for so C5 and its tests have something concrete
//! to drive. A full node embeds this crate and supplies its own richer transaction
//! type implementing the same [`Transaction`] trait.

use alloc::vec::Vec;

use sha2::{Digest, Sha256};

/// `SIGHASH_ALL` et al., the low 5 bits of a sighash type byte.
pub const SIGHASH_ALL: u32 = 0x01;
pub const SIGHASH_NONE: u32 = 0x02;
pub const SIGHASH_SINGLE: u32 = 0x03;
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// The network constants the verifier needs but does not own (§3, §6).
pub trait ConsensusParams {
    fn max_block_size(&self) -> usize;
    fn max_money(&self) -> i64;
}

/// Mainnet values, provided as a convenience default for tests and simple callers.
pub struct BitcoinMainnetParams;

impl ConsensusParams for BitcoinMainnetParams {
    fn max_block_size(&self) -> usize {
        1_000_000
    }

    fn max_money(&self) -> i64 {
        21_000_000 * 100_000_000
    }
}

/// The null outpoint that marks a coinbase input: an all-zero previous txid and the
/// output index `0xFFFFFFFF`.
fn is_null_outpoint(prev_txid: &[u8; 32], prev_index: u32) -> bool {
    prev_txid.iter().all(|&b| b == 0) && prev_index == 0xFFFFFFFF
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    /// Internal (wire) byte order, not the reversed display order used in txid hex.
    pub prev_txid: [u8; 32],
    pub prev_index: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    pub fn is_null(&self) -> bool {
        is_null_outpoint(&self.prev_txid, self.prev_index)
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.prev_txid);
        out.extend_from_slice(&self.prev_index.to_le_bytes());
        write_varint(out, self.script_sig.len() as u64);
        out.extend_from_slice(&self.script_sig);
        out.extend_from_slice(&self.sequence.to_le_bytes());
    }

    fn deserialize(bytes: &[u8], pos: &mut usize) -> Option<TxIn> {
        let prev_txid = read_fixed::<32>(bytes, pos)?;
        let prev_index = u32::from_le_bytes(read_fixed::<4>(bytes, pos)?);
        let script_len = read_varint(bytes, pos)? as usize;
        let script_sig = read_slice(bytes, pos, script_len)?.to_vec();
        let sequence = u32::from_le_bytes(read_fixed::<4>(bytes, pos)?);
        Some(TxIn {
            prev_txid,
            prev_index,
            script_sig,
            sequence,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    /// Value in satoshis. Signed so `checkStr`'s "negative value" check is meaningful
    /// for malformed or adversarial input, matching the network's own int64 encoding.
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value.to_le_bytes());
        write_varint(out, self.script_pubkey.len() as u64);
        out.extend_from_slice(&self.script_pubkey);
    }

    fn deserialize(bytes: &[u8], pos: &mut usize) -> Option<TxOut> {
        let value = i64::from_le_bytes(read_fixed::<8>(bytes, pos)?);
        let script_len = read_varint(bytes, pos)? as usize;
        let script_pubkey = read_slice(bytes, pos, script_len)?.to_vec();
        Some(TxOut {
            value,
            script_pubkey,
        })
    }
}

/// A minimal legacy (pre-SegWit) Bitcoin transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

/// The collaborator contract the verifier (C5) and script interpreter (C6) are
/// written against. A full node's own transaction type implements this directly
/// instead of going through [`Tx`].
pub trait Transaction {
    fn inputs(&self) -> &[TxIn];
    fn outputs(&self) -> &[TxOut];
    fn is_coinbase(&self) -> bool;
    fn serialized_len(&self) -> usize;

    /// `sighash(hashType, nin, subscript)`: the digest a signature at input `nin`
    /// is checked against, with `subscript` spliced into that input's scriptSig slot.
    ///
    /// Preserves the SIGHASH_SINGLE bug: when `hashType & 0x1f == SIGHASH_SINGLE` and
    /// `nin >= outputs().len()`, the result is the 32-byte value `0x00...01`
    /// (little-endian one), not a computed hash. Consensus-critical; do not "fix".
    fn sighash(&self, hash_type: u32, nin: usize, subscript: &[u8]) -> [u8; 32];
}

impl Tx {
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_null()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        write_varint(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            input.serialize(&mut out);
        }
        write_varint(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            output.serialize(&mut out);
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Option<Tx> {
        let mut pos = 0;
        let version = u32::from_le_bytes(read_fixed::<4>(bytes, &mut pos)?);
        let n_in = read_varint(bytes, &mut pos)? as usize;
        let mut inputs = Vec::with_capacity(n_in);
        for _ in 0..n_in {
            inputs.push(TxIn::deserialize(bytes, &mut pos)?);
        }
        let n_out = read_varint(bytes, &mut pos)? as usize;
        let mut outputs = Vec::with_capacity(n_out);
        for _ in 0..n_out {
            outputs.push(TxOut::deserialize(bytes, &mut pos)?);
        }
        let lock_time = u32::from_le_bytes(read_fixed::<4>(bytes, &mut pos)?);
        if pos != bytes.len() {
            return None;
        }
        Some(Tx {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Double-SHA256 of the serialized transaction, in reversed (display/txid) byte
    /// order.
    pub fn id(&self) -> [u8; 32] {
        let mut hash = double_sha256(&self.serialize());
        hash.reverse();
        hash
    }
}

impl Transaction for Tx {
    fn inputs(&self) -> &[TxIn] {
        &self.inputs
    }

    fn outputs(&self) -> &[TxOut] {
        &self.outputs
    }

    fn is_coinbase(&self) -> bool {
        Tx::is_coinbase(self)
    }

    fn serialized_len(&self) -> usize {
        self.serialize().len()
    }

    fn sighash(&self, hash_type: u32, nin: usize, subscript: &[u8]) -> [u8; 32] {
        let base_type = hash_type & 0x1f;
        if base_type == SIGHASH_SINGLE && nin >= self.outputs.len() {
            let mut bug_digest = [0u8; 32];
            bug_digest[0] = 1;
            return bug_digest;
        }

        let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;

        let inputs: Vec<TxIn> = if anyone_can_pay {
            alloc::vec![TxIn {
                script_sig: subscript.to_vec(),
                ..self.inputs[nin].clone()
            }]
        } else {
            self.inputs
                .iter()
                .enumerate()
                .map(|(i, input)| TxIn {
                    script_sig: if i == nin {
                        subscript.to_vec()
                    } else {
                        Vec::new()
                    },
                    sequence: if i != nin && (base_type == SIGHASH_NONE || base_type == SIGHASH_SINGLE)
                    {
                        0
                    } else {
                        input.sequence
                    },
                    ..input.clone()
                })
                .collect()
        };

        let outputs: Vec<TxOut> = match base_type {
            SIGHASH_NONE => Vec::new(),
            SIGHASH_SINGLE => {
                let mut truncated: Vec<TxOut> = self.outputs[..=nin]
                    .iter()
                    .map(|_| TxOut {
                        value: -1,
                        script_pubkey: Vec::new(),
                    })
                    .collect();
                truncated[nin] = self.outputs[nin].clone();
                truncated
            }
            _ => self.outputs.clone(),
        };

        let stripped = Tx {
            version: self.version,
            inputs,
            outputs,
            lock_time: self.lock_time,
        };

        let mut preimage = stripped.serialize();
        preimage.extend_from_slice(&hash_type.to_le_bytes());
        double_sha256(&preimage)
    }
}

pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

fn write_varint(out: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        out.push(n as u8);
    } else if n <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&n.to_le_bytes());
    }
}

fn read_varint(bytes: &[u8], pos: &mut usize) -> Option<u64> {
    let first = *bytes.get(*pos)?;
    *pos += 1;
    match first {
        0xfd => {
            let v = u16::from_le_bytes(read_fixed::<2>(bytes, pos)?);
            Some(v as u64)
        }
        0xfe => {
            let v = u32::from_le_bytes(read_fixed::<4>(bytes, pos)?);
            Some(v as u64)
        }
        0xff => {
            let v = u64::from_le_bytes(read_fixed::<8>(bytes, pos)?);
            Some(v)
        }
        n => Some(n as u64),
    }
}

fn read_fixed<const N: usize>(bytes: &[u8], pos: &mut usize) -> Option<[u8; N]> {
    let slice = bytes.get(*pos..*pos + N)?;
    *pos += N;
    slice.try_into().ok()
}

fn read_slice<'a>(bytes: &'a [u8], pos: &mut usize, len: usize) -> Option<&'a [u8]> {
    let slice = bytes.get(*pos..*pos + len)?;
    *pos += len;
    Some(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Tx {
        Tx {
            version: 1,
            inputs: alloc::vec![TxIn {
                prev_txid: [0x11; 32],
                prev_index: 0,
                script_sig: alloc::vec![0x51],
                sequence: 0xffffffff,
            }],
            outputs: alloc::vec![TxOut {
                value: 5_000_000_000,
                script_pubkey: alloc::vec![0x76, 0xa9, 0x14],
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn serialize_then_deserialize_round_trips() {
        let tx = sample_tx();
        let bytes = tx.serialize();
        let parsed = Tx::deserialize(&bytes).unwrap();
        assert_eq!(parsed, tx);
    }

    #[test]
    fn coinbase_detection() {
        let mut tx = sample_tx();
        assert!(!tx.is_coinbase());
        tx.inputs[0].prev_txid = [0u8; 32];
        tx.inputs[0].prev_index = 0xFFFFFFFF;
        assert!(tx.is_coinbase());
    }

    #[test]
    fn sighash_single_bug_when_nin_out_of_range() {
        let tx = sample_tx();
        let digest = tx.sighash(SIGHASH_SINGLE, 5, &[]);
        let mut expected = [0u8; 32];
        expected[0] = 1;
        assert_eq!(digest, expected);
    }

    #[test]
    fn sighash_all_is_deterministic() {
        let tx = sample_tx();
        let d1 = tx.sighash(SIGHASH_ALL, 0, &tx.inputs[0].script_sig.clone());
        let d2 = tx.sighash(SIGHASH_ALL, 0, &tx.inputs[0].script_sig.clone());
        assert_eq!(d1, d2);
    }
}
