//! Transaction verifier (C5): context-free sanity checks (`check_str`) plus per-input
//! script-execution orchestration (`verify_str`), driven by an external script
//! interpreter (C6) this crate only defines the contract for.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use log::warn;

use crate::tx::{ConsensusParams, Transaction, TxOut};

/// A previous-output reference: `(txid, output index)`, in the byte order the
/// transaction carries internally (not the reversed display order used in hex txids).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OutPoint {
    pub txid: [u8; 32],
    pub index: u32,
}

/// A read-only mapping from outpoint to the previously spent output. Lookups that
/// miss must cause verification to fail; implementors own their own snapshot
/// semantics (§5) — this crate never mutates through the trait.
pub trait UtxoLookup {
    fn get(&self, point: &OutPoint) -> Option<&TxOut>;
}

impl UtxoLookup for BTreeMap<OutPoint, TxOut> {
    fn get(&self, point: &OutPoint) -> Option<&TxOut> {
        BTreeMap::get(self, point)
    }
}

/// Opaque bitfield passed through to the script interpreter unexamined; flags like
/// `SCRIPT_VERIFY_P2SH` are entirely an interpreter concern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptFlags(pub u32);

/// The contract with the (external, §6) script interpreter: given a scriptSig,
/// scriptPubKey, the enclosing transaction, the input index, and flags, decide
/// validity. It may call back into `tx.sighash(..)` and the ECDSA engine; this crate
/// does not prescribe how.
pub trait ScriptInterpreter {
    fn verify(
        &self,
        script_sig: &[u8],
        script_pubkey: &[u8],
        tx: &dyn Transaction,
        nin: usize,
        flags: ScriptFlags,
    ) -> bool;
}

/// A test double that accepts every input unconditionally, for exercising C5 in
/// isolation from any real script engine.
pub struct AlwaysValidInterpreter;

impl ScriptInterpreter for AlwaysValidInterpreter {
    fn verify(&self, _: &[u8], _: &[u8], _: &dyn Transaction, _: usize, _: ScriptFlags) -> bool {
        true
    }
}

/// A test double that rejects every input unconditionally.
pub struct AlwaysInvalidInterpreter;

impl ScriptInterpreter for AlwaysInvalidInterpreter {
    fn verify(&self, _: &[u8], _: &[u8], _: &dyn Transaction, _: usize, _: ScriptFlags) -> bool {
        false
    }
}

/// Context-free sanity checks, independent of any UTXO set or script engine.
/// Returns `None` when the transaction passes; `Some(diagnostic)` naming the first
/// violation found, in the canonical order below.
pub fn check_str<T: Transaction, P: ConsensusParams>(tx: &T, params: &P) -> Option<String> {
    if tx.inputs().is_empty() {
        return Some("transaction has no inputs".into());
    }
    if tx.outputs().is_empty() {
        return Some("transaction has no outputs".into());
    }
    if tx.serialized_len() > params.max_block_size() {
        return Some("transaction size exceeds the maximum block size".into());
    }

    let mut total: i64 = 0;
    for (i, output) in tx.outputs().iter().enumerate() {
        if output.value < 0 {
            return Some(format!("transaction output {i} has a negative value"));
        }
        if output.value > params.max_money() {
            return Some(format!("transaction output {i} exceeds the maximum money supply"));
        }
        total = total.saturating_add(output.value);
        if total > params.max_money() {
            return Some(format!(
                "transaction output {i} brings the running total over the maximum money supply"
            ));
        }
    }

    let mut seen: Vec<([u8; 32], u32)> = Vec::with_capacity(tx.inputs().len());
    for (i, input) in tx.inputs().iter().enumerate() {
        let fingerprint = (input.prev_txid, input.prev_index);
        if seen.contains(&fingerprint) {
            return Some(format!("transaction input {i} duplicate input"));
        }
        seen.push(fingerprint);
    }

    if tx.is_coinbase() {
        let script_len = tx.inputs()[0].script_sig.len();
        if !(2..=100).contains(&script_len) {
            return Some("coinbase script is not between 2 and 100 bytes".into());
        }
    } else {
        for (i, input) in tx.inputs().iter().enumerate() {
            if input.is_null() {
                return Some(format!("transaction input {i} has a null input"));
            }
        }
    }

    None
}

/// Per-input script verification. For each input, looks up its referenced previous
/// output and delegates scriptSig/scriptPubKey evaluation to `interpreter`. Reports
/// the first input to fail, in ascending index order.
pub fn verify_str<T: Transaction, U: UtxoLookup, S: ScriptInterpreter>(
    tx: &T,
    utxo: &U,
    interpreter: &S,
    flags: ScriptFlags,
) -> Option<String> {
    for (i, input) in tx.inputs().iter().enumerate() {
        let point = OutPoint {
            txid: input.prev_txid,
            index: input.prev_index,
        };
        let Some(prevout) = utxo.get(&point) else {
            warn!("verify_str: input {} references a missing prevout", i);
            return Some(format!(
                "input {i} references a previous output that does not exist"
            ));
        };
        let ok = interpreter.verify(&input.script_sig, &prevout.script_pubkey, tx, i, flags);
        if !ok {
            return Some(format!("input {i} failed script verify"));
        }
    }
    None
}

/// `true` iff both `check_str` and `verify_str` report no diagnostic.
pub fn verify<T: Transaction, U: UtxoLookup, S: ScriptInterpreter, P: ConsensusParams>(
    tx: &T,
    utxo: &U,
    interpreter: &S,
    flags: ScriptFlags,
    params: &P,
) -> bool {
    check_str(tx, params).is_none() && verify_str(tx, utxo, interpreter, flags).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{BitcoinMainnetParams, Tx, TxIn};
    use alloc::vec;

    fn base_tx() -> Tx {
        Tx {
            version: 1,
            inputs: vec![TxIn {
                prev_txid: [0x22; 32],
                prev_index: 0,
                script_sig: vec![0x51],
                sequence: 0xffffffff,
            }],
            outputs: vec![TxOut {
                value: 1_000,
                script_pubkey: vec![0x76, 0xa9, 0x14],
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn empty_inputs_fails_first() {
        let mut tx = base_tx();
        tx.inputs.clear();
        assert_eq!(
            check_str(&tx, &BitcoinMainnetParams).as_deref(),
            Some("transaction has no inputs")
        );
    }

    #[test]
    fn empty_outputs_fails_when_inputs_present() {
        let mut tx = base_tx();
        tx.outputs.clear();
        assert_eq!(
            check_str(&tx, &BitcoinMainnetParams).as_deref(),
            Some("transaction has no outputs")
        );
    }

    #[test]
    fn negative_output_value_fails() {
        let mut tx = base_tx();
        tx.outputs[0].value = -1;
        assert_eq!(
            check_str(&tx, &BitcoinMainnetParams).as_deref(),
            Some("transaction output 0 has a negative value")
        );
    }

    #[test]
    fn duplicate_input_detected_at_second_occurrence() {
        let mut tx = base_tx();
        tx.inputs.push(tx.inputs[0].clone());
        assert_eq!(
            check_str(&tx, &BitcoinMainnetParams).as_deref(),
            Some("transaction input 1 duplicate input")
        );
    }

    #[test]
    fn coinbase_script_length_bounds() {
        let mut tx = base_tx();
        tx.inputs[0].prev_txid = [0u8; 32];
        tx.inputs[0].prev_index = 0xFFFFFFFF;

        tx.inputs[0].script_sig = vec![0x00];
        assert!(check_str(&tx, &BitcoinMainnetParams).is_some());

        tx.inputs[0].script_sig = vec![0x00; 2];
        assert!(check_str(&tx, &BitcoinMainnetParams).is_none());

        tx.inputs[0].script_sig = vec![0x00; 100];
        assert!(check_str(&tx, &BitcoinMainnetParams).is_none());

        tx.inputs[0].script_sig = vec![0x00; 101];
        assert!(check_str(&tx, &BitcoinMainnetParams).is_some());
    }

    #[test]
    fn non_coinbase_null_input_fails() {
        let mut tx = base_tx();
        tx.inputs[0].prev_txid = [0u8; 32];
        tx.inputs[0].prev_index = 0xFFFFFFFF;
        tx.outputs.push(TxOut {
            value: 1,
            script_pubkey: vec![],
        });
        // Two inputs so the transaction is not a coinbase, but the first is null.
        tx.inputs.push(TxIn {
            prev_txid: [0x33; 32],
            prev_index: 0,
            script_sig: vec![0x51],
            sequence: 0xffffffff,
        });
        assert!(check_str(&tx, &BitcoinMainnetParams)
            .unwrap()
            .contains("null input"));
    }

    #[test]
    fn verify_str_reports_missing_prevout() {
        let tx = base_tx();
        let utxo: BTreeMap<OutPoint, TxOut> = BTreeMap::new();
        let result = verify_str(&tx, &utxo, &AlwaysValidInterpreter, ScriptFlags::default());
        assert!(result.unwrap().contains("does not exist"));
    }

    #[test]
    fn verify_str_reports_first_failing_input() {
        let tx = base_tx();
        let mut utxo: BTreeMap<OutPoint, TxOut> = BTreeMap::new();
        utxo.insert(
            OutPoint {
                txid: tx.inputs[0].prev_txid,
                index: tx.inputs[0].prev_index,
            },
            TxOut {
                value: 1_000,
                script_pubkey: vec![],
            },
        );
        let result = verify_str(&tx, &utxo, &AlwaysInvalidInterpreter, ScriptFlags::default());
        assert_eq!(result.as_deref(), Some("input 0 failed script verify"));
    }

    #[test]
    fn full_verify_succeeds_with_matching_utxo_and_valid_interpreter() {
        let tx = base_tx();
        let mut utxo: BTreeMap<OutPoint, TxOut> = BTreeMap::new();
        utxo.insert(
            OutPoint {
                txid: tx.inputs[0].prev_txid,
                index: tx.inputs[0].prev_index,
            },
            TxOut {
                value: 1_000,
                script_pubkey: vec![],
            },
        );
        assert!(verify(
            &tx,
            &utxo,
            &AlwaysValidInterpreter,
            ScriptFlags::default(),
            &BitcoinMainnetParams
        ));
    }
}
