//! secp256k1 ECDSA engine, SEC1 public-key codec, and transaction verifier core.
//!
//! Builds `no_std` by default (plus `alloc`); the `std` feature (on by default for
//! ordinary consumers) only adds the blanket `std::error::Error` impl on [`error::Error`]
//! and is never required to use the library.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

pub mod bsm;
pub mod ecdsa;
pub mod error;
pub mod field;
pub mod point;
pub mod pubkey;
pub mod scalar;
pub mod signature;
pub mod tx;
pub mod uint256;
pub mod verifier;

pub use ecdsa::{calc_recovery, deterministic_k, recover_pubkey, sign, verify, verify_bool, Endianness};
pub use error::{Error, Result};
pub use field::FieldElement;
pub use point::{Point, G};
pub use pubkey::PublicKey;
pub use scalar::Scalar;
pub use signature::{RecoveryId, Signature};
pub use tx::{BitcoinMainnetParams, ConsensusParams, Transaction, Tx, TxIn, TxOut};
pub use verifier::{
    check_str, verify_str, AlwaysInvalidInterpreter, AlwaysValidInterpreter, OutPoint,
    ScriptFlags, ScriptInterpreter, UtxoLookup,
};
