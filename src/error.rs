//! Error type for every fallible operation in C0-C4 (the "throw channel" of §7).
//!
//! The diagnostic channel used by the transaction verifier (`checkStr`/`verifyStr`)
//! is a plain `String`, not this enum — see [`crate::verifier`].

use core::fmt;

#[cfg(feature = "std")]
extern crate std;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// SEC1 byte string has an unrecognized prefix, or its length does not match
    /// what that prefix implies.
    CodecInvalidLength,
    CodecInvalidPrefix,
    /// A hybrid-prefix (0x06/0x07) encoding was rejected because `strict` decoding
    /// was requested.
    CodecHybridRejected,
    /// Fast-buffer form had an unrecognized compressed-flag byte.
    CodecInvalidFastBuffer,

    /// Decoded point is the point at infinity, equals (0, 0), or fails the curve
    /// equation y^2 = x^3 + 7 (mod P).
    PointInvalid,

    /// A scalar used as a private key or a signature component r/s was not in (0, N).
    ScalarOutOfRange,

    /// A digest passed to sign/verify/recover was not exactly 32 bytes.
    DigestShape,

    /// `calcRecovery` exhausted all four recovery candidates without a match.
    RecoveryExhausted,

    /// Signing was asked to produce a signature but had no private scalar.
    MissingPrivateKey,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;
        match self {
            CodecInvalidLength => write!(f, "public key encoding has the wrong length for its prefix"),
            CodecInvalidPrefix => write!(f, "public key encoding has an unrecognized prefix byte"),
            CodecHybridRejected => write!(f, "hybrid public key encoding rejected under strict decoding"),
            CodecInvalidFastBuffer => write!(f, "fast-buffer encoding has an invalid compressed-flag byte"),
            PointInvalid => write!(f, "point is not a valid secp256k1 curve point"),
            ScalarOutOfRange => write!(f, "scalar is not in the open interval (0, N)"),
            DigestShape => write!(f, "digest must be exactly 32 bytes"),
            RecoveryExhausted => write!(f, "unable to find valid recovery factor"),
            MissingPrivateKey => write!(f, "signing requires a private scalar"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
