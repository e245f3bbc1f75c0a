//! Shared error taxonomy and canonical byte codec for the Umbra ledger core.
//!
//! Every layer above this crate returns [`CoreError`]; the FFI marshalling
//! layer maps each variant onto a stable numeric code for the boundary
//! envelope. The codec helpers define the one canonical wire form used for
//! everything whose bytes must be platform-identical: fixed-width field and
//! point encodings, big-endian `u32` lengths for variable data.

pub mod codec;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error surface shared by every core component.
///
/// Variants map 1:1 onto the boundary error codes; nothing outside this
/// enum crosses the FFI layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or undersized input buffer.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A buffer that is the right size but does not encode a canonical
    /// field or curve element.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    /// Preimage and key-material/IR disagree on the circuit shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// Coin value outside the representable range.
    #[error("value overflow: {0} exceeds the maximum coin value")]
    ValueOverflow(u128),
    /// The accumulator has reached its 2^32 leaf capacity.
    #[error("accumulator full: height-{height} tree holds at most 2^{height} leaves")]
    AccumulatorFull { height: u8 },
    /// A verifier result buffer with an inconsistent encoding.
    #[error("malformed result: {0}")]
    MalformedResult(String),
    /// Stale, double-released, or never-issued handle.
    #[error("handle not found: {0:#018x}")]
    HandleNotFound(u64),
    /// A cryptographic check failed (proof rejected, commitment mismatch).
    #[error("crypto failure: {0}")]
    CryptoFailure(String),
    /// Unexpected fault caught at the boundary.
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Stable numeric codes for the boundary envelope.
///
/// These are part of the external contract; renumbering is a breaking
/// change for every host binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorCode {
    InvalidInput = 1,
    InvalidEncoding = 2,
    ShapeMismatch = 3,
    ValueOverflow = 4,
    AccumulatorFull = 5,
    MalformedResult = 6,
    HandleNotFound = 7,
    CryptoFailure = 8,
    InternalError = 9,
}

impl CoreError {
    /// The boundary code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidInput(_) => ErrorCode::InvalidInput,
            CoreError::InvalidEncoding(_) => ErrorCode::InvalidEncoding,
            CoreError::ShapeMismatch(_) => ErrorCode::ShapeMismatch,
            CoreError::ValueOverflow(_) => ErrorCode::ValueOverflow,
            CoreError::AccumulatorFull { .. } => ErrorCode::AccumulatorFull,
            CoreError::MalformedResult(_) => ErrorCode::MalformedResult,
            CoreError::HandleNotFound(_) => ErrorCode::HandleNotFound,
            CoreError::CryptoFailure(_) => ErrorCode::CryptoFailure,
            CoreError::InternalError(_) => ErrorCode::InternalError,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
