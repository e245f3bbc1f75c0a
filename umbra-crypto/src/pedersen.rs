//! Pedersen-style coin commitments.
//!
//! `commit(message, r)` maps the message onto the curve with a
//! domain-separated hash-to-curve, adds the blinding term `[r]·G_blind`,
//! and extracts the x-coordinate. Hiding comes from the blinder, binding
//! from collision resistance of the message map plus hardness of the
//! discrete log between the two generators (they are independent
//! hash-to-curve outputs, so nobody knows their relative discrete log).

use once_cell::sync::Lazy;
use pasta_curves::arithmetic::CurveExt;
use umbra_common::CoreResult;
use umbra_primitives::encoding::{base_from_bytes, base_to_bytes, extract_x};
use umbra_primitives::{Base, Point, Scalar};

use crate::persistent::persistent_hash_to_scalar;

/// Hash-to-curve domain prefix for everything in this module.
const COMMIT_DOMAIN: &str = "umbra:CoinCommit";

/// Blinding generator; independent of every message point by construction.
static G_BLIND: Lazy<Point> = Lazy::new(|| Point::hash_to_curve(COMMIT_DOMAIN)(b"blind"));

/// A binding, hiding commitment: the x-extract of a Pedersen point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment(Base);

impl Commitment {
    pub fn from_base(value: Base) -> Self {
        Commitment(value)
    }

    pub fn inner(&self) -> Base {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        base_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> CoreResult<Self> {
        base_from_bytes(bytes).map(Commitment)
    }
}

/// Commit to a message under a blinding scalar.
///
/// Pure: identical `(message, r)` yields identical bytes on every
/// platform. The caller supplies `r`; coin commitments derive it from the
/// coin nonce via [`commitment_randomness`].
pub fn commit(message: &[u8], r: &Scalar) -> Commitment {
    let m = Point::hash_to_curve(COMMIT_DOMAIN)(message);
    Commitment(extract_x(&(m + *G_BLIND * r)))
}

/// Derive commitment randomness from a coin nonce.
///
/// Each coin's nonce is sampled fresh at creation, so the blinder is
/// unique per coin while the commitment stays a pure function of the
/// coin data.
pub fn commitment_randomness(nonce: &[u8; 32]) -> Scalar {
    persistent_hash_to_scalar(b"umbra:CommitRand", nonce)
}
