//! Poseidon nullifier PRF.
//!
//! Nullifiers are `Poseidon(nk, coin_digest)` over the Pallas base field
//! with the standard `P128Pow5T3` parameters. The PRF key `nk` is derived
//! from the spending key, so without the secret key a nullifier is
//! unlinkable to its coin commitment.

use halo2_gadgets::poseidon::primitives::{self as poseidon, ConstantLength, P128Pow5T3};
use umbra_primitives::encoding::scalar_to_bytes;
use umbra_primitives::{Base, Scalar};

use crate::persistent::persistent_hash;

/// Two-to-one Poseidon over the Pallas base field.
fn poseidon_hash(a: Base, b: Base) -> Base {
    poseidon::Hash::<Base, P128Pow5T3, ConstantLength<2>, 3, 2>::init().hash([a, b])
}

/// Derive the nullifier PRF key from a spending key.
pub fn prf_key(secret_key: &Scalar) -> Base {
    persistent_hash(b"umbra:NullifierKey", &scalar_to_bytes(secret_key))
}

/// Compute the nullifier for a coin digest under a PRF key.
pub fn nullifier_prf(nk: Base, coin_digest: Base) -> Base {
    poseidon_hash(nk, coin_digest)
}
