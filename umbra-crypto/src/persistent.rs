//! Persistent (non-circuit) hashing.
//!
//! blake2b-512 with a 16-byte personalization string, reduced into a
//! Pallas field element via `from_uniform_bytes` so the output is
//! statistically uniform. Deterministic on every platform: byte input,
//! byte output, no host-dependent state.

use blake2b_simd::Params as Blake2bParams;
use ff::FromUniformBytes;
use umbra_primitives::{Base, Scalar};

/// Personalization for the generic persistent hash.
pub const PERSISTENT_HASH_PERSONALIZATION: &[u8; 16] = b"Umbra_PersistHsh";

/// Personalization for scalar-valued derivations (commitment randomness).
pub const SCALAR_HASH_PERSONALIZATION: &[u8; 16] = b"Umbra_ScalarHash";

/// Hash a domain tag plus message into the base field.
///
/// The domain tag is length-prefixed into the hash input so that
/// `("ab", "c")` and `("a", "bc")` can never collide.
pub fn persistent_hash(domain: &[u8], data: &[u8]) -> Base {
    let digest = blake2b_512(PERSISTENT_HASH_PERSONALIZATION, domain, data);
    Base::from_uniform_bytes(&digest)
}

/// Hash a domain tag plus message into the scalar field.
pub fn persistent_hash_to_scalar(domain: &[u8], data: &[u8]) -> Scalar {
    let digest = blake2b_512(SCALAR_HASH_PERSONALIZATION, domain, data);
    Scalar::from_uniform_bytes(&digest)
}

fn blake2b_512(personal: &[u8; 16], domain: &[u8], data: &[u8]) -> [u8; 64] {
    let mut state = Blake2bParams::new()
        .hash_length(64)
        .personal(personal)
        .to_state();
    state.update(&(domain.len() as u64).to_be_bytes());
    state.update(domain);
    state.update(data);
    let hash = state.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(hash.as_bytes());
    out
}
