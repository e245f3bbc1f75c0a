//! Hashing and commitment scheme for the Umbra ledger core.
//!
//! Three deterministic constructions sit here, each with its own domain
//! separation:
//!
//! - [`persistent_hash`]: blake2b-512 with a 16-byte personalization,
//!   mapped into the Pallas base field. Used for token tags, addresses,
//!   coin digests, and every non-circuit hash.
//! - [`pedersen`]: hiding, binding coin commitments over hash-to-curve
//!   generators.
//! - [`poseidon_prf`]: the nullifier PRF.
//! - [`merkle_crh`]: the Sinsemilla collision-resistant hash the
//!   accumulator is built from.
//!
//! Nothing in this crate touches shared state or floating point; every
//! function is a pure map from its typed inputs.

pub mod merkle_crh;
pub mod pedersen;
pub mod persistent;
pub mod poseidon_prf;

pub use merkle_crh::{merkle_hash_level, MERKLE_CRH_PERSONALIZATION};
pub use pedersen::{commit, commitment_randomness, Commitment};
pub use persistent::{persistent_hash, persistent_hash_to_scalar};
pub use poseidon_prf::{nullifier_prf, prf_key};
