//! Coin instances, commitments, and nullifiers.
//!
//! A `CoinInfo` is `(token_type, value, nonce)`. Its canonical encoding
//! is the preimage of both the commitment and the nullifier, so any
//! single-byte change to a coin changes both derivations.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use umbra_common::codec::{Reader, Writer};
use umbra_common::{CoreError, CoreResult};
use umbra_crypto::{commit, commitment_randomness, nullifier_prf, persistent_hash, prf_key};
use umbra_crypto::Commitment;
use umbra_primitives::encoding::{base_from_bytes, base_to_bytes};
use umbra_primitives::Base;

use crate::keys::{CoinPublicKey, CoinSecretKey};
use crate::tokens::TokenType;

/// Largest representable coin value.
///
/// Values are held in a u128 field for forward compatibility, but the
/// valid range is 64 bits, matching the circuit's value range checks.
pub const MAX_COIN_VALUE: u128 = u64::MAX as u128;

/// Canonical `CoinInfo` encoding length: tag + value + nonce.
pub const COIN_INFO_ENCODED_LEN: usize = 32 + 16 + 32;

/// Per-coin uniqueness nonce.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce(pub [u8; 32]);

impl std::fmt::Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Nonce({})", hex::encode(&self.0[..8]))
    }
}

/// A coin instance. Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub token_type: TokenType,
    pub value: u128,
    pub nonce: Nonce,
}

impl CoinInfo {
    /// Canonical 80-byte encoding: tag, value (big-endian), nonce.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(COIN_INFO_ENCODED_LEN);
        w.write_array32(&self.token_type.to_bytes());
        w.write_u128_be(self.value);
        w.write_array32(&self.nonce.0);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let mut r = Reader::new(bytes);
        let token_type = TokenType::from_bytes(&r.read_array32()?)?;
        let value = r.read_u128_be()?;
        let nonce = Nonce(r.read_array32()?);
        r.finish()?;
        if value > MAX_COIN_VALUE {
            return Err(CoreError::ValueOverflow(value));
        }
        Ok(CoinInfo {
            token_type,
            value,
            nonce,
        })
    }

    /// Field-element digest of the canonical encoding; the nullifier
    /// PRF input.
    pub fn digest(&self) -> Base {
        persistent_hash(b"umbra:CoinDigest", &self.to_bytes())
    }
}

/// Create a coin with a freshly sampled nonce.
///
/// The nonce source is the caller's CSPRNG; everything else about the
/// coin is exactly the arguments.
pub fn create_shielded_coin_info<R: RngCore + CryptoRng>(
    rng: &mut R,
    token_type: TokenType,
    value: u128,
) -> CoreResult<CoinInfo> {
    if value > MAX_COIN_VALUE {
        return Err(CoreError::ValueOverflow(value));
    }
    let mut nonce = [0u8; 32];
    rng.fill_bytes(&mut nonce);
    Ok(CoinInfo {
        token_type,
        value,
        nonce: Nonce(nonce),
    })
}

/// Commit to a coin under a receiving key.
///
/// Pure in `(coin_info, public_key)`: the blinder is derived from the
/// coin nonce, so repeated calls are byte-identical.
pub fn coin_commitment(coin_info: &CoinInfo, public_key: &CoinPublicKey) -> Commitment {
    let mut message = coin_info.to_bytes();
    message.extend_from_slice(&public_key.to_bytes());
    commit(&message, &commitment_randomness(&coin_info.nonce.0))
}

/// Unique spend tag for a coin under a secret key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nullifier(Base);

impl Nullifier {
    pub fn to_bytes(&self) -> [u8; 32] {
        base_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> CoreResult<Self> {
        base_from_bytes(bytes).map(Nullifier)
    }

    pub fn inner(&self) -> Base {
        self.0
    }
}

/// Derive the nullifier for a coin under a spending key.
///
/// Depends only on `(coin_info, secret_key)`; without the secret key it
/// is unlinkable to the coin's commitment.
pub fn coin_nullifier(coin_info: &CoinInfo, secret_key: &CoinSecretKey) -> Nullifier {
    let nk = prf_key(&secret_key.scalar());
    Nullifier(nullifier_prf(nk, coin_info.digest()))
}
