//! Spending and encryption keypairs, and address derivation.
//!
//! Secret keys hold their canonical scalar encoding and are zeroized on
//! drop; releasing a key handle at the boundary drops the object and
//! thereby wipes it. Public keys are curve points over per-role
//! generators.

use once_cell::sync::Lazy;
use pasta_curves::arithmetic::CurveExt;
use rand::{CryptoRng, RngCore};
use umbra_common::CoreResult;
use umbra_crypto::persistent_hash;
use umbra_primitives::encoding::{
    base_to_bytes, point_from_bytes, point_to_bytes, scalar_from_bytes, scalar_to_bytes,
};
use umbra_primitives::{random_scalar, Point, Scalar};
use zeroize::{Zeroize, ZeroizeOnDrop};

const KEYGEN_DOMAIN: &str = "umbra:KeyGen";

/// Spending-key generator.
static G_SPEND: Lazy<Point> = Lazy::new(|| Point::hash_to_curve(KEYGEN_DOMAIN)(b"spend"));
/// Encryption-key generator.
static G_ENC: Lazy<Point> = Lazy::new(|| Point::hash_to_curve(KEYGEN_DOMAIN)(b"enc"));

/// A coin spending key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CoinSecretKey {
    /// Canonical scalar encoding; kept as bytes so drop can wipe it.
    inner: [u8; 32],
}

impl CoinSecretKey {
    /// Sample a fresh nonzero spending key.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let sk = random_scalar(rng);
        CoinSecretKey {
            inner: scalar_to_bytes(&sk),
        }
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> CoreResult<Self> {
        scalar_from_bytes(bytes)?;
        Ok(CoinSecretKey { inner: *bytes })
    }

    pub(crate) fn scalar(&self) -> Scalar {
        // Construction guarantees canonical bytes.
        scalar_from_bytes(&self.inner).expect("secret key bytes are canonical by construction")
    }

    /// The matching public key.
    pub fn public_key(&self) -> CoinPublicKey {
        CoinPublicKey(*G_SPEND * self.scalar())
    }
}

impl std::fmt::Debug for CoinSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("CoinSecretKey(..)")
    }
}

/// A coin viewing/receiving key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoinPublicKey(pub(crate) Point);

impl CoinPublicKey {
    pub fn to_bytes(&self) -> [u8; 32] {
        point_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> CoreResult<Self> {
        point_from_bytes(bytes).map(CoinPublicKey)
    }
}

/// An encryption secret key (note ciphertexts, out of band).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionSecretKey {
    inner: [u8; 32],
}

impl EncryptionSecretKey {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let sk = random_scalar(rng);
        EncryptionSecretKey {
            inner: scalar_to_bytes(&sk),
        }
    }

    pub fn public_key(&self) -> EncryptionPublicKey {
        let sk =
            scalar_from_bytes(&self.inner).expect("secret key bytes are canonical by construction");
        EncryptionPublicKey(*G_ENC * sk)
    }
}

impl std::fmt::Debug for EncryptionSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionSecretKey(..)")
    }
}

/// An encryption public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncryptionPublicKey(pub(crate) Point);

impl EncryptionPublicKey {
    pub fn to_bytes(&self) -> [u8; 32] {
        point_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> CoreResult<Self> {
        point_from_bytes(bytes).map(EncryptionPublicKey)
    }
}

/// A shielded address: the persistent hash of the receiving key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 32]);

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", hex::encode(&self.0[..8]))
    }
}

/// Deterministic address derivation from a coin public key.
pub fn address_from_key(key: &CoinPublicKey) -> Address {
    let digest = persistent_hash(b"umbra:Address", &key.to_bytes());
    Address(base_to_bytes(&digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn public_key_is_deterministic_in_secret() {
        let sk = CoinSecretKey::random(&mut OsRng);
        assert_eq!(sk.public_key(), sk.public_key());
    }

    #[test]
    fn distinct_secrets_distinct_publics() {
        let a = CoinSecretKey::random(&mut OsRng);
        let b = CoinSecretKey::random(&mut OsRng);
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn public_key_round_trip() {
        let pk = CoinSecretKey::random(&mut OsRng).public_key();
        assert_eq!(CoinPublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
    }

    #[test]
    fn address_is_pure() {
        let pk = CoinSecretKey::random(&mut OsRng).public_key();
        assert_eq!(address_from_key(&pk), address_from_key(&pk));
    }

    #[test]
    fn spend_and_enc_generators_differ() {
        // The same scalar over the two roles must give unrelated keys.
        let sk = CoinSecretKey::random(&mut OsRng);
        let enc = EncryptionSecretKey {
            inner: sk.inner,
        };
        assert_ne!(sk.public_key().to_bytes(), enc.public_key().to_bytes());
    }

    #[test]
    fn debug_never_prints_secret_bytes() {
        let sk = CoinSecretKey::random(&mut OsRng);
        let rendered = format!("{:?}", sk);
        assert!(!rendered.contains(&hex::encode(sk.inner)));
    }
}
