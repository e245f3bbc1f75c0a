//! Coin and token model.
//!
//! Value objects for the shielded ledger: token type tags, coin instances
//! with their commitments and nullifiers, spending/encryption keypairs,
//! and addresses. Constructors are allocation-light and pure except for
//! explicit randomness, which always comes from a caller-supplied
//! `RngCore + CryptoRng` source.

mod coin;
mod keys;
mod tokens;

pub use coin::{
    coin_commitment, coin_nullifier, create_shielded_coin_info, CoinInfo, Nonce, Nullifier,
    COIN_INFO_ENCODED_LEN, MAX_COIN_VALUE,
};
pub use keys::{
    address_from_key, Address, CoinPublicKey, CoinSecretKey, EncryptionPublicKey,
    EncryptionSecretKey,
};
pub use tokens::{fee_token, native_token, shielded_token, unshielded_token, TokenType};
