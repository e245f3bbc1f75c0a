//! Token type tags.
//!
//! A token type is a fixed 32-byte tag. The four built-in asset classes
//! are derived once from domain strings, so they are stable constants
//! with no registry and no allocation at call sites.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use umbra_common::{CoreError, CoreResult};
use umbra_crypto::persistent_hash;
use umbra_primitives::encoding::base_to_bytes;

/// A fungible asset class tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenType(pub(crate) [u8; 32]);

impl TokenType {
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Accept any 32-byte tag; shorter or longer buffers are the caller's
    /// framing error.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CoreError::InvalidInput(format!("token type must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(TokenType(arr))
    }
}

impl std::fmt::Debug for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenType({})", hex::encode(&self.0[..8]))
    }
}

fn derive_tag(domain: &[u8]) -> TokenType {
    TokenType(base_to_bytes(&persistent_hash(b"umbra:TokenType", domain)))
}

static NATIVE: Lazy<TokenType> = Lazy::new(|| derive_tag(b"native"));
static FEE: Lazy<TokenType> = Lazy::new(|| derive_tag(b"fee"));
static SHIELDED: Lazy<TokenType> = Lazy::new(|| derive_tag(b"shielded"));
static UNSHIELDED: Lazy<TokenType> = Lazy::new(|| derive_tag(b"unshielded"));

/// The chain's base asset.
pub fn native_token() -> TokenType {
    *NATIVE
}

/// The fee/dust asset.
pub fn fee_token() -> TokenType {
    *FEE
}

/// The shielded asset class.
pub fn shielded_token() -> TokenType {
    *SHIELDED
}

/// The unshielded (public) asset class.
pub fn unshielded_token() -> TokenType {
    *UNSHIELDED
}
