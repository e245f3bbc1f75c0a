//! Spend and output statement preimages.
//!
//! The two shielded statements the ledger proves: *spend* (a coin I own
//! is in the accumulator, and this is its nullifier) and *output* (this
//! commitment opens to a well-formed coin). These builders convert the
//! wallet-facing types (coin, keys, membership proof) into the flat
//! field-element preimage the circuits consume, fixing the circuit id
//! and shape in one place so preimages can never drift from the
//! artifacts keyed for them.

use umbra_accumulator::{verify_membership, MembershipProof, ACCUMULATOR_HEIGHT};
use umbra_coin::{coin_commitment, coin_nullifier, CoinInfo, CoinPublicKey, CoinSecretKey};
use umbra_common::{CoreError, CoreResult};
use umbra_crypto::persistent_hash;
use umbra_primitives::Base;

use crate::artifacts::CircuitShape;
use crate::preimage::ProofPreimage;

/// Circuit id of the spend statement.
pub const SPEND_CIRCUIT_ID: &str = "umbra/spend";
/// Circuit id of the output statement.
pub const OUTPUT_CIRCUIT_ID: &str = "umbra/output";

/// Shape of the spend circuit: public (root, nullifier, commitment),
/// witness (coin digest, position, one sibling per tree level).
pub fn spend_circuit_shape() -> CircuitShape {
    CircuitShape {
        k: 16,
        public_input_count: 3,
        witness_count: 2 + ACCUMULATOR_HEIGHT as u32,
    }
}

/// Shape of the output circuit: public (commitment), witness (coin
/// digest, receiver key digest).
pub fn output_circuit_shape() -> CircuitShape {
    CircuitShape {
        k: 14,
        public_input_count: 1,
        witness_count: 2,
    }
}

/// Assemble the spend-statement preimage for a coin.
///
/// Fails with `CryptoFailure` if the membership proof does not actually
/// bind this coin's commitment to `root`; a preimage that cannot satisfy
/// its own circuit is never handed to the prover.
pub fn spend_preimage(
    coin: &CoinInfo,
    secret_key: &CoinSecretKey,
    root: Base,
    membership: &MembershipProof,
) -> CoreResult<ProofPreimage> {
    let public_key = secret_key.public_key();
    let commitment = coin_commitment(coin, &public_key);
    let nullifier = coin_nullifier(coin, secret_key);

    if !verify_membership(root, commitment.inner(), membership) {
        return Err(CoreError::CryptoFailure(
            "membership proof does not bind this coin to the given root".into(),
        ));
    }

    let mut witness = Vec::with_capacity(2 + ACCUMULATOR_HEIGHT as usize);
    witness.push(coin.digest());
    witness.push(Base::from(membership.position()));
    witness.extend_from_slice(membership.siblings());

    let preimage = ProofPreimage {
        circuit_id: SPEND_CIRCUIT_ID.into(),
        shape: spend_circuit_shape(),
        public_inputs: vec![root, nullifier.inner(), commitment.inner()],
        witness,
        binding_input: binding_input_for(coin),
    };
    preimage.validate()?;
    Ok(preimage)
}

/// Assemble the output-statement preimage for a freshly created coin.
pub fn output_preimage(coin: &CoinInfo, receiver: &CoinPublicKey) -> CoreResult<ProofPreimage> {
    let commitment = coin_commitment(coin, receiver);

    let preimage = ProofPreimage {
        circuit_id: OUTPUT_CIRCUIT_ID.into(),
        shape: output_circuit_shape(),
        public_inputs: vec![commitment.inner()],
        witness: vec![
            coin.digest(),
            persistent_hash(b"umbra:ReceiverKey", &receiver.to_bytes()),
        ],
        binding_input: binding_input_for(coin),
    };
    preimage.validate()?;
    Ok(preimage)
}

/// Default binding input: the value-binding digest of the coin.
///
/// A transaction builder that balances several statements overwrites
/// this at payload-assembly time via `create_proving_payload`.
fn binding_input_for(coin: &CoinInfo) -> Base {
    persistent_hash(b"umbra:BindingInput", &coin.to_bytes())
}
