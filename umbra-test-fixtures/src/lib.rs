//! Deterministic fixtures shared across the workspace test suites.
//!
//! Everything here is seeded with `ChaCha20Rng`, so fixture values are
//! identical across platforms and test runs, which is exactly the
//! property the engine itself promises, and what the determinism tests
//! lean on.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use umbra_coin::{
    create_shielded_coin_info, native_token, CoinInfo, CoinPublicKey, CoinSecretKey,
};
use umbra_primitives::Base;
use umbra_proof::{CircuitIr, CircuitShape, KeyMaterial, ProofPreimage};

const FIXTURE_SEED: u64 = 0x5eed_cafe;

static FIXTURES: OnceCell<TestFixtures> = OnceCell::new();

/// Pre-generated coins, keys, and proof artifacts reused across tests.
pub struct TestFixtures {
    secret_key: CoinSecretKey,
    public_key: CoinPublicKey,
    coin: CoinInfo,
    key_material: Arc<KeyMaterial>,
    circuit_ir: Arc<CircuitIr>,
    preimage: ProofPreimage,
}

impl TestFixtures {
    pub fn secret_key(&self) -> &CoinSecretKey {
        &self.secret_key
    }

    pub fn public_key(&self) -> &CoinPublicKey {
        &self.public_key
    }

    pub fn coin(&self) -> &CoinInfo {
        &self.coin
    }

    pub fn key_material(&self) -> Arc<KeyMaterial> {
        Arc::clone(&self.key_material)
    }

    pub fn circuit_ir(&self) -> Arc<CircuitIr> {
        Arc::clone(&self.circuit_ir)
    }

    pub fn preimage(&self) -> &ProofPreimage {
        &self.preimage
    }
}

/// The shared fixture set, built once per process.
pub fn fixtures() -> &'static TestFixtures {
    FIXTURES.get_or_init(build_fixtures)
}

/// A fresh seeded RNG for tests that need their own stream.
pub fn seeded_rng(salt: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(FIXTURE_SEED ^ salt)
}

/// The circuit shape used by every proof fixture.
pub fn fixture_shape() -> CircuitShape {
    CircuitShape {
        k: 14,
        public_input_count: 3,
        witness_count: 4,
    }
}

/// A preimage consistent with [`fixture_shape`].
pub fn sample_preimage() -> ProofPreimage {
    ProofPreimage {
        circuit_id: "umbra/test".into(),
        shape: fixture_shape(),
        public_inputs: vec![Base::from(101u64), Base::from(102u64), Base::from(103u64)],
        witness: vec![
            Base::from(201u64),
            Base::from(202u64),
            Base::from(203u64),
            Base::from(204u64),
        ],
        binding_input: Base::from(7u64),
    }
}

/// Key material paired with [`fixture_shape`].
pub fn sample_key_material() -> KeyMaterial {
    KeyMaterial::new("umbra/test", fixture_shape(), vec![0xA5; 256])
}

/// Circuit IR paired with [`fixture_shape`].
pub fn sample_circuit_ir() -> CircuitIr {
    CircuitIr::new("umbra/test", fixture_shape(), vec![0x5A; 128])
}

/// Encode a verifier result buffer in the external verifier's format.
///
/// Mirrors the wire format `parse_check_result` consumes; tests forge
/// verifier outputs with this.
pub fn encode_check_result(accepted: bool, diagnostic: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(10 + diagnostic.len());
    bytes.extend_from_slice(b"URES");
    bytes.push(1); // result format version
    bytes.push(u8::from(accepted));
    bytes.extend_from_slice(&(diagnostic.len() as u32).to_be_bytes());
    bytes.extend_from_slice(diagnostic.as_bytes());
    bytes
}

fn build_fixtures() -> TestFixtures {
    let mut rng = seeded_rng(0);
    let secret_key = CoinSecretKey::random(&mut rng);
    let public_key = secret_key.public_key();
    let coin = create_shielded_coin_info(&mut rng, native_token(), 1_000)
        .expect("fixture coin value is in range");

    TestFixtures {
        secret_key,
        public_key,
        coin,
        key_material: Arc::new(sample_key_material()),
        circuit_ir: Arc::new(sample_circuit_ir()),
        preimage: sample_preimage(),
    }
}
