//! Boundary tests: drive the exported catalog exactly as a host binding
//! would: raw pointers in, envelopes out.
//!
//! The engine context is process-wide, so every test serializes on one
//! lock and leaves the context initialized for the next.

use std::sync::Mutex;

use umbra_coin::{native_token, CoinInfo};
use umbra_ffi::*;
use umbra_test_fixtures::{
    encode_check_result, fixture_shape, sample_circuit_ir, sample_key_material, sample_preimage,
};
use umbra_proof::{spend_circuit_shape, CircuitIr, KeyMaterial, SPEND_CIRCUIT_ID};

static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Decoded result envelope, as a host binding would read it.
#[derive(Debug)]
struct Envelope {
    ok: bool,
    code: u32,
    message: String,
    payload: Vec<u8>,
}

fn read_envelope(ptr: *mut u8) -> Envelope {
    assert!(!ptr.is_null(), "export returned null envelope");
    let envelope = unsafe {
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(std::slice::from_raw_parts(ptr, 4));
        let total_len = u32::from_be_bytes(len_bytes) as usize;
        let bytes = std::slice::from_raw_parts(ptr, total_len).to_vec();

        let ok = bytes[4] == 1;
        let code = u32::from_be_bytes(bytes[5..9].try_into().unwrap());
        let msg_len = u32::from_be_bytes(bytes[9..13].try_into().unwrap()) as usize;
        let message = String::from_utf8(bytes[13..13 + msg_len].to_vec()).unwrap();
        let payload_off = 13 + msg_len;
        let payload_len =
            u32::from_be_bytes(bytes[payload_off..payload_off + 4].try_into().unwrap()) as usize;
        let payload = bytes[payload_off + 4..payload_off + 4 + payload_len].to_vec();
        assert_eq!(payload_off + 4 + payload_len, total_len, "trailing bytes");
        Envelope {
            ok,
            code,
            message,
            payload,
        }
    };
    umbra_result_free(ptr);
    envelope
}

fn expect_ok(ptr: *mut u8) -> Vec<u8> {
    let envelope = read_envelope(ptr);
    assert!(
        envelope.ok,
        "expected success, got code {} ({})",
        envelope.code, envelope.message
    );
    assert_eq!(envelope.code, 0);
    envelope.payload
}

fn expect_err(ptr: *mut u8, code: u32) -> String {
    let envelope = read_envelope(ptr);
    assert!(!envelope.ok, "expected failure with code {}", code);
    assert_eq!(envelope.code, code, "message: {}", envelope.message);
    envelope.message
}

fn ensure_init() {
    // First test in wins; later calls see "already initialized".
    let ptr = umbra_init();
    let _ = read_envelope(ptr);
}

fn call_buf(f: extern "C" fn(*const u8, u32) -> *mut u8, buf: &[u8]) -> *mut u8 {
    f(buf.as_ptr(), buf.len() as u32)
}

fn handle_from(payload: &[u8]) -> u64 {
    u64::from_be_bytes(payload.try_into().expect("8-byte handle"))
}

fn sample_pk_handle() -> u64 {
    handle_from(&expect_ok(umbra_sample_coin_public_key()))
}

fn create_coin(value: u128) -> Vec<u8> {
    let token = expect_ok(umbra_native_token());
    let value_bytes = value.to_be_bytes();
    expect_ok(umbra_create_shielded_coin_info(
        token.as_ptr(),
        token.len() as u32,
        value_bytes.as_ptr(),
        value_bytes.len() as u32,
    ))
}

fn commitment_of(coin: &[u8], pk_handle: u64) -> Vec<u8> {
    expect_ok(umbra_coin_commitment(
        coin.as_ptr(),
        coin.len() as u32,
        pk_handle,
    ))
}

#[test]
fn abi_version_is_exported_raw() {
    assert_eq!(umbra_abi_version(), 1);
}

#[test]
fn scenario_a_coin_creation() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let coin_bytes = create_coin(100);
    let coin = CoinInfo::from_bytes(&coin_bytes).unwrap();
    assert_eq!(coin.token_type, native_token());
    assert_eq!(coin.value, 100);

    let second = CoinInfo::from_bytes(&create_coin(100)).unwrap();
    assert_eq!(second.value, 100);
    assert_ne!(coin.nonce, second.nonce, "nonce must differ across calls");
}

#[test]
fn scenario_b_commitment_determinism() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let coin = create_coin(500);
    let pk = sample_pk_handle();
    assert_eq!(commitment_of(&coin, pk), commitment_of(&coin, pk));

    let other_pk = sample_pk_handle();
    assert_ne!(
        commitment_of(&coin, pk),
        commitment_of(&coin, other_pk),
        "different receivers must commit differently"
    );
    expect_ok(umbra_release(pk));
    expect_ok(umbra_release(other_pk));
}

#[test]
fn scenario_c_accumulator_membership() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let pk = sample_pk_handle();
    let mut commitments = Vec::new();
    let mut indices = Vec::new();
    for value in [1u128, 2, 3] {
        let commitment = commitment_of(&create_coin(value), pk);
        let index = u64::from_be_bytes(
            expect_ok(umbra_accumulator_size()).try_into().unwrap(),
        );
        expect_ok(call_buf(umbra_accumulator_append, &commitment));
        commitments.push(commitment);
        indices.push(index);
    }
    let root = expect_ok(umbra_accumulator_root());

    for (commitment, index) in commitments.iter().zip(&indices) {
        let proof = expect_ok(umbra_accumulator_prove_membership(*index));
        let valid = expect_ok(umbra_accumulator_verify_membership(
            root.as_ptr(),
            root.len() as u32,
            commitment.as_ptr(),
            commitment.len() as u32,
            proof.as_ptr(),
            proof.len() as u32,
        ));
        assert_eq!(valid, vec![1], "appended commitment must verify");
    }

    // A non-appended commitment fails against the same proof set.
    let outsider = commitment_of(&create_coin(999), pk);
    let proof = expect_ok(umbra_accumulator_prove_membership(indices[0]));
    let valid = expect_ok(umbra_accumulator_verify_membership(
        root.as_ptr(),
        root.len() as u32,
        outsider.as_ptr(),
        outsider.len() as u32,
        proof.as_ptr(),
        proof.len() as u32,
    ));
    assert_eq!(valid, vec![0]);
    expect_ok(umbra_release(pk));
}

#[test]
fn scenario_d_truncated_check_result() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let bytes = encode_check_result(true, "fine");
    let truncated = &bytes[..bytes.len() - 3];
    expect_err(
        umbra_parse_check_result(truncated.as_ptr(), truncated.len() as u32),
        6, // MalformedResult
    );

    let payload = expect_ok(call_buf(umbra_parse_check_result, &bytes));
    assert_eq!(payload[0], 1);
}

#[test]
fn handle_safety_release_semantics() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let sk = handle_from(&expect_ok(umbra_sample_coin_secret_key()));
    expect_ok(umbra_release(sk));

    // Double release and use-after-release both report HandleNotFound.
    expect_err(umbra_release(sk), 7);
    let coin = create_coin(5);
    expect_err(
        umbra_coin_nullifier(coin.as_ptr(), coin.len() as u32, sk),
        7,
    );
}

#[test]
fn wrong_kind_handle_is_invalid_input() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let pk = sample_pk_handle();
    let coin = create_coin(5);
    // A public key where a secret key is expected.
    let message = expect_err(
        umbra_coin_nullifier(coin.as_ptr(), coin.len() as u32, pk),
        1,
    );
    assert!(message.contains("expected a coin secret key"));
    expect_ok(umbra_release(pk));
}

#[test]
fn value_overflow_reported() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let token = expect_ok(umbra_native_token());
    let too_big = ((u64::MAX as u128) + 1).to_be_bytes();
    expect_err(
        umbra_create_shielded_coin_info(
            token.as_ptr(),
            token.len() as u32,
            too_big.as_ptr(),
            too_big.len() as u32,
        ),
        4, // ValueOverflow
    );
}

#[test]
fn malformed_coin_buffer_rejected() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let pk = sample_pk_handle();
    let garbage = [0xABu8; 17];
    expect_err(
        umbra_coin_commitment(garbage.as_ptr(), garbage.len() as u32, pk),
        1, // InvalidInput
    );
    expect_ok(umbra_release(pk));
}

#[test]
fn null_input_with_length_rejected() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    expect_err(umbra_parse_check_result(std::ptr::null(), 12), 1);
}

#[test]
fn proving_payload_round_trip_and_determinism() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let preimage_bytes = sample_preimage().to_bytes();
    let km_bytes = sample_key_material().to_bytes();

    let preimage = handle_from(&expect_ok(call_buf(umbra_preimage_from_bytes, &preimage_bytes)));
    let km = handle_from(&expect_ok(call_buf(umbra_key_material_from_bytes, &km_bytes)));

    let p1 = handle_from(&expect_ok(umbra_create_proving_payload(
        preimage,
        std::ptr::null(),
        0,
        km,
    )));
    let p2 = handle_from(&expect_ok(umbra_create_proving_payload(
        preimage,
        std::ptr::null(),
        0,
        km,
    )));
    let bytes1 = expect_ok(umbra_payload_bytes(p1));
    let bytes2 = expect_ok(umbra_payload_bytes(p2));
    assert_eq!(bytes1, bytes2, "payload assembly must be byte-identical");

    // Overriding the binding input changes the payload.
    let binding = [1u8; 32];
    let p3 = handle_from(&expect_ok(umbra_create_proving_payload(
        preimage,
        binding.as_ptr(),
        32,
        km,
    )));
    assert_ne!(expect_ok(umbra_payload_bytes(p3)), bytes1);

    for handle in [p1, p2, p3, preimage, km] {
        expect_ok(umbra_release(handle));
    }
}

#[test]
fn check_payload_shape_mismatch_reported() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let preimage_bytes = sample_preimage().to_bytes();
    let mut wrong_shape = fixture_shape();
    wrong_shape.public_input_count += 1;
    let ir_bytes = CircuitIr::new("umbra/test", wrong_shape, vec![0x5A; 16]).to_bytes();

    let preimage = handle_from(&expect_ok(call_buf(umbra_preimage_from_bytes, &preimage_bytes)));
    let ir = handle_from(&expect_ok(call_buf(umbra_circuit_ir_from_bytes, &ir_bytes)));

    expect_err(umbra_create_check_payload(preimage, ir), 3); // ShapeMismatch

    // A matching IR succeeds.
    let good_ir_bytes = sample_circuit_ir().to_bytes();
    let good_ir = handle_from(&expect_ok(call_buf(umbra_circuit_ir_from_bytes, &good_ir_bytes)));
    let check = handle_from(&expect_ok(umbra_create_check_payload(preimage, good_ir)));
    assert!(!expect_ok(umbra_payload_bytes(check)).is_empty());

    for handle in [preimage, ir, good_ir, check] {
        expect_ok(umbra_release(handle));
    }
}

#[test]
fn concurrent_host_threads_share_the_engine() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let before = u64::from_be_bytes(expect_ok(umbra_accumulator_size()).try_into().unwrap());

    // A multi-threaded host: each thread runs the coin -> commitment ->
    // append pipeline against the shared handle table and accumulator.
    let workers: Vec<_> = (0..4u128)
        .map(|worker| {
            std::thread::spawn(move || {
                let pk = sample_pk_handle();
                for v in 0..5u128 {
                    let coin = create_coin(worker * 100 + v);
                    let commitment = commitment_of(&coin, pk);
                    expect_ok(call_buf(umbra_accumulator_append, &commitment));
                }
                expect_ok(umbra_release(pk));
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker thread must not panic");
    }

    let after = u64::from_be_bytes(expect_ok(umbra_accumulator_size()).try_into().unwrap());
    assert_eq!(after, before + 20);
}

#[test]
fn spend_flow_across_the_boundary() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    // Wallet side: own coin, commitment under our own key, appended.
    let coin = create_coin(750);
    let sk = handle_from(&expect_ok(umbra_sample_coin_secret_key()));
    let pk = handle_from(&expect_ok(umbra_coin_public_key(sk)));
    let commitment = commitment_of(&coin, pk);

    let index = u64::from_be_bytes(expect_ok(umbra_accumulator_size()).try_into().unwrap());
    expect_ok(call_buf(umbra_accumulator_append, &commitment));
    let root = expect_ok(umbra_accumulator_root());
    let proof = expect_ok(umbra_accumulator_prove_membership(index));

    // Statement assembly and payload build, all via handles.
    let preimage = handle_from(&expect_ok(umbra_spend_preimage(
        coin.as_ptr(),
        coin.len() as u32,
        sk,
        root.as_ptr(),
        root.len() as u32,
        proof.as_ptr(),
        proof.len() as u32,
    )));

    let km_bytes = KeyMaterial::new(SPEND_CIRCUIT_ID, spend_circuit_shape(), vec![0xC3; 64])
        .to_bytes();
    let km = handle_from(&expect_ok(call_buf(umbra_key_material_from_bytes, &km_bytes)));
    let payload = handle_from(&expect_ok(umbra_create_proving_payload(
        preimage,
        std::ptr::null(),
        0,
        km,
    )));
    assert!(!expect_ok(umbra_payload_bytes(payload)).is_empty());

    // A spend under someone else's key must fail the membership binding.
    let thief = handle_from(&expect_ok(umbra_sample_coin_secret_key()));
    expect_err(
        umbra_spend_preimage(
            coin.as_ptr(),
            coin.len() as u32,
            thief,
            root.as_ptr(),
            root.len() as u32,
            proof.as_ptr(),
            proof.len() as u32,
        ),
        8, // CryptoFailure
    );

    for handle in [sk, pk, preimage, km, payload, thief] {
        expect_ok(umbra_release(handle));
    }
}

#[test]
fn uninitialized_engine_reports_internal_error() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    // Tear down, observe the definite failure, then restore for the
    // remaining tests.
    expect_ok(umbra_teardown());
    let message = expect_err(umbra_accumulator_root(), 9);
    assert!(message.contains("umbra_init"));
    expect_ok(umbra_init());
}

#[test]
fn teardown_invalidates_handles() {
    let _guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    ensure_init();

    let sk = handle_from(&expect_ok(umbra_sample_coin_secret_key()));
    expect_ok(umbra_teardown());
    expect_ok(umbra_init());
    // The new context has a fresh table; the old handle is dead.
    expect_err(umbra_release(sk), 7);
}
