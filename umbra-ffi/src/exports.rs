//! The `umbra_*` export catalog.
//!
//! Every export follows the same shape: decode the input buffers into
//! typed core values, invoke the core operation, encode the result into
//! the envelope payload (or register it in the handle table and return
//! the 8-byte handle). All of it runs inside a panic guard; a fault in
//! the core becomes an `InternalError` envelope, never an unwind across
//! the boundary.
//!
//! Pure constant operations (token tags, parsing) work without an
//! initialized context; anything touching the handle table or the
//! accumulator requires `umbra_init` first.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice;

use rand::rngs::OsRng;
use tracing::debug;
use umbra_accumulator::{verify_membership, MembershipProof};
use umbra_coin::{
    address_from_key, coin_commitment, coin_nullifier, create_shielded_coin_info, fee_token,
    native_token, shielded_token, unshielded_token, CoinInfo, CoinPublicKey, CoinSecretKey,
    EncryptionSecretKey, TokenType,
};
use umbra_common::codec::Writer;
use umbra_common::{CoreError, CoreResult};
use umbra_crypto::Commitment;
use umbra_primitives::encoding::base_from_bytes;
use umbra_proof::{
    create_check_payload, create_proving_payload, output_preimage, parse_check_result,
    spend_preimage, CircuitIr, KeyMaterial, ProofPreimage,
};

use crate::context::context;
use crate::envelope::{envelope_err, envelope_ok};
use crate::handle::{HandleObject, HandleTable};

/// Run a fallible core closure behind the panic guard and build the
/// envelope.
fn guarded(f: impl FnOnce() -> CoreResult<Vec<u8>>) -> *mut u8 {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(payload)) => envelope_ok(&payload),
        Ok(Err(err)) => envelope_err(&err),
        Err(_) => envelope_err(&CoreError::InternalError(
            "unexpected fault inside core call".into(),
        )),
    }
}

/// View a host input buffer. Null with nonzero length is `InvalidInput`;
/// a zero-length buffer is an empty slice regardless of pointer.
fn input_slice<'a>(ptr: *const u8, len: u32, what: &str) -> CoreResult<&'a [u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(CoreError::InvalidInput(format!(
            "null pointer for {} ({} bytes declared)",
            what, len
        )));
    }
    // SAFETY: caller contract: ptr points at len readable bytes for the
    // duration of the call.
    Ok(unsafe { slice::from_raw_parts(ptr, len as usize) })
}

fn array32(bytes: &[u8], what: &str) -> CoreResult<[u8; 32]> {
    bytes.try_into().map_err(|_| {
        CoreError::InvalidInput(format!("{} must be 32 bytes, got {}", what, bytes.len()))
    })
}

fn handle_payload(handle: u64) -> Vec<u8> {
    handle.to_be_bytes().to_vec()
}

fn insert_object(object: HandleObject) -> CoreResult<Vec<u8>> {
    let ctx = context()?;
    let handle = ctx.handles().insert(object);
    Ok(handle_payload(handle))
}

fn get_secret_key(table: &HandleTable, handle: u64) -> CoreResult<CoinSecretKey> {
    match table.get(handle)? {
        HandleObject::CoinSecretKey(sk) => Ok(sk.clone()),
        other => Err(wrong_kind(handle, other.kind(), "coin secret key")),
    }
}

fn get_coin_public_key(table: &HandleTable, handle: u64) -> CoreResult<CoinPublicKey> {
    match table.get(handle)? {
        HandleObject::CoinPublicKey(pk) => Ok(*pk),
        other => Err(wrong_kind(handle, other.kind(), "coin public key")),
    }
}

fn wrong_kind(handle: u64, found: &str, expected: &str) -> CoreError {
    CoreError::InvalidInput(format!(
        "handle {:#018x} holds a {}, expected a {}",
        handle, found, expected
    ))
}

/// Version of the boundary ABI: envelope layout, handle packing, and
/// the canonical encodings. Host bindings check this before anything
/// else.
pub const ABI_VERSION: u32 = 1;

/// The one export that returns a raw value instead of an envelope, since a
/// host must be able to read it before trusting the envelope layout.
#[no_mangle]
pub extern "C" fn umbra_abi_version() -> u32 {
    ABI_VERSION
}

// === Token tags ===

#[no_mangle]
pub extern "C" fn umbra_native_token() -> *mut u8 {
    guarded(|| Ok(native_token().to_bytes().to_vec()))
}

#[no_mangle]
pub extern "C" fn umbra_fee_token() -> *mut u8 {
    guarded(|| Ok(fee_token().to_bytes().to_vec()))
}

#[no_mangle]
pub extern "C" fn umbra_shielded_token() -> *mut u8 {
    guarded(|| Ok(shielded_token().to_bytes().to_vec()))
}

#[no_mangle]
pub extern "C" fn umbra_unshielded_token() -> *mut u8 {
    guarded(|| Ok(unshielded_token().to_bytes().to_vec()))
}

// === Coin model ===

/// Create a coin with a freshly sampled nonce.
///
/// `value` is a 16-byte big-endian unsigned integer.
#[no_mangle]
pub extern "C" fn umbra_create_shielded_coin_info(
    token_type_ptr: *const u8,
    token_type_len: u32,
    value_ptr: *const u8,
    value_len: u32,
) -> *mut u8 {
    guarded(|| {
        let token_bytes = input_slice(token_type_ptr, token_type_len, "token type")?;
        let token_type = TokenType::from_bytes(token_bytes)?;

        let value_bytes = input_slice(value_ptr, value_len, "coin value")?;
        let value_arr: [u8; 16] = value_bytes.try_into().map_err(|_| {
            CoreError::InvalidInput(format!(
                "coin value must be 16 bytes big-endian, got {}",
                value_bytes.len()
            ))
        })?;
        let value = u128::from_be_bytes(value_arr);

        let coin = create_shielded_coin_info(&mut OsRng, token_type, value)?;
        Ok(coin.to_bytes())
    })
}

/// Commitment to a coin under a receiving key handle.
#[no_mangle]
pub extern "C" fn umbra_coin_commitment(
    coin_info_ptr: *const u8,
    coin_info_len: u32,
    public_key_handle: u64,
) -> *mut u8 {
    guarded(|| {
        let coin = CoinInfo::from_bytes(input_slice(coin_info_ptr, coin_info_len, "coin info")?)?;
        let ctx = context()?;
        let pk = get_coin_public_key(&ctx.handles(), public_key_handle)?;
        Ok(coin_commitment(&coin, &pk).to_bytes().to_vec())
    })
}

/// Nullifier for a coin under a spending key handle.
#[no_mangle]
pub extern "C" fn umbra_coin_nullifier(
    coin_info_ptr: *const u8,
    coin_info_len: u32,
    secret_key_handle: u64,
) -> *mut u8 {
    guarded(|| {
        let coin = CoinInfo::from_bytes(input_slice(coin_info_ptr, coin_info_len, "coin info")?)?;
        let ctx = context()?;
        let sk = get_secret_key(&ctx.handles(), secret_key_handle)?;
        Ok(coin_nullifier(&coin, &sk).to_bytes().to_vec())
    })
}

// === Keys and addresses ===

/// Sample a spending key; returns its handle.
#[no_mangle]
pub extern "C" fn umbra_sample_coin_secret_key() -> *mut u8 {
    guarded(|| {
        let sk = CoinSecretKey::random(&mut OsRng);
        insert_object(HandleObject::CoinSecretKey(sk))
    })
}

/// Derive the public key behind a secret-key handle; returns a new
/// public-key handle.
#[no_mangle]
pub extern "C" fn umbra_coin_public_key(secret_key_handle: u64) -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        let pk = {
            let handles = ctx.handles();
            get_secret_key(&handles, secret_key_handle)?.public_key()
        };
        insert_object(HandleObject::CoinPublicKey(pk))
    })
}

/// Sample a fresh coin public key (test receivers); the secret side is
/// discarded.
#[no_mangle]
pub extern "C" fn umbra_sample_coin_public_key() -> *mut u8 {
    guarded(|| {
        let pk = CoinSecretKey::random(&mut OsRng).public_key();
        insert_object(HandleObject::CoinPublicKey(pk))
    })
}

/// Sample a fresh encryption public key; the secret side is discarded.
#[no_mangle]
pub extern "C" fn umbra_sample_encryption_public_key() -> *mut u8 {
    guarded(|| {
        let pk = EncryptionSecretKey::random(&mut OsRng).public_key();
        insert_object(HandleObject::EncryptionPublicKey(pk))
    })
}

/// Canonical 32-byte encoding of a public-key handle (coin or
/// encryption).
#[no_mangle]
pub extern "C" fn umbra_public_key_bytes(public_key_handle: u64) -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        let handles = ctx.handles();
        match handles.get(public_key_handle)? {
            HandleObject::CoinPublicKey(pk) => Ok(pk.to_bytes().to_vec()),
            HandleObject::EncryptionPublicKey(pk) => Ok(pk.to_bytes().to_vec()),
            other => Err(wrong_kind(public_key_handle, other.kind(), "public key")),
        }
    })
}

/// Address derived from a coin public-key handle.
#[no_mangle]
pub extern "C" fn umbra_address_from_key(public_key_handle: u64) -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        let pk = get_coin_public_key(&ctx.handles(), public_key_handle)?;
        Ok(address_from_key(&pk).0.to_vec())
    })
}

// === Proof subsystem ===

/// Decode a proof preimage; returns its handle.
#[no_mangle]
pub extern "C" fn umbra_preimage_from_bytes(ptr: *const u8, len: u32) -> *mut u8 {
    guarded(|| {
        let preimage = ProofPreimage::from_bytes(input_slice(ptr, len, "preimage")?)?;
        insert_object(HandleObject::Preimage(preimage))
    })
}

/// Decode prover key material; returns its handle.
#[no_mangle]
pub extern "C" fn umbra_key_material_from_bytes(ptr: *const u8, len: u32) -> *mut u8 {
    guarded(|| {
        let km = KeyMaterial::from_bytes(input_slice(ptr, len, "key material")?)?;
        debug!(circuit = %km.circuit_id, "key material registered");
        insert_object(HandleObject::KeyMaterial(km))
    })
}

/// Decode a circuit IR; returns its handle.
#[no_mangle]
pub extern "C" fn umbra_circuit_ir_from_bytes(ptr: *const u8, len: u32) -> *mut u8 {
    guarded(|| {
        let ir = CircuitIr::from_bytes(input_slice(ptr, len, "circuit IR")?)?;
        insert_object(HandleObject::CircuitIr(ir))
    })
}

/// Assemble a proving payload; returns its handle.
///
/// `binding` is optional: zero length means "keep the preimage's binding
/// input", otherwise it must be a canonical 32-byte field element that
/// overwrites it.
#[no_mangle]
pub extern "C" fn umbra_create_proving_payload(
    preimage_handle: u64,
    binding_ptr: *const u8,
    binding_len: u32,
    key_material_handle: u64,
) -> *mut u8 {
    guarded(|| {
        let binding_bytes = input_slice(binding_ptr, binding_len, "binding input")?;
        let overwrite_binding = if binding_bytes.is_empty() {
            None
        } else {
            Some(base_from_bytes(&array32(binding_bytes, "binding input")?)?)
        };

        let ctx = context()?;
        let payload = {
            let handles = ctx.handles();
            let preimage = match handles.get(preimage_handle)? {
                HandleObject::Preimage(p) => p,
                other => {
                    return Err(wrong_kind(preimage_handle, other.kind(), "proof preimage"))
                }
            };
            let key_material = match handles.get(key_material_handle)? {
                HandleObject::KeyMaterial(km) => km,
                other => {
                    return Err(wrong_kind(key_material_handle, other.kind(), "key material"))
                }
            };
            create_proving_payload(preimage, overwrite_binding, key_material)?
        };
        insert_object(HandleObject::ProvingPayload(payload))
    })
}

/// Assemble a check payload; returns its handle.
#[no_mangle]
pub extern "C" fn umbra_create_check_payload(preimage_handle: u64, ir_handle: u64) -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        let payload = {
            let handles = ctx.handles();
            let preimage = match handles.get(preimage_handle)? {
                HandleObject::Preimage(p) => p,
                other => {
                    return Err(wrong_kind(preimage_handle, other.kind(), "proof preimage"))
                }
            };
            let ir = match handles.get(ir_handle)? {
                HandleObject::CircuitIr(ir) => ir,
                other => return Err(wrong_kind(ir_handle, other.kind(), "circuit IR")),
            };
            create_check_payload(preimage, ir)?
        };
        insert_object(HandleObject::CheckPayload(payload))
    })
}

/// Assemble a spend-statement preimage from a coin, a spending-key
/// handle, the accumulator root the proof was generated against, and a
/// membership proof in canonical encoding; returns a preimage handle.
#[no_mangle]
pub extern "C" fn umbra_spend_preimage(
    coin_info_ptr: *const u8,
    coin_info_len: u32,
    secret_key_handle: u64,
    root_ptr: *const u8,
    root_len: u32,
    proof_ptr: *const u8,
    proof_len: u32,
) -> *mut u8 {
    guarded(|| {
        let coin = CoinInfo::from_bytes(input_slice(coin_info_ptr, coin_info_len, "coin info")?)?;
        let root = base_from_bytes(&array32(input_slice(root_ptr, root_len, "root")?, "root")?)?;
        let proof = MembershipProof::from_bytes(input_slice(proof_ptr, proof_len, "proof")?)?;

        let ctx = context()?;
        let preimage = {
            let handles = ctx.handles();
            let sk = get_secret_key(&handles, secret_key_handle)?;
            spend_preimage(&coin, &sk, root, &proof)?
        };
        insert_object(HandleObject::Preimage(preimage))
    })
}

/// Assemble an output-statement preimage for a coin and a receiver key
/// handle; returns a preimage handle.
#[no_mangle]
pub extern "C" fn umbra_output_preimage(
    coin_info_ptr: *const u8,
    coin_info_len: u32,
    public_key_handle: u64,
) -> *mut u8 {
    guarded(|| {
        let coin = CoinInfo::from_bytes(input_slice(coin_info_ptr, coin_info_len, "coin info")?)?;
        let ctx = context()?;
        let preimage = {
            let handles = ctx.handles();
            let pk = get_coin_public_key(&handles, public_key_handle)?;
            output_preimage(&coin, &pk)?
        };
        insert_object(HandleObject::Preimage(preimage))
    })
}

/// Serialized bytes of a proving or check payload handle.
#[no_mangle]
pub extern "C" fn umbra_payload_bytes(payload_handle: u64) -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        let handles = ctx.handles();
        match handles.get(payload_handle)? {
            HandleObject::ProvingPayload(p) => Ok(p.as_bytes().to_vec()),
            HandleObject::CheckPayload(p) => Ok(p.as_bytes().to_vec()),
            other => Err(wrong_kind(payload_handle, other.kind(), "payload")),
        }
    })
}

/// Parse a verifier result buffer.
///
/// Payload: `[accepted: u8][diag_len: u32 BE][diag]`.
#[no_mangle]
pub extern "C" fn umbra_parse_check_result(ptr: *const u8, len: u32) -> *mut u8 {
    guarded(|| {
        let result = parse_check_result(input_slice(ptr, len, "check result")?)?;
        let diagnostic = result.diagnostic.unwrap_or_default();
        let mut w = Writer::with_capacity(1 + 4 + diagnostic.len());
        w.write_u8(u8::from(result.accepted));
        w.write_var_bytes(diagnostic.as_bytes());
        Ok(w.into_bytes())
    })
}

// === Accumulator ===

/// Append a commitment; payload is the new 32-byte root.
#[no_mangle]
pub extern "C" fn umbra_accumulator_append(commitment_ptr: *const u8, commitment_len: u32) -> *mut u8 {
    guarded(|| {
        let bytes = array32(
            input_slice(commitment_ptr, commitment_len, "commitment")?,
            "commitment",
        )?;
        let commitment = Commitment::from_bytes(&bytes)?;
        let ctx = context()?;
        let new_root = ctx.accumulator().append(commitment.inner())?;
        Ok(umbra_primitives::encoding::base_to_bytes(&new_root).to_vec())
    })
}

/// Current 32-byte accumulator root.
#[no_mangle]
pub extern "C" fn umbra_accumulator_root() -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        let root = ctx.accumulator().root();
        Ok(umbra_primitives::encoding::base_to_bytes(&root).to_vec())
    })
}

/// Number of appended leaves, as 8 bytes big-endian.
#[no_mangle]
pub extern "C" fn umbra_accumulator_size() -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        let size = ctx.accumulator().size();
        Ok(size.to_be_bytes().to_vec())
    })
}

/// Membership proof for the leaf appended at `index`, in canonical
/// encoding.
#[no_mangle]
pub extern "C" fn umbra_accumulator_prove_membership(index: u64) -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        let proof = ctx.accumulator().prove_membership(index)?;
        Ok(proof.to_bytes())
    })
}

/// Verify a membership proof against a root; payload is one byte, 1 for
/// valid.
#[no_mangle]
pub extern "C" fn umbra_accumulator_verify_membership(
    root_ptr: *const u8,
    root_len: u32,
    leaf_ptr: *const u8,
    leaf_len: u32,
    proof_ptr: *const u8,
    proof_len: u32,
) -> *mut u8 {
    guarded(|| {
        let root = base_from_bytes(&array32(input_slice(root_ptr, root_len, "root")?, "root")?)?;
        let leaf = base_from_bytes(&array32(input_slice(leaf_ptr, leaf_len, "leaf")?, "leaf")?)?;
        let proof = MembershipProof::from_bytes(input_slice(proof_ptr, proof_len, "proof")?)?;
        let valid = verify_membership(root, leaf, &proof);
        Ok(vec![u8::from(valid)])
    })
}

// === Handle lifecycle ===

/// Release a handle, dropping (and for secret keys, zeroizing) the
/// object. Double release reports `HandleNotFound`.
#[no_mangle]
pub extern "C" fn umbra_release(handle: u64) -> *mut u8 {
    guarded(|| {
        let ctx = context()?;
        ctx.handles().release(handle)?;
        Ok(Vec::new())
    })
}
