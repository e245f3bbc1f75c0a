//! Proving and check payload assembly.
//!
//! Payloads are the serialized requests handed to the external prover
//! and verifier. Assembly validates shape agreement first; the resulting
//! bytes are a pure function of the inputs, so equal `(preimage, key
//! material)` pairs produce byte-identical payloads on every platform.

use tracing::debug;
use umbra_common::codec::Writer;
use umbra_common::{CoreError, CoreResult};
use umbra_primitives::encoding::base_to_bytes;
use umbra_primitives::Base;

use crate::artifacts::{CircuitIr, CircuitShape, KeyMaterial};
use crate::preimage::ProofPreimage;

const PROVING_PAYLOAD_MAGIC: &[u8; 4] = b"UPRV";
const CHECK_PAYLOAD_MAGIC: &[u8; 4] = b"UCHK";

/// Payload format version; part of the external prover contract.
pub const PAYLOAD_VERSION: u8 = 1;

/// A serialized proof-generation request. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvingPayload {
    bytes: Vec<u8>,
}

impl ProvingPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A serialized proof-verification request. Carries no witness data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckPayload {
    bytes: Vec<u8>,
}

impl CheckPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Build a proving payload from a preimage and prover key material.
///
/// `overwrite_binding_input`, when present, replaces the preimage's
/// binding input before assembly. This is the transaction-balancing hook used
/// when the enclosing transaction fixes the binding after the preimage
/// was assembled.
pub fn create_proving_payload(
    preimage: &ProofPreimage,
    overwrite_binding_input: Option<Base>,
    key_material: &KeyMaterial,
) -> CoreResult<ProvingPayload> {
    preimage.validate()?;
    ensure_shape_agreement(
        preimage,
        &key_material.circuit_id,
        key_material.shape,
        "key material",
    )?;

    let binding = overwrite_binding_input.unwrap_or(preimage.binding_input);

    let mut w = Writer::new();
    w.write_raw(PROVING_PAYLOAD_MAGIC);
    w.write_u8(PAYLOAD_VERSION);
    w.write_var_bytes(preimage.circuit_id.as_bytes());
    preimage.shape.write(&mut w);
    w.write_array32(&key_material.fingerprint());
    w.write_array32(&base_to_bytes(&binding));
    write_elements(&mut w, &preimage.public_inputs);
    write_elements(&mut w, &preimage.witness);

    debug!(
        circuit = %preimage.circuit_id,
        len = w.len(),
        "assembled proving payload"
    );
    Ok(ProvingPayload {
        bytes: w.into_bytes(),
    })
}

/// Build a check payload from a preimage and the circuit IR.
///
/// The verification side never needs the proving key, and the witness is
/// deliberately not serialized; a check payload may leave the device.
pub fn create_check_payload(
    preimage: &ProofPreimage,
    ir: &CircuitIr,
) -> CoreResult<CheckPayload> {
    preimage.validate()?;
    ensure_shape_agreement(preimage, &ir.circuit_id, ir.shape, "circuit IR")?;

    let mut w = Writer::new();
    w.write_raw(CHECK_PAYLOAD_MAGIC);
    w.write_u8(PAYLOAD_VERSION);
    w.write_var_bytes(preimage.circuit_id.as_bytes());
    preimage.shape.write(&mut w);
    w.write_array32(&ir.fingerprint());
    w.write_array32(&base_to_bytes(&preimage.binding_input));
    write_elements(&mut w, &preimage.public_inputs);

    debug!(
        circuit = %preimage.circuit_id,
        len = w.len(),
        "assembled check payload"
    );
    Ok(CheckPayload {
        bytes: w.into_bytes(),
    })
}

fn ensure_shape_agreement(
    preimage: &ProofPreimage,
    circuit_id: &str,
    shape: CircuitShape,
    what: &str,
) -> CoreResult<()> {
    if preimage.circuit_id != circuit_id {
        return Err(CoreError::ShapeMismatch(format!(
            "preimage is for circuit '{}' but {} is for '{}'",
            preimage.circuit_id, what, circuit_id
        )));
    }
    if preimage.shape != shape {
        return Err(CoreError::ShapeMismatch(format!(
            "preimage shape {:?} does not match {} shape {:?}",
            preimage.shape, what, shape
        )));
    }
    Ok(())
}

fn write_elements(w: &mut Writer, elements: &[Base]) {
    w.write_u32_be(elements.len() as u32);
    for element in elements {
        w.write_array32(&base_to_bytes(element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> CircuitShape {
        CircuitShape {
            k: 14,
            public_input_count: 2,
            witness_count: 2,
        }
    }

    fn preimage() -> ProofPreimage {
        ProofPreimage {
            circuit_id: "umbra/test".into(),
            shape: shape(),
            public_inputs: vec![Base::from(10u64), Base::from(11u64)],
            witness: vec![Base::from(20u64), Base::from(21u64)],
            binding_input: Base::from(30u64),
        }
    }

    fn key_material() -> KeyMaterial {
        KeyMaterial::new("umbra/test", shape(), vec![0xAA; 64])
    }

    fn ir() -> CircuitIr {
        CircuitIr::new("umbra/test", shape(), vec![0xBB; 48])
    }

    #[test]
    fn proving_payload_is_byte_identical_across_calls() {
        let a = create_proving_payload(&preimage(), None, &key_material()).unwrap();
        let b = create_proving_payload(&preimage(), None, &key_material()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn binding_override_changes_payload() {
        let plain = create_proving_payload(&preimage(), None, &key_material()).unwrap();
        let overridden =
            create_proving_payload(&preimage(), Some(Base::from(99u64)), &key_material()).unwrap();
        assert_ne!(plain.as_bytes(), overridden.as_bytes());
    }

    #[test]
    fn shape_mismatch_on_wrong_arity() {
        let km = KeyMaterial::new(
            "umbra/test",
            CircuitShape {
                k: 14,
                public_input_count: 3,
                witness_count: 2,
            },
            vec![0xAA; 64],
        );
        assert!(matches!(
            create_proving_payload(&preimage(), None, &km).unwrap_err(),
            CoreError::ShapeMismatch(_)
        ));
    }

    #[test]
    fn shape_mismatch_on_wrong_circuit() {
        let km = KeyMaterial::new("umbra/other", shape(), vec![0xAA; 64]);
        assert!(matches!(
            create_proving_payload(&preimage(), None, &km).unwrap_err(),
            CoreError::ShapeMismatch(_)
        ));
    }

    #[test]
    fn check_payload_shape_mismatch() {
        let bad_ir = CircuitIr::new(
            "umbra/test",
            CircuitShape {
                k: 15,
                public_input_count: 2,
                witness_count: 2,
            },
            vec![],
        );
        assert!(matches!(
            create_check_payload(&preimage(), &bad_ir).unwrap_err(),
            CoreError::ShapeMismatch(_)
        ));
    }

    #[test]
    fn check_payload_omits_witness_bytes() {
        let payload = create_check_payload(&preimage(), &ir()).unwrap();
        let witness_bytes = base_to_bytes(&Base::from(20u64));
        assert!(!payload
            .as_bytes()
            .windows(32)
            .any(|window| window == witness_bytes));
    }

    #[test]
    fn proving_payload_embeds_key_fingerprint() {
        let km = key_material();
        let payload = create_proving_payload(&preimage(), None, &km).unwrap();
        assert!(payload
            .as_bytes()
            .windows(32)
            .any(|window| window == km.fingerprint()));
    }
}
