//! Proof payload assembly and verification-result parsing.
//!
//! This crate owns the data contracts around the external prover: it
//! assembles spend/output statement preimages from wallet-facing types
//! ([`spend_preimage`], [`output_preimage`]), turns a witness-bearing
//! [`ProofPreimage`] plus prover [`KeyMaterial`] into a
//! [`ProvingPayload`], the witness-free analog into a [`CheckPayload`]
//! against a verifier [`CircuitIr`], and parses the verifier's raw
//! output into a [`CheckResult`]. It does not run the proving
//! algorithm.
//!
//! Every artifact carries a magic tag, a format version, and the circuit
//! shape it was built for; assembly validates the preimage's declared
//! shape against the key material's (or IR's) before serializing, and
//! identical inputs produce byte-identical payloads on every platform.

mod artifacts;
mod check_result;
mod payload;
mod preimage;
mod statement;

pub use artifacts::{CircuitIr, CircuitShape, KeyMaterial};
pub use check_result::{parse_check_result, CheckResult};
pub use payload::{
    create_check_payload, create_proving_payload, CheckPayload, ProvingPayload, PAYLOAD_VERSION,
};
pub use preimage::ProofPreimage;
pub use statement::{
    output_circuit_shape, output_preimage, spend_circuit_shape, spend_preimage,
    OUTPUT_CIRCUIT_ID, SPEND_CIRCUIT_ID,
};
