//! Proof preimages: the witness and public-input bundle for a circuit.

use umbra_common::codec::{Reader, Writer};
use umbra_common::{CoreError, CoreResult};
use umbra_primitives::encoding::{base_from_bytes, base_to_bytes};
use umbra_primitives::Base;

use crate::artifacts::{expect_magic, expect_version, read_circuit_id, CircuitShape};

const PREIMAGE_MAGIC: &[u8; 4] = b"UPRE";

/// Witness + public inputs assembled for one proving request.
///
/// Consumed once to build a payload; the declared shape must match the
/// key material (or IR) it is paired with.
#[derive(Clone, Debug)]
pub struct ProofPreimage {
    pub circuit_id: String,
    pub shape: CircuitShape,
    pub public_inputs: Vec<Base>,
    pub witness: Vec<Base>,
    pub binding_input: Base,
}

impl ProofPreimage {
    /// Fail unless the element vectors match the declared shape.
    ///
    /// A preimage whose own declaration is inconsistent is invalid input
    /// long before any pairing question arises.
    pub fn validate(&self) -> CoreResult<()> {
        if self.public_inputs.len() != self.shape.public_input_count as usize {
            return Err(CoreError::InvalidInput(format!(
                "preimage declares {} public inputs but carries {}",
                self.shape.public_input_count,
                self.public_inputs.len()
            )));
        }
        if self.witness.len() != self.shape.witness_count as usize {
            return Err(CoreError::InvalidInput(format!(
                "preimage declares {} witness elements but carries {}",
                self.shape.witness_count,
                self.witness.len()
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_raw(PREIMAGE_MAGIC);
        w.write_u8(crate::artifacts::ARTIFACT_VERSION);
        w.write_var_bytes(self.circuit_id.as_bytes());
        self.shape.write(&mut w);
        w.write_u32_be(self.public_inputs.len() as u32);
        for element in &self.public_inputs {
            w.write_array32(&base_to_bytes(element));
        }
        w.write_u32_be(self.witness.len() as u32);
        for element in &self.witness {
            w.write_array32(&base_to_bytes(element));
        }
        w.write_array32(&base_to_bytes(&self.binding_input));
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let mut r = Reader::new(bytes);
        expect_magic(&mut r, PREIMAGE_MAGIC, "preimage")?;
        expect_version(&mut r, "preimage")?;
        let circuit_id = read_circuit_id(&mut r)?;
        let shape = CircuitShape::read(&mut r)?;
        let public_inputs = read_elements(&mut r)?;
        let witness = read_elements(&mut r)?;
        let binding_input = base_from_bytes(&r.read_array32()?)?;
        r.finish()?;
        let preimage = ProofPreimage {
            circuit_id,
            shape,
            public_inputs,
            witness,
            binding_input,
        };
        preimage.validate()?;
        Ok(preimage)
    }
}

fn read_elements(r: &mut Reader<'_>) -> CoreResult<Vec<Base>> {
    let count = r.read_u32_be()? as usize;
    // Bound before allocating: each element still has to be present in
    // the buffer, so an absurd count is just a truncation in disguise.
    if count.checked_mul(32).map_or(true, |need| need > r.remaining()) {
        return Err(CoreError::InvalidInput(format!(
            "element count {} exceeds remaining buffer",
            count
        )));
    }
    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        elements.push(base_from_bytes(&r.read_array32()?)?);
    }
    Ok(elements)
}
