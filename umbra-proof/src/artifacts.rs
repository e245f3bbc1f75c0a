//! Prover and verifier artifacts: circuit shapes, key material, IR.

use umbra_common::codec::{Reader, Writer};
use umbra_common::{CoreError, CoreResult};

const KEY_MATERIAL_MAGIC: &[u8; 4] = b"UKEY";
const CIRCUIT_IR_MAGIC: &[u8; 4] = b"UIR\0";

/// Artifact format version; bumped on any wire change.
pub(crate) const ARTIFACT_VERSION: u8 = 1;

/// The shape a circuit expects of its inputs.
///
/// Two artifacts agree on a shape only if every field matches; the
/// circuit id is checked separately so mismatches get a precise message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitShape {
    /// Log2 circuit size parameter.
    pub k: u32,
    /// Number of public inputs the circuit exposes.
    pub public_input_count: u32,
    /// Number of private witness elements the circuit consumes.
    pub witness_count: u32,
}

impl CircuitShape {
    pub(crate) fn write(&self, w: &mut Writer) {
        w.write_u32_be(self.k);
        w.write_u32_be(self.public_input_count);
        w.write_u32_be(self.witness_count);
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> CoreResult<Self> {
        Ok(CircuitShape {
            k: r.read_u32_be()?,
            public_input_count: r.read_u32_be()?,
            witness_count: r.read_u32_be()?,
        })
    }
}

/// Prover-side artifact: the proving key plus the shape it was keyed for.
#[derive(Clone, Debug)]
pub struct KeyMaterial {
    pub circuit_id: String,
    pub shape: CircuitShape,
    proving_key: Vec<u8>,
    fingerprint: [u8; 32],
}

impl KeyMaterial {
    pub fn new(circuit_id: impl Into<String>, shape: CircuitShape, proving_key: Vec<u8>) -> Self {
        let fingerprint = *blake3::hash(&proving_key).as_bytes();
        KeyMaterial {
            circuit_id: circuit_id.into(),
            shape,
            proving_key,
            fingerprint,
        }
    }

    /// blake3 fingerprint of the proving key; embedded in payloads so a
    /// prover can detect a stale artifact before doing any work.
    pub fn fingerprint(&self) -> [u8; 32] {
        self.fingerprint
    }

    pub fn proving_key(&self) -> &[u8] {
        &self.proving_key
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(4 + 1 + 4 + self.circuit_id.len() + 12 + 4 + self.proving_key.len());
        w.write_raw(KEY_MATERIAL_MAGIC);
        w.write_u8(ARTIFACT_VERSION);
        w.write_var_bytes(self.circuit_id.as_bytes());
        self.shape.write(&mut w);
        w.write_var_bytes(&self.proving_key);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let mut r = Reader::new(bytes);
        expect_magic(&mut r, KEY_MATERIAL_MAGIC, "key material")?;
        expect_version(&mut r, "key material")?;
        let circuit_id = read_circuit_id(&mut r)?;
        let shape = CircuitShape::read(&mut r)?;
        let proving_key = r.read_var_bytes()?.to_vec();
        r.finish()?;
        Ok(KeyMaterial::new(circuit_id, shape, proving_key))
    }
}

/// Verifier-side artifact: the circuit's intermediate representation.
///
/// Carries no proving key: building a check payload must be possible on
/// a device that never holds prover material.
#[derive(Clone, Debug)]
pub struct CircuitIr {
    pub circuit_id: String,
    pub shape: CircuitShape,
    ir: Vec<u8>,
    fingerprint: [u8; 32],
}

impl CircuitIr {
    pub fn new(circuit_id: impl Into<String>, shape: CircuitShape, ir: Vec<u8>) -> Self {
        let fingerprint = *blake3::hash(&ir).as_bytes();
        CircuitIr {
            circuit_id: circuit_id.into(),
            shape,
            ir,
            fingerprint,
        }
    }

    pub fn fingerprint(&self) -> [u8; 32] {
        self.fingerprint
    }

    pub fn ir_bytes(&self) -> &[u8] {
        &self.ir
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(4 + 1 + 4 + self.circuit_id.len() + 12 + 4 + self.ir.len());
        w.write_raw(CIRCUIT_IR_MAGIC);
        w.write_u8(ARTIFACT_VERSION);
        w.write_var_bytes(self.circuit_id.as_bytes());
        self.shape.write(&mut w);
        w.write_var_bytes(&self.ir);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let mut r = Reader::new(bytes);
        expect_magic(&mut r, CIRCUIT_IR_MAGIC, "circuit IR")?;
        expect_version(&mut r, "circuit IR")?;
        let circuit_id = read_circuit_id(&mut r)?;
        let shape = CircuitShape::read(&mut r)?;
        let ir = r.read_var_bytes()?.to_vec();
        r.finish()?;
        Ok(CircuitIr::new(circuit_id, shape, ir))
    }
}

pub(crate) fn expect_magic(r: &mut Reader<'_>, magic: &[u8; 4], what: &str) -> CoreResult<()> {
    let found = r.read_exact(4)?;
    if found != magic {
        return Err(CoreError::InvalidInput(format!(
            "{} buffer has wrong magic tag",
            what
        )));
    }
    Ok(())
}

pub(crate) fn expect_version(r: &mut Reader<'_>, what: &str) -> CoreResult<()> {
    let version = r.read_u8()?;
    if version != ARTIFACT_VERSION {
        return Err(CoreError::InvalidInput(format!(
            "unsupported {} version {}, expected {}",
            what, version, ARTIFACT_VERSION
        )));
    }
    Ok(())
}

pub(crate) fn read_circuit_id(r: &mut Reader<'_>) -> CoreResult<String> {
    let bytes = r.read_var_bytes()?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| CoreError::InvalidInput("circuit id is not valid UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> CircuitShape {
        CircuitShape {
            k: 14,
            public_input_count: 3,
            witness_count: 5,
        }
    }

    #[test]
    fn key_material_round_trip() {
        let km = KeyMaterial::new("umbra/test", shape(), vec![1, 2, 3, 4]);
        let decoded = KeyMaterial::from_bytes(&km.to_bytes()).unwrap();
        assert_eq!(decoded.circuit_id, "umbra/test");
        assert_eq!(decoded.shape, shape());
        assert_eq!(decoded.proving_key(), &[1, 2, 3, 4]);
        assert_eq!(decoded.fingerprint(), km.fingerprint());
    }

    #[test]
    fn circuit_ir_round_trip() {
        let ir = CircuitIr::new("umbra/test", shape(), vec![9; 100]);
        let decoded = CircuitIr::from_bytes(&ir.to_bytes()).unwrap();
        assert_eq!(decoded.circuit_id, "umbra/test");
        assert_eq!(decoded.ir_bytes(), &[9u8; 100][..]);
    }

    #[test]
    fn wrong_magic_rejected() {
        let mut bytes = KeyMaterial::new("c", shape(), vec![]).to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            KeyMaterial::from_bytes(&bytes).unwrap_err(),
            CoreError::InvalidInput(_)
        ));
    }

    #[test]
    fn unknown_version_rejected() {
        let mut bytes = CircuitIr::new("c", shape(), vec![]).to_bytes();
        bytes[4] = 99;
        assert!(matches!(
            CircuitIr::from_bytes(&bytes).unwrap_err(),
            CoreError::InvalidInput(_)
        ));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = KeyMaterial::new("c", shape(), vec![1]);
        let b = KeyMaterial::new("c", shape(), vec![2]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
