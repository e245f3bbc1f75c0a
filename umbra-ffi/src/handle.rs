//! The opaque-handle arena.
//!
//! Core objects held across the boundary live in slots indexed by
//! `(slot, generation)`. A handle is `slot << 32 | generation`; releasing
//! a handle bumps the slot's generation, so any retained copy of the old
//! handle fails with `HandleNotFound` instead of reaching freed memory.
//! Slots are recycled through a free list, generations are never reused
//! for the same slot.

use umbra_coin::{CoinPublicKey, CoinSecretKey, EncryptionPublicKey};
use umbra_common::{CoreError, CoreResult};
use umbra_proof::{CheckPayload, CircuitIr, KeyMaterial, ProofPreimage, ProvingPayload};

/// Everything that can live behind a handle.
///
/// Secret keys zeroize on drop, so releasing their handle wipes them.
#[derive(Debug)]
pub enum HandleObject {
    CoinSecretKey(CoinSecretKey),
    CoinPublicKey(CoinPublicKey),
    EncryptionPublicKey(EncryptionPublicKey),
    Preimage(ProofPreimage),
    KeyMaterial(KeyMaterial),
    CircuitIr(CircuitIr),
    ProvingPayload(ProvingPayload),
    CheckPayload(CheckPayload),
}

impl HandleObject {
    /// Host-facing name of the stored type, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            HandleObject::CoinSecretKey(_) => "coin secret key",
            HandleObject::CoinPublicKey(_) => "coin public key",
            HandleObject::EncryptionPublicKey(_) => "encryption public key",
            HandleObject::Preimage(_) => "proof preimage",
            HandleObject::KeyMaterial(_) => "key material",
            HandleObject::CircuitIr(_) => "circuit IR",
            HandleObject::ProvingPayload(_) => "proving payload",
            HandleObject::CheckPayload(_) => "check payload",
        }
    }
}

struct Slot {
    generation: u32,
    object: Option<HandleObject>,
}

/// Slot-and-generation arena for boundary-owned objects.
#[derive(Default)]
pub struct HandleTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl HandleTable {
    pub fn new() -> Self {
        HandleTable::default()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.object.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store an object, returning its handle.
    pub fn insert(&mut self, object: HandleObject) -> u64 {
        if let Some(slot_index) = self.free.pop() {
            let slot = &mut self.slots[slot_index as usize];
            slot.object = Some(object);
            return pack(slot_index, slot.generation);
        }
        let slot_index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            object: Some(object),
        });
        pack(slot_index, 1)
    }

    /// Borrow the object behind a handle.
    pub fn get(&self, handle: u64) -> CoreResult<&HandleObject> {
        let (slot_index, generation) = unpack(handle);
        self.slots
            .get(slot_index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.object.as_ref())
            .ok_or(CoreError::HandleNotFound(handle))
    }

    /// Release a handle, dropping the object.
    ///
    /// The generation bump happens even though the slot is recycled, so
    /// both use-after-release and double-release land here as
    /// `HandleNotFound`.
    pub fn release(&mut self, handle: u64) -> CoreResult<()> {
        let (slot_index, generation) = unpack(handle);
        let slot = self
            .slots
            .get_mut(slot_index as usize)
            .filter(|slot| slot.generation == generation && slot.object.is_some())
            .ok_or(CoreError::HandleNotFound(handle))?;

        slot.object = None;
        slot.generation = slot.generation.wrapping_add(1);
        // A slot that wrapped back to generation 0 is retired rather than
        // risking a handle collision after 2^32 releases.
        if slot.generation != 0 {
            self.free.push(slot_index);
        }
        Ok(())
    }
}

fn pack(slot: u32, generation: u32) -> u64 {
    (u64::from(slot) << 32) | u64::from(generation)
}

fn unpack(handle: u64) -> (u32, u32) {
    ((handle >> 32) as u32, handle as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_test_fixtures::seeded_rng;

    fn sample_object() -> HandleObject {
        HandleObject::CoinSecretKey(CoinSecretKey::random(&mut seeded_rng(1)))
    }

    #[test]
    fn insert_then_get() {
        let mut table = HandleTable::new();
        let handle = table.insert(sample_object());
        assert!(matches!(
            table.get(handle).unwrap(),
            HandleObject::CoinSecretKey(_)
        ));
    }

    #[test]
    fn use_after_release_is_handle_not_found() {
        let mut table = HandleTable::new();
        let handle = table.insert(sample_object());
        table.release(handle).unwrap();
        assert!(matches!(
            table.get(handle).unwrap_err(),
            CoreError::HandleNotFound(_)
        ));
    }

    #[test]
    fn double_release_is_handle_not_found() {
        let mut table = HandleTable::new();
        let handle = table.insert(sample_object());
        table.release(handle).unwrap();
        assert!(matches!(
            table.release(handle).unwrap_err(),
            CoreError::HandleNotFound(_)
        ));
    }

    #[test]
    fn recycled_slot_gets_new_generation() {
        let mut table = HandleTable::new();
        let old = table.insert(sample_object());
        table.release(old).unwrap();
        let new = table.insert(sample_object());
        assert_ne!(old, new);
        // Old handle still dead, new handle alive, same slot.
        assert!(table.get(old).is_err());
        assert!(table.get(new).is_ok());
        assert_eq!(old >> 32, new >> 32);
    }

    #[test]
    fn never_issued_handle_rejected() {
        let table = HandleTable::new();
        assert!(matches!(
            table.get(0xFFFF_0001),
            Err(CoreError::HandleNotFound(_))
        ));
    }

    #[test]
    fn len_tracks_live_objects() {
        let mut table = HandleTable::new();
        assert!(table.is_empty());
        let a = table.insert(sample_object());
        let _b = table.insert(sample_object());
        assert_eq!(table.len(), 2);
        table.release(a).unwrap();
        assert_eq!(table.len(), 1);
    }
}
