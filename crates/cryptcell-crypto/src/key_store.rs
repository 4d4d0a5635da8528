//! In-memory key store.
//!
//! Handles are monotone and never reused, so a stale handle held by a
//! caller after destroy can never alias a newer key. Persistent keys are
//! additionally indexed by their composite identifier; "persistent" here
//! means addressable-by-name within one service lifetime, not durable
//! across restarts.

use std::collections::HashMap;

use cryptcell_core::{CompositeKeyId, KeyHandle};
use cryptcell_proto::{ErrorCode, KeyPolicy, KeyType, Lifetime};
use zeroize::Zeroize;

/// One key slot: attributes plus raw material.
#[derive(Debug, Default)]
pub struct KeySlot {
    /// Type of the held material; `None` while the slot is empty.
    pub key_type: Option<KeyType>,
    /// Bit size of the held material.
    pub bits: u32,
    /// Usage policy attached before the slot was filled.
    pub policy: KeyPolicy,
    /// Persistence class.
    pub lifetime: Lifetime,
    /// Raw key material (secret half for key pairs).
    pub material: Vec<u8>,
}

impl Drop for KeySlot {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

impl KeySlot {
    /// Fill the slot with typed material.
    ///
    /// A slot is filled exactly once; re-filling is [`ErrorCode::AlreadyExists`].
    pub fn fill(&mut self, key_type: KeyType, bits: u32, material: Vec<u8>) -> Result<(), ErrorCode> {
        if self.key_type.is_some() {
            return Err(ErrorCode::AlreadyExists);
        }
        self.key_type = Some(key_type);
        self.bits = bits;
        self.material = material;
        Ok(())
    }

    /// The held material, failing on an empty slot.
    pub fn material(&self) -> Result<&[u8], ErrorCode> {
        if self.key_type.is_none() {
            return Err(ErrorCode::BadState);
        }
        Ok(&self.material)
    }
}

/// Key slots addressed by handle, with a name index for persistent keys.
#[derive(Debug, Default)]
pub struct KeyStore {
    slots: HashMap<KeyHandle, KeySlot>,
    names: HashMap<u64, KeyHandle>,
    next_handle: KeyHandle,
}

impl KeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_handle(&mut self) -> KeyHandle {
        self.next_handle += 1;
        self.next_handle
    }

    /// Allocate an empty volatile slot.
    pub fn allocate(&mut self) -> KeyHandle {
        let handle = self.fresh_handle();
        self.slots.insert(handle, KeySlot::default());
        handle
    }

    /// Create an empty slot addressable by `id`.
    pub fn create(&mut self, lifetime: Lifetime, id: CompositeKeyId) -> Result<KeyHandle, ErrorCode> {
        if self.names.contains_key(&id.raw()) {
            return Err(ErrorCode::AlreadyExists);
        }
        let handle = self.fresh_handle();
        let mut slot = KeySlot::default();
        slot.lifetime = lifetime;
        self.slots.insert(handle, slot);
        self.names.insert(id.raw(), handle);
        Ok(handle)
    }

    /// Look up the slot named by `id`.
    pub fn open(&self, id: CompositeKeyId) -> Result<KeyHandle, ErrorCode> {
        self.names.get(&id.raw()).copied().ok_or(ErrorCode::DoesNotExist)
    }

    /// Destroy a slot and any name pointing at it. Material is zeroized on
    /// drop.
    pub fn destroy(&mut self, handle: KeyHandle) -> Result<(), ErrorCode> {
        self.slots.remove(&handle).ok_or(ErrorCode::InvalidHandle)?;
        self.names.retain(|_, named| *named != handle);
        Ok(())
    }

    /// Shared access to a slot.
    pub fn slot(&self, handle: KeyHandle) -> Result<&KeySlot, ErrorCode> {
        self.slots.get(&handle).ok_or(ErrorCode::InvalidHandle)
    }

    /// Mutable access to a slot.
    pub fn slot_mut(&mut self, handle: KeyHandle) -> Result<&mut KeySlot, ErrorCode> {
        self.slots.get_mut(&handle).ok_or(ErrorCode::InvalidHandle)
    }

    /// Drop every slot and name.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.names.clear();
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True iff no slot is live.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_never_reused() {
        let mut store = KeyStore::new();
        let first = store.allocate();
        store.destroy(first).unwrap();
        let second = store.allocate();
        assert_ne!(first, second);
    }

    #[test]
    fn destroy_removes_name_binding() {
        let mut store = KeyStore::new();
        let id = CompositeKeyId::assemble(7, 1);
        let handle = store.create(Lifetime::Persistent, id).unwrap();

        store.destroy(handle).unwrap();
        assert_eq!(store.open(id), Err(ErrorCode::DoesNotExist));

        // The name is free again after destroy.
        store.create(Lifetime::Persistent, id).unwrap();
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut store = KeyStore::new();
        let id = CompositeKeyId::assemble(7, 1);
        store.create(Lifetime::Persistent, id).unwrap();
        assert_eq!(store.create(Lifetime::Persistent, id), Err(ErrorCode::AlreadyExists));
    }

    #[test]
    fn slot_fills_exactly_once() {
        let mut store = KeyStore::new();
        let handle = store.allocate();
        let slot = store.slot_mut(handle).unwrap();

        slot.fill(KeyType::RawData, 64, vec![1; 8]).unwrap();
        assert_eq!(
            store.slot_mut(handle).unwrap().fill(KeyType::RawData, 64, vec![2; 8]),
            Err(ErrorCode::AlreadyExists)
        );
    }

    #[test]
    fn empty_slot_has_no_material() {
        let mut store = KeyStore::new();
        let handle = store.allocate();
        assert_eq!(store.slot(handle).unwrap().material(), Err(ErrorCode::BadState));
    }
}
