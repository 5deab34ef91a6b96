//! Slot Store - fixed key space of gateway slots
//!
//! The key space is decided at construction and never changes, so the
//! key → position index lives outside the lock. Only the slot values sit
//! behind one readers-writer lock: `get` and snapshots share it, `set` and
//! `modify` take it exclusively. No I/O happens while it is held.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{slot_key, Slot};

/// Thread-safe store of provisioned slots
#[derive(Debug)]
pub struct SlotStore {
    /// Provisioned keys in order (`k1`, `k2`, ...)
    keys: Vec<String>,
    /// Key → position in `keys` and `slots`
    index: HashMap<String, usize>,
    /// Slot values, same order as `keys`
    slots: RwLock<Vec<Slot>>,
}

impl SlotStore {
    /// Create a store with `size` zero-valued slots keyed `k1` through `k{size}`
    pub fn new(size: usize) -> Self {
        let keys: Vec<String> = (1..=size).map(slot_key).collect();
        let index = keys
            .iter()
            .enumerate()
            .map(|(pos, key)| (key.clone(), pos))
            .collect();

        Self {
            keys,
            index,
            slots: RwLock::new(vec![Slot::default(); size]),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.size)
    }

    /// Number of provisioned slots
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Provisioned keys in order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Whether `key` belongs to the provisioned key space
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Copy of the slot at `key`
    ///
    /// Returns `None` for keys outside the provisioned space; callers that
    /// want the zero value use `unwrap_or_default()`.
    pub fn get(&self, key: &str) -> Option<Slot> {
        let pos = *self.index.get(key)?;
        let slots = self.slots.read();
        slots.get(pos).cloned()
    }

    /// Replace the slot at `key`
    ///
    /// Unprovisioned keys are rejected; the store never grows.
    pub fn set(&self, key: &str, slot: Slot) -> StoreResult<()> {
        let pos = *self
            .index
            .get(key)
            .ok_or_else(|| StoreError::UnknownSlot(key.to_string()))?;

        let mut slots = self.slots.write();
        slots[pos] = slot;
        Ok(())
    }

    /// Rewrite the slot at `key` in place under one exclusive lock
    ///
    /// Lets a write depend on the current value without another writer
    /// slipping in between the read and the write. Returns the new value.
    pub fn modify<F>(&self, key: &str, f: F) -> StoreResult<Slot>
    where
        F: FnOnce(&mut Slot),
    {
        let pos = *self
            .index
            .get(key)
            .ok_or_else(|| StoreError::UnknownSlot(key.to_string()))?;

        let mut slots = self.slots.write();
        let slot = &mut slots[pos];
        f(slot);
        Ok(slot.clone())
    }

    /// Copy of every slot, in key order, taken at one instant
    pub fn entries(&self) -> Vec<(String, Slot)> {
        let slots = self.slots.read();
        self.keys.iter().cloned().zip(slots.iter().cloned()).collect()
    }

    /// Serialize the whole store as a JSON object keyed by slot key
    ///
    /// Writers are excluded for the duration of serialization, so the
    /// output reflects one consistent instant.
    pub fn to_json(&self) -> StoreResult<Vec<u8>> {
        let slots = self.slots.read();
        let view = SnapshotView {
            keys: &self.keys,
            slots: &slots,
        };
        Ok(serde_json::to_vec(&view)?)
    }
}

/// Borrowed view serialized as `{"k1": {...}, "k2": {...}}` in key order
struct SnapshotView<'a> {
    keys: &'a [String],
    slots: &'a [Slot],
}

impl Serialize for SnapshotView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for (key, slot) in self.keys.iter().zip(self.slots) {
            map.serialize_entry(key, slot)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn reported(gateway: &str, value: i64, time: i64) -> Slot {
        Slot {
            gateway: gateway.to_string(),
            value,
            time,
        }
    }

    #[test]
    fn test_new_provisions_zero_slots() {
        for size in [1, 2, 40, 100] {
            let store = SlotStore::new(size);
            assert_eq!(store.len(), size);

            for n in 1..=size {
                let key = slot_key(n);
                assert_eq!(store.get(&key), Some(Slot::default()), "{}", key);
            }
            assert!(store.get(&slot_key(size + 1)).is_none());
        }
    }

    #[test]
    fn test_keys_in_order() {
        let store = SlotStore::new(3);
        assert_eq!(store.keys(), &["k1", "k2", "k3"]);
    }

    #[test]
    fn test_from_config() {
        let store = SlotStore::from_config(&StoreConfig::default());
        assert_eq!(store.len(), 40);
        assert!(store.contains("k40"));
        assert!(!store.contains("k41"));
    }

    #[test]
    fn test_get_unknown_key() {
        let store = SlotStore::new(2);
        assert!(store.get("k999").is_none());
        assert!(store.get("").is_none());
        assert!(store.get("K1").is_none());
        assert_eq!(store.get("kX").unwrap_or_default(), Slot::default());
    }

    #[test]
    fn test_set_replaces_slot() {
        let store = SlotStore::new(2);
        store.set("k2", reported("243", 7, 1000)).unwrap();

        assert_eq!(store.get("k2"), Some(reported("243", 7, 1000)));
        assert_eq!(store.get("k1"), Some(Slot::default()));
    }

    #[test]
    fn test_set_unknown_key_rejected() {
        let store = SlotStore::new(2);
        let err = store.set("k3", reported("241", 1, 1)).unwrap_err();

        assert!(matches!(err, StoreError::UnknownSlot(ref k) if k == "k3"));
        assert_eq!(store.len(), 2);
        assert!(store.get("k3").is_none());
    }

    #[test]
    fn test_modify_in_place() {
        let store = SlotStore::new(2);
        store.set("k1", reported("241", 1, 100)).unwrap();

        let updated = store.modify("k1", |slot| slot.value += 4).unwrap();

        assert_eq!(updated, reported("241", 5, 100));
        assert_eq!(store.get("k1"), Some(updated));
        assert!(matches!(
            store.modify("k9", |_| {}),
            Err(StoreError::UnknownSlot(_))
        ));
    }

    #[test]
    fn test_to_json_shape_and_order() {
        let store = SlotStore::new(2);
        store.set("k1", reported("242", 10, 1234)).unwrap();

        let json = String::from_utf8(store.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"k1":{"gateway":"242","value":10,"time":1234},"k2":{"gateway":"","value":0,"time":0}}"#
        );
    }

    #[test]
    fn test_to_json_keeps_numeric_key_order() {
        let store = SlotStore::new(12);
        let json = String::from_utf8(store.to_json().unwrap()).unwrap();

        let k2 = json.find("\"k2\"").unwrap();
        let k10 = json.find("\"k10\"").unwrap();
        assert!(k2 < k10);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let store = SlotStore::new(40);
        store.set("k1", reported("241", 5, 10)).unwrap();
        store.set("k17", reported("245", -3, 20)).unwrap();
        store.set("k40", reported("243", 99, 30)).unwrap();

        let decoded: BTreeMap<String, Slot> =
            serde_json::from_slice(&store.to_json().unwrap()).unwrap();
        let expected: BTreeMap<String, Slot> = store.entries().into_iter().collect();

        assert_eq!(decoded.len(), 40);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_concurrent_disjoint_writers() {
        let store = Arc::new(SlotStore::new(40));

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for n in (worker * 10 + 1)..=(worker * 10 + 10) {
                        let slot = reported("241", n as i64, 1);
                        store.set(&slot_key(n), slot).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for (key, slot) in store.entries() {
            let n: i64 = key[1..].parse().unwrap();
            assert_eq!(slot.value, n, "{}", key);
        }
    }

    #[test]
    fn test_snapshot_never_torn() {
        let store = Arc::new(SlotStore::new(4));

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 1..=2000i64 {
                    store.set("k1", reported("242", i, i)).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let decoded: BTreeMap<String, Slot> =
                serde_json::from_slice(&store.to_json().unwrap()).unwrap();
            let slot = &decoded["k1"];
            assert_eq!(slot.value, slot.time);
        }

        writer.join().unwrap();
        assert_eq!(store.get("k1"), Some(reported("242", 2000, 2000)));
    }
}
