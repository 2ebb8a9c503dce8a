use crate::interface::{PrefStore, PrefValue, PrefWrite, StoreError};
use std::{cell::RefCell, collections::BTreeMap};

///
/// MemoryPrefStore
/// Volatile store; state is lost with the process.
///

#[derive(Debug, Default)]
pub struct MemoryPrefStore {
    values: RefCell<BTreeMap<String, PrefValue>>,
}

impl MemoryPrefStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, PrefValue> {
        self.values.borrow().clone()
    }
}

impl PrefStore for MemoryPrefStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.borrow().get(key).cloned()
    }

    fn write_all(&self, writes: Vec<PrefWrite<'_>>) -> Result<(), StoreError> {
        apply_writes(&mut self.values.borrow_mut(), writes);

        Ok(())
    }
}

/// Apply a batch to an in-memory map.
pub(crate) fn apply_writes(values: &mut BTreeMap<String, PrefValue>, writes: Vec<PrefWrite<'_>>) {
    for write in writes {
        match write {
            PrefWrite::Set(key, value) => {
                values.insert(key.to_string(), value);
            }
            PrefWrite::Clear(key) => {
                values.remove(key);
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_getters_fall_back_to_defaults() {
        let store = MemoryPrefStore::new();

        assert_eq!(store.get_string("missing"), "");
        assert_eq!(store.get_int("missing"), 0);
        assert_eq!(store.get_time("missing"), None);
        assert!(store.get_list("missing").is_empty());
    }

    #[test]
    fn mistyped_values_read_as_defaults() {
        let store = MemoryPrefStore::new();
        store.set_int("k", 7).unwrap();

        assert_eq!(store.get_string("k"), "");
        assert_eq!(store.get_int("k"), 7);
    }

    #[test]
    fn clear_removes_value() {
        let store = MemoryPrefStore::new();
        store.set_list("h", vec![json!({"a": 1})]).unwrap();
        store.clear("h").unwrap();

        assert!(store.get("h").is_none());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn batch_applies_in_order() {
        let store = MemoryPrefStore::new();
        store.set_int("a", 1).unwrap();

        store
            .write_all(vec![
                PrefWrite::Clear("a"),
                PrefWrite::Set("b", PrefValue::Int(2)),
                PrefWrite::Set("b", PrefValue::Int(3)),
            ])
            .unwrap();

        assert!(store.get("a").is_none());
        assert_eq!(store.get_int("b"), 3);
    }
}
