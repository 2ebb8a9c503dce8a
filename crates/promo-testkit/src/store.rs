use promo_core::{
    interface::{PrefStore, PrefValue, PrefWrite, StoreError},
    storage::MemoryPrefStore,
};
use std::{cell::RefCell, collections::BTreeMap};

///
/// FaultyPrefStore
///
/// In-memory store that can be told to reject every batch touching a key,
/// the way a full disk would.
///

#[derive(Debug, Default)]
pub struct FaultyPrefStore {
    inner: MemoryPrefStore,
    reject: RefCell<Option<String>>,
}

impl FaultyPrefStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.reject.replace(Some(key.to_string()));
    }

    pub fn heal(&self) {
        self.reject.take();
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, PrefValue> {
        self.inner.snapshot()
    }
}

impl PrefStore for FaultyPrefStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.inner.get(key)
    }

    fn write_all(&self, writes: Vec<PrefWrite<'_>>) -> Result<(), StoreError> {
        if let Some(reject) = self.reject.borrow().as_deref()
            && writes.iter().any(|w| w.key() == reject)
        {
            return Err(StoreError::Serialize(format!("write to {reject} rejected")));
        }

        self.inner.write_all(writes)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_batch_writes_nothing() {
        let store = FaultyPrefStore::new();
        store.fail_writes_to("b");

        let err = store
            .write_all(vec![
                PrefWrite::Set("a", PrefValue::Int(1)),
                PrefWrite::Set("b", PrefValue::Int(2)),
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialize(_)));
        assert!(store.snapshot().is_empty());

        store.heal();
        store.set_int("b", 2).unwrap();
        assert_eq!(store.get_int("b"), 2);
    }
}
