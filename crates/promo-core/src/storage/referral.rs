use super::keys;
use crate::interface::{PrefStore, PrefValue, PrefWrite, StoreError};
use derive_more::Display;
use serde::Serialize;
use serde_json::Value;

///
/// ReferralPhase
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ReferralPhase {
    /// No download id.
    Inactive,
    /// Download id issued, activity not confirmed yet.
    Pending,
    /// Activity confirmed; terminal.
    Confirmed,
}

///
/// ReferralState
/// Point-in-time view of the referral keys.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ReferralState {
    /// Code read from the local artifact this run; never persisted.
    pub promo_code: String,
    pub download_id: String,
    pub referral_code: String,
    pub confirmed_timestamp: Option<u64>,
    pub last_attempt_timestamp: Option<u64>,
    pub attempt_count: u32,
    pub headers: Vec<Value>,
}

impl ReferralState {
    #[must_use]
    pub fn phase(&self) -> ReferralPhase {
        if self.download_id.is_empty() {
            ReferralPhase::Inactive
        } else if self.confirmed_timestamp.is_some() {
            ReferralPhase::Confirmed
        } else {
            ReferralPhase::Pending
        }
    }
}

///
/// ReferralStore
/// Typed access to the referral keys of a `PrefStore`.
///

pub struct ReferralStore<'a> {
    prefs: &'a dyn PrefStore,
}

impl<'a> ReferralStore<'a> {
    #[must_use]
    pub fn new(prefs: &'a dyn PrefStore) -> Self {
        Self { prefs }
    }

    // -------------------------------------------------------------
    // Getters
    // -------------------------------------------------------------

    #[must_use]
    pub fn load(&self) -> ReferralState {
        ReferralState {
            promo_code: String::new(),
            download_id: self.download_id(),
            referral_code: self.prefs.get_string(keys::PROMO_CODE),
            confirmed_timestamp: self.confirmed_timestamp(),
            last_attempt_timestamp: self.last_attempt_timestamp(),
            attempt_count: self.attempt_count(),
            headers: self.headers(),
        }
    }

    #[must_use]
    pub fn download_id(&self) -> String {
        self.prefs.get_string(keys::DOWNLOAD_ID)
    }

    #[must_use]
    pub fn confirmed_timestamp(&self) -> Option<u64> {
        self.prefs.get_time(keys::TIMESTAMP)
    }

    #[must_use]
    pub fn last_attempt_timestamp(&self) -> Option<u64> {
        self.prefs.get_time(keys::ATTEMPT_TIMESTAMP)
    }

    #[must_use]
    pub fn attempt_count(&self) -> u32 {
        let raw = self.prefs.get_int(keys::ATTEMPT_COUNT).max(0);

        u32::try_from(raw).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn headers(&self) -> Vec<Value> {
        self.prefs.get_list(keys::HEADERS)
    }

    // -------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------

    pub fn replace_headers(&self, headers: Vec<Value>) -> Result<(), StoreError> {
        self.prefs.set_list(keys::HEADERS, headers)
    }

    /// Persist a validated initialization result in one batch.
    pub fn complete_init(
        &self,
        download_id: &str,
        referral_code: &str,
        headers: Option<Vec<Value>>,
    ) -> Result<(), StoreError> {
        let mut writes = Vec::with_capacity(3);
        if let Some(headers) = headers {
            writes.push(PrefWrite::Set(keys::HEADERS, PrefValue::List(headers)));
        }
        writes.push(PrefWrite::Set(
            keys::PROMO_CODE,
            PrefValue::String(referral_code.to_string()),
        ));
        writes.push(PrefWrite::Set(
            keys::DOWNLOAD_ID,
            PrefValue::String(download_id.to_string()),
        ));

        self.prefs.write_all(writes)
    }

    pub fn record_attempt(&self, now: u64, count: u32) -> Result<(), StoreError> {
        self.prefs.write_all(vec![
            PrefWrite::Set(keys::ATTEMPT_TIMESTAMP, PrefValue::Time(now)),
            PrefWrite::Set(keys::ATTEMPT_COUNT, PrefValue::Int(i64::from(count))),
        ])
    }

    /// Abandon the referral after the attempt cap. The count only resets
    /// together with the download id.
    pub fn expire(&self) -> Result<(), StoreError> {
        self.prefs.write_all(vec![
            PrefWrite::Clear(keys::DOWNLOAD_ID),
            PrefWrite::Clear(keys::ATTEMPT_TIMESTAMP),
            PrefWrite::Clear(keys::ATTEMPT_COUNT),
        ])
    }

    pub fn confirm(&self, now: u64) -> Result<(), StoreError> {
        self.prefs.write_all(vec![
            PrefWrite::Set(keys::TIMESTAMP, PrefValue::Time(now)),
            PrefWrite::Clear(keys::ATTEMPT_TIMESTAMP),
            PrefWrite::Clear(keys::ATTEMPT_COUNT),
        ])
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPrefStore;
    use serde_json::json;

    // rejects any batch that touches `key`
    struct RejectKey {
        inner: MemoryPrefStore,
        key: &'static str,
    }

    impl PrefStore for RejectKey {
        fn get(&self, key: &str) -> Option<PrefValue> {
            self.inner.get(key)
        }

        fn write_all(&self, writes: Vec<PrefWrite<'_>>) -> Result<(), StoreError> {
            if writes.iter().any(|w| w.key() == self.key) {
                return Err(StoreError::Serialize("disk full".to_string()));
            }

            self.inner.write_all(writes)
        }
    }

    #[test]
    fn fresh_store_is_inactive() {
        let prefs = MemoryPrefStore::new();
        let state = ReferralStore::new(&prefs).load();

        assert_eq!(state, ReferralState::default());
        assert_eq!(state.phase(), ReferralPhase::Inactive);
    }

    #[test]
    fn complete_init_sets_all_fields() {
        let prefs = MemoryPrefStore::new();
        let store = ReferralStore::new(&prefs);

        store
            .complete_init("abc", "xyz", Some(vec![json!({"h": 1})]))
            .unwrap();

        let state = store.load();
        assert_eq!(state.download_id, "abc");
        assert_eq!(state.referral_code, "xyz");
        assert_eq!(state.headers, vec![json!({"h": 1})]);
        assert_eq!(state.phase(), ReferralPhase::Pending);
    }

    #[test]
    fn confirm_clears_attempt_fields() {
        let prefs = MemoryPrefStore::new();
        let store = ReferralStore::new(&prefs);
        store.complete_init("abc", "xyz", None).unwrap();
        store.record_attempt(100, 5).unwrap();

        store.confirm(200).unwrap();

        let state = store.load();
        assert_eq!(state.confirmed_timestamp, Some(200));
        assert_eq!(state.last_attempt_timestamp, None);
        assert_eq!(state.attempt_count, 0);
        assert_eq!(state.phase(), ReferralPhase::Confirmed);
    }

    #[test]
    fn expire_keeps_referral_code() {
        let prefs = MemoryPrefStore::new();
        let store = ReferralStore::new(&prefs);
        store.complete_init("abc", "xyz", None).unwrap();
        store.record_attempt(100, 30).unwrap();

        store.expire().unwrap();

        let state = store.load();
        assert!(state.download_id.is_empty());
        assert_eq!(state.attempt_count, 0);
        assert_eq!(state.last_attempt_timestamp, None);
        assert_eq!(state.referral_code, "xyz");
    }

    #[test]
    fn negative_attempt_count_reads_as_zero() {
        let prefs = MemoryPrefStore::new();
        prefs.set_int(keys::ATTEMPT_COUNT, -4).unwrap();

        assert_eq!(ReferralStore::new(&prefs).attempt_count(), 0);
    }

    #[test]
    fn failed_expire_keeps_the_spent_count() {
        let prefs = RejectKey {
            inner: MemoryPrefStore::new(),
            key: keys::DOWNLOAD_ID,
        };
        let seed = ReferralStore::new(&prefs.inner);
        seed.complete_init("abc", "xyz", None).unwrap();
        seed.record_attempt(100, 30).unwrap();

        assert!(ReferralStore::new(&prefs).expire().is_err());

        let state = seed.load();
        assert_eq!(state.download_id, "abc");
        assert_eq!(state.attempt_count, 30);
        assert_eq!(state.last_attempt_timestamp, Some(100));
    }

    #[test]
    fn failed_complete_init_keeps_previous_values() {
        let prefs = RejectKey {
            inner: MemoryPrefStore::new(),
            key: keys::DOWNLOAD_ID,
        };
        prefs.inner.set_list(keys::HEADERS, vec![json!({"old": 1})]).unwrap();

        let err = ReferralStore::new(&prefs)
            .complete_init("abc", "xyz", Some(vec![json!({"new": 1})]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialize(_)));

        let state = ReferralStore::new(&prefs.inner).load();
        assert!(state.download_id.is_empty());
        assert!(state.referral_code.is_empty());
        assert_eq!(state.headers, vec![json!({"old": 1})]);
    }
}
