//! Preference storage.
//!
//! `memory` and `file` are the two `PrefStore` backends; `referral` is the
//! typed view over the referral keys that the workflows read and write.

pub mod file;
pub mod memory;
pub mod referral;

pub use file::JsonFilePrefStore;
pub use memory::MemoryPrefStore;
pub use referral::{ReferralPhase, ReferralState, ReferralStore};

///
/// Keys
///

pub mod keys {
    /// Server-echoed referral code.
    pub const PROMO_CODE: &str = "referral.promo_code";
    pub const DOWNLOAD_ID: &str = "referral.download_id";
    /// When activity was confirmed.
    pub const TIMESTAMP: &str = "referral.timestamp";
    pub const ATTEMPT_TIMESTAMP: &str = "referral.attempt_timestamp";
    pub const ATTEMPT_COUNT: &str = "referral.attempt_count";
    pub const HEADERS: &str = "referral.headers";
}
