//! Scripted collaborator fakes for exercising the referral manager.
//!
//! Every seam in `promo_core::interface` has a fake here. `Harness` bundles
//! one of each around a `FaultyPrefStore` so tests can script the server,
//! drop a promo-code file, move the clock and then inspect what happened.

pub mod clock;
pub mod env;
pub mod fetcher;
pub mod fs;
pub mod launcher;
pub mod store;

pub use clock::ManualClock;
pub use env::FakeEnv;
pub use fetcher::FakeFetcher;
pub use fs::FakePromoFile;
pub use launcher::RecordingLauncher;
pub use store::FaultyPrefStore;

use promo_core::{
    ReferralManager, Services,
    config::ConfigModel,
    log::{Level, LogBuffer},
};
use std::{future::Future, rc::Rc, sync::Arc};
use tokio::task::LocalSet;

/// A fixed, readable start time for tests (2020-01-01T00:00:00Z).
pub const T0: u64 = 1_577_836_800;

pub const DAY: u64 = 24 * 60 * 60;

///
/// Harness
///

pub struct Harness {
    pub store: Rc<FaultyPrefStore>,
    pub fetcher: Rc<FakeFetcher>,
    pub promo_file: Arc<FakePromoFile>,
    pub env: Rc<FakeEnv>,
    pub launcher: Rc<RecordingLauncher>,
    pub clock: Rc<ManualClock>,
}

impl Harness {
    /// Fresh install: empty store, no promo file, clock at `T0`.
    #[must_use]
    pub fn new() -> Self {
        LogBuffer::configure(&promo_core::config::schema::LogConfig {
            min_level: Level::Debug,
            ..Default::default()
        });
        LogBuffer::clear();

        Self {
            store: Rc::new(FaultyPrefStore::new()),
            fetcher: Rc::new(FakeFetcher::new()),
            promo_file: Arc::new(FakePromoFile::absent()),
            env: Rc::new(FakeEnv::new()),
            launcher: Rc::new(RecordingLauncher::new()),
            clock: Rc::new(ManualClock::new(T0)),
        }
    }

    #[must_use]
    pub fn services(&self) -> Services {
        Services {
            store: self.store.clone(),
            fetcher: self.fetcher.clone(),
            promo_file: self.promo_file.clone(),
            env: self.env.clone(),
            launcher: self.launcher.clone(),
            clock: self.clock.clone(),
        }
    }

    /// Manager over the default config with the activity poll disabled, so
    /// tests drive the gate themselves.
    #[must_use]
    pub fn manager(&self) -> ReferralManager {
        let mut config = ConfigModel::default();
        config.referral.activity_check_interval_secs = 0;

        self.manager_with(config)
    }

    #[must_use]
    pub fn manager_with(&self, config: ConfigModel) -> ReferralManager {
        ReferralManager::new(Arc::new(config), self.services())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a test body on a `LocalSet`, which the manager requires.
pub async fn local<F: Future>(body: F) -> F::Output {
    LocalSet::new().run_until(body).await
}
