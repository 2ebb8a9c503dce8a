//! Production adapters for the collaborator seams in `interface`.

pub mod clock;
pub mod env;
pub mod fs;
pub mod http;
pub mod launcher;

pub use clock::SystemClock;
pub use env::ProcessEnv;
pub use fs::FsPromoCodeFile;
pub use http::ReqwestFetcher;
pub use launcher::SystemLauncher;

use crate::{
    config::ConfigModel,
    error::{Error, ErrorContext, ErrorOrigin},
    manager::Services,
    storage::JsonFilePrefStore,
};
use std::{rc::Rc, sync::Arc, time::Duration};

impl Services {
    /// Wire the real filesystem, network, environment and clock, rooted at
    /// the configured user data directory.
    pub fn production(config: &ConfigModel) -> Result<Self, Error> {
        let referral = &config.referral;

        let store = JsonFilePrefStore::open(referral.prefs_path()).at(ErrorOrigin::Store)?;
        let fetcher = ReqwestFetcher::new(Duration::from_secs(referral.request_timeout_secs))
            .at(ErrorOrigin::Manager)?;

        Ok(Self {
            store: Rc::new(store),
            fetcher: Rc::new(fetcher),
            promo_file: Arc::new(FsPromoCodeFile::new(referral.promo_code_path())),
            env: Rc::new(ProcessEnv),
            launcher: Rc::new(SystemLauncher),
            clock: Rc::new(SystemClock),
        })
    }
}
