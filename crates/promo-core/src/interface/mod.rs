//! Collaborator seams.
//!
//! The manager reaches the outside world only through these traits. Production
//! adapters live in `infra/`; scripted fakes live in the `promo-testkit` crate.

pub mod clock;
pub mod env;
pub mod fs;
pub mod http;
pub mod launcher;
pub mod store;

pub use clock::Clock;
pub use env::EnvReader;
pub use fs::{PromoCodeFile, PromoFileError};
pub use http::{FetchError, FetchRequest, FetchResponse, HttpFetcher, HttpMethod, LoadFlags};
pub use launcher::{LaunchError, UrlLauncher};
pub use store::{PrefStore, PrefValue, PrefWrite, StoreError};
