//! Referral lifecycle for a single installation.
//!
//! A `ReferralManager` keeps three jobs going against the referral server:
//! a daily refresh of opaque custom headers, a one-time initialization
//! handshake driven by an installer-dropped promo-code file, and a bounded
//! daily activity check that runs until the referral is confirmed or given up.
//!
//! ## Layering
//!
//! - `manager` is the public entry point and the single owner of state.
//! - `workflow/` sequences the async jobs and applies their results.
//! - `policy/` owns deterministic decision rules.
//! - `ops/` provides mechanical, reusable side-effecting operations.
//! - `storage/` owns persisted preferences and the typed referral view.
//! - `interface/` declares the collaborator seams; `infra/` implements them.
//!
//! The default flow is: manager → workflow → policy → ops → storage.

pub mod config;
pub mod error;
pub mod infra;
pub mod interface;
pub mod log;
pub mod manager;
pub mod ops;
pub mod policy;
pub mod storage;

pub(crate) mod workflow;

pub use error::{Error, ErrorClass, ErrorOrigin};
pub use manager::{ReferralManager, Services};

///
/// Crate Version
///

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
