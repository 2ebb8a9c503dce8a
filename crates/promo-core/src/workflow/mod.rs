//! Orchestration of the three referral jobs.
//!
//! Workflows own the async sequencing: in-flight guards, awaiting ops,
//! checking the manager is still live after every await, and only then
//! touching persisted state. Decisions come from `policy`, side effects from
//! `ops`.

pub mod activity;
pub mod headers;
pub mod init;
pub mod timer;

///
/// Prelude
///

pub(crate) mod prelude {
    pub(crate) use crate::{
        error::{Error, ErrorContext, ErrorOrigin},
        log,
        log::Topic,
        manager::{Core, InFlightGuard, OpKind},
    };
}
