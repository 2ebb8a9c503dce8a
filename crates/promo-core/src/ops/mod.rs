//! Mechanical, reusable side-effecting operations.

pub mod endpoint;
pub mod http;
pub mod json;
pub mod metrics;
pub mod promo;
