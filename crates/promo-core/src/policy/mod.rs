//! Deterministic decision rules. No I/O, no clocks: callers pass `now`.

pub mod activity;
