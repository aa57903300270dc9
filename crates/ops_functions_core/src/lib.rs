//! Shared domain primitives for the operations functions.
//!
//! This crate owns trigger payload contracts, key decoding, log-subscription
//! matching and feed parsing. It intentionally excludes AWS SDK and Lambda
//! runtime concerns, which live in `ops_functions_lambda`.

pub mod contract;
pub mod feed;
pub mod log_subscription;
pub mod object_keys;
