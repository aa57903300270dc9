//! Lambda-facing glue for the operations functions.
//!
//! Handlers are synchronous and depend only on the adapter traits in
//! [`adapters`]; the binaries under `src/bin` wire the AWS and HTTPS
//! implementations in once per process and hand them to the runtime loop.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
