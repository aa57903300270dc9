//! Seams to external services. Handlers only see these traits; the AWS and
//! HTTPS implementations bridge into async clients on the current runtime.

pub mod aws;
pub mod chat_completion;
pub mod feed_source;
pub mod notifier;
pub mod object_store;
pub mod record_table;

use std::future::Future;

/// Drive `future` to completion from synchronous adapter code.
///
/// Requires the multi-threaded tokio runtime the Lambda binaries start.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
