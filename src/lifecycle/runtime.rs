//! Tokio runtime ownership for the server binary.
//!
//! Handler chains run on the blocking pool, and dropping a runtime waits for
//! every blocking task. A stuck handler would then keep the process alive
//! after an immediate or forced stop, so the runtime is torn down with a
//! deadline instead.

use std::future::Future;
use std::time::Duration;

/// How long blocking handler chains may outlive the server once it stopped.
pub const TEARDOWN_DEADLINE: Duration = Duration::from_secs(1);

/// Drive `future` on a multi-thread runtime, then shut the runtime down
/// without waiting more than [`TEARDOWN_DEADLINE`] for blocking tasks.
pub fn run<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(TEARDOWN_DEADLINE);
    Ok(output)
}
