/*!
 * Structured Tracing
 * Subscriber setup and structured reports for the pid table
 *
 * The table logs through the `log` facade; the syscall layer opens
 * `tracing` spans. Both end up in the one subscriber installed here.
 */

use crate::memory::MemoryStats;
use crate::process::PidStats;
use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter, Layer,
};

/// Install the kernel's tracing subscriber
///
/// `RUST_LOG` filters (default `info`); `KERNEL_TRACE_JSON=1` switches to
/// JSON lines. Fails if a subscriber or `log` logger is already installed.
pub fn init_tracing() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("KERNEL_TRACE_JSON").is_ok_and(|v| v == "1" || v == "true");

    // Thread names carry the forked kernel thread's name
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_thread_names(true)
            .with_current_span(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .compact()
            .boxed()
    };

    // try_init also installs a LogTracer, so the table's `log` records
    // reach this subscriber through the same filter
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    info!(json, "Tracing initialized");
    Ok(())
}

/// Emit one structured event describing table and heap usage
pub fn report_stats(stats: &PidStats, heap: &MemoryStats) {
    info!(
        live = stats.live,
        capacity = stats.capacity,
        next_candidate = stats.next_candidate,
        allocated = stats.allocated,
        exited = stats.exited,
        joined = stats.joined,
        detached = stats.detached,
        rolled_back = stats.rolled_back,
        reclaimed = stats.reclaimed,
        heap_used = heap.used_memory,
        heap_blocks = heap.allocated_blocks,
        "pid table stats"
    );
}
