/*!
 * Pid Kernel - Main Entry Point
 *
 * Boots the pid table and runs a small fork/exit/wait workload:
 * - Children that exit with a status and are waited for
 * - A child that is detached and reclaims itself on exit
 * - A child with a recorded kill request
 */

use miette::{IntoDiagnostic, Result};
use pid_kernel::core::limits::WNOHANG;
use pid_kernel::{
    bootstrap, init_tracing, report_stats, ExitStatus, KernelError, PidTableConfig,
    SyscallExecutor, WaitStatus,
};
use std::sync::mpsc;
use tracing::{info, warn};

const WORKERS: ExitStatus = 3;

fn main() -> Result<()> {
    init_tracing().into_diagnostic()?;

    info!("Pid kernel starting...");

    let config = PidTableConfig::from_env()?;
    let pids = bootstrap(config)?;
    let sys = SyscallExecutor::new(pids.clone());

    info!(pid = sys.getpid(), "Boot thread bound");

    // Workers exit with their index as status
    let mut workers = Vec::new();
    for index in 1..=WORKERS {
        let worker = sys
            .fork(&format!("worker-{index}"), move || index)
            .map_err(KernelError::from)?;
        workers.push(worker);
    }

    // A sleeper that waits to be told to exit, so it can be polled and flagged first
    let (wake_tx, wake_rx) = mpsc::channel::<()>();
    let sleeper = sys
        .fork("sleeper", move || match wake_rx.recv() {
            Ok(()) => 0,
            Err(_) => 1,
        })
        .map_err(KernelError::from)?;

    // A detached child nobody waits for
    let loner = sys.fork("loner", || 99).map_err(KernelError::from)?;
    sys.detach(loner.pid()).map_err(KernelError::from)?;

    match sys.waitpid(sleeper.pid(), WNOHANG) {
        Ok(WaitStatus::StillRunning) => info!(pid = sleeper.pid(), "Sleeper still running"),
        Ok(other) => warn!(?other, "Sleeper finished early"),
        Err(errno) => warn!(%errno, "Polling sleeper failed"),
    }
    sys.kill(sleeper.pid(), 15).map_err(KernelError::from)?;
    let signal = sys.pending_signal(sleeper.pid()).map_err(KernelError::from)?;
    info!(pid = sleeper.pid(), signal, "Kill request recorded");
    wake_tx.send(()).into_diagnostic()?;

    for worker in workers.iter().chain(std::iter::once(&sleeper)) {
        match sys.waitpid(worker.pid(), 0) {
            Ok(WaitStatus::Exited { pid, status }) => info!(pid, status, "Child reaped"),
            Ok(WaitStatus::StillRunning) => warn!(pid = worker.pid(), "Blocking wait returned early"),
            Err(errno) => warn!(pid = worker.pid(), %errno, "waitpid failed"),
        }
    }

    for thread in workers.into_iter().chain([sleeper, loner]) {
        if thread.join_host().is_err() {
            warn!("Kernel thread panicked");
        }
    }

    report_stats(&pids.stats(), &pids.heap_stats());
    let snapshot = serde_json::to_string_pretty(&pids.snapshot()).map_err(KernelError::from)?;
    println!("{snapshot}");

    info!("Pid kernel shutting down");
    Ok(())
}
