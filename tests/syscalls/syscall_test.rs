/*!
 * Process Syscall Tests
 * fork/waitpid/detach/kill as seen from user level, errno mapping included
 */

use pid_kernel::core::limits::{BOOTUP_PID, NSIG, WNOHANG};
use pid_kernel::process::{bind_boot_thread, RECORD_FOOTPRINT};
use pid_kernel::{Errno, PidTable, PidTableConfig, SyscallExecutor, WaitMode, WaitStatus};
use pretty_assertions::assert_eq;
use std::sync::{mpsc, Arc};

fn executor_with(config: PidTableConfig) -> SyscallExecutor {
    let pids = Arc::new(PidTable::new(config).unwrap());
    bind_boot_thread(&pids).unwrap();
    SyscallExecutor::new(pids)
}

fn executor() -> SyscallExecutor {
    executor_with(PidTableConfig::default())
}

#[test]
fn test_getpid_in_boot_and_child() {
    let sys = executor();
    assert_eq!(sys.getpid(), BOOTUP_PID);

    let inner = SyscallExecutor::new(Arc::clone(sys.pid_table()));
    let child = sys.fork("child", move || inner.getpid() as i32).unwrap();
    let pid = child.pid();

    assert_eq!(
        sys.waitpid(pid, 0),
        Ok(WaitStatus::Exited {
            pid,
            status: pid as i32
        })
    );
    assert_eq!(WaitStatus::Exited { pid, status: 0 }.pid(), pid);
    child.join_host().unwrap();
}

#[test]
fn test_wait_errors_map_to_errno() {
    let sys = executor();
    let (tx, rx) = mpsc::channel::<()>();

    // The child attempts waits it is not allowed to make
    let inner = SyscallExecutor::new(Arc::clone(sys.pid_table()));
    let child = sys
        .fork("child", move || {
            let me = inner.getpid();
            let checks = [
                inner.waitpid(me, 0) == Err(Errno::EDEADLK),
                inner.waitpid(BOOTUP_PID, 0) == Err(Errno::EINVAL),
                inner.waitpid(me + 1000, WNOHANG) == Err(Errno::ESRCH),
            ];
            rx.recv().ok();
            if checks.iter().all(|ok| *ok) {
                0
            } else {
                1
            }
        })
        .unwrap();
    let pid = child.pid();

    // A sibling is not the parent
    let sibling = sys.pid_table().allocate(BOOTUP_PID).unwrap();
    let stranger = sys.pid_table().join(sibling, pid, true, WaitMode::NoHang);
    assert_eq!(stranger.map_err(Errno::from), Err(Errno::ECHILD));

    tx.send(()).unwrap();
    assert_eq!(sys.waitpid(pid, 0), Ok(WaitStatus::Exited { pid, status: 0 }));
    child.join_host().unwrap();
}

#[test]
fn test_detach_then_wait_is_esrch() {
    let sys = executor();
    let (tx, rx) = mpsc::channel::<()>();

    let child = sys.fork("detached", move || rx.recv().map_or(1, |_| 0)).unwrap();
    let pid = child.pid();

    assert_eq!(sys.detach(pid), Ok(()));
    assert_eq!(sys.detach(pid), Err(Errno::EINVAL));

    tx.send(()).unwrap();
    child.join_host().unwrap();

    assert_eq!(sys.waitpid(pid, 0), Err(Errno::ESRCH));
    assert_eq!(sys.pid_table().live_count(), 1);
}

#[test]
fn test_fork_reports_eagain_when_table_full() {
    let sys = executor_with(
        PidTableConfig::default()
            .with_capacity(2)
            .with_pid_range(2, 10),
    );
    let (tx, rx) = mpsc::channel::<()>();

    let child = sys.fork("only", move || rx.recv().map_or(1, |_| 0)).unwrap();
    assert_eq!(sys.fork("extra", || 0).err(), Some(Errno::EAGAIN));

    tx.send(()).unwrap();
    assert!(sys.waitpid(child.pid(), 0).is_ok());
    child.join_host().unwrap();
}

#[test]
fn test_fork_reports_enomem_when_heap_exhausted() {
    let sys = executor_with(PidTableConfig::default().with_heap_bytes(RECORD_FOOTPRINT));

    assert_eq!(sys.fork("starved", || 0).err(), Some(Errno::ENOMEM));
    assert_eq!(sys.pid_table().live_count(), 1);
}

#[test]
fn test_kill_records_and_clears_signal() {
    let sys = executor();
    let pid = sys.pid_table().allocate(sys.getpid()).unwrap();

    assert_eq!(sys.pending_signal(pid), Ok(0));
    assert_eq!(sys.kill(pid, 15), Ok(()));
    assert_eq!(sys.pending_signal(pid), Ok(15));
    assert_eq!(sys.kill(pid, 0), Ok(()));
    assert_eq!(sys.pending_signal(pid), Ok(0));

    assert_eq!(sys.kill(pid, NSIG), Err(Errno::EINVAL));
    assert_eq!(sys.kill(BOOTUP_PID, 9), Err(Errno::EINVAL));
    assert_eq!(sys.kill(0, 9), Err(Errno::EINVAL));
}

#[test]
fn test_errno_codes_match_linux() {
    assert_eq!(Errno::ESRCH.code(), 3);
    assert_eq!(Errno::ECHILD.code(), 10);
    assert_eq!(Errno::EAGAIN.code(), 11);
    assert_eq!(Errno::ENOMEM.code(), 12);
    assert_eq!(Errno::EINVAL.code(), 22);
    assert_eq!(Errno::EDEADLK.code(), 35);
}
