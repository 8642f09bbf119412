/*!
 * Concurrency Tests
 * Blocking joins, exit/detach races and multi-parent churn on real threads
 */

use pid_kernel::core::limits::BOOTUP_PID;
use pid_kernel::process::bind_boot_thread;
use pid_kernel::{
    current_pid, thread_fork, ExitStatus, JoinOutcome, PidError, PidTable, PidTableConfig,
    WaitMode,
};
use pretty_assertions::assert_eq;
use rand::Rng;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn shared_table() -> Arc<PidTable> {
    Arc::new(PidTable::new(PidTableConfig::default()).unwrap())
}

#[test]
fn test_blocking_join_woken_by_exit() {
    let pids = shared_table();
    let child = pids.allocate(BOOTUP_PID).unwrap();

    let exiter = {
        let pids = Arc::clone(&pids);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            pids.exit(child, 42, false);
        })
    };

    assert_eq!(
        pids.join(BOOTUP_PID, child, true, WaitMode::Block),
        Ok(JoinOutcome::Joined {
            pid: child,
            status: Some(42)
        })
    );
    exiter.join().unwrap();
    assert_eq!(pids.live_count(), 1);
}

#[test]
fn test_blocking_join_by_forked_parent() {
    let pids = shared_table();
    bind_boot_thread(&pids).unwrap();

    let inner = Arc::clone(&pids);
    let parent = thread_fork(&pids, "parent", move || {
        let me = current_pid();
        let child = thread_fork(&inner, "child", || {
            thread::sleep(Duration::from_millis(20));
            11
        })
        .unwrap();

        let outcome = inner.join(me, child.pid(), true, WaitMode::Block);
        child.join_host().unwrap();
        match outcome {
            Ok(JoinOutcome::Joined { status: Some(11), .. }) => 0,
            _ => 1,
        }
    })
    .unwrap();

    let pid = parent.pid();
    assert_eq!(
        pids.join(BOOTUP_PID, pid, true, WaitMode::Block),
        Ok(JoinOutcome::Joined {
            pid,
            status: Some(0)
        })
    );
    parent.join_host().unwrap();
    assert_eq!(pids.live_count(), 1);
}

#[test]
fn test_second_waiter_with_same_identity_gets_not_found() {
    let pids = shared_table();
    let child = pids.allocate(BOOTUP_PID).unwrap();
    let start = Arc::new(Barrier::new(3));

    let waiters: Vec<_> = (0..2)
        .map(|_| {
            let pids = Arc::clone(&pids);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                pids.join(BOOTUP_PID, child, true, WaitMode::Block)
            })
        })
        .collect();

    start.wait();
    thread::sleep(Duration::from_millis(50));
    pids.exit(child, 5, false);

    let mut outcomes: Vec<_> = waiters.into_iter().map(|w| w.join().unwrap()).collect();
    outcomes.sort_by_key(|outcome| outcome.is_err());
    assert_eq!(
        outcomes,
        vec![
            Ok(JoinOutcome::Joined {
                pid: child,
                status: Some(5)
            }),
            Err(PidError::NotFound(child)),
        ]
    );
    assert_eq!(pids.live_count(), 1);
}

#[test]
fn test_detach_races_exit() {
    let pids = shared_table();

    for round in 0..200 {
        let child = pids.allocate(BOOTUP_PID).unwrap();
        let start = Arc::new(Barrier::new(2));

        let exiter = {
            let pids = Arc::clone(&pids);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                pids.exit(child, round, false);
            })
        };

        start.wait();
        assert_eq!(pids.detach(BOOTUP_PID, child), Ok(()));
        exiter.join().unwrap();

        // Whichever side ran second reclaimed the record
        assert!(!pids.contains(child));
    }

    let stats = pids.stats();
    assert_eq!(stats.live, 1);
    assert_eq!(stats.detached, 200);
    assert_eq!(stats.reclaimed, 200);
}

#[test]
fn test_kill_flag_visible_across_threads() {
    let pids = shared_table();
    let child = pids.allocate(BOOTUP_PID).unwrap();

    let setter = {
        let pids = Arc::clone(&pids);
        thread::spawn(move || pids.set_flag(child, 9))
    };
    assert_eq!(setter.join().unwrap(), Ok(()));
    assert_eq!(pids.get_flag(child), Ok(9));

    pids.exit(child, 0, false);
    pids.detach(BOOTUP_PID, child).unwrap();
    assert_eq!(pids.get_flag(child), Err(PidError::NotFound(child)));
}

#[test]
fn test_many_parents_churn_children() {
    const PARENTS: usize = 8;
    const ROUNDS: usize = 50;

    let pids = shared_table();
    let mut parents = Vec::new();

    for _ in 0..PARENTS {
        let me = pids.allocate(BOOTUP_PID).unwrap();
        let pids = Arc::clone(&pids);

        let handle = thread::spawn(move || {
            let mut rng = rand::thread_rng();

            for round in 0..ROUNDS {
                let child = pids.allocate(me).unwrap();
                let status = round as ExitStatus;

                let exiter = {
                    let pids = Arc::clone(&pids);
                    thread::spawn(move || pids.exit(child, status, false))
                };

                if rng.gen_bool(0.5) {
                    assert_eq!(
                        pids.join(me, child, true, WaitMode::Block),
                        Ok(JoinOutcome::Joined {
                            pid: child,
                            status: Some(status)
                        })
                    );
                } else {
                    assert_eq!(pids.detach(me, child), Ok(()));
                }
                exiter.join().unwrap();
                assert!(!pids.contains(child));
            }

            // Leave a running child behind for exit to detach
            let straggler = pids.allocate(me).unwrap();
            pids.exit(me, 0, true);
            straggler
        });
        parents.push((me, handle));
    }

    for (parent, handle) in parents {
        let straggler = handle.join().unwrap();
        assert_eq!(pids.record(straggler).unwrap().ppid, None);
        pids.exit(straggler, 0, false);

        assert_eq!(
            pids.join(BOOTUP_PID, parent, false, WaitMode::Block),
            Ok(JoinOutcome::Joined {
                pid: parent,
                status: None
            })
        );
    }

    let stats = pids.stats();
    assert_eq!(stats.live, 1);
    assert_eq!(stats.allocated, (PARENTS * (ROUNDS + 2)) as u64);
}
