mod common;

use schedsim::{Algorithm, Scenario, TraceKind};

#[test]
fn test_fcfs_two_processes() {
    common::setup_test();

    let scenario = Scenario::builder()
        .add_process("P1", 0, 5, 1, 0)
        .add_process("P2", 0, 3, 1, 0)
        .build();
    let result = common::simulate(Algorithm::Fcfs, &scenario);

    assert_eq!(
        result.lines(),
        vec![
            "time 0ms: Simulator started for FCFS [Q <empty>]",
            "time 0ms: Process P1 arrived and added to ready queue [Q P1]",
            "time 0ms: Process P2 arrived and added to ready queue [Q P1 P2]",
            "time 4ms: Process P1 started using the CPU [Q P2]",
            "time 9ms: Process P1 terminated [Q P2]",
            "time 13ms: Process P1 switched out of CPU; removed from system [Q P2]",
            "time 17ms: Process P2 started using the CPU [Q <empty>]",
            "time 20ms: Process P2 terminated [Q <empty>]",
            "time 24ms: Process P2 switched out of CPU; removed from system [Q <empty>]",
            "time 24ms: Simulator ended for FCFS [Q <empty>]",
        ]
    );
    assert_eq!(result.end_time(), 24);
    assert_eq!(result.stats.context_switches, 2);
    assert_eq!(result.stats.preemptions, 0);
}

#[test]
fn test_fcfs_io_and_later_arrival() {
    common::setup_test();

    let scenario = Scenario::builder()
        .add_process("A", 0, 10, 2, 20)
        .add_process("B", 2, 5, 1, 0)
        .build();
    let result = common::simulate(Algorithm::Fcfs, &scenario);

    assert_eq!(
        result.lines(),
        vec![
            "time 0ms: Simulator started for FCFS [Q <empty>]",
            "time 0ms: Process A arrived and added to ready queue [Q A]",
            "time 2ms: Process B arrived and added to ready queue [Q B]",
            "time 4ms: Process A started using the CPU [Q B]",
            "time 14ms: Process A completed a CPU burst; 1 burst to go [Q B]",
            "time 18ms: Process A switched out of CPU; will block on I/O until time 38ms [Q B]",
            "time 22ms: Process B started using the CPU [Q <empty>]",
            "time 27ms: Process B terminated [Q <empty>]",
            "time 31ms: Process B switched out of CPU; removed from system [Q <empty>]",
            "time 38ms: Process A completed I/O; added to ready queue [Q A]",
            "time 42ms: Process A started using the CPU [Q <empty>]",
            "time 52ms: Process A terminated [Q <empty>]",
            "time 56ms: Process A switched out of CPU; removed from system [Q <empty>]",
            "time 56ms: Simulator ended for FCFS [Q <empty>]",
        ]
    );

    let stats = &result.stats;
    assert_eq!(stats.total_bursts(), 3);
    // Bursts 10, 5, 10.
    assert_eq!(stats.summary().avg_burst_ms, 8.33);
    // Only B waits: dispatched at 18 after arriving at 2.
    assert_eq!(stats.wait.sum, 16);
    assert_eq!(stats.summary().avg_wait_ms, 5.33);
    // Turnarounds 18, 29, 18.
    assert_eq!(stats.turnaround.sum, 65);
    assert_eq!(stats.summary().avg_turnaround_ms, 21.67);
    assert_eq!(stats.context_switches, 3);
}

#[test]
fn test_fcfs_never_preempts() {
    common::setup_test();

    let result = common::simulate(Algorithm::Fcfs, &common::mixed_workload());
    assert_eq!(result.stats.preemptions, 0);
    assert!(result.trace.events().iter().all(|e| !matches!(
        e.kind,
        TraceKind::SlicePreempted { .. }
            | TraceKind::SliceExpiredNoPreemption { .. }
            | TraceKind::ArrivedPreempting { .. }
            | TraceKind::IoCompletedPreempting { .. }
    )));
    // Every burst runs start to finish in one go.
    for pid in ["A", "B", "C", "D", "E"] {
        assert!(result
            .trace
            .events_for(pid)
            .all(|e| !matches!(e.kind, TraceKind::Started { remaining: Some(_), .. })));
    }
}

#[test]
fn test_fcfs_idle_cpu_until_arrival() {
    common::setup_test();

    let scenario = Scenario::builder().add_process("late", 100, 10, 1, 0).build();
    let result = common::simulate(Algorithm::Fcfs, &scenario);

    let started = result
        .trace
        .events_for("late")
        .find(|e| matches!(e.kind, TraceKind::Started { .. }))
        .map(|e| e.time_ms);
    assert_eq!(started, Some(104));
    assert_eq!(result.trace.termination_time("late"), Some(114));
    assert_eq!(result.end_time(), 118);
    assert_eq!(result.stats.wait.sum, 0);
}
