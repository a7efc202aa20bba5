use pretty_assertions::assert_eq;
use processor::{format_logs, Log, Summary};
use scheduler::{PolicyKind, ProcessState};

use super::{mixed_workload, process, processor};

#[test]
fn runs_are_deterministic() {
    for policy in PolicyKind::ALL {
        let processor = processor(policy, 2);
        let first = processor.logs(mixed_workload());
        let second = processor.logs(mixed_workload());

        assert_eq!(format_logs(&first), format_logs(&second));
    }
}

#[test]
fn executed_units_match_total_time() {
    for policy in PolicyKind::ALL {
        let workload = mixed_workload();
        let total: usize = workload.iter().map(|process| process.total_time()).sum();
        let logs = processor(policy, 2).logs(workload);

        let executed = logs.iter().filter(|log| !log.is_idle()).count();
        assert_eq!(executed, total, "{policy}");

        let history = &logs.last().unwrap().history;
        let mut finished = history
            .iter()
            .map(|completion| completion.process.name().to_string())
            .collect::<Vec<_>>();
        finished.sort();
        assert_eq!(finished, vec!["A", "B", "C", "D", "E", "F"], "{policy}");
    }
}

#[test]
fn time_advances_one_unit_per_notification() {
    for policy in PolicyKind::ALL {
        let logs = processor(policy, 3).logs(mixed_workload());
        let (last, units) = logs.split_last().unwrap();

        let mut expected = 0;
        for log in units {
            if log.is_idle() {
                assert_eq!(log.time, expected, "{policy}");
            } else {
                assert_eq!(log.time, expected + 1, "{policy}");
            }
            expected += 1;
        }
        assert_eq!(last.time, expected, "{policy}");
    }
}

#[test]
fn finishing_is_recorded_once_at_zero_remaining() {
    for policy in PolicyKind::ALL {
        let logs = processor(policy, 1).logs(mixed_workload());
        let history = &logs.last().unwrap().history;

        for completion in history {
            let name = completion.process.name();
            let finishing_unit = logs
                .iter()
                .find(|log| {
                    log.running
                        .as_ref()
                        .is_some_and(|process| process.name() == name && process.remaining() == 0)
                })
                .unwrap();

            assert_eq!(finishing_unit.time, completion.time, "{policy} {name}");
            assert_eq!(completion.process.state(), ProcessState::Finished);
            assert_eq!(
                history.iter().filter(|c| c.process.name() == name).count(),
                1
            );
        }
    }
}

#[test]
fn finished_process_never_runs_again() {
    for policy in PolicyKind::ALL {
        let logs = processor(policy, 2).logs(mixed_workload());

        for (index, log) in logs.iter().enumerate() {
            let Some(running) = &log.running else {
                continue;
            };
            let finished_before = logs[..index].iter().any(|earlier| {
                earlier
                    .history
                    .iter()
                    .any(|completion| completion.process.pid() == running.pid())
            });
            assert!(!finished_before, "{policy}: {} ran after finishing", running);
        }
    }
}

#[test]
fn queue_never_holds_duplicates() {
    for policy in PolicyKind::ALL {
        for log in processor(policy, 2).logs(mixed_workload()) {
            let mut pids = log.queue.iter().map(|process| process.pid()).collect::<Vec<_>>();
            pids.sort();
            pids.dedup();
            assert_eq!(pids.len(), log.queue.len(), "{policy}");
        }
    }
}

#[test]
fn processor_can_be_reused() {
    let processor = processor(PolicyKind::Srtf, 1);
    let workload = mixed_workload();

    let first = processor.run(workload.clone(), |_| std::ops::ControlFlow::Continue(()));
    let second = processor.run(workload, |_| std::ops::ControlFlow::Continue(()));

    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
}

#[test]
fn consumed_processes_are_reset() {
    let logs = processor(PolicyKind::Fcfs, 1).logs(vec![process("A", 2, 0)]);
    let finished = logs.last().unwrap().history[0].process.clone();
    assert_eq!(finished.remaining(), 0);

    let logs = processor(PolicyKind::Fcfs, 1).logs(vec![finished]);
    assert_eq!(logs.len(), 3);
    assert_eq!(logs.last().unwrap().history[0].time, 2);
}

#[test]
fn outside_mutation_does_not_change_a_run() {
    let processor = processor(PolicyKind::Srtf, 1);
    let expected = processor.logs(vec![process("A", 3, 0), process("B", 1, 1)]);

    let mut tampered = process("A", 3, 0);
    tampered.execute();
    tampered.execute();
    tampered.set_state(ProcessState::Finished);
    let logs = processor.logs(vec![tampered, process("B", 1, 1)]);

    assert_eq!(format_logs(&logs), format_logs(&expected));
}

#[test]
fn snapshots_do_not_leak_into_the_simulation() {
    let processor = processor(PolicyKind::RoundRobin, 1);
    let expected = processor.logs(vec![process("A", 2, 0), process("B", 2, 0)]);

    let mut simulation = processor.simulate(vec![process("A", 2, 0), process("B", 2, 0)]);
    let mut seen = Vec::new();
    while let Some(mut log) = simulation.next() {
        seen.push(log.clone());
        log.queue.clear();
        log.history.clear();
        if let Some(running) = log.running.as_mut() {
            running.reset();
        }
    }

    let names = |logs: &[Log]| {
        logs.iter()
            .map(|log| log.running.as_ref().map(|p| p.name().to_string()))
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&seen), names(&expected));
}

#[test]
fn summary_reports_turnaround_and_waiting() {
    let history = processor(PolicyKind::Fcfs, 1).run(
        vec![process("A", 3, 0), process("B", 2, 1)],
        |_| std::ops::ControlFlow::Continue(()),
    );
    let summary = Summary::from_history(&history);

    let turnaround = summary
        .processes
        .iter()
        .map(|stats| stats.turnaround)
        .collect::<Vec<_>>();
    let waiting = summary
        .processes
        .iter()
        .map(|stats| stats.waiting)
        .collect::<Vec<_>>();

    assert_eq!(turnaround, vec![3, 4]);
    assert_eq!(waiting, vec![0, 2]);
    assert_eq!(summary.makespan(), 5);
    assert_eq!(summary.average_turnaround(), 3.5);
    assert_eq!(summary.average_waiting(), 1.0);
}

#[test]
fn empty_summary() {
    let summary = Summary::from_history(&[]);

    assert_eq!(summary.makespan(), 0);
    assert_eq!(summary.average_waiting(), 0.0);
}
