use scheduler::{PolicyKind, Process};

use std::env;
use std::fs;

use processor::format_logs;
use processor::Log;
use processor::Processor;

mod properties;

fn output_path(policy: PolicyKind, folder: &str, name: &str) -> String {
    format!("../outputs/{policy}/{folder}/{name}.log")
}

fn write_logs(policy: PolicyKind, folder: &str, name: &str, logs: &str) {
    fs::create_dir_all(format!("../outputs/{policy}/{folder}")).unwrap();
    fs::write(output_path(policy, folder, name), logs).unwrap();
}

fn read_logs(policy: PolicyKind, folder: &str, name: &str) -> String {
    fs::read_to_string(output_path(policy, folder, name)).unwrap()
}

/// Compare the logs against the reference output, or overwrite the
/// reference when `WRITE_OUTPUT` is set.
fn run(policy: PolicyKind, folder: &str, name: &str, logs: &[Log]) {
    let output = format_logs(logs);

    if env::var("WRITE_OUTPUT").is_ok() {
        write_logs(policy, folder, name, &output);
    } else {
        let reference = read_logs(policy, folder, name);

        println!("\nleft = Correct Output\nright = Your Output\n");
        use pretty_assertions::assert_eq;
        assert_eq!(reference, output);
    }
}

fn process(name: &str, total_time: usize, arrival: usize) -> Process {
    Process::new(name, total_time, arrival).unwrap()
}

fn processor(policy: PolicyKind, quantum: usize) -> Processor<PolicyKind> {
    Processor::new(policy, quantum).unwrap()
}

/// The name of the process that used the CPU in every unit, `-` for idle
/// units. The closing notification is left out.
fn timeline(logs: &[Log]) -> Vec<String> {
    let units = logs.len().saturating_sub(1);
    logs[..units]
        .iter()
        .map(|log| match &log.running {
            Some(process) => process.name().to_string(),
            None => "-".to_string(),
        })
        .collect()
}

/// `(name, completion time)` pairs of the closing notification.
fn completions(logs: &[Log]) -> Vec<(String, usize)> {
    logs.last()
        .map(|log| {
            log.history
                .iter()
                .map(|completion| (completion.process.name().to_string(), completion.time))
                .collect()
        })
        .unwrap_or_default()
}

fn mixed_workload() -> Vec<Process> {
    vec![
        process("A", 5, 0),
        process("B", 3, 1),
        process("C", 1, 2),
        process("D", 2, 2),
        process("E", 4, 9),
        process("F", 2, 20),
    ]
}
