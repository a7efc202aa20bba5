use crate::{Policy, Process, Ticks};

/// First Come, First Served.
///
/// Whoever arrived first gets the CPU and keeps it until it finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fcfs;

impl Policy for Fcfs {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn is_preemptive(&self) -> bool {
        false
    }

    fn rank<'a>(&self, mut ready: Vec<&'a Process>, _now: Ticks) -> Vec<&'a Process> {
        ready.sort_by_key(|process| process.arrival());
        ready
    }
}
