use crate::{Policy, Process, Ticks};

/// Shortest Job First, non preemptive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sjf;

impl Policy for Sjf {
    fn name(&self) -> &'static str {
        "sjf"
    }

    fn is_preemptive(&self) -> bool {
        false
    }

    fn rank<'a>(&self, mut ready: Vec<&'a Process>, _now: Ticks) -> Vec<&'a Process> {
        ready.sort_by_key(|process| process.total_time());
        ready
    }
}
