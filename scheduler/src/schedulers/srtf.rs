use crate::{Policy, Process, Ticks};

/// Shortest Remaining Time First.
///
/// Re-ranked at every unit, so a shorter arrival takes the CPU away from
/// the running process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Srtf;

impl Policy for Srtf {
    fn name(&self) -> &'static str {
        "srtf"
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn rank<'a>(&self, mut ready: Vec<&'a Process>, _now: Ticks) -> Vec<&'a Process> {
        ready.sort_by_key(|process| process.remaining());
        ready
    }
}
