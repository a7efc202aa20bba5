use crate::{Policy, Process, Ticks};

/// Round Robin.
///
/// The policy itself never reorders anything: the engine serves the front of
/// its FIFO ready queue and rotates it when the quantum expires.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobin;

impl Policy for RoundRobin {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn is_round_robin(&self) -> bool {
        true
    }

    fn rank<'a>(&self, ready: Vec<&'a Process>, _now: Ticks) -> Vec<&'a Process> {
        ready
    }
}
