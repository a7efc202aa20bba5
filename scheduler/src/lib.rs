//! A scheduling policy library.
//!
//! This library provides the process model and the policies
//! that the [`processor`](../processor/index.html) engine consults
//! to decide which process gets the CPU.
//!

use std::fmt::{self, Display};
use std::str::FromStr;

mod scheduler;

pub use crate::scheduler::{
    Pid, Policy, Process, ProcessError, ProcessSpec, ProcessState, Ticks,
};

pub mod schedulers;

use schedulers::{Fcfs, RoundRobin, Sjf, Srtf};

/// Returns a First Come, First Served policy.
pub fn fcfs() -> impl Policy {
    Fcfs
}

/// Returns a non preemptive Shortest Job First policy.
pub fn sjf() -> impl Policy {
    Sjf
}

/// Returns a Shortest Remaining Time First policy.
pub fn srtf() -> impl Policy {
    Srtf
}

/// Returns a Round Robin policy.
///
/// The quantum is not part of the policy, it is given to the engine.
pub fn round_robin() -> impl Policy {
    RoundRobin
}

/// One of the four policies, picked at runtime (for example from a config value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Fcfs,
    Sjf,
    Srtf,
    RoundRobin,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Fcfs,
        PolicyKind::Sjf,
        PolicyKind::Srtf,
        PolicyKind::RoundRobin,
    ];

    fn policy(&self) -> &'static dyn Policy {
        match self {
            PolicyKind::Fcfs => &Fcfs,
            PolicyKind::Sjf => &Sjf,
            PolicyKind::Srtf => &Srtf,
            PolicyKind::RoundRobin => &RoundRobin,
        }
    }
}

impl Policy for PolicyKind {
    fn name(&self) -> &'static str {
        self.policy().name()
    }

    fn is_preemptive(&self) -> bool {
        self.policy().is_preemptive()
    }

    fn is_round_robin(&self) -> bool {
        self.policy().is_round_robin()
    }

    fn rank<'a>(&self, ready: Vec<&'a Process>, now: Ticks) -> Vec<&'a Process> {
        self.policy().rank(ready, now)
    }
}

impl FromStr for PolicyKind {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fcfs" => Ok(PolicyKind::Fcfs),
            "sjf" => Ok(PolicyKind::Sjf),
            "srtf" => Ok(PolicyKind::Srtf),
            "rr" | "round-robin" | "round_robin" | "roundrobin" => Ok(PolicyKind::RoundRobin),
            _ => Err(ProcessError::UnknownPolicy(s.to_string())),
        }
    }
}

impl Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
