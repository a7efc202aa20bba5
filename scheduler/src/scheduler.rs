use std::fmt::{self, Display};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use thiserror::Error;

/// Simulated time, counted in CPU units.
pub type Ticks = usize;

static NEXT_PID: AtomicUsize = AtomicUsize::new(1);

/// The PID of a process
///
/// The PID cannot be 0, PIDs start from 1. Every [`Process`] created during the
/// lifetime of the program receives a fresh one.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Pid(NonZeroUsize);

impl Pid {
    fn next() -> Pid {
        let pid = NEXT_PID.fetch_add(1, Ordering::Relaxed);
        Pid(NonZeroUsize::new(pid).expect("pid counter wrapped around"))
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl PartialEq<usize> for Pid {
    fn eq(&self, other: &usize) -> bool {
        self.0.get() == *other
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors reported while building processes or picking a policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("process `{name}` must require at least one CPU unit, got {total_time}")]
    NonPositiveTotalTime { name: String, total_time: i64 },

    #[error("process `{name}` cannot arrive at negative time {arrival}")]
    NegativeArrival { name: String, arrival: i64 },

    #[error("process `{name}` cannot have a negative quantum {quantum}")]
    NegativeQuantum { name: String, quantum: i64 },

    #[error("unknown scheduling policy `{0}`")]
    UnknownPolicy(String),
}

/// The state of a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ProcessState {
    /// The process has not arrived yet.
    #[default]
    New,

    /// The process is in the ready queue, waiting for the CPU.
    Ready,

    /// The process occupied the CPU during the last simulated unit.
    Running,

    /// The process has consumed all of its CPU units.
    Finished,
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::New => write!(f, "NEW"),
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Finished => write!(f, "FINISHED"),
        }
    }
}

/// A process definition as it arrives from outside, before validation.
///
/// Times are signed here so that bad input can be reported instead of
/// being unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub total_time: i64,
    pub arrival: i64,
    #[serde(default)]
    pub quantum: i64,
}

/// A simulated process.
///
/// Identity, total CPU time and arrival are fixed at creation. The remaining
/// time and state are runtime counters updated only by the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pid: Pid,
    name: String,
    total_time: Ticks,
    remaining: Ticks,
    arrival: Ticks,
    quantum: Ticks,
    state: ProcessState,
}

impl Process {
    /// Create a process that needs `total_time` CPU units and becomes ready at `arrival`.
    pub fn new(name: impl Into<String>, total_time: Ticks, arrival: Ticks) -> Result<Process, ProcessError> {
        Process::with_quantum(name, total_time, arrival, 0)
    }

    /// Same as [`Process::new`], also recording an informational quantum.
    ///
    /// The quantum is only shown to the user; Round Robin uses the one given
    /// to the engine.
    pub fn with_quantum(
        name: impl Into<String>,
        total_time: Ticks,
        arrival: Ticks,
        quantum: Ticks,
    ) -> Result<Process, ProcessError> {
        let name = name.into();
        if total_time == 0 {
            return Err(ProcessError::NonPositiveTotalTime { name, total_time: 0 });
        }

        Ok(Process {
            pid: Pid::next(),
            name,
            total_time,
            remaining: total_time,
            arrival,
            quantum,
            state: ProcessState::New,
        })
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_time(&self) -> Ticks {
        self.total_time
    }

    pub fn remaining(&self) -> Ticks {
        self.remaining
    }

    pub fn arrival(&self) -> Ticks {
        self.arrival
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Consume one CPU unit. Returns the units left.
    /// Only the simulation engine calls this; it resets every process it is
    /// handed before a run.
    #[doc(hidden)]
    pub fn execute(&mut self) -> Ticks {
        debug_assert!(self.remaining > 0, "process {} executed after finishing", self.pid);
        self.remaining = self.remaining.saturating_sub(1);
        self.state = if self.remaining == 0 {
            ProcessState::Finished
        } else {
            ProcessState::Running
        };
        self.remaining
    }

    #[doc(hidden)]
    pub fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    /// Put the runtime counters back to their creation values.
    #[doc(hidden)]
    pub fn reset(&mut self) {
        self.remaining = self.total_time;
        self.state = ProcessState::New;
    }
}

impl TryFrom<ProcessSpec> for Process {
    type Error = ProcessError;

    fn try_from(spec: ProcessSpec) -> Result<Self, Self::Error> {
        let ProcessSpec {
            name,
            total_time,
            arrival,
            quantum,
        } = spec;

        if total_time <= 0 {
            return Err(ProcessError::NonPositiveTotalTime { name, total_time });
        }
        if arrival < 0 {
            return Err(ProcessError::NegativeArrival { name, arrival });
        }
        if quantum < 0 {
            return Err(ProcessError::NegativeQuantum { name, quantum });
        }

        Process::with_quantum(name, total_time as Ticks, arrival as Ticks, quantum as Ticks)
    }
}

impl Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "P{}({}, t={}, l={})",
            self.pid, self.name, self.total_time, self.arrival
        )
    }
}

/// The trait that any scheduling policy has to implement.
///
/// A policy never owns processes and never changes them: it only looks at the
/// ready set the engine hands over and tells it in which order to consider them.
pub trait Policy: Send + Sync {
    /// A short name used in logs and output paths.
    fn name(&self) -> &'static str;

    /// Whether a running process can lose the CPU before it finishes.
    fn is_preemptive(&self) -> bool;

    /// Whether the engine should rotate its ready queue every quantum.
    fn is_round_robin(&self) -> bool {
        false
    }

    /// Order the ready processes, best candidate first.
    ///
    /// The sort must be stable: processes with equal keys keep the order in
    /// which they were handed over.
    fn rank<'a>(&self, ready: Vec<&'a Process>, now: Ticks) -> Vec<&'a Process>;
}
