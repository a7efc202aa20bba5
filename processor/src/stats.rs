use std::fmt::{self, Display};

use scheduler::{Pid, Ticks};

use crate::Completion;

/// Timings of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStats {
    pub pid: Pid,
    pub name: String,
    pub arrival: Ticks,
    pub total_time: Ticks,
    pub completion: Ticks,

    /// Time between arrival and completion.
    pub turnaround: Ticks,

    /// Time spent in the ready queue without the CPU.
    pub waiting: Ticks,
}

impl ProcessStats {
    fn new(completion: &Completion) -> ProcessStats {
        let process = &completion.process;
        let turnaround = completion.time.saturating_sub(process.arrival());
        ProcessStats {
            pid: process.pid(),
            name: process.name().to_string(),
            arrival: process.arrival(),
            total_time: process.total_time(),
            completion: completion.time,
            turnaround,
            waiting: turnaround.saturating_sub(process.total_time()),
        }
    }
}

impl Display for ProcessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.name, self.arrival, self.total_time, self.completion, self.turnaround, self.waiting
        )
    }
}

/// Turnaround and waiting times of a run, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub processes: Vec<ProcessStats>,
}

impl Summary {
    pub fn from_history(history: &[Completion]) -> Summary {
        Summary {
            processes: history.iter().map(ProcessStats::new).collect(),
        }
    }

    /// The time at which the last process finished.
    pub fn makespan(&self) -> Ticks {
        self.processes
            .iter()
            .map(|stats| stats.completion)
            .max()
            .unwrap_or(0)
    }

    pub fn average_turnaround(&self) -> f64 {
        self.average(|stats| stats.turnaround)
    }

    pub fn average_waiting(&self) -> f64 {
        self.average(|stats| stats.waiting)
    }

    fn average(&self, field: impl Fn(&ProcessStats) -> Ticks) -> f64 {
        if self.processes.is_empty() {
            return 0.0;
        }
        let sum: Ticks = self.processes.iter().map(field).sum();
        sum as f64 / self.processes.len() as f64
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NAME\tARRIVAL\tTOTAL\tEND\tTURN\tWAIT")?;
        for stats in &self.processes {
            writeln!(f, "{}", stats)?;
        }
        writeln!(f, "Average turnaround: {:.2}", self.average_turnaround())?;
        writeln!(f, "Average waiting: {:.2}", self.average_waiting())?;
        writeln!(f, "Makespan: {}", self.makespan())
    }
}
