//! A processor simulation library
//!
//! This is used for simulating the policies from the [`scheduler`] crate
//! on a single CPU, one time unit at a time.

use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::ops::ControlFlow;

use log::{debug, info, trace, warn};
use scheduler::{Policy, Process, ProcessState, Ticks};
use thiserror::Error;

mod stats;

pub use stats::{ProcessStats, Summary};

/// Errors reported when building a [`Processor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("policy `{policy}` needs a quantum of at least one time unit")]
    InvalidQuantum { policy: &'static str },
}

/// A finished process and the time at which it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub process: Process,
    pub time: Ticks,
}

/// What happened during one simulated time unit.
///
/// Everything in here is a copy, changing it does not affect the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    /// The process that used the CPU, or [`None`] if the CPU was idle.
    pub running: Option<Process>,

    /// The simulation time after the unit.
    ///
    /// For idle units this is the time at which the CPU was found idle.
    pub time: Ticks,

    /// The ready queue, in the order the policy sees it.
    pub queue: Vec<Process>,

    /// The processes that finished so far, in completion order.
    pub history: Vec<Completion>,
}

impl Log {
    fn idle(time: Ticks, queue: Vec<Process>, history: Vec<Completion>) -> Log {
        Log {
            running: None,
            time,
            queue,
            history,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }
}

impl Display for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.running {
            Some(process) => writeln!(f, "Time {}: RUN {}", self.time, process.name())?,
            None => writeln!(f, "Time {}: IDLE", self.time)?,
        }
        writeln!(f, "NAME\tSTATE\tTOTAL\tREMAIN\tARRIVAL")?;
        for process in &self.queue {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}",
                process.name(),
                process.state(),
                process.total_time(),
                process.remaining(),
                process.arrival()
            )?;
        }
        if self.history.is_empty() {
            writeln!(f, "History: none")
        } else {
            let history = self
                .history
                .iter()
                .map(|completion| format!("{}@{}", completion.process.name(), completion.time))
                .collect::<Vec<_>>();
            writeln!(f, "History: {}", history.join(", "))
        }
    }
}

/// The processor simulator.
///
/// Holds the policy and, for Round Robin, the quantum. All the state of a
/// run lives in the [`Simulation`] it creates, so one processor can be used
/// for any number of runs.
#[derive(Debug, Clone)]
pub struct Processor<P: Policy> {
    policy: P,
    quantum: usize,
}

impl<P: Policy> Processor<P> {
    /// Create a processor driven by `policy`.
    ///
    /// * `quantum` - the number of units a process may run before the ready
    ///               queue is rotated. Must be at least 1 for Round Robin and
    ///               is ignored by the other policies.
    pub fn new(policy: P, quantum: usize) -> Result<Processor<P>, SimulationError> {
        if policy.is_round_robin() && quantum == 0 {
            return Err(SimulationError::InvalidQuantum {
                policy: policy.name(),
            });
        }

        Ok(Processor { policy, quantum })
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn quantum(&self) -> usize {
        self.quantum
    }

    /// Start a step-wise simulation.
    ///
    /// Every call to [`Iterator::next`] simulates up to the next notification.
    /// The caller decides the pace, which is how a UI or a real-time delay
    /// gets layered on top.
    pub fn simulate<I>(&self, processes: I) -> Simulation<'_, P>
    where
        I: IntoIterator<Item = Process>,
    {
        Simulation::new(&self.policy, self.quantum, processes.into_iter().collect())
    }

    /// Run a simulation to completion.
    ///
    /// * `processes` - the processes to schedule.
    /// * `notify` - called after every simulated unit, once for an empty
    ///              process set and a last time when everything finished.
    ///              Returning [`ControlFlow::Break`] stops the run early.
    ///
    /// Returns the completion history, which is partial if the run was stopped.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use processor::Processor;
    /// use scheduler::{fcfs, Process};
    /// use std::ops::ControlFlow;
    ///
    /// let processor = Processor::new(fcfs(), 1).unwrap();
    /// let processes = vec![
    ///     Process::new("A", 3, 0).unwrap(),
    ///     Process::new("B", 2, 1).unwrap(),
    /// ];
    ///
    /// let history = processor.run(processes, |log| {
    ///     println!("{}", log);
    ///     ControlFlow::Continue(())
    /// });
    ///
    /// assert_eq!(history[0].time, 3);
    /// assert_eq!(history[1].time, 5);
    /// ```
    pub fn run<I, F>(&self, processes: I, mut notify: F) -> Vec<Completion>
    where
        I: IntoIterator<Item = Process>,
        F: FnMut(&Log) -> ControlFlow<()>,
    {
        let mut simulation = self.simulate(processes);
        info!(
            "starting {} simulation of {} processes",
            self.policy.name(),
            simulation.processes.len()
        );

        while let Some(log) = simulation.next() {
            if notify(&log).is_break() {
                warn!("simulation stopped by the caller at time {}", log.time);
                break;
            }
        }

        let history = simulation.finish();
        info!("simulation ended with {} finished processes", history.len());
        history
    }

    /// Run a simulation to completion and keep every notification.
    pub fn logs<I>(&self, processes: I) -> Vec<Log>
    where
        I: IntoIterator<Item = Process>,
    {
        self.simulate(processes).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Running,
    Done,
}

/// A single run of the processor, consumed one notification at a time.
#[derive(Debug)]
pub struct Simulation<'p, P: Policy> {
    policy: &'p P,
    quantum: usize,
    // sorted by arrival; the ready queue holds indexes into it
    processes: Vec<Process>,
    next_arrival: usize,
    ready: VecDeque<usize>,
    current: Option<usize>,
    slice_used: usize,
    time: Ticks,
    history: Vec<Completion>,
    // executed in the last unit, bookkeeping not done yet
    executed: Option<usize>,
    phase: Phase,
}

impl<'p, P: Policy> Simulation<'p, P> {
    fn new(policy: &'p P, quantum: usize, mut processes: Vec<Process>) -> Self {
        for process in processes.iter_mut() {
            process.reset();
        }
        processes.sort_by_key(|process| process.arrival());

        Simulation {
            policy,
            quantum,
            processes,
            next_arrival: 0,
            ready: VecDeque::new(),
            current: None,
            slice_used: 0,
            time: 0,
            history: Vec::new(),
            executed: None,
            phase: Phase::Start,
        }
    }

    /// The current simulation time.
    pub fn time(&self) -> Ticks {
        self.time
    }

    /// The processes that finished so far.
    pub fn history(&self) -> &[Completion] {
        &self.history
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Stop here and return the history, including a process that finished
    /// in the last simulated unit.
    pub fn finish(mut self) -> Vec<Completion> {
        self.settle();
        self.history
    }

    fn admit_arrivals(&mut self) {
        while let Some(process) = self.processes.get_mut(self.next_arrival) {
            if process.arrival() > self.time {
                break;
            }
            trace!("t={} {} arrived", self.time, process);
            process.set_state(ProcessState::Ready);
            self.ready.push_back(self.next_arrival);
            self.next_arrival += 1;
        }
    }

    /// The ready queue as indexes, in the order the policy ranked it.
    ///
    /// Anything the policy returns that is not in the ready queue, or returns
    /// twice, is ignored; ready processes it leaves out keep their queue order
    /// at the end.
    fn ranked(&self) -> Vec<usize> {
        let mut unranked: HashMap<*const Process, usize> = self
            .ready
            .iter()
            .map(|&index| (&self.processes[index] as *const Process, index))
            .collect();
        let ready = self
            .ready
            .iter()
            .map(|&index| &self.processes[index])
            .collect();

        let mut ranked = Vec::with_capacity(self.ready.len());
        for process in self.policy.rank(ready, self.time) {
            match unranked.remove(&(process as *const Process)) {
                Some(index) => ranked.push(index),
                None => warn!(
                    "policy {} ranked {} which is not ready",
                    self.policy.name(),
                    process
                ),
            }
        }

        if !unranked.is_empty() {
            warn!(
                "policy {} left {} ready processes unranked",
                self.policy.name(),
                unranked.len()
            );
            ranked.extend(
                self.ready
                    .iter()
                    .copied()
                    .filter(|index| unranked.contains_key(&(&self.processes[*index] as *const Process))),
            );
        }

        ranked
    }

    fn snapshot(&self, order: &[usize]) -> Vec<Process> {
        order
            .iter()
            .map(|&index| self.processes[index].clone())
            .collect()
    }

    fn select(&self, ranked: &[usize]) -> Option<usize> {
        if self.policy.is_round_robin() {
            return self.ready.front().copied();
        }

        if !self.policy.is_preemptive() {
            if let Some(current) = self.current {
                if !self.processes[current].is_finished() {
                    return Some(current);
                }
            }
        }

        ranked.first().copied()
    }

    // Everything that happens after the notification of an executed unit.
    fn settle(&mut self) {
        let Some(executed) = self.executed.take() else {
            return;
        };

        if self.processes[executed].is_finished() {
            let process = self.processes[executed].clone();
            info!("t={} {} finished", self.time, process);

            match self.ready.iter().position(|&index| index == executed) {
                Some(position) => {
                    self.ready.remove(position);
                }
                None => trace!("{} finished outside the ready queue", process),
            }

            self.history.push(Completion {
                process,
                time: self.time,
            });
            self.current = None;
            self.slice_used = 0;
            return;
        }

        if self.policy.is_round_robin() && self.slice_used >= self.quantum {
            if let Some(front) = self.ready.pop_front() {
                trace!(
                    "t={} quantum expired, {} moves to the back",
                    self.time,
                    self.processes[front]
                );
                self.ready.push_back(front);
            }
            self.slice_used = 0;
        }

        self.admit_arrivals();
    }

    fn step(&mut self) -> Log {
        self.admit_arrivals();

        let round_robin = self.policy.is_round_robin();
        let ranked = if round_robin {
            Vec::new()
        } else {
            self.ranked()
        };

        let Some(selected) = self.select(&ranked) else {
            debug!("t={} cpu idle", self.time);
            let log = Log::idle(self.time, self.snapshot(&ranked), self.history.clone());
            self.time += 1;
            return log;
        };

        if let Some(previous) = self.current.filter(|&previous| previous != selected) {
            let previous = &mut self.processes[previous];
            if !previous.is_finished() {
                debug!("t={} {} loses the cpu", self.time, previous);
                previous.set_state(ProcessState::Ready);
            }
        }
        if round_robin && self.current != Some(selected) {
            self.slice_used = 0;
        }
        self.current = Some(selected);

        let remaining = self.processes[selected].execute();
        self.slice_used += 1;
        self.time += 1;
        self.executed = Some(selected);
        debug!(
            "t={} ran {}, {} units left",
            self.time, self.processes[selected], remaining
        );

        let queue = if round_robin {
            self.ready.iter().copied().collect()
        } else {
            ranked
        };

        Log {
            running: Some(self.processes[selected].clone()),
            time: self.time,
            queue: self.snapshot(&queue),
            history: self.history.clone(),
        }
    }
}

impl<'p, P: Policy> Iterator for Simulation<'p, P> {
    type Item = Log;

    fn next(&mut self) -> Option<Log> {
        match self.phase {
            Phase::Done => return None,
            Phase::Start => {
                self.phase = Phase::Running;
                if self.processes.is_empty() {
                    self.phase = Phase::Done;
                    return Some(Log::idle(self.time, Vec::new(), Vec::new()));
                }
            }
            Phase::Running => self.settle(),
        }

        if self.history.len() == self.processes.len() {
            self.phase = Phase::Done;
            info!("t={} all processes finished", self.time);
            return Some(Log::idle(self.time, Vec::new(), self.history.clone()));
        }

        Some(self.step())
    }
}

/// Format the [`Processor`]'s logs to a [`String`].
///
/// * `logs` - the logs returned by [`Processor::logs`] or collected from
///            the `notify` callback.
pub fn format_logs(logs: &[Log]) -> String {
    logs.iter()
        .enumerate()
        .map(|(iteration, log)| format!("===== Iteration: {} =====\n{}\n", iteration + 1, log))
        .collect()
}
