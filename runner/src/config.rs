//! Runner configuration, read from environment variables.
//!
//! | Variable    | Default | Meaning                                        |
//! |-------------|---------|------------------------------------------------|
//! | `POLICY`    | `fcfs`  | `fcfs`, `sjf`, `srtf` or `rr`                  |
//! | `QUANTUM`   | `2`     | Round Robin quantum, in time units             |
//! | `WORKLOAD`  | -       | JSON file with an array of process definitions |
//! | `DELAY_MS`  | `0`     | real time to wait after every time unit        |
//! | `LOG_LEVEL` | `info`  | `off`, `error`, `warn`, `info`, `debug`, `trace` |

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;
use processor::SimulationError;
use scheduler::{PolicyKind, Process, ProcessError, ProcessSpec};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid value `{value}` for {key}")]
    Config { key: &'static str, value: String },

    #[error("cannot read workload {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid workload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("cannot install the logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub policy: PolicyKind,
    pub quantum: usize,
    pub workload: Option<PathBuf>,
    pub delay: Duration,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            policy: PolicyKind::Fcfs,
            quantum: 2,
            workload: None,
            delay: Duration::ZERO,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, RunnerError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key/value source, falling back to the
    /// defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, RunnerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(policy) = lookup("POLICY") {
            config.policy = policy.parse()?;
        }
        if let Some(quantum) = lookup("QUANTUM") {
            config.quantum = parse("QUANTUM", quantum)?;
        }
        if let Some(delay) = lookup("DELAY_MS") {
            config.delay = Duration::from_millis(parse("DELAY_MS", delay)?);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = parse("LOG_LEVEL", level)?;
        }
        config.workload = lookup("WORKLOAD").map(PathBuf::from);

        Ok(config)
    }

    /// The processes to simulate: the workload file if one was given,
    /// the built-in demo otherwise.
    pub fn processes(&self) -> Result<Vec<Process>, RunnerError> {
        match &self.workload {
            Some(path) => {
                let json = fs::read_to_string(path).map_err(|source| RunnerError::Io {
                    path: path.clone(),
                    source,
                })?;
                parse_workload(&json)
            }
            None => demo_workload(),
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, RunnerError> {
    value
        .trim()
        .parse()
        .map_err(|_| RunnerError::Config { key, value })
}

/// Parse a JSON array of process definitions.
///
/// ```json
/// [{ "name": "A", "total_time": 3, "arrival": 0 }]
/// ```
pub fn parse_workload(json: &str) -> Result<Vec<Process>, RunnerError> {
    let specs: Vec<ProcessSpec> = serde_json::from_str(json)?;
    specs
        .into_iter()
        .map(|spec| Process::try_from(spec).map_err(RunnerError::from))
        .collect()
}

fn demo_workload() -> Result<Vec<Process>, RunnerError> {
    Ok(vec![
        Process::new("P1", 5, 0)?,
        Process::new("P2", 3, 1)?,
        Process::new("P3", 1, 2)?,
        Process::new("P4", 2, 8)?,
        Process::new("P5", 4, 14)?,
    ])
}
