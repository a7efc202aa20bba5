use std::ops::ControlFlow;
use std::process::ExitCode;
use std::thread;

use processor::{Processor, Summary};

mod config;
mod logger;

use config::{Config, RunnerError};

fn main() -> ExitCode {
    match simulate() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn simulate() -> Result<(), RunnerError> {
    let config = Config::from_env()?;
    logger::init(config.log_level)?;

    let processes = config.processes()?;
    let processor = Processor::new(config.policy, config.quantum)?;

    println!("Policy {}\nQuantum {}\n", config.policy, config.quantum);

    let mut iteration = 0;
    let history = processor.run(processes, |log| {
        iteration += 1;
        println!("===== Iteration: {iteration} =====\n{log}");
        if !config.delay.is_zero() {
            thread::sleep(config.delay);
        }
        ControlFlow::Continue(())
    });

    println!("{}", Summary::from_history(&history));
    Ok(())
}

// Do not delete this line
#[cfg(test)]
mod tests;
