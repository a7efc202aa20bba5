//! The scheduling policies.
//!
//! Each policy lives in its own file and is re-exported here.
//! Policies are stateless values, so they can be copied around freely.
//!
mod fcfs;
pub use fcfs::Fcfs;

mod sjf;
pub use sjf::Sjf;

mod srtf;
pub use srtf::Srtf;

mod round_robin;
pub use round_robin::RoundRobin;
