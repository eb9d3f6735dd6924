//! Sequential case replay: a source feeds cases to an executable target
//! model one at a time, every outcome goes to a recorder, and per-case
//! failures are recorded annotations rather than aborts.

pub mod config;
pub mod engine;
pub mod errors;
pub mod model;
pub mod recorder;
pub mod report;
pub mod source;
pub mod storage;
pub mod target;
pub mod watchdog;

pub use engine::{CaseRunner, RunSummary};
pub use errors::ConfigError;
pub use model::{Assignment, Case};
pub use recorder::{CaseRecorder, DumpRecorder, JsonlRecorder};
pub use source::{CaseSource, JsonlSource, ListSource};
pub use storage::{Store, StoreRecorder};
pub use target::{CommandModel, EchoModel, TargetModel};
pub use watchdog::WatchdogError;
