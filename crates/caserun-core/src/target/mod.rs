use crate::model::Assignment;

pub mod command;
pub mod echo;

pub use command::CommandModel;
pub use echo::EchoModel;

/// The executable unit a case is replayed against.
///
/// The runner drives it in a fixed order per case: `apply_inputs`, then
/// `run` once, then `read_outputs`. An `apply_inputs` error is a
/// precondition violation and aborts the whole run; `run` and
/// `read_outputs` errors become failure annotations on the case.
pub trait TargetModel {
    fn apply_inputs(&mut self, inputs: &[Assignment]) -> anyhow::Result<()>;

    /// Execute once. `case_id` ties the execution to the case for
    /// downstream traceability.
    fn run(&mut self, case_id: &str) -> anyhow::Result<()>;

    fn read_outputs(&mut self) -> anyhow::Result<Vec<Assignment>>;
}
