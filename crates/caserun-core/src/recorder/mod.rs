use crate::model::Case;

pub mod dump;
pub mod jsonl;

pub use dump::{DumpRecorder, DumpSink};
pub use jsonl::JsonlRecorder;

/// Where finished cases go. The runner calls `record` exactly once per
/// case, in source order, whether or not the case failed.
///
/// Closed-recorder policy: after `close`, `record` is a silent no-op,
/// never an error. Before close, a `record` error is real and the runner
/// treats it as fatal; silently dropped records would break the
/// exactly-once contract.
pub trait CaseRecorder {
    fn record(&mut self, case: &Case) -> anyhow::Result<()>;

    /// Flush and release whatever the recorder privately owns. Shared
    /// sinks (standard streams, caller-provided buffers) stay open and
    /// intact. Idempotent.
    fn close(&mut self) -> anyhow::Result<()>;
}
