use crate::model::Case;
use crate::recorder::CaseRecorder;
use crate::source::CaseSource;
use crate::target::TargetModel;
use anyhow::Context;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// What [`CaseRunner::run_all`] reports back. Observability only: the
/// recorded case data flows exclusively to the recorder.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub executed: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Sequential case replay driver.
///
/// Pulls cases from a source one at a time, replays each against the
/// target, and hands every completed case to the recorder in source
/// order, failed or not. Per-case failures become text annotations on the
/// case; only precondition failures abort the run: a source that cannot
/// produce the next case, inputs that cannot be applied, or a recorder
/// that cannot persist.
pub struct CaseRunner {
    run_id: String,
}

impl Default for CaseRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseRunner {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Use a caller-chosen run identifier instead of a generated one.
    pub fn with_run_id(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Drain the source once. Every pulled case is tagged with this run's
    /// identifier, executed, and recorded.
    pub fn run_all(
        &self,
        source: &mut dyn CaseSource,
        target: &mut dyn TargetModel,
        recorder: &mut dyn CaseRecorder,
    ) -> anyhow::Result<RunSummary> {
        let started = Instant::now();
        let mut executed = 0usize;
        let mut failed = 0usize;

        for next in source.cases() {
            let mut case = next.context("case source failed to produce the next case")?;
            tracing::debug!(run_id = %self.run_id, case_id = %case.id, "executing case");
            self.run_case(&mut case, target)?;
            executed += 1;
            if let Some(msg) = &case.msg {
                failed += 1;
                tracing::warn!(case_id = %case.id, error = %msg, "case failed");
            }
            recorder
                .record(&case)
                .with_context(|| format!("failed to record case '{}'", case.id))?;
        }

        let summary = RunSummary {
            run_id: self.run_id.clone(),
            executed,
            failed,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            run_id = %summary.run_id,
            executed = summary.executed,
            failed = summary.failed,
            "run complete"
        );
        Ok(summary)
    }

    /// Execute one case. Execution and read-back failures end up in the
    /// case's annotation; inputs that cannot be applied are an error.
    fn run_case(&self, case: &mut Case, target: &mut dyn TargetModel) -> anyhow::Result<()> {
        case.parent_id = Some(self.run_id.clone());

        target
            .apply_inputs(&case.inputs)
            .with_context(|| format!("failed to apply inputs for case '{}'", case.id))?;

        let mut msg = match target.run(&case.id) {
            Ok(()) => None,
            Err(e) => Some(e.to_string()),
        };

        // Read-back happens whether or not execution failed; a secondary
        // failure is appended to the execution message, execution first.
        if let Err(e) = read_outputs_into(case, target) {
            msg = Some(match msg {
                Some(exec) => format!("{} : {}", exec, e),
                None => e.to_string(),
            });
        }

        case.msg = msg;
        Ok(())
    }
}

/// Copy the target's reported outputs into the case. With a capture list,
/// names are taken one at a time in capture order; the first missing name
/// fails the read and already-copied outputs stay in place.
fn read_outputs_into(case: &mut Case, target: &mut dyn TargetModel) -> anyhow::Result<()> {
    let reported = target.read_outputs()?;
    if case.capture.is_empty() {
        for a in reported {
            case.set_output(&a.name, a.value);
        }
        return Ok(());
    }
    let wanted = case.capture.clone();
    for name in &wanted {
        match reported.iter().find(|a| a.name == *name) {
            Some(a) => case.set_output(&a.name, a.value.clone()),
            None => anyhow::bail!("output '{}' was not reported by the target", name),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Assignment;
    use crate::source::ListSource;
    use serde_json::json;

    #[derive(Clone, Copy)]
    enum TargetMode {
        Pass,
        FailSecondRun,
        FailRunAndRead,
        FailRead,
        FailApply,
        FailSecondApply,
    }

    /// Scripted target for contract tests: echoes each staged input back
    /// as `<name>_out`, with failures injected per mode.
    struct ScriptedTarget {
        mode: TargetMode,
        staged: Vec<Assignment>,
        apply_calls: usize,
        run_calls: usize,
    }

    impl ScriptedTarget {
        fn new(mode: TargetMode) -> Self {
            Self {
                mode,
                staged: Vec::new(),
                apply_calls: 0,
                run_calls: 0,
            }
        }

        fn runs(&self) -> usize {
            self.run_calls
        }
    }

    impl TargetModel for ScriptedTarget {
        fn apply_inputs(&mut self, inputs: &[Assignment]) -> anyhow::Result<()> {
            let n = self.apply_calls;
            self.apply_calls += 1;
            match self.mode {
                TargetMode::FailApply => anyhow::bail!("scripted apply failure"),
                TargetMode::FailSecondApply if n == 1 => {
                    anyhow::bail!("scripted apply failure")
                }
                _ => {
                    self.staged = inputs.to_vec();
                    Ok(())
                }
            }
        }

        fn run(&mut self, _case_id: &str) -> anyhow::Result<()> {
            let n = self.run_calls;
            self.run_calls += 1;
            match self.mode {
                TargetMode::FailRunAndRead => anyhow::bail!("scripted run failure"),
                TargetMode::FailSecondRun if n == 1 => anyhow::bail!("scripted run failure"),
                _ => Ok(()),
            }
        }

        fn read_outputs(&mut self) -> anyhow::Result<Vec<Assignment>> {
            match self.mode {
                TargetMode::FailRead | TargetMode::FailRunAndRead => {
                    anyhow::bail!("scripted read failure")
                }
                _ => Ok(self
                    .staged
                    .iter()
                    .map(|a| Assignment::new(format!("{}_out", a.name), a.value.clone()))
                    .collect()),
            }
        }
    }

    /// Doubles input `x` into output `y`.
    struct DoublingTarget {
        x: i64,
    }

    impl TargetModel for DoublingTarget {
        fn apply_inputs(&mut self, inputs: &[Assignment]) -> anyhow::Result<()> {
            self.x = inputs
                .iter()
                .find(|a| a.name == "x")
                .and_then(|a| a.value.as_i64())
                .context("missing input x")?;
            Ok(())
        }

        fn run(&mut self, _case_id: &str) -> anyhow::Result<()> {
            Ok(())
        }

        fn read_outputs(&mut self) -> anyhow::Result<Vec<Assignment>> {
            Ok(vec![Assignment::new("y", json!(self.x * 2))])
        }
    }

    #[derive(Default)]
    struct CollectingRecorder {
        recorded: Vec<Case>,
        closed: bool,
    }

    impl CaseRecorder for CollectingRecorder {
        fn record(&mut self, case: &Case) -> anyhow::Result<()> {
            if self.closed {
                return Ok(());
            }
            self.recorded.push(case.clone());
            Ok(())
        }

        fn close(&mut self) -> anyhow::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    struct FailingRecorder;

    impl CaseRecorder for FailingRecorder {
        fn record(&mut self, _case: &Case) -> anyhow::Result<()> {
            anyhow::bail!("scripted recorder failure")
        }

        fn close(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn source(ids: &[&str]) -> ListSource {
        ListSource::new(
            ids.iter()
                .map(|id| Case::new(*id).with_input("x", json!(1)))
                .collect(),
        )
    }

    #[test]
    fn every_case_is_recorded_once_in_source_order() -> anyhow::Result<()> {
        let mut src = source(&["a", "b", "c"]);
        let mut target = ScriptedTarget::new(TargetMode::Pass);
        let mut rec = CollectingRecorder::default();

        let runner = CaseRunner::new();
        let summary = runner.run_all(&mut src, &mut target, &mut rec)?;

        assert_eq!(summary.executed, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.run_id, runner.run_id());

        let ids: Vec<&str> = rec.recorded.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        for case in &rec.recorded {
            assert_eq!(case.parent_id.as_deref(), Some(runner.run_id()));
            assert!(case.msg.is_none());
            assert_eq!(case.output("x_out"), Some(&json!(1)));
        }
        Ok(())
    }

    #[test]
    fn failing_case_is_recorded_and_the_run_continues() -> anyhow::Result<()> {
        let mut src = source(&["a", "b", "c"]);
        let mut target = ScriptedTarget::new(TargetMode::FailSecondRun);
        let mut rec = CollectingRecorder::default();

        let summary = CaseRunner::new().run_all(&mut src, &mut target, &mut rec)?;

        assert_eq!(summary.executed, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(target.runs(), 3);
        assert_eq!(rec.recorded.len(), 3);
        assert!(rec.recorded[0].msg.is_none());
        assert_eq!(rec.recorded[1].msg.as_deref(), Some("scripted run failure"));
        assert!(rec.recorded[2].msg.is_none());
        Ok(())
    }

    #[test]
    fn execution_and_read_failures_join_with_the_separator() -> anyhow::Result<()> {
        let mut src = source(&["a"]);
        let mut target = ScriptedTarget::new(TargetMode::FailRunAndRead);
        let mut rec = CollectingRecorder::default();

        CaseRunner::new().run_all(&mut src, &mut target, &mut rec)?;

        assert_eq!(
            rec.recorded[0].msg.as_deref(),
            Some("scripted run failure : scripted read failure")
        );
        Ok(())
    }

    #[test]
    fn read_failure_alone_is_the_whole_annotation() -> anyhow::Result<()> {
        let mut src = source(&["a"]);
        let mut target = ScriptedTarget::new(TargetMode::FailRead);
        let mut rec = CollectingRecorder::default();

        let summary = CaseRunner::new().run_all(&mut src, &mut target, &mut rec)?;

        assert_eq!(summary.failed, 1);
        assert_eq!(rec.recorded[0].msg.as_deref(), Some("scripted read failure"));
        assert!(rec.recorded[0].outputs.is_empty());
        Ok(())
    }

    #[test]
    fn empty_source_is_a_clean_no_op() -> anyhow::Result<()> {
        let mut src = ListSource::default();
        let mut target = ScriptedTarget::new(TargetMode::Pass);
        let mut rec = CollectingRecorder::default();

        let summary = CaseRunner::new().run_all(&mut src, &mut target, &mut rec)?;

        assert_eq!(summary.executed, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(target.runs(), 0);
        assert!(rec.recorded.is_empty());
        Ok(())
    }

    #[test]
    fn apply_failure_aborts_without_recording_the_case() {
        let mut src = source(&["a", "b"]);
        let mut target = ScriptedTarget::new(TargetMode::FailApply);
        let mut rec = CollectingRecorder::default();

        let err = CaseRunner::new()
            .run_all(&mut src, &mut target, &mut rec)
            .unwrap_err();

        assert!(
            err.to_string().contains("apply inputs for case 'a'"),
            "got: {err}"
        );
        assert_eq!(target.runs(), 0);
        assert!(rec.recorded.is_empty());
    }

    #[test]
    fn apply_failure_keeps_previously_recorded_cases() {
        let mut src = source(&["a", "b", "c"]);
        let mut target = ScriptedTarget::new(TargetMode::FailSecondApply);
        let mut rec = CollectingRecorder::default();

        let err = CaseRunner::new()
            .run_all(&mut src, &mut target, &mut rec)
            .unwrap_err();

        assert!(
            err.to_string().contains("apply inputs for case 'b'"),
            "got: {err}"
        );
        let ids: Vec<&str> = rec.recorded.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn source_item_error_is_fatal() {
        struct BrokenSource;
        impl CaseSource for BrokenSource {
            fn cases(&mut self) -> crate::source::CaseIter<'_> {
                Box::new(std::iter::once(Err(anyhow::anyhow!("scripted source failure"))))
            }
        }

        let mut src = BrokenSource;
        let mut target = ScriptedTarget::new(TargetMode::Pass);
        let mut rec = CollectingRecorder::default();

        let err = CaseRunner::new()
            .run_all(&mut src, &mut target, &mut rec)
            .unwrap_err();
        assert!(
            err.to_string().contains("failed to produce the next case"),
            "got: {err}"
        );
        assert!(rec.recorded.is_empty());
    }

    #[test]
    fn recorder_error_is_fatal() {
        let mut src = source(&["a"]);
        let mut target = ScriptedTarget::new(TargetMode::Pass);
        let mut rec = FailingRecorder;

        let err = CaseRunner::new()
            .run_all(&mut src, &mut target, &mut rec)
            .unwrap_err();
        assert!(
            err.to_string().contains("failed to record case 'a'"),
            "got: {err}"
        );
    }

    #[test]
    fn missing_captured_output_is_a_read_failure() -> anyhow::Result<()> {
        let mut src = ListSource::new(vec![Case::new("c1")
            .with_input("x", json!(1))
            .with_capture("z")]);
        let mut target = DoublingTarget { x: 0 };
        let mut rec = CollectingRecorder::default();

        let summary = CaseRunner::new().run_all(&mut src, &mut target, &mut rec)?;

        assert_eq!(summary.failed, 1);
        let msg = rec.recorded[0].msg.as_deref().unwrap();
        assert!(msg.contains("output 'z' was not reported"), "got: {msg}");
        Ok(())
    }

    #[test]
    fn doubling_target_records_doubled_outputs_in_order() -> anyhow::Result<()> {
        let mut src = ListSource::new(vec![
            Case::new("c1").with_input("x", json!(1)).with_capture("y"),
            Case::new("c2").with_input("x", json!(2)).with_capture("y"),
        ]);
        let mut target = DoublingTarget { x: 0 };
        let mut rec = CollectingRecorder::default();

        let summary = CaseRunner::with_run_id("run-42").run_all(&mut src, &mut target, &mut rec)?;

        assert_eq!(summary.executed, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(rec.recorded[0].id, "c1");
        assert_eq!(rec.recorded[0].output("y"), Some(&json!(2)));
        assert_eq!(rec.recorded[1].id, "c2");
        assert_eq!(rec.recorded[1].output("y"), Some(&json!(4)));
        assert_eq!(rec.recorded[0].parent_id.as_deref(), Some("run-42"));
        Ok(())
    }
}
