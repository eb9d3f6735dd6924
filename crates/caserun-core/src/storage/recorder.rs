use super::store::Store;
use crate::model::Case;
use crate::recorder::CaseRecorder;
use anyhow::{Context, Result};

/// Adapts a [`Store`] to the recorder contract: one `runs` row per
/// recorder, one `cases` row per recorded case. `close` finalizes the run
/// row (`passed` when no recorded case carries a failure annotation,
/// `failed` otherwise); recording after close silently does nothing.
pub struct StoreRecorder {
    store: Store,
    run_id: i64,
    any_failed: bool,
    open: bool,
}

impl StoreRecorder {
    /// Open a run row named `name`, tagged with the runner's identifier.
    pub fn begin(store: Store, run_uuid: &str, name: &str) -> Result<Self> {
        let run_id = store
            .create_run(run_uuid, name)
            .context("failed to create run row")?;
        Ok(Self {
            store,
            run_id,
            any_failed: false,
            open: true,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }
}

impl CaseRecorder for StoreRecorder {
    fn record(&mut self, case: &Case) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.any_failed = self.any_failed || case.failed();
        self.store
            .insert_case(self.run_id, case)
            .with_context(|| format!("failed to record case '{}'", case.id))
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        let status = if self.any_failed { "failed" } else { "passed" };
        self.store.finalize_run(self.run_id, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> Store {
        let store = Store::memory().expect("in-memory store");
        store.init_schema().expect("schema init");
        store
    }

    #[test]
    fn close_finalizes_passed_when_nothing_failed() -> anyhow::Result<()> {
        let store = store();
        let mut rec = StoreRecorder::begin(store.clone(), "uuid-1", "smoke")?;

        rec.record(&Case::new("c1").with_input("x", json!(1)))?;
        rec.close()?;

        let runs = store.list_runs(10)?;
        assert_eq!(runs[0].status, "passed");
        assert_eq!(store.fetch_run_cases(rec.run_id())?.len(), 1);
        Ok(())
    }

    #[test]
    fn close_finalizes_failed_when_any_case_carries_an_annotation() -> anyhow::Result<()> {
        let store = store();
        let mut rec = StoreRecorder::begin(store.clone(), "uuid-1", "smoke")?;

        let mut bad = Case::new("c1");
        bad.msg = Some("boom".to_string());
        rec.record(&bad)?;
        rec.close()?;

        assert_eq!(store.list_runs(10)?[0].status, "failed");
        Ok(())
    }

    #[test]
    fn record_after_close_is_a_silent_no_op() -> anyhow::Result<()> {
        let store = store();
        let mut rec = StoreRecorder::begin(store.clone(), "uuid-1", "smoke")?;

        rec.record(&Case::new("c1"))?;
        rec.close()?;
        rec.record(&Case::new("c2"))?;
        rec.close()?;

        assert_eq!(store.fetch_run_cases(rec.run_id())?.len(), 1);
        assert_eq!(store.list_runs(10)?[0].status, "passed");
        Ok(())
    }
}
