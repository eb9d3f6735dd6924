use crate::cli::args::{RecordKind, RunArgs};
use crate::exit_codes;
use anyhow::Context;
use caserun_core::config::load_config;
use caserun_core::report::console;
use caserun_core::{
    CaseRecorder, CaseRunner, CommandModel, DumpRecorder, EchoModel, JsonlRecorder, ListSource,
    Store, StoreRecorder, TargetModel,
};
use std::time::Duration;

pub fn run(args: RunArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let name = cfg.name.clone();
    let cases = match cfg.into_cases() {
        Ok(cases) => cases,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    tracing::debug!(config = %args.config.display(), cases = cases.len(), "config loaded");
    let mut source = ListSource::new(cases);

    let mut target: Box<dyn TargetModel> = if args.command.is_empty() {
        Box::new(EchoModel::new())
    } else {
        Box::new(
            CommandModel::new(args.command[0].as_str())
                .args(args.command[1..].iter().cloned())
                .timeout(Duration::from_secs(args.timeout)),
        )
    };

    let runner = CaseRunner::new();
    let mut recorder: Box<dyn CaseRecorder> = match args.record {
        RecordKind::Dump => match &args.out {
            Some(path) => Box::new(DumpRecorder::to_path(path)?),
            None => Box::new(DumpRecorder::stdout()),
        },
        RecordKind::Jsonl => {
            let Some(path) = &args.out else {
                eprintln!("config error: --record jsonl requires --out");
                return Ok(exit_codes::CONFIG_ERROR);
            };
            Box::new(JsonlRecorder::create(path)?)
        }
        RecordKind::Sqlite => {
            if let Some(parent) = args.db.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create db directory {}", parent.display())
                    })?;
                }
            }
            let store = Store::open(&args.db)?;
            store.init_schema()?;
            Box::new(StoreRecorder::begin(store, runner.run_id(), &name)?)
        }
    };

    let summary = match runner.run_all(&mut source, target.as_mut(), recorder.as_mut()) {
        Ok(summary) => summary,
        Err(e) => {
            // Still close on the abort path: a store run row must not stay
            // `running` and a file recorder must not lose buffered lines.
            if let Err(close_err) = recorder.close() {
                tracing::warn!(error = %close_err, "failed to close recorder after aborted run");
            }
            return Err(e);
        }
    };
    recorder.close()?;
    console::print_summary(&summary);

    Ok(if summary.failed > 0 {
        exit_codes::CASES_FAILED
    } else {
        exit_codes::SUCCESS
    })
}
