use crate::cli::args::RunsArgs;
use crate::exit_codes;
use caserun_core::Store;

pub fn run(args: RunsArgs) -> anyhow::Result<i32> {
    if !args.db.exists() {
        eprintln!("no run database at {}", args.db.display());
        return Ok(exit_codes::CONFIG_ERROR);
    }
    let store = Store::open(&args.db)?;
    store.init_schema()?;

    let runs = store.list_runs(args.last)?;
    if runs.is_empty() {
        println!("no recorded runs");
        return Ok(exit_codes::SUCCESS);
    }
    for r in runs {
        println!(
            "{:>4}  {:<7}  {}  {}  ({})",
            r.id, r.status, r.started_at, r.name, r.run_uuid
        );
    }
    Ok(exit_codes::SUCCESS)
}
