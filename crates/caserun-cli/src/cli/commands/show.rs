use crate::cli::args::ShowArgs;
use crate::exit_codes;
use caserun_core::Store;

pub fn run(args: ShowArgs) -> anyhow::Result<i32> {
    if !args.db.exists() {
        eprintln!("no run database at {}", args.db.display());
        return Ok(exit_codes::CONFIG_ERROR);
    }
    let store = Store::open(&args.db)?;
    store.init_schema()?;

    let cases = store.fetch_run_cases(args.run)?;
    if cases.is_empty() {
        println!("no cases recorded for run {}", args.run);
        return Ok(exit_codes::SUCCESS);
    }
    for case in cases {
        print!("{}", case);
    }
    Ok(exit_codes::SUCCESS)
}
