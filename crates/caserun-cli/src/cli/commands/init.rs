use crate::cli::args::InitArgs;
use crate::exit_codes;
use anyhow::Context;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        eprintln!("refusing to overwrite {}", args.config.display());
        return Ok(exit_codes::CONFIG_ERROR);
    }
    std::fs::write(&args.config, crate::templates::SAMPLE_CONFIG_YAML)
        .with_context(|| format!("failed to write {}", args.config.display()))?;
    println!("Created {}", args.config.display());
    Ok(exit_codes::SUCCESS)
}
