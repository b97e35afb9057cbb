//! Configuration validation command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tinyrack_config::{BootConfig, ConfigError, Performance, ValidationError};
use tinyrack_effects::EffectType;

#[derive(Args)]
pub struct CheckArgs {
    /// Boot configuration files to validate
    #[arg(short, long)]
    boot: Vec<PathBuf>,

    /// Performance files to validate
    #[arg(short, long)]
    performance: Vec<PathBuf>,

    /// List effect types and their parameter counts
    #[arg(long)]
    effects: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    if args.effects {
        println!("Effect types:");
        for kind in EffectType::ALL {
            println!("  {:<12} {} params", kind.name(), kind.param_count());
        }
        println!();
    }

    let mut failures = 0usize;
    for path in &args.boot {
        let result = BootConfig::load(path).and_then(|boot| Ok(boot.validate()?));
        failures += usize::from(!report(path, result));
    }
    for path in &args.performance {
        let result = Performance::load(path).and_then(|p| Ok(p.validate()?));
        failures += usize::from(!report(path, result));
    }

    if args.boot.is_empty() && args.performance.is_empty() && !args.effects {
        anyhow::bail!("Nothing to check; pass --boot or --performance");
    }
    if failures > 0 {
        anyhow::bail!("{failures} file(s) failed validation");
    }
    Ok(())
}

fn report(path: &Path, result: Result<(), ConfigError>) -> bool {
    match result {
        Ok(()) => {
            println!("OK    {}", path.display());
            true
        }
        Err(ConfigError::Validation(ValidationError::Multiple(errors))) => {
            println!("FAIL  {} ({} problems)", path.display(), errors.len());
            for error in errors {
                println!("        {error}");
            }
            false
        }
        Err(err) => {
            println!("FAIL  {}", path.display());
            println!("        {err}");
            false
        }
    }
}
