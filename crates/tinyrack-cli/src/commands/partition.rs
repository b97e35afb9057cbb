//! Core partition display.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tinyrack_config::BootConfig;
use tinyrack_core::CorePartition;

#[derive(Args)]
pub struct PartitionArgs {
    /// Read generator and core counts from a boot configuration
    #[arg(short, long, conflicts_with_all = ["generators", "cores", "share"])]
    boot: Option<PathBuf>,

    /// Number of tone generators
    #[arg(short, long, default_value = "16")]
    generators: usize,

    /// Number of render cores
    #[arg(short, long, default_value = "1")]
    cores: usize,

    /// Generators rendered by the coordinator (default: generators / cores)
    #[arg(short, long)]
    share: Option<usize>,
}

pub fn run(args: PartitionArgs) -> Result<()> {
    let boot = match &args.boot {
        Some(path) => BootConfig::load_validated(path)
            .with_context(|| format!("Failed to load boot config {}", path.display()))?,
        None => {
            if args.generators == 0 {
                anyhow::bail!("At least one generator is required");
            }
            BootConfig {
                generators: args.generators,
                active: args.generators,
                cores: args.cores.max(1),
                coordinator_share: args.share,
                ..BootConfig::default()
            }
        }
    };

    let partition = boot.partition();
    print_partition(&partition);
    Ok(())
}

fn print_partition(partition: &CorePartition) {
    println!(
        "{} generators on {} core(s)",
        partition.generators(),
        partition.cores()
    );
    for (core, range) in partition.ranges().iter().enumerate() {
        let role = if core == 0 { "coordinator" } else { "worker" };
        println!(
            "  core {core}: {}..{} ({} generators, {role})",
            range.start,
            range.end,
            range.len()
        );
    }
}
