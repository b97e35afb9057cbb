//! Offline render command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tinyrack_config::{BootConfig, Performance};
use tinyrack_core::linear_to_db;
use tinyrack_io::{RenderEngine, WavDevice};

use crate::tone::{self, Waveform};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    output: PathBuf,

    /// Boot configuration (TOML); defaults are used when omitted
    #[arg(short, long)]
    boot: Option<PathBuf>,

    /// Performance loaded before the first cycle
    #[arg(short, long)]
    performance: Option<PathBuf>,

    /// Duration in seconds
    #[arg(short, long, default_value = "2.0")]
    seconds: f32,

    /// Override the number of render cores
    #[arg(long)]
    cores: Option<usize>,

    /// Test tone waveform
    #[arg(short, long, value_enum, default_value_t = Waveform::Sine)]
    waveform: Waveform,

    /// MIDI note of the first slot's tone
    #[arg(long, default_value = "48")]
    base_note: u8,

    /// Performance to switch to during the render
    #[arg(long)]
    switch: Option<PathBuf>,

    /// Time of the switch in seconds (default: halfway)
    #[arg(long, requires = "switch")]
    switch_at: Option<f32>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut boot = match &args.boot {
        Some(path) => BootConfig::load(path)
            .with_context(|| format!("Failed to load boot config {}", path.display()))?,
        None => BootConfig::default(),
    };
    if let Some(cores) = args.cores {
        boot.cores = cores;
    }
    boot.validate().context("Invalid boot configuration")?;

    if args.seconds <= 0.0 || !args.seconds.is_finite() {
        anyhow::bail!("Duration must be a positive number of seconds");
    }

    let initial = args
        .performance
        .as_ref()
        .map(|path| {
            Performance::load(path)
                .with_context(|| format!("Failed to load performance {}", path.display()))
        })
        .transpose()?;
    let mut switch = args
        .switch
        .as_ref()
        .map(|path| {
            Performance::load(path)
                .with_context(|| format!("Failed to load performance {}", path.display()))
        })
        .transpose()?;

    let generators = tone::chord(
        boot.generators,
        args.base_note,
        args.waveform,
        boot.sample_rate_hz(),
    );
    let mut engine = RenderEngine::new(&boot, generators)?;
    if let Some(performance) = initial {
        let name = performance.name.clone();
        engine
            .load_performance(performance)
            .with_context(|| format!("Performance '{name}' rejected"))?;
    }

    let mut device = WavDevice::create(
        &args.output,
        boot.sample_rate,
        engine.output_channels(),
        boot.format(),
        boot.queue_frames,
    )
    .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let frames = engine.frames_per_cycle() as u64;
    let sample_rate = boot.sample_rate_hz();
    let total_frames = (f64::from(args.seconds) * f64::from(boot.sample_rate)).round() as u64;
    let cycles = total_frames.div_ceil(frames);
    let switch_at = args.switch_at.unwrap_or(args.seconds / 2.0).max(0.0);
    let switch_cycle = (f64::from(switch_at) * f64::from(sample_rate) / frames as f64) as u64;

    println!(
        "Rendering {:.2}s: {} slots ({} active) on {} core(s), {} Hz, {} ch",
        args.seconds,
        boot.generators,
        boot.active,
        boot.cores,
        boot.sample_rate,
        engine.output_channels()
    );

    let mut peak = 0.0f32;
    for cycle in 0..cycles {
        if cycle == switch_cycle {
            if let Some(performance) = switch.take() {
                let name = performance.name.clone();
                engine
                    .load_performance(performance)
                    .with_context(|| format!("Performance '{name}' rejected"))?;
                tracing::info!(cycle, performance = %name, "performance switch requested");
            }
        }
        engine.process(&mut device);
        peak = peak.max(engine.last_peak());
    }

    let written = device.frames_written();
    device.finalize()?;

    let stats = engine.stats();
    println!("Wrote {} frames to {}", written, args.output.display());
    println!("  Peak:          {:.1} dBFS", linear_to_db(peak.max(1e-6)));
    println!("  Cycles:        {}", stats.rendered_cycles);
    println!("  Skipped:       {}", stats.skipped_cycles);
    println!("  Short writes:  {}", stats.short_writes);
    println!("  Switches:      {}", stats.performance_switches);

    Ok(())
}
