//! Integration tests for tinyrack-cli.
//!
//! Run the built binary against generated config files in temp dirs.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn tinyrack_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tinyrack"))
}

fn run(args: &[&str]) -> Output {
    tinyrack_bin()
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run tinyrack")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// tinyrack partition
// ---------------------------------------------------------------------------

#[test]
fn partition_with_explicit_share() {
    let output = run(&["partition", "--generators", "10", "--cores", "3", "--share", "2"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("10 generators on 3 core(s)"), "{text}");
    assert!(text.contains("core 0: 0..2"), "{text}");
    assert!(text.contains("core 1: 2..6"), "{text}");
    assert!(text.contains("core 2: 6..10"), "{text}");
}

#[test]
fn partition_puts_remainder_on_coordinator() {
    let output = run(&["partition", "--generators", "9", "--cores", "3", "--share", "2"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("core 0: 0..3"), "{text}");
    assert!(text.contains("core 2: 6..9"), "{text}");
}

#[test]
fn partition_from_boot_file() {
    let dir = tempfile::tempdir().unwrap();
    let boot = write(
        dir.path(),
        "boot.toml",
        "generators = 16\nactive = 16\ncores = 4\n",
    );

    let output = run(&["partition", "--boot", &boot]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("core 0: 0..4"), "{text}");
    assert!(text.contains("core 3: 12..16"), "{text}");
}

// ---------------------------------------------------------------------------
// tinyrack check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_files() {
    let dir = tempfile::tempdir().unwrap();
    let boot = write(dir.path(), "boot.toml", "sample_rate = 44100\ncores = 2\n");
    let performance = write(
        dir.path(),
        "perf.toml",
        r#"
name = "Pad"

[[slots]]
volume = 0.8
pan = 0.25
sends = [0.3]

[[send_buses]]
return_level = 0.5

[[send_buses.chain.effects]]
type = "reverb"
params = [0.7, 0.4]
"#,
    );

    let output = run(&["check", "--boot", &boot, "--performance", &performance]);
    assert!(output.status.success(), "{}", stdout(&output));
    let text = stdout(&output);
    assert_eq!(text.lines().filter(|l| l.starts_with("OK")).count(), 2, "{text}");
}

#[test]
fn check_reports_every_problem() {
    let dir = tempfile::tempdir().unwrap();
    let boot = write(
        dir.path(),
        "boot.toml",
        "sample_rate = 1000\nframes_per_cycle = 0\n",
    );

    let output = run(&["check", "--boot", &boot]);
    assert!(!output.status.success());

    let text = stdout(&output);
    assert!(text.contains("FAIL"), "{text}");
    assert!(text.contains("sample_rate"), "{text}");
    assert!(text.contains("frames_per_cycle"), "{text}");
}

#[test]
fn check_rejects_unknown_effect() {
    let dir = tempfile::tempdir().unwrap();
    let performance = write(
        dir.path(),
        "perf.toml",
        "name = \"Bad\"\n\n[[master.effects]]\ntype = \"wobble\"\n",
    );

    let output = run(&["check", "--performance", &performance]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("wobble"));
}

#[test]
fn check_lists_effects() {
    let output = run(&["check", "--effects"]);
    assert!(output.status.success());

    let text = stdout(&output);
    for name in ["chorus", "delay", "overdrive", "reverb", "phaser"] {
        assert!(text.contains(name), "missing {name}: {text}");
    }
}

#[test]
fn check_without_inputs_fails() {
    assert!(!run(&["check"]).status.success());
}

// ---------------------------------------------------------------------------
// tinyrack render
// ---------------------------------------------------------------------------

fn file_len(path: &Path) -> usize {
    fs::metadata(path).unwrap().len() as usize
}

#[test]
fn render_writes_wav() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.wav");

    let output = run(&[
        "render",
        out.to_str().unwrap(),
        "--seconds",
        "0.1",
        "--waveform",
        "triangle",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    // 4800 frames rounded up to whole 128-frame cycles, 16-bit stereo
    let frames = 4800usize.div_ceil(128) * 128;
    assert!(stdout(&output).contains(&format!("Wrote {frames} frames")));
    assert!(file_len(&out) > frames * 2 * 2);
}

#[test]
fn render_multicore_direct_mode() {
    let dir = tempfile::tempdir().unwrap();
    let boot = write(
        dir.path(),
        "boot.toml",
        "generators = 8\nactive = 4\ncores = 2\noutput_mode = \"direct\"\nsample_format = \"s24\"\n",
    );
    let out = dir.path().join("direct.wav");

    let output = run(&[
        "render",
        out.to_str().unwrap(),
        "--boot",
        &boot,
        "--seconds",
        "0.05",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let frames = 2400usize.div_ceil(128) * 128;
    assert!(stdout(&output).contains(&format!("Wrote {frames} frames")));
    // four active slots, 24-bit
    assert!(file_len(&out) > frames * 4 * 3);
}

#[test]
fn render_with_performance_switch() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "a.toml", "name = \"A\"\n");
    let second = write(
        dir.path(),
        "b.toml",
        "name = \"B\"\n\n[[master.effects]]\ntype = \"chorus\"\n",
    );
    let out = dir.path().join("switch.wav");

    let output = run(&[
        "render",
        out.to_str().unwrap(),
        "--performance",
        &first,
        "--switch",
        &second,
        "--seconds",
        "0.5",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Switches:      2"), "{}", stdout(&output));
}

#[test]
fn render_rejects_bad_boot() {
    let dir = tempfile::tempdir().unwrap();
    let boot = write(dir.path(), "boot.toml", "cores = 0\n");
    let out = dir.path().join("never.wav");

    let output = run(&["render", out.to_str().unwrap(), "--boot", &boot]);
    assert!(!output.status.success());
    assert!(!out.exists());
}
