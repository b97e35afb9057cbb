//! End-to-end render engine tests.

use proptest::prelude::*;
use tinyrack_config::{BootConfig, OutputMode, Performance, SendBusConfig, SlotConfig};
use tinyrack_core::{SampleFormat, ToneGenerator, VolumeRampState};
use tinyrack_effects::EffectType;
use tinyrack_io::{
    CycleOutcome, Error, OutputDevice, QueueDevice, RenderEngine, WavDevice, read_wav_samples,
};

#[derive(Debug, Default)]
struct Dc {
    level: f32,
    resets: usize,
}

impl Dc {
    fn new(level: f32) -> Self {
        Self { level, resets: 0 }
    }
}

impl ToneGenerator for Dc {
    fn render(&mut self, out: &mut [f32]) {
        out.fill(self.level);
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

struct Sine {
    phase: f32,
    increment: f32,
}

impl Sine {
    fn new(freq: f32) -> Self {
        Self {
            phase: 0.0,
            increment: freq / 48000.0,
        }
    }
}

impl ToneGenerator for Sine {
    fn render(&mut self, out: &mut [f32]) {
        for s in out {
            *s = (self.phase * std::f32::consts::TAU).sin() * 0.2;
            self.phase = (self.phase + self.increment).fract();
        }
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Device with a fixed free-space report and a cap on bytes per write.
struct FakeDevice {
    capacity: usize,
    available: usize,
    accept: usize,
    received: usize,
}

impl FakeDevice {
    fn new(capacity: usize, available: usize) -> Self {
        Self {
            capacity,
            available,
            accept: usize::MAX,
            received: 0,
        }
    }
}

impl OutputDevice for FakeDevice {
    fn capacity_frames(&self) -> usize {
        self.capacity
    }

    fn available_frames(&self) -> usize {
        self.available
    }

    fn channels(&self) -> usize {
        2
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.accept);
        self.received += n;
        n
    }
}

fn boot(generators: usize, active: usize) -> BootConfig {
    BootConfig {
        generators,
        active,
        frames_per_cycle: 128,
        send_buses: 2,
        queue_frames: 1024,
        ..BootConfig::default()
    }
}

fn dc_engine(generators: usize, active: usize, level: f32) -> RenderEngine<Dc> {
    let generators_vec = (0..generators).map(|_| Dc::new(level)).collect();
    RenderEngine::new(&boot(generators, active), generators_vec).unwrap()
}

fn resets(engine: &mut RenderEngine<Dc>, index: usize) -> usize {
    let mut count = 0;
    engine.with_generator_mut(index, |g| count = g.resets);
    count
}

#[test]
fn renders_only_when_half_the_queue_is_free() {
    let mut engine = dc_engine(2, 2, 0.1);

    let mut device = FakeDevice::new(256, 128);
    assert_eq!(engine.process(&mut device), CycleOutcome::Rendered);
    assert_eq!(device.received, engine.cycle_bytes());

    device.available = 127;
    assert_eq!(engine.process(&mut device), CycleOutcome::Skipped);
    assert_eq!(device.received, engine.cycle_bytes());

    let stats = engine.stats();
    assert_eq!(stats.rendered_cycles, 1);
    assert_eq!(stats.skipped_cycles, 1);
}

#[test]
fn short_write_drops_remainder() {
    let mut engine = dc_engine(2, 2, 0.1);
    let mut device = FakeDevice::new(1024, 1024);
    device.accept = 100;

    assert_eq!(engine.process(&mut device), CycleOutcome::Rendered);
    let stats = engine.stats();
    assert_eq!(stats.short_writes, 1);
    assert_eq!(stats.dropped_bytes, (engine.cycle_bytes() - 100) as u64);

    // The next cycle starts fresh; nothing is carried over.
    device.accept = usize::MAX;
    engine.process(&mut device);
    assert_eq!(device.received, 100 + engine.cycle_bytes());
    assert_eq!(engine.stats().short_writes, 1);
}

#[test]
fn zero_return_send_bus_never_runs_its_chain() {
    let generators: Vec<Sine> = (0..8).map(|i| Sine::new(110.0 * (i + 1) as f32)).collect();
    let mut engine = RenderEngine::new(&boot(8, 8), generators).unwrap();

    for slot in 0..8 {
        assert!(engine.set_slot_send(slot, 0, 0.5));
        assert!(engine.set_slot_send(slot, 1, 0.5));
    }
    engine.set_send_return(0, 0.4);
    engine.set_send_return(1, 0.0);

    let live = engine.send_chain(0).unwrap();
    let silent = engine.send_chain(1).unwrap();
    live.set_slot(0, EffectType::Reverb);
    silent.set_slot(0, EffectType::Delay);
    let master = engine.master_chain();

    let mut device = QueueDevice::new(1024, 2, SampleFormat::S16);
    for _ in 0..10 {
        assert_eq!(engine.process(&mut device), CycleOutcome::Rendered);
        device.consume_frames(128);
    }

    assert_eq!(live.process_calls(), 10);
    assert_eq!(silent.process_calls(), 0);
    assert_eq!(master.process_calls(), 10);
    assert!(engine.last_peak() > 0.0);
}

#[test]
fn bypassed_master_chain_is_not_run() {
    let mut engine = dc_engine(2, 2, 0.1);
    let master = engine.master_chain();
    master.set_bypass(true);
    engine.render_cycle();
    assert_eq!(master.process_calls(), 0);
}

#[test]
fn performance_switch_mutes_applies_and_resumes() {
    let mut engine = dc_engine(4, 4, 0.5);
    let performance = Performance::new("B")
        .with_slot(SlotConfig {
            volume: 0.5,
            pan: 0.25,
            ..SlotConfig::default()
        })
        .with_send_bus(SendBusConfig {
            return_level: 0.3,
            ..SendBusConfig::default()
        });

    engine.render_cycle();
    engine.load_performance(performance).unwrap();
    assert!(engine.has_pending_performance());
    assert_eq!(engine.volume_state(), VolumeRampState::RampingDown);

    for _ in 0..20 {
        engine.render_cycle();
        if engine.stats().performance_switches == 1 {
            break;
        }
    }
    assert_eq!(engine.stats().performance_switches, 1);
    assert!(!engine.has_pending_performance());
    assert_eq!(engine.volume_state(), VolumeRampState::RampingUp);

    for slot in 0..4 {
        assert_eq!(resets(&mut engine, slot), 1);
    }
    let slot0 = engine.slot_config(0).unwrap();
    assert_eq!(slot0.volume, 0.5);
    assert_eq!(slot0.pan, 0.25);
    assert_eq!(engine.slot_config(1).unwrap(), SlotConfig {
        sends: vec![0.0, 0.0],
        ..SlotConfig::default()
    });
    assert_eq!(engine.send_return(0), Some(0.3));
    assert_eq!(engine.send_return(1), Some(0.0));

    for _ in 0..10 {
        engine.render_cycle();
    }
    assert_eq!(engine.volume_state(), VolumeRampState::Normal);
}

#[test]
fn switch_while_muted_stays_muted() {
    let mut engine = dc_engine(2, 2, 0.5);
    engine.request_mute();
    for _ in 0..10 {
        engine.render_cycle();
    }
    assert_eq!(engine.volume_state(), VolumeRampState::Muted);

    engine
        .load_performance(Performance::new("quiet switch"))
        .unwrap();
    engine.render_cycle();
    assert_eq!(engine.stats().performance_switches, 1);
    assert_eq!(engine.volume_state(), VolumeRampState::Muted);

    // Silence, apart from the one-LSB patch on the last sample.
    let samples = engine.last_samples();
    let (last, rest) = samples.split_last().unwrap();
    assert!(rest.iter().all(|s| *s == 0));
    assert_eq!(*last, 1);
}

fn run_until_switched(engine: &mut RenderEngine<Dc>, switches: u64) {
    for _ in 0..20 {
        engine.render_cycle();
        if engine.stats().performance_switches == switches {
            break;
        }
    }
}

fn settle(engine: &mut RenderEngine<Dc>) {
    for _ in 0..20 {
        engine.render_cycle();
    }
}

#[test]
fn unmute_during_switch_still_applies_it() {
    let mut engine = dc_engine(2, 2, 0.5);
    engine.load_performance(Performance::new("B")).unwrap();
    engine.render_cycle();
    assert_eq!(engine.volume_state(), VolumeRampState::RampingDown);

    engine.request_unmute();
    assert_eq!(engine.volume_state(), VolumeRampState::RampingDown);
    settle(&mut engine);
    assert_eq!(engine.stats().performance_switches, 1);
    assert!(!engine.has_pending_performance());
    assert_eq!(engine.volume_state(), VolumeRampState::Normal);

    // A later mute is the user's and nothing undoes it.
    engine.request_mute();
    settle(&mut engine);
    assert_eq!(engine.volume_state(), VolumeRampState::Muted);
    assert_eq!(engine.stats().performance_switches, 1);
}

#[test]
fn mute_during_switch_stays_muted_after_it() {
    let mut engine = dc_engine(2, 2, 0.5);
    engine.load_performance(Performance::new("B")).unwrap();
    engine.request_mute();
    settle(&mut engine);

    assert_eq!(engine.stats().performance_switches, 1);
    assert_eq!(engine.volume_state(), VolumeRampState::Muted);

    engine.request_unmute();
    settle(&mut engine);
    assert_eq!(engine.volume_state(), VolumeRampState::Normal);
}

#[test]
fn second_switch_replaces_first_and_keeps_resume() {
    let mut engine = dc_engine(2, 2, 0.5);
    let slot_volume = |volume| SlotConfig {
        volume,
        ..SlotConfig::default()
    };

    engine
        .load_performance(Performance::new("A").with_slot(slot_volume(0.25)))
        .unwrap();
    engine.render_cycle();
    assert_eq!(engine.volume_state(), VolumeRampState::RampingDown);
    engine
        .load_performance(Performance::new("B").with_slot(slot_volume(0.75)))
        .unwrap();

    run_until_switched(&mut engine, 1);
    assert_eq!(engine.slot_config(0).unwrap().volume, 0.75);
    settle(&mut engine);
    assert_eq!(engine.stats().performance_switches, 1);
    assert_eq!(engine.volume_state(), VolumeRampState::Normal);
}

#[test]
fn second_switch_while_muted_keeps_silence() {
    let mut engine = dc_engine(2, 2, 0.5);
    engine.request_mute();
    engine.load_performance(Performance::new("A")).unwrap();
    engine.load_performance(Performance::new("B")).unwrap();
    settle(&mut engine);

    assert_eq!(engine.stats().performance_switches, 1);
    assert_eq!(engine.volume_state(), VolumeRampState::Muted);
}

#[test]
fn invalid_performance_is_rejected() {
    let mut engine = dc_engine(2, 2, 0.5);
    let performance = Performance::new("bad").with_slot(SlotConfig {
        volume: 2.0,
        ..SlotConfig::default()
    });
    let err = engine.load_performance(performance).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!engine.has_pending_performance());
    assert_eq!(engine.volume_state(), VolumeRampState::Normal);
}

#[test]
fn master_volume_set_while_muted_applies_on_unmute() {
    let mut engine = dc_engine(2, 2, 0.25);
    engine.request_mute();
    for _ in 0..10 {
        engine.render_cycle();
    }
    engine.set_master_volume(0.5);
    assert_eq!(engine.volume_state(), VolumeRampState::Muted);
    assert_eq!(engine.master_volume(), 0.5);

    engine.request_unmute();
    for _ in 0..10 {
        engine.render_cycle();
    }
    assert_eq!(engine.volume_state(), VolumeRampState::Normal);
}

#[test]
fn hard_left_pan_and_channel_swap() {
    for swap in [false, true] {
        let boot = BootConfig {
            swap_channels: swap,
            ..boot(2, 1)
        };
        let mut engine = RenderEngine::new(&boot, vec![Dc::new(0.5), Dc::new(0.5)]).unwrap();
        engine.set_slot_pan(0, 0.0);
        for _ in 0..10 {
            engine.render_cycle();
        }

        let left_code = SampleFormat::S16.to_fixed(0.5);
        let samples = engine.last_samples();
        let frames = samples.len() / 2;
        for (i, frame) in samples.chunks_exact(2).enumerate() {
            let (first, second) = (frame[0], frame[1]);
            if swap {
                assert_eq!(first, 0);
                assert_eq!(second, left_code);
            } else {
                assert_eq!(first, left_code);
                // Silent right channel, patched on the very last sample.
                assert_eq!(second, if i == frames - 1 { 1 } else { 0 });
            }
        }
    }
}

#[test]
fn direct_mode_writes_one_channel_per_active_slot() {
    let boot = BootConfig {
        output_mode: OutputMode::Direct,
        ..boot(4, 3)
    };
    let levels = [0.1, 0.2, 0.3, 0.4];
    let generators = levels.iter().map(|l| Dc::new(*l)).collect();
    let mut engine = RenderEngine::new(&boot, generators).unwrap();
    assert_eq!(engine.output_channels(), 3);

    let master = engine.master_chain();
    engine.render_cycle();
    assert_eq!(master.process_calls(), 0);

    let expected: Vec<i32> = levels[..3]
        .iter()
        .map(|l| SampleFormat::S16.to_fixed(*l))
        .collect();
    for frame in engine.last_samples().chunks_exact(3) {
        assert_eq!(frame, expected.as_slice());
    }
}

#[test]
fn direct_mode_follows_mute() {
    let boot = BootConfig {
        output_mode: OutputMode::Direct,
        ..boot(2, 2)
    };
    let mut engine = RenderEngine::new(&boot, vec![Dc::new(0.5), Dc::new(0.5)]).unwrap();
    engine.request_mute();
    for _ in 0..10 {
        engine.render_cycle();
    }
    assert_eq!(engine.volume_state(), VolumeRampState::Muted);
    assert_eq!(engine.last_peak(), 0.0);
}

#[test]
fn multicore_output_matches_single_core() {
    let make = |cores| {
        let boot = BootConfig {
            cores,
            ..boot(8, 8)
        };
        let generators = (0..8).map(|i| Sine::new(100.0 + 50.0 * i as f32)).collect();
        RenderEngine::new(&boot, generators).unwrap()
    };
    let mut single = make(1);
    let mut multi = make(4);
    assert_eq!(multi.partition().cores(), 4);

    for _ in 0..8 {
        let a = single.render_cycle().to_vec();
        let b = multi.render_cycle().to_vec();
        assert_eq!(a, b);
    }
}

#[test]
fn generator_count_must_match_boot() {
    let result = RenderEngine::new(&boot(4, 4), vec![Dc::new(0.0)]);
    assert!(matches!(result, Err(Error::Setup(_))));
}

#[test]
fn control_setters_reject_unknown_targets() {
    let mut engine = dc_engine(2, 2, 0.1);
    assert!(!engine.set_slot_volume(5, 0.5));
    assert!(!engine.set_slot_send(0, 2, 0.5));
    assert!(!engine.set_send_return(2, 0.5));
    assert!(engine.send_chain(2).is_none());
    assert!(!engine.with_generator_mut(9, |_| {}));
    assert_eq!(engine.slot_enabled(1), Some(true));
    assert!(engine.set_slot_enabled(1, false));
    assert_eq!(engine.slot_enabled(1), Some(false));
}

#[test]
fn soft_clip_bounds_the_master() {
    // two centered full-scale slots sum to ~1.41 per side
    let mut engine = dc_engine(2, 2, 1.0);
    engine.render_cycle();
    assert!(engine.last_peak() > 1.4);

    engine.set_soft_clip(true);
    engine.render_cycle();
    let peak = engine.last_peak();
    assert!(peak < 1.0 && peak > 0.85, "peak {peak}");
}

#[test]
fn generator_changes_reach_the_output() {
    let mut engine = dc_engine(1, 1, 0.0);
    engine.render_cycle();
    assert_eq!(engine.last_peak(), 0.0);

    assert!(engine.with_generator_mut(0, |g| g.level = 0.5));
    engine.render_cycle();
    assert!(engine.last_peak() > 0.3);
}

#[test]
fn wav_device_records_every_cycle() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("render.wav");
    let boot = boot(2, 2);

    let mut engine = RenderEngine::new(&boot, vec![Sine::new(220.0), Sine::new(330.0)]).unwrap();
    let mut device = WavDevice::create(&path, boot.sample_rate, 2, boot.format(), boot.queue_frames)
        .unwrap();
    for _ in 0..10 {
        assert_eq!(engine.process(&mut device), CycleOutcome::Rendered);
    }
    assert_eq!(device.frames_written(), 10 * 128);
    device.finalize().unwrap();

    let (samples, spec) = read_wav_samples(&path).unwrap();
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(samples.len(), 10 * 128 * 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn backpressure_threshold(capacity in 1usize..4096, available in 0usize..4096) {
        let available = available.min(capacity);
        let mut engine = dc_engine(1, 1, 0.1);
        let mut device = FakeDevice::new(capacity, available);
        let outcome = engine.process(&mut device);
        let expected = if available * 2 >= capacity {
            CycleOutcome::Rendered
        } else {
            CycleOutcome::Skipped
        };
        prop_assert_eq!(outcome, expected);
    }
}
