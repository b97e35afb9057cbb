//! The render engine: one cycle from tone generators to device bytes.
//!
//! ```text
//!               ┌──────────────┐
//!  scheduler ──▶│ slot buffers │
//!               └──────┬───────┘
//!        ┌─────────────┼──────────────┐
//!        ▼             ▼              ▼
//!    main MixBus   send bus 0 …   send bus n      (skipped at return 0)
//!        │             │ chain         │ chain
//!        └──────┬──────┴───────────────┘
//!               ▼
//!         master chain (unless bypassed) ─▶ soft clip? ─▶ VolumeRamp
//!               ▼
//!          OutputStage ─▶ bytes ─▶ OutputDevice
//! ```
//!
//! In direct mode the buses and chains are bypassed: each active slot is
//! written to its own device channel, scaled only by the volume ramp.
//!
//! Control setters take `&mut self` and run between cycles on the same
//! thread as the render loop. The effect chains are the exception: they are
//! handed out as `Arc<EffectChain>` and may be mutated from any thread.
//!
//! Performance switches are deferred: [`RenderEngine::load_performance`]
//! queues the performance and starts a mute. Once the volume ramp reaches
//! Muted the engine applies it, resets generators and chains, and ramps back
//! up.

use std::sync::Arc;

use tinyrack_config::{BootConfig, OutputMode, Performance, SlotConfig};
use tinyrack_core::{
    CorePartition, MAX_SEND_BUSES, MixBus, MultiCoreScheduler, OutputStage, SampleBuffer,
    Scheduler, SingleCoreScheduler, StereoBuffer, ToneGenerator, ToneGeneratorSlot, VolumeRamp,
    VolumeRampState, soft_clip,
};
use tinyrack_effects::EffectChain;

use crate::output::OutputDevice;
use crate::routing::SendEffectBus;
use crate::{Error, Result};

/// Result of one [`RenderEngine::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A cycle was rendered and handed to the device.
    Rendered,
    /// The device queue was less than half free; nothing was rendered.
    Skipped,
}

/// Running counters for the driving loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    /// Cycles rendered and handed to the device.
    pub rendered_cycles: u64,
    /// Cycles skipped because the queue was too full.
    pub skipped_cycles: u64,
    /// Writes the device accepted only partially.
    pub short_writes: u64,
    /// Bytes lost to short writes.
    pub dropped_bytes: u64,
    /// Performances applied.
    pub performance_switches: u64,
}

struct PendingPerformance {
    performance: Performance,
    /// Unmute after applying. False when the output was already muted by
    /// the user before the switch was requested.
    resume: bool,
}

/// Polyphonic multi-timbral render engine.
pub struct RenderEngine<G: ToneGenerator> {
    scheduler: Box<dyn Scheduler<G>>,
    frames: usize,
    sample_rate: f32,
    mode: OutputMode,
    main: MixBus,
    sends: Vec<SendEffectBus>,
    master_chain: Arc<EffectChain>,
    master: StereoBuffer,
    volume: VolumeRamp,
    soft_clip: bool,
    direct: Vec<SampleBuffer>,
    direct_scales: Vec<f32>,
    output: OutputStage,
    pending: Option<PendingPerformance>,
    stats: EngineStats,
    last_peak: f32,
}

impl<G: ToneGenerator + 'static> RenderEngine<G> {
    /// Builds an engine for `boot` around `generators`.
    ///
    /// The first `boot.active` slots are enabled. With more than one core a
    /// [`MultiCoreScheduler`] is started, otherwise slots render
    /// sequentially.
    ///
    /// # Errors
    ///
    /// Fails if `boot` does not validate, if the generator count differs from
    /// `boot.generators`, or if a worker thread cannot be spawned.
    pub fn new(boot: &BootConfig, generators: Vec<G>) -> Result<Self> {
        boot.validate()?;
        if generators.len() != boot.generators {
            return Err(Error::Setup(format!(
                "boot configuration expects {} tone generators, got {}",
                boot.generators,
                generators.len()
            )));
        }

        let slots: Vec<_> = generators
            .into_iter()
            .enumerate()
            .map(|(index, generator)| {
                let mut slot = ToneGeneratorSlot::new(index, generator, boot.frames_per_cycle);
                slot.set_enabled(index < boot.active);
                slot
            })
            .collect();

        let scheduler: Box<dyn Scheduler<G>> = if boot.cores > 1 {
            Box::new(MultiCoreScheduler::new(slots, boot.partition())?)
        } else {
            Box::new(SingleCoreScheduler::new(slots))
        };

        Self::with_scheduler(boot, scheduler)
    }
}

impl<G: ToneGenerator> RenderEngine<G> {
    /// Builds an engine around an already constructed scheduler.
    ///
    /// Slot routing state (volume, pan, sends) is taken from the slots as
    /// they are.
    pub fn with_scheduler(boot: &BootConfig, scheduler: Box<dyn Scheduler<G>>) -> Result<Self> {
        boot.validate()?;
        let frames = boot.frames_per_cycle;
        let sample_rate = boot.sample_rate_hz();
        let generators = scheduler.slot_count();
        let channels = boot.output_channels();

        let mut engine = Self {
            scheduler,
            frames,
            sample_rate,
            mode: boot.output_mode,
            main: MixBus::new(generators, frames, sample_rate),
            sends: (0..boot.send_buses.min(MAX_SEND_BUSES))
                .map(|_| SendEffectBus::new(generators, frames, sample_rate))
                .collect(),
            master_chain: Arc::new(EffectChain::new(sample_rate)),
            master: StereoBuffer::new(frames),
            volume: VolumeRamp::new(sample_rate, boot.master_volume),
            soft_clip: boot.soft_clip,
            direct: (0..channels).map(|_| SampleBuffer::new(frames)).collect(),
            direct_scales: vec![0.0; frames],
            output: OutputStage::new(boot.format(), channels, frames, boot.swap_channels),
            pending: None,
            stats: EngineStats::default(),
            last_peak: 0.0,
        };

        for index in 0..generators {
            engine.route_slot(index);
        }
        engine.main.snap_to_targets();
        for bus in &mut engine.sends {
            bus.mix_mut().snap_to_targets();
        }

        tracing::info!(
            sample_rate = boot.sample_rate,
            generators,
            active = boot.active,
            frames,
            send_buses = engine.sends.len(),
            cores = engine.scheduler.partition().cores(),
            mode = ?engine.mode,
            format = ?boot.format(),
            "render engine ready"
        );

        Ok(engine)
    }

    /// Frames rendered per cycle.
    pub fn frames_per_cycle(&self) -> usize {
        self.frames
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Stereo master or one device channel per slot.
    pub fn output_mode(&self) -> OutputMode {
        self.mode
    }

    /// Device channels per frame.
    pub fn output_channels(&self) -> usize {
        self.output.channels()
    }

    /// Bytes in one rendered cycle.
    pub fn cycle_bytes(&self) -> usize {
        self.frames * self.output.frame_bytes()
    }

    /// How slots are split across cores.
    pub fn partition(&self) -> &CorePartition {
        self.scheduler.partition()
    }

    /// Number of tone generator slots.
    pub fn slot_count(&self) -> usize {
        self.scheduler.slot_count()
    }

    /// Number of send buses.
    pub fn send_bus_count(&self) -> usize {
        self.sends.len()
    }

    /// Counters since the engine was built.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Peak absolute sample of the last rendered cycle, after the volume
    /// ramp.
    pub fn last_peak(&self) -> f32 {
        self.last_peak
    }

    /// Fixed-point samples of the last rendered cycle, interleaved.
    pub fn last_samples(&self) -> &[i32] {
        self.output.samples(self.frames)
    }

    // --- Driving loop ---

    /// Renders one cycle if the device has room and hands it over.
    ///
    /// The cycle renders only when at least half of the device queue is
    /// free. A short write is logged and the remainder dropped; the cycle
    /// still counts as rendered.
    pub fn process(&mut self, device: &mut dyn OutputDevice) -> CycleOutcome {
        let capacity = device.capacity_frames();
        let available = device.available_frames();
        if available * 2 < capacity {
            tracing::trace!(available, capacity, "render: device queue not ready");
            self.stats.skipped_cycles += 1;
            return CycleOutcome::Skipped;
        }

        let bytes = self.render_cycle();
        let requested = bytes.len();
        let written = device.write(bytes);
        self.stats.rendered_cycles += 1;

        if written < requested {
            tracing::error!(requested, written, "render: short write, dropping remainder");
            self.stats.short_writes += 1;
            self.stats.dropped_bytes += (requested - written) as u64;
        }

        CycleOutcome::Rendered
    }

    /// Renders one cycle and returns the serialized device bytes.
    pub fn render_cycle(&mut self) -> &[u8] {
        let frames = self.frames;
        self.scheduler.render_cycle(frames);

        match self.mode {
            OutputMode::Stereo => self.mix_stereo(frames),
            OutputMode::Direct => self.mix_direct(frames),
        }

        if self.volume.is_muted() {
            if let Some(pending) = self.pending.take() {
                self.apply_performance(pending);
            }
        }

        match self.mode {
            OutputMode::Stereo => self
                .output
                .convert_stereo(&self.master.left[..frames], &self.master.right[..frames]),
            OutputMode::Direct => self.output.convert_channels(&self.direct, frames),
        }
    }

    fn mix_stereo(&mut self, frames: usize) {
        let main = &mut self.main;
        let sends = &mut self.sends;
        self.scheduler.for_each_output(&mut |slot| {
            if !slot.is_enabled() {
                return;
            }
            let out = slot.output(frames);
            main.add_mix(slot.index(), out);
            for bus in sends.iter_mut() {
                bus.add_mix(slot.index(), out);
            }
        });

        let (left, right) = self.master.split_mut(frames);
        self.main.get_mix(left, right);

        for bus in &mut self.sends {
            bus.render_into(&mut self.master, frames);
        }

        let (left, right) = self.master.split_mut(frames);
        if !self.master_chain.is_bypassed() {
            self.master_chain.process(left, right);
        }
        if self.soft_clip {
            for s in left.iter_mut().chain(right.iter_mut()) {
                *s = soft_clip(*s);
            }
        }
        self.volume.apply(left, right);
        self.last_peak = self.master.peak(frames);
    }

    fn mix_direct(&mut self, frames: usize) {
        let scales = &mut self.direct_scales[..frames];
        self.volume.advance_block(scales);

        let direct = &mut self.direct;
        for buffer in direct.iter_mut() {
            buffer.frames_mut(frames).fill(0.0);
        }
        self.scheduler.for_each_output(&mut |slot| {
            if !slot.is_enabled() {
                return;
            }
            if let Some(buffer) = direct.get_mut(slot.index()) {
                let out = slot.output(frames);
                for ((dst, src), scale) in buffer.frames_mut(frames).iter_mut().zip(out).zip(&*scales)
                {
                    *dst = src * scale;
                }
            }
        });

        self.last_peak = self
            .direct
            .iter()
            .flat_map(|b| b.frames(frames))
            .fold(0.0_f32, |acc, s| acc.max(s.abs()));
    }

    // --- Volume ---

    /// Sets the master volume, clamped to [0, 1].
    pub fn set_master_volume(&mut self, level: f32) {
        self.volume.set_master_volume(level);
    }

    /// Master volume target, 0..1.
    pub fn master_volume(&self) -> f32 {
        self.volume.level()
    }

    /// Starts ramping the master down to silence.
    ///
    /// With a performance switch pending the output is already heading to
    /// Muted; the request only keeps it muted once the switch is applied.
    pub fn request_mute(&mut self) {
        if let Some(pending) = &mut self.pending {
            pending.resume = false;
        }
        self.volume.request_mute();
    }

    /// Starts ramping the master back up.
    ///
    /// A pending performance switch owns the mute: the ramp keeps heading
    /// to Muted, the performance is applied, and the output resumes after.
    pub fn request_unmute(&mut self) {
        match &mut self.pending {
            Some(pending) => pending.resume = true,
            None => self.volume.request_unmute(),
        }
    }

    /// Current phase of the master mute ramp.
    pub fn volume_state(&self) -> VolumeRampState {
        self.volume.state()
    }

    /// Soft-clip the master bus before conversion (stereo mode only).
    pub fn set_soft_clip(&mut self, enabled: bool) {
        self.soft_clip = enabled;
    }

    // --- Performances ---

    /// Queues `performance` and starts muting.
    ///
    /// The performance is applied by the first cycle that ends Muted, after
    /// which the output ramps back up unless it was already muted or
    /// muting when the switch was requested. A performance queued while
    /// another is pending replaces it.
    ///
    /// # Errors
    ///
    /// Returns the validation error if the performance is invalid; nothing
    /// is queued in that case.
    pub fn load_performance(&mut self, performance: Performance) -> Result<()> {
        performance.validate()?;

        let resume = match &self.pending {
            Some(pending) => pending.resume,
            None => matches!(
                self.volume.state(),
                VolumeRampState::Normal | VolumeRampState::RampingUp
            ),
        };
        tracing::debug!(name = %performance.name, "render: performance queued");
        self.pending = Some(PendingPerformance {
            performance,
            resume,
        });
        self.volume.request_mute();
        Ok(())
    }

    /// True while a queued performance waits for the Muted phase.
    pub fn has_pending_performance(&self) -> bool {
        self.pending.is_some()
    }

    fn apply_performance(&mut self, pending: PendingPerformance) {
        let PendingPerformance {
            performance,
            resume,
        } = pending;

        for index in 0..self.scheduler.slot_count() {
            let config = performance.slot(index);
            self.scheduler.with_slot_mut(index, &mut |slot| {
                slot.set_volume(config.volume);
                slot.set_pan(config.pan);
                for bus in 0..MAX_SEND_BUSES {
                    slot.set_send(bus, config.send(bus));
                }
                slot.set_midi_channel(config.midi_channel);
            });
            self.route_slot(index);
        }

        for (index, bus) in self.sends.iter_mut().enumerate() {
            let config = performance.send_bus(index);
            bus.set_return_level(config.return_level);
            if let Err(err) = config.chain.apply(bus.chain()) {
                tracing::warn!(bus = index, %err, "render: send chain left unchanged");
            }
            bus.reset();
        }
        if let Err(err) = performance.master.apply(&self.master_chain) {
            tracing::warn!(%err, "render: master chain left unchanged");
        }
        self.master_chain.reset();

        self.main.zero_fill();
        self.main.snap_to_targets();
        self.scheduler.reset_generators();
        self.stats.performance_switches += 1;

        tracing::info!(name = %performance.name, resume, "render: performance applied");
        if resume {
            self.volume.request_unmute();
        }
    }

    // --- Slot routing ---

    /// Pushes slot `index`'s volume, pan, and sends into the buses.
    fn route_slot(&mut self, index: usize) {
        let mut routing = None;
        self.scheduler.with_slot(index, &mut |slot| {
            let mut sends = [0.0; MAX_SEND_BUSES];
            for (bus, level) in sends.iter_mut().enumerate() {
                *level = slot.send(bus);
            }
            routing = Some((slot.volume(), slot.pan(), sends));
        });
        let Some((volume, pan, sends)) = routing else {
            return;
        };

        self.main.gain(index, volume);
        self.main.pan(index, pan);
        for (bus, send) in self.sends.iter_mut().zip(sends) {
            bus.mix_mut().gain(index, volume * send);
            bus.mix_mut().pan(index, pan);
        }
    }

    /// Sets a slot's volume. Returns false for an unknown slot.
    pub fn set_slot_volume(&mut self, index: usize, volume: f32) -> bool {
        let found = self
            .scheduler
            .with_slot_mut(index, &mut |slot| slot.set_volume(volume));
        if found {
            self.route_slot(index);
        }
        found
    }

    /// Sets a slot's pan (0 = left, 1 = right). Returns false for an
    /// unknown slot.
    pub fn set_slot_pan(&mut self, index: usize, pan: f32) -> bool {
        let found = self
            .scheduler
            .with_slot_mut(index, &mut |slot| slot.set_pan(pan));
        if found {
            self.route_slot(index);
        }
        found
    }

    /// Sets a slot's send level into `bus`. Returns false for an unknown
    /// slot or bus.
    pub fn set_slot_send(&mut self, index: usize, bus: usize, level: f32) -> bool {
        if bus >= self.sends.len() {
            return false;
        }
        let found = self
            .scheduler
            .with_slot_mut(index, &mut |slot| slot.set_send(bus, level));
        if found {
            self.route_slot(index);
        }
        found
    }

    /// Enables or disables a slot. Disabled slots render silence and are
    /// left out of every bus.
    pub fn set_slot_enabled(&mut self, index: usize, enabled: bool) -> bool {
        self.scheduler
            .with_slot_mut(index, &mut |slot| slot.set_enabled(enabled))
    }

    /// Assigns a MIDI channel to a slot. Returns false for an unknown slot.
    pub fn set_slot_midi_channel(&mut self, index: usize, channel: Option<u8>) -> bool {
        self.scheduler
            .with_slot_mut(index, &mut |slot| slot.set_midi_channel(channel))
    }

    /// Current routing settings of a slot.
    pub fn slot_config(&mut self, index: usize) -> Option<SlotConfig> {
        let send_buses = self.sends.len();
        let mut config = None;
        self.scheduler.with_slot(index, &mut |slot| {
            config = Some(SlotConfig {
                volume: slot.volume(),
                pan: slot.pan(),
                sends: (0..send_buses).map(|bus| slot.send(bus)).collect(),
                midi_channel: slot.midi_channel(),
            });
        });
        config
    }

    /// Whether slot `index` is enabled, `None` for an unknown slot.
    pub fn slot_enabled(&mut self, index: usize) -> Option<bool> {
        let mut enabled = None;
        self.scheduler
            .with_slot(index, &mut |slot| enabled = Some(slot.is_enabled()));
        enabled
    }

    /// Sets a send bus's return level. Returns false for an unknown bus.
    pub fn set_send_return(&mut self, bus: usize, level: f32) -> bool {
        match self.sends.get_mut(bus) {
            Some(send) => {
                send.set_return_level(level);
                true
            }
            None => false,
        }
    }

    /// Return level of a send bus, `None` for an unknown bus.
    pub fn send_return(&self, bus: usize) -> Option<f32> {
        self.sends.get(bus).map(SendEffectBus::return_level)
    }

    /// Chain of send bus `bus`, shared with the caller.
    pub fn send_chain(&self, bus: usize) -> Option<Arc<EffectChain>> {
        self.sends.get(bus).map(|send| Arc::clone(send.chain()))
    }

    /// Master chain, shared with the caller.
    pub fn master_chain(&self) -> Arc<EffectChain> {
        Arc::clone(&self.master_chain)
    }

    /// Runs `f` on the generator in slot `index`. Returns false for an
    /// unknown slot.
    pub fn with_generator_mut<F>(&mut self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut G),
    {
        let mut f = Some(f);
        self.scheduler.with_slot_mut(index, &mut |slot| {
            if let Some(f) = f.take() {
                f(slot.generator_mut());
            }
        })
    }
}
