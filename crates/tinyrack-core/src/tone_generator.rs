//! Tone generator contract and the per-slot container around it.
//!
//! The synthesis engine itself is opaque: anything that can fill a mono
//! buffer and reset its state implements [`ToneGenerator`]. Each generator
//! lives in a [`ToneGeneratorSlot`] that also carries the control-path state
//! the router needs (volume, pan, send levels, MIDI channel) and the cycle
//! buffer the generator renders into.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

use crate::buffer::SampleBuffer;

/// Upper bound on tone generators in one engine.
pub const MAX_TONE_GENERATORS: usize = 16;

/// Upper bound on send-effect buses in one engine.
pub const MAX_SEND_BUSES: usize = 4;

/// A sound-producing unit.
///
/// `render` is called once per cycle from whichever core owns the slot. It
/// must not allocate or block. The output slice is zeroed beforehand, so
/// voice-summing generators may accumulate into it.
///
/// # Example
///
/// ```rust
/// use tinyrack_core::ToneGenerator;
///
/// struct Dc(f32);
///
/// impl ToneGenerator for Dc {
///     fn render(&mut self, out: &mut [f32]) {
///         out.fill(self.0);
///     }
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait ToneGenerator: Send {
    /// Render one cycle into `out` (`out.len()` is the cycle's frame count).
    fn render(&mut self, out: &mut [f32]);

    /// Silence all voices and clear internal state.
    ///
    /// Only called while the output is muted.
    fn reset(&mut self);
}

impl<T: ToneGenerator + ?Sized> ToneGenerator for Box<T> {
    fn render(&mut self, out: &mut [f32]) {
        (**self).render(out);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// One tone generator plus its routing state and cycle buffer.
#[derive(Debug)]
pub struct ToneGeneratorSlot<G> {
    index: usize,
    generator: G,
    buffer: SampleBuffer,
    enabled: bool,
    volume: f32,
    pan: f32,
    sends: [f32; MAX_SEND_BUSES],
    midi_channel: Option<u8>,
}

impl<G: ToneGenerator> ToneGeneratorSlot<G> {
    /// Creates a disabled slot, unity volume, centered, no sends.
    pub fn new(index: usize, generator: G, capacity: usize) -> Self {
        Self {
            index,
            generator,
            buffer: SampleBuffer::new(capacity),
            enabled: false,
            volume: 1.0,
            pan: 0.5,
            sends: [0.0; MAX_SEND_BUSES],
            midi_channel: None,
        }
    }

    /// Position of the slot in the engine.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// True when the slot renders and mixes.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabled slots render silence and skip their generator.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Slot volume, 0..1.
    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Sets the slot volume, clamped to [0, 1].
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Pan position, 0 = hard left.
    #[inline]
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Sets the pan position, clamped to [0, 1] (0 = hard left).
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan.clamp(0.0, 1.0);
    }

    /// Send level toward bus `bus`; 0 for unknown buses.
    pub fn send(&self, bus: usize) -> f32 {
        self.sends.get(bus).copied().unwrap_or(0.0)
    }

    /// Sets the send level toward bus `bus`, clamped to [0, 1].
    pub fn set_send(&mut self, bus: usize, level: f32) {
        if let Some(send) = self.sends.get_mut(bus) {
            *send = level.clamp(0.0, 1.0);
        }
    }

    /// Assigned MIDI channel, if any.
    #[inline]
    pub fn midi_channel(&self) -> Option<u8> {
        self.midi_channel
    }

    /// Assigns a MIDI channel (0..16). Anything else clears the assignment.
    pub fn set_midi_channel(&mut self, channel: Option<u8>) {
        self.midi_channel = channel.filter(|c| *c < 16);
    }

    /// The wrapped generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Mutable access to the wrapped generator.
    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    /// Frame capacity of the cycle buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// The last rendered cycle.
    #[inline]
    pub fn output(&self, frames: usize) -> &[f32] {
        self.buffer.frames(frames)
    }

    /// Renders one cycle into the slot buffer.
    ///
    /// Disabled slots produce silence without calling the generator.
    pub fn render(&mut self, frames: usize) {
        let out = self.buffer.frames_mut(frames);
        out.fill(0.0);
        if self.enabled {
            self.generator.render(out);
        }
    }

    /// Resets the generator and clears the buffer.
    pub fn reset(&mut self) {
        self.generator.reset();
        self.buffer.clear();
    }
}
