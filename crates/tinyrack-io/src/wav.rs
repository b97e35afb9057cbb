//! WAV file sink.
//!
//! [`WavDevice`] records the exact fixed-point stream the engine would send
//! to the DAC. It never fills up, so every cycle renders; `write` only comes
//! up short if the file write itself fails.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{WavReader, WavWriter};
use tinyrack_core::SampleFormat;

use crate::Result;
use crate::output::OutputDevice;

fn hound_spec(sample_rate: u32, channels: usize, format: SampleFormat) -> hound::WavSpec {
    hound::WavSpec {
        channels: channels as u16,
        sample_rate,
        bits_per_sample: format.bits() as u16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Output device that writes interleaved frames to a PCM WAV file.
pub struct WavDevice {
    writer: WavWriter<BufWriter<File>>,
    format: SampleFormat,
    channels: usize,
    capacity_frames: usize,
    samples_written: u64,
}

impl WavDevice {
    /// Creates `path` for `channels` channels of `format` at `sample_rate`.
    ///
    /// `capacity_frames` is the queue size reported to the engine; the file
    /// itself is unbounded.
    pub fn create(
        path: impl AsRef<Path>,
        sample_rate: u32,
        channels: usize,
        format: SampleFormat,
        capacity_frames: usize,
    ) -> Result<Self> {
        let channels = channels.max(1);
        let writer = WavWriter::create(path, hound_spec(sample_rate, channels, format))?;
        Ok(Self {
            writer,
            format,
            channels,
            capacity_frames,
            samples_written: 0,
        })
    }

    /// Complete frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.samples_written / self.channels as u64
    }

    /// Flushes and closes the file, fixing up the header lengths.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }

    fn write_sample(&mut self, bytes: &[u8]) -> std::result::Result<(), hound::Error> {
        match self.format {
            SampleFormat::S16 => self
                .writer
                .write_sample(i16::from_le_bytes([bytes[0], bytes[1]])),
            SampleFormat::S24 | SampleFormat::S32 => self
                .writer
                .write_sample(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        }
    }
}

impl std::fmt::Debug for WavDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavDevice")
            .field("format", &self.format)
            .field("channels", &self.channels)
            .field("samples_written", &self.samples_written)
            .finish_non_exhaustive()
    }
}

impl OutputDevice for WavDevice {
    fn capacity_frames(&self) -> usize {
        self.capacity_frames
    }

    fn available_frames(&self) -> usize {
        self.capacity_frames
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let width = self.format.bytes_per_sample();
        let mut written = 0;
        for sample in bytes.chunks_exact(width) {
            if let Err(err) = self.write_sample(sample) {
                tracing::error!(%err, written, "wav: sample write failed");
                break;
            }
            written += width;
            self.samples_written += 1;
        }
        written
    }
}

/// Reads a PCM WAV file back as raw integer samples plus its spec.
pub fn read_wav_samples(path: impl AsRef<Path>) -> Result<(Vec<i32>, hound::WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i32>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((samples, spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn encode(format: SampleFormat, codes: &[i32]) -> Vec<u8> {
        codes
            .iter()
            .flat_map(|c| match format {
                SampleFormat::S16 => (*c as i16).to_le_bytes().to_vec(),
                SampleFormat::S24 | SampleFormat::S32 => c.to_le_bytes().to_vec(),
            })
            .collect()
    }

    #[test]
    fn records_codes_exactly() {
        for format in [SampleFormat::S16, SampleFormat::S24, SampleFormat::S32] {
            let file = NamedTempFile::new().unwrap();
            let max = format.max_code();
            let codes = [0, 1, -1, max, -max, max / 3];

            let mut device = WavDevice::create(file.path(), 48000, 2, format, 256).unwrap();
            let bytes = encode(format, &codes);
            assert_eq!(device.write(&bytes), bytes.len());
            assert_eq!(device.frames_written(), 3);
            device.finalize().unwrap();

            let (samples, spec) = read_wav_samples(file.path()).unwrap();
            assert_eq!(spec.channels, 2);
            assert_eq!(u32::from(spec.bits_per_sample), format.bits());
            assert_eq!(samples, codes);
        }
    }

    #[test]
    fn always_has_room() {
        let file = NamedTempFile::new().unwrap();
        let device = WavDevice::create(file.path(), 48000, 2, SampleFormat::S16, 512).unwrap();
        assert_eq!(device.available_frames(), device.capacity_frames());
    }
}
