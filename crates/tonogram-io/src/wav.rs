//! Streaming WAV decode into per-channel sample buffers.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tonogram_analysis::SampleSource;

/// A [`SampleSource`] that decodes a WAV file as it is read.
///
/// Integer samples are normalized to `[-1, 1)` by `2^(bits-1)` and
/// channels are de-interleaved into the caller's per-channel slices.
/// PCM files up to 32 bits and 32-bit IEEE float files are accepted.
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    sample_rate: u32,
    channels: usize,
    bits_per_sample: u16,
    format: SampleFormat,
    scale: f32,
    frames_total: u64,
    frames_read: u64,
}

impl WavSource {
    /// Open a WAV file for streaming.
    ///
    /// Reads the header only; sample data is decoded on demand by
    /// [`read_samples`](SampleSource::read_samples).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();

        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 1..=32) => {}
            (SampleFormat::Float, 32) => {}
            (format, bits) => {
                return Err(Error::UnsupportedFormat {
                    bits,
                    format: match format {
                        SampleFormat::Int => "int",
                        SampleFormat::Float => "float",
                    },
                });
            }
        }

        let scale = match spec.sample_format {
            SampleFormat::Int => 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32,
            SampleFormat::Float => 1.0,
        };

        Ok(Self {
            frames_total: u64::from(reader.duration()),
            reader,
            sample_rate: spec.sample_rate,
            channels: spec.channels as usize,
            bits_per_sample: spec.bits_per_sample,
            format: spec.sample_format,
            scale,
            frames_read: 0,
        })
    }

    /// Bit depth the file declares.
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Length of the file in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frames_total as f64 / f64::from(self.sample_rate)
    }

    /// Skip up to `frames` samples per channel without handing them to the
    /// caller. Returns the count actually skipped, which falls short only
    /// at end of file.
    pub fn skip_samples(&mut self, frames: u64) -> Result<u64> {
        let target = frames.min(self.samples_remaining()) * self.channels as u64;
        let mut consumed = 0u64;

        match self.format {
            SampleFormat::Int => {
                let mut samples = self.reader.samples::<i32>();
                while consumed < target {
                    match samples.next() {
                        Some(sample) => {
                            sample?;
                            consumed += 1;
                        }
                        None => break,
                    }
                }
            }
            SampleFormat::Float => {
                let mut samples = self.reader.samples::<f32>();
                while consumed < target {
                    match samples.next() {
                        Some(sample) => {
                            sample?;
                            consumed += 1;
                        }
                        None => break,
                    }
                }
            }
        }

        let skipped = consumed / self.channels as u64;
        self.frames_read += skipped;
        Ok(skipped)
    }

    /// Decode up to `want` frames, de-interleaving into `out`.
    ///
    /// A frame cut off mid-way by a truncated file is dropped.
    fn fill(&mut self, want: usize, out: &mut [&mut [f32]]) -> Result<usize> {
        let channels = self.channels;
        let scale = self.scale;
        let mut frames = 0;

        match self.format {
            SampleFormat::Int => {
                let mut samples = self.reader.samples::<i32>();
                'frames: while frames < want {
                    for channel in 0..channels {
                        match samples.next() {
                            Some(sample) => out[channel][frames] = sample? as f32 * scale,
                            None => break 'frames,
                        }
                    }
                    frames += 1;
                }
            }
            SampleFormat::Float => {
                let mut samples = self.reader.samples::<f32>();
                'frames: while frames < want {
                    for channel in 0..channels {
                        match samples.next() {
                            Some(sample) => out[channel][frames] = sample?,
                            None => break 'frames,
                        }
                    }
                    frames += 1;
                }
            }
        }

        self.frames_read += frames as u64;
        Ok(frames)
    }
}

impl SampleSource for WavSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channel_count(&self) -> usize {
        self.channels
    }

    fn samples_remaining(&self) -> u64 {
        self.frames_total - self.frames_read
    }

    fn read_samples(
        &mut self,
        max: usize,
        out: &mut [&mut [f32]],
    ) -> tonogram_analysis::Result<usize> {
        if out.len() != self.channels {
            return Err(tonogram_analysis::Error::ChannelMismatch {
                expected: self.channels,
                got: out.len(),
            });
        }
        for slot in out.iter() {
            if slot.len() < max {
                return Err(tonogram_analysis::Error::LengthMismatch {
                    expected: max,
                    got: slot.len(),
                });
            }
        }

        self.fill(max, out)
            .map_err(|e| tonogram_analysis::Error::Source(e.to_string()))
    }
}

/// Write per-channel sample buffers as an interleaved WAV file.
///
/// A `bits_per_sample` of 32 writes IEEE float; smaller depths write PCM
/// with saturating integer conversion. All channels must share one
/// length. Mainly used to produce extraction fixtures.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    bits_per_sample: u16,
    channels: &[Vec<f32>],
) -> Result<()> {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample,
        sample_format: if bits_per_sample == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer = WavWriter::create(path, spec)?;
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);

    if bits_per_sample == 32 {
        for frame in 0..frames {
            for channel in channels {
                writer.write_sample(channel[frame])?;
            }
        }
    } else {
        let max_val = (1i32 << (bits_per_sample - 1)) as f32;
        for frame in 0..frames {
            for channel in channels {
                let value = (channel[frame] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(value)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    /// Drain a source completely in steps of `chunk` samples.
    fn read_all(source: &mut WavSource, chunk: usize) -> Vec<Vec<f32>> {
        let channels = source.channel_count();
        let mut collected = vec![Vec::new(); channels];
        let mut scratch = vec![vec![0.0f32; chunk]; channels];
        loop {
            let mut views: Vec<&mut [f32]> =
                scratch.iter_mut().map(|s| s.as_mut_slice()).collect();
            let n = source.read_samples(chunk, &mut views).unwrap();
            if n == 0 {
                return collected;
            }
            for (acc, buf) in collected.iter_mut().zip(scratch.iter()) {
                acc.extend_from_slice(&buf[..n]);
            }
        }
    }

    #[test]
    fn test_roundtrip_i16() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 50.0).sin() * 0.9).collect();

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), 44100, 16, &[samples.clone()]).unwrap();

        let mut source = WavSource::open(file.path()).unwrap();
        assert_eq!(source.sample_rate(), 44100);
        assert_eq!(source.channel_count(), 1);
        assert_eq!(source.bits_per_sample(), 16);
        assert_eq!(source.samples_remaining(), 1000);

        let loaded = read_all(&mut source, 256);
        assert_eq!(loaded[0].len(), samples.len());
        assert_eq!(source.samples_remaining(), 0);

        // One LSB of quantization error at 16 bits.
        for (a, b) in samples.iter().zip(loaded[0].iter()) {
            assert!((a - b).abs() < 1.0 / 32000.0);
        }
    }

    #[test]
    fn test_roundtrip_f32() {
        let samples: Vec<f32> = (0..500).map(|i| (i as f32 / 25.0).cos() * 0.5).collect();

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), 48000, 32, &[samples.clone()]).unwrap();

        let mut source = WavSource::open(file.path()).unwrap();
        assert_eq!(source.bits_per_sample(), 32);

        let loaded = read_all(&mut source, 128);
        assert_eq!(loaded[0], samples);
    }

    #[test]
    fn test_stereo_deinterleaves() {
        let left: Vec<f32> = (0..200).map(|i| i as f32 / 200.0).collect();
        let right: Vec<f32> = (0..200).map(|i| -(i as f32) / 200.0).collect();

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), 8000, 32, &[left.clone(), right.clone()]).unwrap();

        let mut source = WavSource::open(file.path()).unwrap();
        assert_eq!(source.channel_count(), 2);

        // An awkward step size exercises mid-stream short state.
        let loaded = read_all(&mut source, 7);
        assert_eq!(loaded[0], left);
        assert_eq!(loaded[1], right);
    }

    #[test]
    fn test_skip_samples() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), 8000, 32, &[samples]).unwrap();

        let mut source = WavSource::open(file.path()).unwrap();
        assert_eq!(source.skip_samples(10).unwrap(), 10);
        assert_eq!(source.samples_remaining(), 90);

        let mut buf = vec![0.0f32; 4];
        let mut views: Vec<&mut [f32]> = vec![buf.as_mut_slice()];
        assert_eq!(source.read_samples(4, &mut views).unwrap(), 4);
        assert_eq!(buf[0], 0.10);

        // Skipping past the end reports what was left.
        assert_eq!(source.skip_samples(1000).unwrap(), 86);
        assert_eq!(source.samples_remaining(), 0);

        let mut views: Vec<&mut [f32]> = vec![buf.as_mut_slice()];
        assert_eq!(source.read_samples(4, &mut views).unwrap(), 0);
    }

    #[test]
    fn test_duration_seconds() {
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), 8000, 16, &[vec![0.0; 2000]]).unwrap();

        let source = WavSource::open(file.path()).unwrap();
        assert!((source.duration_seconds() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_wrong_channel_count() {
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), 8000, 16, &[vec![0.0; 10], vec![0.0; 10]]).unwrap();

        let mut source = WavSource::open(file.path()).unwrap();
        let mut buf = vec![0.0f32; 10];
        let mut views: Vec<&mut [f32]> = vec![buf.as_mut_slice()];
        assert!(matches!(
            source.read_samples(10, &mut views),
            Err(tonogram_analysis::Error::ChannelMismatch { expected: 2, got: 1 })
        ));
    }
}
