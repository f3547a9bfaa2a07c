//! Sample ingestion: the source trait and an in-memory implementation.

use crate::error::{Error, Result};

/// Pull-based supplier of non-interleaved audio samples.
///
/// Channels advance in lockstep: one read fills the same number of samples
/// into every channel slice. A short read is allowed anywhere in the
/// stream; a read of 0 samples means the stream has ended.
pub trait SampleSource {
    /// Sample rate of the stream in Hz.
    fn sample_rate(&self) -> u32;

    /// Number of channels the stream carries.
    fn channel_count(&self) -> usize;

    /// Samples left per channel, as far as the source knows.
    ///
    /// Advisory only: used to size result buffers, never for control flow.
    fn samples_remaining(&self) -> u64;

    /// Fill up to `max` samples per channel into `out`.
    ///
    /// `out` must hold [`channel_count`](Self::channel_count) slices of at
    /// least `max` samples each. Returns the count written to every
    /// channel; 0 signals end of stream.
    fn read_samples(&mut self, max: usize, out: &mut [&mut [f32]]) -> Result<usize>;
}

/// A [`SampleSource`] over owned per-channel buffers.
///
/// Useful for tests and for feeding already-decoded audio through an
/// extraction. A read cap can be set to exercise short-read handling.
#[derive(Debug, Clone)]
pub struct MemorySource {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
    position: usize,
    max_read: Option<usize>,
}

impl MemorySource {
    /// Wrap per-channel sample buffers. All channels must share one length
    /// and there must be at least one.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::NoChannels);
        }
        let len = channels[0].len();
        for channel in &channels[1..] {
            if channel.len() != len {
                return Err(Error::LengthMismatch {
                    expected: len,
                    got: channel.len(),
                });
            }
        }

        Ok(Self {
            sample_rate,
            channels,
            position: 0,
            max_read: None,
        })
    }

    /// Cap every read to at most `n` samples (at least 1).
    ///
    /// Forces the consumer through its short-read paths.
    pub fn with_max_read(mut self, n: usize) -> Self {
        self.max_read = Some(n.max(1));
        self
    }

    /// Samples in each channel, consumed or not.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// True if the buffers hold no samples at all.
    pub fn is_empty(&self) -> bool {
        self.channels[0].is_empty()
    }
}

impl SampleSource for MemorySource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn samples_remaining(&self) -> u64 {
        (self.len() - self.position) as u64
    }

    fn read_samples(&mut self, max: usize, out: &mut [&mut [f32]]) -> Result<usize> {
        if out.len() != self.channels.len() {
            return Err(Error::ChannelMismatch {
                expected: self.channels.len(),
                got: out.len(),
            });
        }

        let mut n = max.min(self.len() - self.position);
        if let Some(cap) = self.max_read {
            n = n.min(cap);
        }

        for (channel, slot) in self.channels.iter().zip(out.iter_mut()) {
            if slot.len() < n {
                return Err(Error::LengthMismatch {
                    expected: n,
                    got: slot.len(),
                });
            }
            slot[..n].copy_from_slice(&channel[self.position..self.position + n]);
        }

        self.position += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(source: &mut MemorySource, chunk: usize) -> Vec<Vec<f32>> {
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
    fn test_reads_in_lockstep() {
        let mut source = MemorySource::new(
            48000,
            vec![vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![5.0, 4.0, 3.0, 2.0, 1.0]],
        )
        .unwrap();

        assert_eq!(source.sample_rate(), 48000);
        assert_eq!(source.channel_count(), 2);
        assert_eq!(source.samples_remaining(), 5);

        let out = read_all(&mut source, 2);
        assert_eq!(out[0], vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(out[1], vec![5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(source.samples_remaining(), 0);
    }

    #[test]
    fn test_max_read_caps_each_call() {
        let mut source = MemorySource::new(8000, vec![vec![0.0; 100]])
            .unwrap()
            .with_max_read(7);

        let mut buf = vec![0.0f32; 50];
        let mut views: Vec<&mut [f32]> = vec![buf.as_mut_slice()];
        let n = source.read_samples(50, &mut views).unwrap();
        assert_eq!(n, 7);
        assert_eq!(source.samples_remaining(), 93);
    }

    #[test]
    fn test_rejects_mismatched_channels() {
        assert!(matches!(
            MemorySource::new(8000, vec![]),
            Err(Error::NoChannels)
        ));
        assert!(matches!(
            MemorySource::new(8000, vec![vec![0.0; 4], vec![0.0; 5]]),
            Err(Error::LengthMismatch { expected: 4, got: 5 })
        ));

        let mut source = MemorySource::new(8000, vec![vec![0.0; 4], vec![0.0; 4]]).unwrap();
        let mut buf = vec![0.0f32; 4];
        let mut views: Vec<&mut [f32]> = vec![buf.as_mut_slice()];
        assert!(matches!(
            source.read_samples(4, &mut views),
            Err(Error::ChannelMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_end_of_stream_is_zero() {
        let mut source = MemorySource::new(8000, vec![vec![1.0, 2.0]]).unwrap();
        let mut buf = vec![0.0f32; 8];

        let mut views: Vec<&mut [f32]> = vec![buf.as_mut_slice()];
        assert_eq!(source.read_samples(8, &mut views).unwrap(), 2);

        let mut views: Vec<&mut [f32]> = vec![buf.as_mut_slice()];
        assert_eq!(source.read_samples(8, &mut views).unwrap(), 0);
    }
}
