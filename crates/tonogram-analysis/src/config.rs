//! Extraction parameters and their validation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ratio between the top pitch class of an octave and its base: `2^(11/12)`.
const TOP_SEMITONE_RATIO: f64 = 1.8877486253633868;

fn default_batch_seconds() -> f64 {
    5.0
}

/// Parameters for a note-profile extraction.
///
/// Plain data, serde-derivable for preset files. Nothing here is trusted
/// until [`validate`](Self::validate) has turned it into a
/// [`ValidatedConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Sample rate of the audio to analyze, in Hz.
    pub sample_rate: u32,
    /// Analysis window size in samples. Must be a power of two.
    pub window_size: usize,
    /// Samples between consecutive chunk starts.
    pub chunk_stride: usize,
    /// Frequency of pitch class 0, octave 0, in Hz.
    pub base_frequency: f64,
    /// Audio buffered per read cycle, in seconds.
    #[serde(default = "default_batch_seconds")]
    pub batch_seconds: f64,
}

impl ExtractionConfig {
    /// Config with the default batch length.
    pub fn new(
        sample_rate: u32,
        window_size: usize,
        chunk_stride: usize,
        base_frequency: f64,
    ) -> Self {
        Self {
            sample_rate,
            window_size,
            chunk_stride,
            base_frequency,
            batch_seconds: default_batch_seconds(),
        }
    }

    /// Check every parameter and derive the quantities extraction needs.
    pub fn validate(self) -> Result<ValidatedConfig> {
        if self.sample_rate == 0 {
            return Err(Error::ZeroSampleRate);
        }
        if self.window_size < 2 || !self.window_size.is_power_of_two() {
            return Err(Error::WindowNotPowerOfTwo {
                size: self.window_size,
            });
        }
        if self.chunk_stride == 0 {
            return Err(Error::ZeroStride);
        }
        if !(self.base_frequency.is_finite() && self.base_frequency > 0.0) {
            return Err(Error::BadBaseFrequency {
                hz: self.base_frequency,
            });
        }
        if !(self.batch_seconds.is_finite() && self.batch_seconds > 0.0) {
            return Err(Error::BadBatchSeconds {
                seconds: self.batch_seconds,
            });
        }

        // The top pitch class of octave 0 must complete at least one cycle
        // per stride, which also keeps the stride below the base-note
        // period.
        let rate = f64::from(self.sample_rate);
        if self.base_frequency * TOP_SEMITONE_RATIO > rate / self.chunk_stride as f64 {
            return Err(Error::UnresolvableRange {
                base_hz: self.base_frequency,
                sample_rate: self.sample_rate,
                stride: self.chunk_stride,
            });
        }

        let samples_per_base_note = rate / self.base_frequency;
        let base_note_ceil = samples_per_base_note.ceil() as usize;
        let chunk_requirement = base_note_ceil + 3;

        if self.window_size > chunk_requirement {
            return Err(Error::WindowTooLong {
                window: self.window_size,
                limit: chunk_requirement,
            });
        }

        let batch_capacity = (rate * self.batch_seconds).round() as usize;
        if batch_capacity < chunk_requirement {
            return Err(Error::BatchTooSmall {
                capacity: batch_capacity,
                needed: chunk_requirement,
            });
        }

        Ok(ValidatedConfig {
            config: self,
            samples_per_base_note,
            base_note_ceil,
            center_offset: (samples_per_base_note / 2.0).round() as u64,
            batch_capacity,
        })
    }
}

/// An [`ExtractionConfig`] that passed validation, with derived quantities.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedConfig {
    config: ExtractionConfig,
    samples_per_base_note: f64,
    base_note_ceil: usize,
    center_offset: u64,
    batch_capacity: usize,
}

impl ValidatedConfig {
    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Analysis window size in samples.
    pub fn window_size(&self) -> usize {
        self.config.window_size
    }

    /// Samples between consecutive chunk starts.
    pub fn chunk_stride(&self) -> usize {
        self.config.chunk_stride
    }

    /// Frequency of pitch class 0, octave 0, in Hz.
    pub fn base_frequency(&self) -> f64 {
        self.config.base_frequency
    }

    /// Audio buffered per read cycle, in seconds.
    pub fn batch_seconds(&self) -> f64 {
        self.config.batch_seconds
    }

    /// Period of the base note in samples (exact).
    pub fn samples_per_base_note(&self) -> f64 {
        self.samples_per_base_note
    }

    /// Period of the base note in samples, rounded up.
    pub fn base_note_ceil(&self) -> usize {
        self.base_note_ceil
    }

    /// Samples a chunk must have available past its start.
    pub fn chunk_requirement(&self) -> usize {
        self.base_note_ceil + 3
    }

    /// Offset added to a chunk's start index to get its center timestamp.
    pub fn center_offset(&self) -> u64 {
        self.center_offset
    }

    /// Samples the batch buffer holds per channel.
    pub fn batch_capacity(&self) -> usize {
        self.batch_capacity
    }

    /// The plain config this was validated from.
    pub fn raw(&self) -> ExtractionConfig {
        self.config
    }
}
