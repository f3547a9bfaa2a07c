//! Pitch-class binning of FFT spectra.
//!
//! A note vector holds one intensity per semitone slot, 12 pitch classes per
//! octave, indexed `octave * 12 + pitch_class`. Pitch class 0 of octave 0 is
//! the base frequency itself; everything above is equal-tempered steps.

use crate::error::{Error, Result};

/// Maps spectrum bins to pitch-class/octave slots.
///
/// Slot frequencies and their nearest FFT bins are precomputed at
/// construction, so gathering a note vector from a magnitude spectrum is a
/// plain table walk. The octave count follows the window: a `2^n`-sample
/// window yields `n` octaves above the base frequency.
#[derive(Debug, Clone)]
pub struct NoteBinner {
    /// Analysis window size the bin map was built for.
    window_size: usize,
    /// Sample rate in Hz.
    sample_rate: u32,
    /// Frequency of slot (0, 0) in Hz.
    base_frequency: f64,
    /// Octave rows in the note vector.
    octaves: usize,
    /// Slot index to spectrum bin.
    bins: Vec<usize>,
    /// Slot index to target frequency in Hz.
    frequencies: Vec<f64>,
}

impl NoteBinner {
    /// Build the bin map for a window size, sample rate, and base frequency.
    pub fn new(window_size: usize, sample_rate: u32, base_frequency: f64) -> Result<Self> {
        if window_size < 2 || !window_size.is_power_of_two() {
            return Err(Error::WindowNotPowerOfTwo { size: window_size });
        }
        if sample_rate == 0 {
            return Err(Error::ZeroSampleRate);
        }
        if !(base_frequency.is_finite() && base_frequency > 0.0) {
            return Err(Error::BadBaseFrequency { hz: base_frequency });
        }

        let octaves = window_size.trailing_zeros() as usize;
        let spectrum_len = window_size / 2;

        let mut bins = Vec::with_capacity(octaves * 12);
        let mut frequencies = Vec::with_capacity(octaves * 12);
        for octave in 0..octaves {
            for pitch_class in 0..12 {
                let freq = note_frequency(base_frequency, octave, pitch_class);
                let bin = (freq * window_size as f64 / f64::from(sample_rate)).round() as usize;
                bins.push(bin.min(spectrum_len - 1));
                frequencies.push(freq);
            }
        }

        Ok(Self {
            window_size,
            sample_rate,
            base_frequency,
            octaves,
            bins,
            frequencies,
        })
    }

    /// Window size the bin map was built for.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frequency of slot (0, 0) in Hz.
    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    /// Number of octave rows.
    pub fn octaves(&self) -> usize {
        self.octaves
    }

    /// Length of the note vectors this binner produces.
    pub fn note_count(&self) -> usize {
        self.octaves * 12
    }

    /// Spectrum bin a slot reads from.
    pub fn bin_for(&self, octave: usize, pitch_class: usize) -> Result<usize> {
        self.bins
            .get(slot_index(octave, pitch_class, self.octaves)?)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index: octave * 12 + pitch_class,
                len: self.bins.len(),
            })
    }

    /// Target frequency of a slot in Hz.
    pub fn frequency_for(&self, octave: usize, pitch_class: usize) -> Result<f64> {
        self.frequencies
            .get(slot_index(octave, pitch_class, self.octaves)?)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index: octave * 12 + pitch_class,
                len: self.frequencies.len(),
            })
    }

    /// Gather a magnitude spectrum into a note vector.
    ///
    /// `magnitudes` must hold exactly `window_size / 2` bins.
    pub fn bin_notes(&self, magnitudes: &[f32]) -> Result<Vec<f32>> {
        if magnitudes.len() != self.window_size / 2 {
            return Err(Error::LengthMismatch {
                expected: self.window_size / 2,
                got: magnitudes.len(),
            });
        }

        Ok(self.bins.iter().map(|&bin| magnitudes[bin]).collect())
    }
}

fn slot_index(octave: usize, pitch_class: usize, octaves: usize) -> Result<usize> {
    if octave >= octaves || pitch_class >= 12 {
        return Err(Error::IndexOutOfRange {
            index: octave * 12 + pitch_class,
            len: octaves * 12,
        });
    }
    Ok(octave * 12 + pitch_class)
}

/// Frequency of a pitch-class/octave slot: `base * 2^(octave + pitch_class/12)`.
pub fn note_frequency(base_hz: f64, octave: usize, pitch_class: usize) -> f64 {
    base_hz * 2.0_f64.powf(octave as f64 + pitch_class as f64 / 12.0)
}

/// Equal-tempered frequency of a MIDI note for a given A4 reference (A4 = 69).
pub fn midi_note_frequency(a4_hz: f64, midi_note: u8) -> f64 {
    a4_hz * 2.0_f64.powf((f64::from(midi_note) - 69.0) / 12.0)
}
