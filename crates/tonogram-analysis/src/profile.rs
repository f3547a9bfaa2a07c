//! The extraction artifact: timestamped note vectors.

use crate::error::{Error, Result};

/// A time series of note vectors, one per analysis chunk.
///
/// Timestamps are absolute sample indices at the center of each chunk's
/// window and grow strictly by the chunk stride. The profile carries the
/// parameters it was extracted with, so consumers can interpret it without
/// the config that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteProfile {
    /// Sample rate of the analyzed audio in Hz.
    sample_rate: u32,
    /// Samples between consecutive chunk starts.
    chunk_stride: usize,
    /// Length every note vector must have.
    note_len: usize,
    /// Center timestamps, one per chunk, strictly increasing.
    timestamps: Vec<u64>,
    /// Note vectors, parallel to `timestamps`.
    notes: Vec<Vec<f32>>,
}

impl NoteProfile {
    /// Create an empty profile for the given extraction parameters.
    pub fn new(sample_rate: u32, chunk_stride: usize, note_len: usize) -> Self {
        Self::with_capacity(sample_rate, chunk_stride, note_len, 0)
    }

    /// Create an empty profile with room for `capacity` chunks.
    pub fn with_capacity(
        sample_rate: u32,
        chunk_stride: usize,
        note_len: usize,
        capacity: usize,
    ) -> Self {
        Self {
            sample_rate,
            chunk_stride,
            note_len,
            timestamps: Vec::with_capacity(capacity),
            notes: Vec::with_capacity(capacity),
        }
    }

    /// Append one chunk's note vector at its center timestamp.
    ///
    /// The vector length must match the profile's and the timestamp must
    /// advance strictly past the previous one.
    pub fn push(&mut self, timestamp: u64, notes: Vec<f32>) -> Result<()> {
        if notes.len() != self.note_len {
            return Err(Error::LengthMismatch {
                expected: self.note_len,
                got: notes.len(),
            });
        }
        if let Some(&previous) = self.timestamps.last() {
            if timestamp <= previous {
                return Err(Error::NonMonotonicTimestamp {
                    previous,
                    offered: timestamp,
                });
            }
        }

        self.timestamps.push(timestamp);
        self.notes.push(notes);
        Ok(())
    }

    /// Number of chunks recorded.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// True if no chunk has been recorded.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Sample rate of the analyzed audio in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples between consecutive chunk starts.
    pub fn chunk_stride(&self) -> usize {
        self.chunk_stride
    }

    /// Length of every note vector in this profile.
    pub fn note_len(&self) -> usize {
        self.note_len
    }

    /// Center timestamp of chunk `index`, in samples.
    pub fn timestamp(&self, index: usize) -> Result<u64> {
        self.timestamps
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.timestamps.len(),
            })
    }

    /// Note vector of chunk `index`.
    pub fn notes(&self, index: usize) -> Result<&[f32]> {
        self.notes
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.notes.len(),
            })
    }

    /// Center time of chunk `index`, in seconds.
    pub fn time_of(&self, index: usize) -> Result<f64> {
        let ts = self.timestamp(index)?;
        Ok(ts as f64 / f64::from(self.sample_rate))
    }

    /// Iterate chunks as `(timestamp, note vector)` pairs, in time order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[f32])> {
        self.timestamps
            .iter()
            .copied()
            .zip(self.notes.iter().map(Vec::as_slice))
    }
}
