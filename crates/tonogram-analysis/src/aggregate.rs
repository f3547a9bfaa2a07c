//! Cross-channel aggregation of note vectors.

use crate::error::{Error, Result};

/// Element-wise arithmetic mean across equal-length channel slices.
///
/// One slice per channel; a single channel comes back as a copy. Channel
/// counts of zero and length disagreements are errors, not silent defaults.
pub fn mean(channels: &[&[f32]]) -> Result<Vec<f32>> {
    if channels.is_empty() {
        return Err(Error::EmptyAggregation);
    }

    let len = channels[0].len();
    let mut sums = channels[0].to_vec();

    for channel in &channels[1..] {
        if channel.len() != len {
            return Err(Error::LengthMismatch {
                expected: len,
                got: channel.len(),
            });
        }
        for (acc, &value) in sums.iter_mut().zip(channel.iter()) {
            *acc += value;
        }
    }

    let scale = 1.0 / channels.len() as f32;
    for value in &mut sums {
        *value *= scale;
    }

    Ok(sums)
}
