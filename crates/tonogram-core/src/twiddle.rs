//! Precomputed roots of unity for a fixed transform size.

use rustfft::num_complex::Complex32;
use std::f64::consts::PI;

use crate::FftError;

/// Twiddle factor table: `exp(-2*pi*i*k/size)` for `k` in `0..size/2`.
///
/// The negative exponent is the forward-transform convention, the same one
/// `rustfft` uses, so spectra built from this table compare directly against
/// its output. Factors are computed in double precision and stored as `f32`.
#[derive(Debug, Clone)]
pub struct TwiddleTable {
    factors: Vec<Complex32>,
    size: usize,
}

impl TwiddleTable {
    /// Build the table for the given transform size.
    ///
    /// `size` must be a power of two and at least 2.
    pub fn new(size: usize) -> Result<Self, FftError> {
        if size < 2 || !size.is_power_of_two() {
            return Err(FftError::NonPowerOfTwo { size });
        }

        let factors = (0..size / 2)
            .map(|k| {
                let angle = -2.0 * PI * k as f64 / size as f64;
                Complex32::new(angle.cos() as f32, angle.sin() as f32)
            })
            .collect();

        Ok(Self { factors, size })
    }

    /// Transform size the table was built for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored factors (`size / 2`).
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// True if the table holds no factors. Never the case for a
    /// successfully constructed table.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// The `k`-th root, `exp(-2*pi*i*k/size)`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= size / 2`.
    #[inline]
    pub fn factor(&self, k: usize) -> Complex32 {
        self.factors[k]
    }
}
