//! Iterative radix-2 FFT engine over real input windows.

use rustfft::num_complex::Complex32;
use std::f64::consts::PI;

use crate::FftError;
use crate::twiddle::TwiddleTable;

/// Fixed-size decimation-in-time FFT with reusable scratch buffers.
///
/// The engine owns two scratch buffers that alternate read/write roles at
/// every stage (ping-pong). Stage `s` combines `2^s`-point sub-spectra into
/// `2^(s+1)`-point ones; after `log2(size)` stages the first buffer half
/// holds the non-redundant spectrum of the real input. No bit-reversal pass
/// is needed: each stage reads its even/odd halves from the positions the
/// previous stage produced.
pub struct FftEngine {
    twiddles: TwiddleTable,
    scratch: [Vec<Complex32>; 2],
    size: usize,
    stages: u32,
}

impl FftEngine {
    /// Create an engine for the given window size.
    ///
    /// `window_size` must be a power of two, at least 2.
    pub fn new(window_size: usize) -> Result<Self, FftError> {
        let twiddles = TwiddleTable::new(window_size)?;
        let scratch = [
            vec![Complex32::new(0.0, 0.0); window_size],
            vec![Complex32::new(0.0, 0.0); window_size],
        ];

        Ok(Self {
            twiddles,
            scratch,
            size: window_size,
            stages: window_size.trailing_zeros(),
        })
    }

    /// Window size the engine transforms.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bins a transform returns (`size / 2`).
    pub fn spectrum_len(&self) -> usize {
        self.size / 2
    }

    /// Transform one window of real samples.
    ///
    /// Returns the first `size / 2` complex bins (DC up to, excluding,
    /// Nyquist). The window length must match [`size`](Self::size).
    pub fn transform(&mut self, window: &[f32]) -> Result<Vec<Complex32>, FftError> {
        if window.len() != self.size {
            return Err(FftError::WindowLength {
                expected: self.size,
                got: window.len(),
            });
        }

        for (slot, &sample) in self.scratch[0].iter_mut().zip(window) {
            *slot = Complex32::new(sample, 0.0);
        }

        let mut cur = 0;
        for stage in 0..self.stages {
            // Sub-transforms still to merge at this stage, and the number of
            // butterfly pairs inside each merge.
            let n_universes = self.size >> (stage + 1);
            let n_pairs = 1usize << stage;
            let tw_shift = self.stages - stage - 1;

            let (first, second) = self.scratch.split_at_mut(1);
            let (src, dst) = if cur == 0 {
                (&first[0], &mut second[0])
            } else {
                (&second[0], &mut first[0])
            };

            for u in 0..n_universes {
                let evens = u << stage;
                let odds = (u + n_universes) << stage;
                let out = u << (stage + 1);

                for k in 0..n_pairs {
                    let tw = self.twiddles.factor(k << tw_shift);
                    let even = src[evens + k];
                    let odd = src[odds + k] * tw;
                    dst[out + k] = even + odd;
                    dst[out + k + n_pairs] = even - odd;
                }
            }

            cur ^= 1;
        }

        Ok(self.scratch[cur][..self.size / 2].to_vec())
    }
}

/// Brute-force DFT of a real window, first `n/2` bins.
///
/// Double-precision accumulation. O(n^2); this is the correctness oracle
/// for [`FftEngine`], not a production path.
pub fn reference_dft(window: &[f32]) -> Vec<Complex32> {
    let n = window.len();
    let mut spectrum = Vec::with_capacity(n / 2);

    for k in 0..n / 2 {
        let mut re = 0.0f64;
        let mut im = 0.0f64;
        for (j, &sample) in window.iter().enumerate() {
            let angle = -2.0 * PI * (j * k) as f64 / n as f64;
            re += f64::from(sample) * angle.cos();
            im += f64::from(sample) * angle.sin();
        }
        spectrum.push(Complex32::new(re as f32, im as f32));
    }

    spectrum
}

/// Magnitude of each spectral bin.
pub fn magnitudes(spectrum: &[Complex32]) -> Vec<f32> {
    spectrum.iter().map(|c| c.norm()).collect()
}
