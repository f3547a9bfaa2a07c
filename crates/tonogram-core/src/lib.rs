//! Tonogram Core - radix-2 FFT primitives for note-profile extraction.
//!
//! This crate provides the transform layer the rest of the workspace builds
//! on:
//!
//! - [`twiddle`] - precomputed roots of unity for a fixed transform size
//! - [`fft`] - iterative radix-2 FFT engine over real input windows, plus a
//!   brute-force reference DFT and magnitude helpers
//!
//! The engine returns the non-redundant half of the spectrum (real input),
//! uses the forward sign convention `exp(-2*pi*i*k/n)`, and reuses its
//! scratch buffers across calls so steady-state transforms do not allocate
//! beyond the returned spectrum.
//!
//! ```rust,ignore
//! use tonogram_core::FftEngine;
//!
//! let mut engine = FftEngine::new(1024)?;
//! let spectrum = engine.transform(&window)?;   // 512 complex bins
//! let mags = tonogram_core::magnitudes(&spectrum);
//! ```

pub mod fft;
pub mod twiddle;

pub use fft::{FftEngine, magnitudes, reference_dft};
pub use twiddle::TwiddleTable;

/// Error types for transform construction and execution.
#[derive(Debug, thiserror::Error)]
pub enum FftError {
    /// Transform sizes must be powers of two, at least 2.
    #[error("transform size {size} is not a power of two >= 2")]
    NonPowerOfTwo {
        /// The rejected size.
        size: usize,
    },

    /// Input window length does not match the size the engine was built for.
    #[error("window length {got} does not match transform size {expected}")]
    WindowLength {
        /// Size fixed at construction.
        expected: usize,
        /// Length of the offered window.
        got: usize,
    },
}

/// Convenience result type for transform operations.
pub type Result<T> = std::result::Result<T, FftError>;
