//! WAV ingestion for the Tonogram note-extraction pipeline.
//!
//! This crate provides:
//!
//! - **Streaming WAV input**: [`WavSource`] decodes a WAV file on demand
//!   and feeds it to an extraction as a
//!   [`SampleSource`](tonogram_analysis::SampleSource)
//! - **Fixture output**: [`write_wav`] saves per-channel buffers, mainly
//!   for producing test input
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tonogram_analysis::{ChunkScheduler, ExtractionConfig, SoftwareBackend};
//! use tonogram_io::WavSource;
//!
//! let config = ExtractionConfig::new(44100, 4096, 2048, 27.5).validate()?;
//! let scheduler = ChunkScheduler::new(config)?;
//! let backend = SoftwareBackend::new(4096)?;
//!
//! let source = WavSource::open("input.wav")?;
//! let profile = scheduler.extract(source, &backend)?;
//! println!("{} chunks extracted", profile.len());
//! ```

mod wav;

pub use wav::{WavSource, write_wav};

/// Error types for WAV ingestion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file's sample encoding cannot be decoded to f32.
    #[error("Unsupported sample format: {bits}-bit {format}")]
    UnsupportedFormat {
        /// Bit depth the file declares.
        bits: u16,
        /// Declared encoding, "int" or "float".
        format: &'static str,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for WAV ingestion.
pub type Result<T> = std::result::Result<T, Error>;
