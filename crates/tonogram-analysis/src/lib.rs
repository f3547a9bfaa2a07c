//! Tonogram Analysis - chunked note-profile extraction over streamed audio.
//!
//! This crate turns sampled audio into a time series of musical-note
//! intensities: overlapping windows are Fourier-transformed, their
//! magnitudes gathered into 12 pitch classes per octave, channels averaged,
//! and each chunk appended with a center timestamp. It provides:
//!
//! - [`config`] - extraction parameters and their validation
//! - [`notes`] - pitch-class binning of spectra ([`NoteBinner`])
//! - [`aggregate`] - cross-channel averaging
//! - [`profile`] - the output artifact ([`NoteProfile`])
//! - [`source`] - sample ingestion ([`SampleSource`], [`MemorySource`])
//! - [`backend`] - batch transform execution ([`TransformBackend`],
//!   [`SoftwareBackend`], [`ThreadedBackend`])
//! - [`scheduler`] - the streaming driver ([`ChunkScheduler`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use tonogram_analysis::{
//!     ChunkScheduler, ExtractionConfig, MemorySource, SoftwareBackend,
//! };
//!
//! let config = ExtractionConfig::new(4096, 1024, 512, 4.0).validate()?;
//! let scheduler = ChunkScheduler::new(config)?;
//! let backend = SoftwareBackend::new(config.window_size())?;
//! let mut source = MemorySource::new(4096, vec![samples])?;
//!
//! let profile = scheduler.extract(&mut source, &backend)?;
//! for (timestamp, notes) in profile.iter() {
//!     // notes[octave * 12 + pitch_class]
//! }
//! ```
//!
//! Failures mid-stream return the partial profile inside
//! [`ExtractionError`], so completed chunks survive a dying source.

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod error;
pub mod notes;
pub mod profile;
pub mod scheduler;
pub mod source;

// Re-export main types
pub use backend::{BatchHandle, SoftwareBackend, ThreadedBackend, TransformBackend};
pub use config::{ExtractionConfig, ValidatedConfig};
pub use error::{Error, ExtractionError, Result};
pub use notes::{NoteBinner, midi_note_frequency, note_frequency};
pub use profile::NoteProfile;
pub use scheduler::ChunkScheduler;
pub use source::{MemorySource, SampleSource};
