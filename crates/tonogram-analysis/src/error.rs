//! Error types for note-profile extraction.

use thiserror::Error;
use tonogram_core::FftError;

use crate::profile::NoteProfile;

/// Errors that can occur while configuring or running an extraction.
#[derive(Debug, Error)]
pub enum Error {
    /// Analysis windows must be powers of two, at least 2.
    #[error("window size {size} is not a power of two >= 2")]
    WindowNotPowerOfTwo {
        /// The rejected window size.
        size: usize,
    },

    /// The sample rate must be positive.
    #[error("sample rate must be positive")]
    ZeroSampleRate,

    /// The chunk stride must be positive.
    #[error("chunk stride must be positive")]
    ZeroStride,

    /// The base frequency must be positive and finite.
    #[error("base frequency {hz} Hz is not usable")]
    BadBaseFrequency {
        /// The rejected frequency.
        hz: f64,
    },

    /// The batch length must be positive and finite.
    #[error("batch length {seconds} s is not usable")]
    BadBatchSeconds {
        /// The rejected length.
        seconds: f64,
    },

    /// The highest pitch class of the first octave does not complete a cycle
    /// within one stride at this rate; no chunk spacing can resolve it.
    #[error(
        "base {base_hz} Hz with stride {stride} at {sample_rate} Hz cannot resolve the first octave"
    )]
    UnresolvableRange {
        /// Configured base frequency.
        base_hz: f64,
        /// Configured sample rate.
        sample_rate: u32,
        /// Configured chunk stride.
        stride: usize,
    },

    /// The analysis window does not fit in the samples one chunk is
    /// guaranteed to have available.
    #[error("window size {window} exceeds the {limit} samples a chunk can rely on")]
    WindowTooLong {
        /// Configured window size.
        window: usize,
        /// Base-note period plus slack.
        limit: usize,
    },

    /// The batch buffer cannot hold even one chunk.
    #[error("batch capacity {capacity} is below the {needed} samples one chunk needs")]
    BatchTooSmall {
        /// Samples the batch buffer holds per channel.
        capacity: usize,
        /// Samples the first chunk requires.
        needed: usize,
    },

    /// The source's sample rate differs from the configured one.
    // thiserror reserves a field named `source` for the cause chain, so
    // the reported rate goes by `got`.
    #[error("source sample rate {got} does not match configured rate {expected}")]
    SampleRateMismatch {
        /// Rate in the validated config.
        expected: u32,
        /// Rate the source reports.
        got: u32,
    },

    /// The source reports no channels.
    #[error("source has no channels")]
    NoChannels,

    /// A channel count differed from the one established at the start.
    #[error("expected {expected} channels, got {got}")]
    ChannelMismatch {
        /// Channel count the extraction started with.
        expected: usize,
        /// Channel count offered.
        got: usize,
    },

    /// A full batch still holds too few samples for a single chunk.
    #[error("batch holds {available} samples but the first chunk needs {needed}")]
    InsufficientSamples {
        /// Samples available in the batch buffer.
        available: usize,
        /// Samples the first chunk requires.
        needed: usize,
    },

    /// A backend returned a different number of spectra than windows
    /// submitted.
    #[error("backend returned {got} spectra for {expected} submitted windows")]
    ChunkCountMismatch {
        /// Windows submitted.
        expected: usize,
        /// Spectra returned.
        got: usize,
    },

    /// A slice length did not match what the operation requires.
    #[error("expected length {expected}, got {got}")]
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Offered length.
        got: usize,
    },

    /// Timestamps must be strictly increasing.
    #[error("timestamp {offered} does not advance past {previous}")]
    NonMonotonicTimestamp {
        /// Last accepted timestamp.
        previous: u64,
        /// Rejected timestamp.
        offered: u64,
    },

    /// An index was out of range.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the indexed collection.
        len: usize,
    },

    /// Aggregation over zero channels has no meaning.
    #[error("cannot aggregate zero channels")]
    EmptyAggregation,

    /// The handle does not belong to a pending batch of this backend.
    #[error("batch handle {handle} is unknown to this backend")]
    UnknownBatch {
        /// The stale or foreign handle value.
        handle: u64,
    },

    /// Extraction was cancelled by the caller.
    #[error("extraction cancelled")]
    Cancelled,

    /// Transform-layer failure.
    #[error("fft error: {0}")]
    Fft(#[from] FftError),

    /// Sample source failure.
    #[error("sample source error: {0}")]
    Source(String),

    /// Backend failure outside the transform itself.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Convenience result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extraction failed partway through a stream.
///
/// Carries the profile built up to the failing batch so callers keep the
/// chunks already computed alongside the cause.
#[derive(Debug, Error)]
#[error("extraction stopped after {} chunks: {source}", .profile.len())]
pub struct ExtractionError {
    /// Chunks completed before the failure.
    pub profile: NoteProfile,
    /// What went wrong.
    #[source]
    pub source: Error,
}

impl ExtractionError {
    /// Split into the partial profile and the cause.
    pub fn into_parts(self) -> (NoteProfile, Error) {
        (self.profile, self.source)
    }
}
