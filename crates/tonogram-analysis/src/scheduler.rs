//! The streaming extraction driver.
//!
//! Pulls batches from a [`SampleSource`], carves overlapping windows,
//! transforms them per channel through a [`TransformBackend`], averages the
//! channels, bins the spectra, and appends timestamped note vectors to a
//! [`NoteProfile`]. Carryover keeps chunk spacing exact across read
//! boundaries, so profiles never depend on how a source chops its reads.

use std::sync::atomic::{AtomicBool, Ordering};

use tonogram_core::magnitudes;

use crate::aggregate;
use crate::backend::TransformBackend;
use crate::config::ValidatedConfig;
use crate::error::{Error, ExtractionError, Result};
use crate::notes::NoteBinner;
use crate::profile::NoteProfile;
use crate::source::SampleSource;

/// Streaming note-profile extractor for one validated configuration.
///
/// The scheduler itself is stateless across extractions; batch buffers and
/// carryover live inside each [`extract`](Self::extract) call, so one
/// scheduler can serve many sources sequentially.
pub struct ChunkScheduler {
    config: ValidatedConfig,
    binner: NoteBinner,
}

impl ChunkScheduler {
    /// Build a scheduler (and its bin map) for a validated config.
    pub fn new(config: ValidatedConfig) -> Result<Self> {
        let binner = NoteBinner::new(
            config.window_size(),
            config.sample_rate(),
            config.base_frequency(),
        )?;
        Ok(Self { config, binner })
    }

    /// The configuration driving this scheduler.
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// The bin map chunks are gathered with.
    pub fn binner(&self) -> &NoteBinner {
        &self.binner
    }

    /// Extract a profile, consuming the source to exhaustion.
    ///
    /// On failure the partial profile built so far travels inside the
    /// error.
    pub fn extract(
        &self,
        source: &mut dyn SampleSource,
        backend: &dyn TransformBackend,
    ) -> std::result::Result<NoteProfile, ExtractionError> {
        self.run(source, backend, None)
    }

    /// Like [`extract`](Self::extract), but stops with
    /// [`Error::Cancelled`] once `cancel` is set. The flag is checked once
    /// per batch cycle.
    pub fn extract_with_cancel(
        &self,
        source: &mut dyn SampleSource,
        backend: &dyn TransformBackend,
        cancel: &AtomicBool,
    ) -> std::result::Result<NoteProfile, ExtractionError> {
        self.run(source, backend, Some(cancel))
    }

    fn run(
        &self,
        source: &mut dyn SampleSource,
        backend: &dyn TransformBackend,
        cancel: Option<&AtomicBool>,
    ) -> std::result::Result<NoteProfile, ExtractionError> {
        let remaining = usize::try_from(source.samples_remaining()).unwrap_or(usize::MAX);
        // Advisory preallocation, capped so a source reporting a wild
        // remaining count cannot force a huge buffer up front.
        let hint = chunk_count(
            remaining,
            self.config.chunk_requirement(),
            self.config.chunk_stride(),
        )
        .min(1 << 20);
        let mut profile = NoteProfile::with_capacity(
            self.config.sample_rate(),
            self.config.chunk_stride(),
            self.binner.note_count(),
            hint,
        );

        match self.stream(source, backend, cancel, &mut profile) {
            Ok(()) => Ok(profile),
            Err(cause) => {
                tracing::warn!(
                    "extraction aborted after {} chunks: {cause}",
                    profile.len()
                );
                Err(ExtractionError {
                    profile,
                    source: cause,
                })
            }
        }
    }

    fn stream(
        &self,
        source: &mut dyn SampleSource,
        backend: &dyn TransformBackend,
        cancel: Option<&AtomicBool>,
        profile: &mut NoteProfile,
    ) -> Result<()> {
        if source.sample_rate() != self.config.sample_rate() {
            return Err(Error::SampleRateMismatch {
                expected: self.config.sample_rate(),
                got: source.sample_rate(),
            });
        }
        let channels = source.channel_count();
        if channels == 0 {
            return Err(Error::NoChannels);
        }

        let window = self.config.window_size();
        if backend.window_size() != window {
            return Err(Error::LengthMismatch {
                expected: window,
                got: backend.window_size(),
            });
        }

        let stride = self.config.chunk_stride();
        let needed = self.config.chunk_requirement();
        let capacity = self.config.batch_capacity();
        let center = self.config.center_offset();

        let mut buffers: Vec<Vec<f32>> = vec![vec![0.0; capacity]; channels];
        let mut available = 0usize;
        let mut base_index = 0u64;

        loop {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(Error::Cancelled);
                }
            }

            let want = capacity - available;
            let n_read = {
                let mut views: Vec<&mut [f32]> = buffers
                    .iter_mut()
                    .map(|buffer| &mut buffer[available..])
                    .collect();
                source.read_samples(want, &mut views)?
            };
            if n_read > want {
                return Err(Error::Source(format!(
                    "source produced {n_read} samples for a request of {want}"
                )));
            }
            if n_read == 0 {
                if available > 0 {
                    tracing::debug!("stream end, {available} tail samples below one chunk");
                }
                return Ok(());
            }
            available += n_read;

            let chunks = chunk_count(available, needed, stride);
            if chunks == 0 {
                if n_read < want {
                    // Terminal partial read; the next read returns 0 and
                    // ends the stream.
                    continue;
                }
                return Err(Error::InsufficientSamples { available, needed });
            }

            let mut handles = Vec::with_capacity(channels);
            for buffer in &buffers {
                let windows: Vec<&[f32]> = (0..chunks)
                    .map(|i| &buffer[i * stride..i * stride + window])
                    .collect();
                handles.push(backend.submit(&windows)?);
            }

            let mut channel_notes: Vec<Vec<Vec<f32>>> = Vec::with_capacity(channels);
            for handle in handles {
                let spectra = backend.wait(handle)?;
                if spectra.len() != chunks {
                    return Err(Error::ChunkCountMismatch {
                        expected: chunks,
                        got: spectra.len(),
                    });
                }
                let notes = spectra
                    .iter()
                    .map(|spectrum| self.binner.bin_notes(&magnitudes(spectrum)))
                    .collect::<Result<Vec<_>>>()?;
                channel_notes.push(notes);
            }

            for i in 0..chunks {
                let per_channel: Vec<&[f32]> = channel_notes
                    .iter()
                    .map(|notes| notes[i].as_slice())
                    .collect();
                let merged = aggregate::mean(&per_channel)?;
                let timestamp = base_index + (i * stride) as u64 + center;
                profile.push(timestamp, merged)?;
            }

            let leftover = available - chunks * stride;
            let start = available - leftover;
            for buffer in &mut buffers {
                buffer.copy_within(start..available, 0);
            }
            tracing::debug!(
                "batch done: {chunks} chunks from {available} samples, {leftover} carried over"
            );

            base_index += (chunks * stride) as u64;
            available = leftover;
        }
    }
}

/// Chunks extractable from `available` samples when each needs `needed`
/// samples past its start and starts `stride` apart.
fn chunk_count(available: usize, needed: usize, stride: usize) -> usize {
    let spare = available as i64 - needed as i64;
    if spare < 0 {
        0
    } else {
        (spare.div_euclid(stride as i64) + 1) as usize
    }
}
