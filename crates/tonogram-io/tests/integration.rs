//! Integration tests for tonogram-io.
//!
//! Writes WAV fixtures to disk and runs whole extractions through
//! [`WavSource`], checking parity with the in-memory path.

use std::f64::consts::PI;

use tonogram_analysis::{
    ChunkScheduler, ExtractionConfig, MemorySource, NoteProfile, SampleSource, SoftwareBackend,
};
use tonogram_io::{WavSource, write_wav};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a sine wave at a given frequency and amplitude.
fn sine(freq_hz: f64, sample_rate: u32, num_samples: usize, amplitude: f64) -> Vec<f32> {
    (0..num_samples)
        .map(|i| (amplitude * (2.0 * PI * freq_hz * i as f64 / f64::from(sample_rate)).sin()) as f32)
        .collect()
}

/// Index of the loudest slot in a note vector.
fn loudest_slot(notes: &[f32]) -> usize {
    notes
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap()
}

/// The exact f32 values a 16-bit PCM round trip hands back.
fn quantize_i16(samples: &[f32]) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| ((s * 32768.0).clamp(-32768.0, 32767.0) as i32) as f32 / 32768.0)
        .collect()
}

/// 4096 Hz audio, 1024-sample windows, half-window stride, base note 4 Hz.
fn extract_standard(source: &mut dyn SampleSource) -> NoteProfile {
    let config = ExtractionConfig::new(4096, 1024, 512, 4.0)
        .validate()
        .unwrap();
    let scheduler = ChunkScheduler::new(config).unwrap();
    let backend = SoftwareBackend::new(config.window_size()).unwrap();
    scheduler.extract(source, &backend).unwrap()
}

// ===========================================================================
// 1. Extraction straight from disk
// ===========================================================================

#[test]
fn tone_from_wav_lands_in_its_slot() {
    // 256 Hz = 4 Hz * 2^6: octave 6, pitch class 0, slot 72.
    let signal = sine(256.0, 4096, 3 * 4096, 0.8);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_wav(&path, 4096, 16, &[signal]).unwrap();

    let mut source = WavSource::open(&path).unwrap();
    assert_eq!(source.sample_rate(), 4096);
    assert!((source.duration_seconds() - 3.0).abs() < 1e-9);

    let profile = extract_standard(&mut source);
    assert_eq!(profile.len(), 22);
    assert_eq!(profile.timestamp(0).unwrap(), 512);

    for (_, notes) in profile.iter() {
        assert_eq!(loudest_slot(notes), 72);
        assert!(notes[72] > 300.0);
    }
}

// ===========================================================================
// 2. Parity with the in-memory path
// ===========================================================================

#[test]
fn wav_extraction_matches_memory_extraction() {
    let signal = sine(256.0, 4096, 3 * 4096, 0.8);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parity.wav");
    write_wav(&path, 4096, 16, &[signal.clone()]).unwrap();

    let mut wav_source = WavSource::open(&path).unwrap();
    let from_disk = extract_standard(&mut wav_source);

    // 16-bit quantization happens on the way to disk, so feed the memory
    // path the values the file actually stores.
    let mut memory_source = MemorySource::new(4096, vec![quantize_i16(&signal)]).unwrap();
    let from_memory = extract_standard(&mut memory_source);

    assert_eq!(from_disk, from_memory);
}

#[test]
fn silent_channel_halves_the_wav_profile() {
    let tone = sine(256.0, 4096, 3 * 4096, 0.8);
    let silence = vec![0.0f32; tone.len()];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_wav(&path, 4096, 16, &[tone.clone(), silence]).unwrap();

    let mut stereo_source = WavSource::open(&path).unwrap();
    assert_eq!(stereo_source.channel_count(), 2);
    let stereo = extract_standard(&mut stereo_source);

    let mut mono_source = MemorySource::new(4096, vec![quantize_i16(&tone)]).unwrap();
    let mono = extract_standard(&mut mono_source);

    assert_eq!(stereo.len(), mono.len());
    for i in 0..stereo.len() {
        let halved = stereo.notes(i).unwrap();
        let full = mono.notes(i).unwrap();
        for (h, f) in halved.iter().zip(full.iter()) {
            assert_eq!(*h, f * 0.5);
        }
    }
}

// ===========================================================================
// 3. Skipping ahead before extraction
// ===========================================================================

#[test]
fn skip_samples_trims_the_head() {
    let signal = sine(256.0, 4096, 3 * 4096, 0.8);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skip.wav");
    write_wav(&path, 4096, 16, &[signal]).unwrap();

    let mut source = WavSource::open(&path).unwrap();
    assert_eq!(source.skip_samples(4096).unwrap(), 4096);
    assert_eq!(source.samples_remaining(), 8192);

    // 8192 samples left, chunks need 1027: 14 chunks.
    let profile = extract_standard(&mut source);
    assert_eq!(profile.len(), 14);
    assert_eq!(loudest_slot(profile.notes(0).unwrap()), 72);
}
