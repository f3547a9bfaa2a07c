//! Batch execution of window transforms.
//!
//! The scheduler hands whole batches of windows to a backend and collects
//! the spectra later, so an implementation is free to compute eagerly, on a
//! worker thread, or on an accelerator. Two software implementations ship:
//! [`SoftwareBackend`] (eager, in-process) and [`ThreadedBackend`] (one
//! worker thread, pipelined).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, mpsc};
use std::thread;

use rustfft::num_complex::Complex32;
use tonogram_core::{FftEngine, FftError};

use crate::error::{Error, Result};

/// Opaque receipt for a submitted batch. Single-use and backend-scoped.
///
/// The handle pairs the issuing backend's identity with a batch sequence
/// number, so a handle presented to any other backend is rejected even
/// when the sequence numbers happen to coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchHandle {
    backend: u64,
    seq: u64,
}

impl BatchHandle {
    /// Numeric identity of the batch within its backend.
    pub fn id(&self) -> u64 {
        self.seq
    }
}

/// Process-wide counter handing each backend instance a distinct identity.
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(0);

fn next_identity() -> u64 {
    NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed)
}

/// Executes batches of equal-length window transforms.
pub trait TransformBackend {
    /// Window size this backend transforms.
    fn window_size(&self) -> usize;

    /// Enqueue a batch of windows, each exactly
    /// [`window_size`](Self::window_size) samples long.
    fn submit(&self, windows: &[&[f32]]) -> Result<BatchHandle>;

    /// Block until a batch is done and take its half-spectra, in
    /// submission order. A handle can be waited on once.
    fn wait(&self, handle: BatchHandle) -> Result<Vec<Vec<Complex32>>>;
}

struct SoftwareState {
    engine: FftEngine,
    next_seq: u64,
    done: HashMap<u64, Vec<Vec<Complex32>>>,
}

/// In-process backend that transforms eagerly inside `submit`.
pub struct SoftwareBackend {
    window_size: usize,
    identity: u64,
    state: Mutex<SoftwareState>,
}

impl SoftwareBackend {
    /// Create a backend for the given window size.
    pub fn new(window_size: usize) -> Result<Self> {
        let engine = FftEngine::new(window_size)?;
        Ok(Self {
            window_size,
            identity: next_identity(),
            state: Mutex::new(SoftwareState {
                engine,
                next_seq: 0,
                done: HashMap::new(),
            }),
        })
    }
}

impl TransformBackend for SoftwareBackend {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn submit(&self, windows: &[&[f32]]) -> Result<BatchHandle> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| Error::Backend(e.to_string()))?;

        let mut spectra = Vec::with_capacity(windows.len());
        for window in windows {
            spectra.push(state.engine.transform(window)?);
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.done.insert(seq, spectra);
        Ok(BatchHandle {
            backend: self.identity,
            seq,
        })
    }

    fn wait(&self, handle: BatchHandle) -> Result<Vec<Vec<Complex32>>> {
        if handle.backend != self.identity {
            return Err(Error::UnknownBatch { handle: handle.id() });
        }

        let mut state = self
            .state
            .lock()
            .map_err(|e| Error::Backend(e.to_string()))?;

        state
            .done
            .remove(&handle.seq)
            .ok_or(Error::UnknownBatch { handle: handle.id() })
    }
}

type BatchResult = Result<Vec<Vec<Complex32>>>;

struct ResultSide {
    rx: mpsc::Receiver<(u64, BatchResult)>,
    ready: HashMap<u64, BatchResult>,
    /// Lowest id that has not been received yet. Results arrive in id
    /// order from the single worker.
    next_expected: u64,
}

/// Backend that runs transforms on one worker thread.
///
/// `submit` copies the windows and returns once they are queued (the queue
/// is bounded, so deep backlogs block), letting the caller prepare the next
/// batch while this one transforms. `wait` blocks until the worker has
/// delivered the requested batch.
pub struct ThreadedBackend {
    window_size: usize,
    identity: u64,
    jobs: Option<mpsc::SyncSender<(u64, Vec<Vec<f32>>)>>,
    results: Mutex<ResultSide>,
    next_seq: AtomicU64,
    worker: Option<thread::JoinHandle<()>>,
}

impl ThreadedBackend {
    /// Spawn the worker for the given window size.
    pub fn new(window_size: usize) -> Result<Self> {
        let mut engine = FftEngine::new(window_size)?;
        let (job_tx, job_rx) = mpsc::sync_channel::<(u64, Vec<Vec<f32>>)>(2);
        let (result_tx, result_rx) = mpsc::channel::<(u64, BatchResult)>();

        let worker = thread::spawn(move || {
            while let Ok((id, windows)) = job_rx.recv() {
                let mut spectra = Vec::with_capacity(windows.len());
                let mut failure = None;
                for window in &windows {
                    match engine.transform(window) {
                        Ok(spectrum) => spectra.push(spectrum),
                        Err(e) => {
                            failure = Some(Error::Fft(e));
                            break;
                        }
                    }
                }
                let outcome = match failure {
                    None => Ok(spectra),
                    Some(e) => Err(e),
                };
                if result_tx.send((id, outcome)).is_err() {
                    return;
                }
            }
        });

        Ok(Self {
            window_size,
            identity: next_identity(),
            jobs: Some(job_tx),
            results: Mutex::new(ResultSide {
                rx: result_rx,
                ready: HashMap::new(),
                next_expected: 0,
            }),
            next_seq: AtomicU64::new(0),
            worker: Some(worker),
        })
    }
}

impl TransformBackend for ThreadedBackend {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn submit(&self, windows: &[&[f32]]) -> Result<BatchHandle> {
        for window in windows {
            if window.len() != self.window_size {
                return Err(Error::Fft(FftError::WindowLength {
                    expected: self.window_size,
                    got: window.len(),
                }));
            }
        }

        let owned: Vec<Vec<f32>> = windows.iter().map(|w| w.to_vec()).collect();
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);

        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| Error::Backend("transform worker shut down".into()))?;
        jobs.send((seq, owned))
            .map_err(|_| Error::Backend("transform worker exited".into()))?;

        tracing::debug!("batch {seq} queued with {} windows", windows.len());
        Ok(BatchHandle {
            backend: self.identity,
            seq,
        })
    }

    fn wait(&self, handle: BatchHandle) -> Result<Vec<Vec<Complex32>>> {
        if handle.backend != self.identity || handle.seq >= self.next_seq.load(Ordering::SeqCst) {
            return Err(Error::UnknownBatch { handle: handle.id() });
        }

        let mut side = self
            .results
            .lock()
            .map_err(|e| Error::Backend(e.to_string()))?;

        loop {
            if let Some(result) = side.ready.remove(&handle.seq) {
                return result;
            }
            // Already delivered and taken; only a reused handle gets here.
            if handle.seq < side.next_expected {
                return Err(Error::UnknownBatch { handle: handle.id() });
            }
            match side.rx.recv() {
                Ok((seq, result)) => {
                    side.next_expected = seq + 1;
                    side.ready.insert(seq, result);
                }
                Err(_) => return Err(Error::Backend("transform worker exited".into())),
            }
        }
    }
}

impl Drop for ThreadedBackend {
    fn drop(&mut self) {
        // Closing the job channel stops the worker loop.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
