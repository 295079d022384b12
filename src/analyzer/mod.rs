//! Frequency analysis: turns a playable audio source into a stream of
//! magnitude snapshots, published lock-free to the render side.

mod source;
mod spectrum;

pub use source::{AudioSource, StaticSource, TrackSource};
pub use spectrum::{ByteSpectrum, BIN_COUNT, FFT_SIZE};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use triple_buffer::TripleBuffer;

use crate::error::InitError;

/// Cadence of the analysis thread, roughly one 2048-sample window at
/// 44.1 kHz. The audio pipeline, not the render loop, owns this clock.
const ANALYSIS_INTERVAL: Duration = Duration::from_millis(45);

/// One complete magnitude spectrum, one byte per frequency bin. Produced
/// wholesale each analysis cycle and never mutated after publication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencySnapshot {
    bins: Box<[u8]>,
}

impl FrequencySnapshot {
    /// The all-zero snapshot readers see before the first analysis cycle.
    pub fn silent() -> Self {
        Self {
            bins: vec![0; BIN_COUNT].into_boxed_slice(),
        }
    }

    fn from_bins(bins: Vec<u8>) -> Self {
        Self {
            bins: bins.into_boxed_slice(),
        }
    }

    /// Magnitude of bin `i`; out-of-range reads yield 0.
    pub fn bin(&self, i: usize) -> u8 {
        self.bins.get(i).copied().unwrap_or(0)
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Render-side view of the snapshot cell. Never blocks; returns whatever
/// snapshot is currently published, however stale.
pub struct SnapshotReader {
    output: triple_buffer::Output<FrequencySnapshot>,
}

impl SnapshotReader {
    pub fn latest(&mut self) -> &FrequencySnapshot {
        self.output.read()
    }
}

/// Continuously derives the frequency spectrum of whatever the attached
/// source is playing. Each cycle allocates a fresh snapshot and swaps it
/// into the shared cell as a unit, so readers never observe a partial write.
pub struct FrequencyAnalyzer<S: AudioSource> {
    source: Arc<S>,
    input: triple_buffer::Input<FrequencySnapshot>,
    scratch: Vec<u8>,
}

impl<S: AudioSource> FrequencyAnalyzer<S> {
    /// Attach to a playable source, returning the analyzer and the reader
    /// half of the snapshot cell.
    pub fn attach(source: Arc<S>) -> Result<(Self, SnapshotReader), InitError> {
        let bins = source.bin_count();
        if bins != BIN_COUNT {
            return Err(InitError::AudioSource(format!(
                "expected {BIN_COUNT} frequency bins, source reports {bins}"
            )));
        }
        let (input, output) = TripleBuffer::new(&FrequencySnapshot::silent()).split();
        Ok((
            Self {
                source,
                input,
                scratch: vec![0; BIN_COUNT],
            },
            SnapshotReader { output },
        ))
    }

    /// Run one analysis cycle synchronously and publish the result. Hosts
    /// with their own clock (offline rendering, tests) drive this directly.
    pub fn publish_once(&mut self) {
        self.source.magnitudes(&mut self.scratch);
        self.input.write(FrequencySnapshot::from_bins(self.scratch.clone()));
    }

    /// Hand the analyzer to a dedicated thread running at audio cadence.
    pub fn spawn(mut self) -> AnalyzerHandle
    where
        S: 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = std::thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                self.publish_once();
                std::thread::sleep(ANALYSIS_INTERVAL);
            }
            // Dropping the analyzer here releases its source handle.
        });
        AnalyzerHandle {
            stop,
            thread: Some(thread),
        }
    }
}

/// Owner handle for a spawned analysis thread. Stopping is idempotent and
/// joins the thread so no snapshot is published afterwards.
pub struct AnalyzerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl AnalyzerHandle {
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for AnalyzerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
