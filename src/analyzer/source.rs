use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::spectrum::{ByteSpectrum, BIN_COUNT, FFT_SIZE};

/// Narrow seam over the host's playable-audio capability. Implementations
/// must be callable from the analyzer thread while the host holds its own
/// handle for playback control.
pub trait AudioSource: Send + Sync {
    /// Number of frequency bins one magnitude read yields.
    fn bin_count(&self) -> usize;

    /// Fill `out` with the current byte magnitudes, one per bin. All zeros
    /// when the source currently yields no signal.
    fn magnitudes(&self, out: &mut [u8]);

    /// Whether the underlying pipeline is suspended (autoplay policies may
    /// start it that way).
    fn is_suspended(&self) -> bool;

    /// Move the pipeline out of the suspended state. Only ever called from a
    /// user-intent play action, never implicitly by the render loop.
    fn resume(&self);

    /// Audible mute only; analysis is unaffected.
    fn set_muted(&self, muted: bool);
}

struct TrackState {
    cursor: usize,
    playing: bool,
    spectrum: ByteSpectrum,
    window: Vec<f32>,
}

/// A playable track backed by decoded PCM. The host clocks playback by
/// calling [`TrackSource::advance`]; analysis reads the window ending at the
/// playback cursor. Starts suspended, mirroring autoplay-restricted pipelines.
pub struct TrackSource {
    samples: Vec<f32>,
    sample_rate: u32,
    suspended: AtomicBool,
    muted: AtomicBool,
    state: Mutex<TrackState>,
}

impl TrackSource {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            suspended: AtomicBool::new(true),
            muted: AtomicBool::new(false),
            state: Mutex::new(TrackState {
                cursor: 0,
                playing: false,
                spectrum: ByteSpectrum::new(),
                window: vec![0.0; FFT_SIZE],
            }),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn play(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.playing = true;
        }
    }

    pub fn pause(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.playing = false;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().map(|s| s.playing).unwrap_or(false)
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    /// Host playback clock: moves the cursor forward while playing and not
    /// suspended. A paused or suspended track does not advance.
    pub fn advance(&self, samples: usize) {
        if self.is_suspended() {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            if state.playing {
                state.cursor = (state.cursor + samples).min(self.samples.len());
            }
        }
    }

    /// Current playback position in seconds; the host samples this for its
    /// elapsed-time display.
    pub fn position_secs(&self) -> f32 {
        let cursor = self.state.lock().map(|s| s.cursor).unwrap_or(0);
        cursor as f32 / self.sample_rate as f32
    }
}

impl AudioSource for TrackSource {
    fn bin_count(&self) -> usize {
        BIN_COUNT
    }

    fn magnitudes(&self, out: &mut [u8]) {
        let Ok(mut state) = self.state.lock() else {
            out.fill(0);
            return;
        };

        if self.is_suspended() || !state.playing {
            state.spectrum.reset();
            out.fill(0);
            return;
        }

        // Most recent FFT_SIZE samples ending at the cursor, zero-padded at
        // the front near the start of the track.
        let end = state.cursor;
        let start = end.saturating_sub(FFT_SIZE);
        let pad = FFT_SIZE - (end - start);
        let state = &mut *state;
        state.window[..pad].fill(0.0);
        state.window[pad..].copy_from_slice(&self.samples[start..end]);
        state.spectrum.analyze(&state.window, out);
    }

    fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    fn resume(&self) {
        self.suspended.store(false, Ordering::Relaxed);
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }
}

/// Fixed-magnitude source for tests and demos: always reports the same bins,
/// with the same suspended/muted lifecycle as a real source.
pub struct StaticSource {
    bins: Vec<u8>,
    suspended: AtomicBool,
    muted: AtomicBool,
}

impl StaticSource {
    pub fn new(bins: Vec<u8>) -> Self {
        Self {
            bins,
            suspended: AtomicBool::new(false),
            muted: AtomicBool::new(false),
        }
    }
}

impl AudioSource for StaticSource {
    fn bin_count(&self) -> usize {
        self.bins.len()
    }

    fn magnitudes(&self, out: &mut [u8]) {
        if self.suspended.load(Ordering::Relaxed) {
            out.fill(0);
            return;
        }
        let n = out.len().min(self.bins.len());
        out[..n].copy_from_slice(&self.bins[..n]);
        out[n..].fill(0);
    }

    fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    fn resume(&self) {
        self.suspended.store(false, Ordering::Relaxed);
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_track(secs: f32) -> TrackSource {
        let sample_rate = 44_100;
        let samples: Vec<f32> = (0..(sample_rate as f32 * secs) as usize)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin())
            .collect();
        TrackSource::new(samples, sample_rate)
    }

    #[test]
    fn starts_suspended_and_silent() {
        let track = sine_track(1.0);
        assert!(track.is_suspended());

        let mut out = [1u8; BIN_COUNT];
        track.magnitudes(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn suspended_track_does_not_advance() {
        let track = sine_track(1.0);
        track.play();
        track.advance(4096);
        assert_eq!(track.position_secs(), 0.0);
    }

    #[test]
    fn playing_track_produces_signal() {
        let track = sine_track(1.0);
        track.resume();
        track.play();
        track.advance(FFT_SIZE);

        let mut out = [0u8; BIN_COUNT];
        track.magnitudes(&mut out);
        assert!(out.iter().any(|&b| b > 0));
    }

    #[test]
    fn paused_track_goes_silent() {
        let track = sine_track(1.0);
        track.resume();
        track.play();
        track.advance(FFT_SIZE);
        track.pause();

        let mut out = [0u8; BIN_COUNT];
        track.magnitudes(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn mute_does_not_affect_analysis() {
        let track = sine_track(1.0);
        track.resume();
        track.play();
        track.advance(FFT_SIZE);
        track.set_muted(true);

        let mut out = [0u8; BIN_COUNT];
        track.magnitudes(&mut out);
        assert!(track.is_muted());
        assert!(out.iter().any(|&b| b > 0));
    }

    #[test]
    fn cursor_clamps_at_track_end() {
        let track = sine_track(0.1);
        track.resume();
        track.play();
        track.advance(10_000_000);
        assert!((track.position_secs() - 0.1).abs() < 0.01);
    }
}
