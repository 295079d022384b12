use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Analysis window length in samples.
pub const FFT_SIZE: usize = 2048;
/// Frequency bins per snapshot (half the analysis window).
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Byte mapping range: magnitudes at or below MIN_DB become 0, at or above
/// MAX_DB become 255.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;
/// Temporal smoothing constant applied to linear magnitudes between cycles.
const SMOOTHING: f32 = 0.8;

/// Windowed FFT that turns a block of PCM samples into byte frequency
/// magnitudes, with exponential smoothing across analysis cycles.
pub struct ByteSpectrum {
    fft: Arc<dyn Fft<f32>>,
    hann: Vec<f32>,
    window_sum: f32,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl ByteSpectrum {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let hann = hann_window(FFT_SIZE);
        let window_sum = hann.iter().sum();
        Self {
            fft,
            hann,
            window_sum,
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; BIN_COUNT],
        }
    }

    /// One analysis cycle over the most recent [`FFT_SIZE`] samples
    /// (zero-padded by the caller when fewer are available). Writes one byte
    /// per bin into `out`.
    pub fn analyze(&mut self, window: &[f32], out: &mut [u8]) {
        debug_assert_eq!(window.len(), FFT_SIZE);
        debug_assert_eq!(out.len(), BIN_COUNT);

        for (slot, (&sample, &coeff)) in self
            .scratch
            .iter_mut()
            .zip(window.iter().zip(self.hann.iter()))
        {
            *slot = Complex::new(sample * coeff, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Amplitude-correct normalization for the Hann window: a full-scale
        // sine lands at ~1.0 in its bin.
        let scale = 2.0 / self.window_sum;
        for (bin, byte) in out.iter_mut().enumerate().take(BIN_COUNT) {
            let magnitude = self.scratch[bin].norm() * scale;
            let smoothed = SMOOTHING * self.smoothed[bin] + (1.0 - SMOOTHING) * magnitude;
            self.smoothed[bin] = smoothed;
            *byte = byte_magnitude(smoothed);
        }
    }

    /// Forget smoothing history. Used when the signal stops so the next
    /// cycle starts from silence instead of decaying old content.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }
}

impl Default for ByteSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a linear magnitude onto the 0..=255 dB range.
fn byte_magnitude(amplitude: f32) -> u8 {
    if amplitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * amplitude.log10();
    let norm = (db - MIN_DB) / (MAX_DB - MIN_DB);
    (norm.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_window_shape() {
        let hann = hann_window(FFT_SIZE);
        assert!(hann[0].abs() < 0.01);
        assert!(hann[FFT_SIZE - 1].abs() < 0.01);
        assert!((hann[FFT_SIZE / 2] - 1.0).abs() < 0.01);
    }

    #[test]
    fn silence_yields_zero_bins() {
        let mut spectrum = ByteSpectrum::new();
        let mut out = [0u8; BIN_COUNT];
        spectrum.analyze(&[0.0; FFT_SIZE], &mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn sine_energy_lands_in_its_bin() {
        let mut spectrum = ByteSpectrum::new();
        let bin = 64;
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin())
            .collect();

        let mut out = [0u8; BIN_COUNT];
        spectrum.analyze(&window, &mut out);

        // First cycle sees 0.2x the magnitude through smoothing, still well
        // above the -100 dB floor.
        assert!(out[bin] > 200, "peak bin was {}", out[bin]);
        assert_eq!(out[bin + 50], 0, "far-field floor should stay at zero");
    }

    #[test]
    fn reset_clears_smoothing_history() {
        let mut spectrum = ByteSpectrum::new();
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| (2.0 * std::f32::consts::PI * 32.0 * i as f32 / FFT_SIZE as f32).sin())
            .collect();
        let mut out = [0u8; BIN_COUNT];
        spectrum.analyze(&window, &mut out);
        assert!(out[32] > 0);

        spectrum.reset();
        spectrum.analyze(&[0.0; FFT_SIZE], &mut out);
        assert!(out.iter().all(|&b| b == 0));
    }
}
