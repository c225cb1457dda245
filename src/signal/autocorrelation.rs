//! Autocorrelation-based dominant period estimation
//!
//! The score is standardised, its autocorrelation is computed with FFT
//! acceleration (`ACF = IFFT(|FFT(x)|²)` on a zero-padded buffer, which gives
//! the linear, not circular, correlation), the first two lags are zeroed and
//! the lag of the first remaining maximum is converted to seconds.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Minimum signal length for a period estimate
pub const MIN_PERIOD_SAMPLES: usize = 8;

/// Epsilon added to the standard deviation before standardising
const STD_EPSILON: f64 = 1e-9;

/// ACF values at or below this are treated as zero (FFT round-off)
const ACF_EPSILON: f64 = 1e-9;

/// Estimate the dominant period of a signal, in seconds
///
/// # Arguments
///
/// * `signal` - Per-frame values (e.g. a fused beat score)
/// * `fps` - Frame rate
///
/// # Returns
///
/// `Some(lag / fps)` for the strongest autocorrelation lag ≥ 2, or `None` if
/// the signal has fewer than [`MIN_PERIOD_SAMPLES`] samples, `fps` is not
/// positive, or no lag ≥ 2 has positive correlation. Values at or below
/// `1e-9` count as no correlation.
///
/// # Example
///
/// ```
/// use stratum_motion::signal::estimate_period_from_autocorr;
///
/// let signal: Vec<f64> = (0..300)
///     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 15.0).cos())
///     .collect();
/// let period = estimate_period_from_autocorr(&signal, 30.0).unwrap();
/// assert!((period - 0.5).abs() < 1e-9);
/// ```
pub fn estimate_period_from_autocorr(signal: &[f64], fps: f64) -> Option<f64> {
    if signal.len() < MIN_PERIOD_SAMPLES || !(fps > 0.0) {
        return None;
    }

    let n = signal.len() as f64;
    let mean = signal.iter().sum::<f64>() / n;
    let std = (signal.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n).sqrt();
    let normalized: Vec<f64> = signal
        .iter()
        .map(|x| (x - mean) / (std + STD_EPSILON))
        .collect();

    let mut acf = autocorrelation(&normalized);
    for v in acf.iter_mut().take(2) {
        *v = 0.0;
    }

    let lag = super::argmax(&acf)?;
    if lag == 0 || !(acf[lag] > ACF_EPSILON) {
        log::debug!("No usable autocorrelation peak in {} samples", signal.len());
        return None;
    }

    let period = lag as f64 / fps;
    log::debug!(
        "Autocorrelation period: lag {} frames ({:.3}s at {:.1} fps)",
        lag,
        period,
        fps
    );
    Some(period)
}

/// Linear (non-circular) autocorrelation for lags `0..len`
///
/// `acf[k] = Σ x[i] · x[i + k]`
pub fn autocorrelation(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    // Zero-pad to at least 2n so the circular correlation does not wrap
    let fft_size = (2 * n).next_power_of_two();
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    for x in &mut buffer {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / fft_size as f64;
    buffer[..n].iter().map(|x| x.re * scale).collect()
}
