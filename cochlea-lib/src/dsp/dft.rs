// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Discrete Fourier Transform
//!
//! The magnitude spectrum of the current interval, and the window functions that shape it.
//!
//! The cascade table has one bin per Hz, so the spectrum must too.  A transform of exactly
//! `sample_rate` samples gives that resolution no matter how short an interval the source hands
//! out.  Short intervals are tiled end to end until they fill one second.

use std::f64::consts::{PI as PI64, TAU as TAU64};
use std::sync::Arc;

use num_complex::Complex64;
use num_traits::Zero;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::CochleaError;

/// ## Window Choice
///
/// Tiling a short interval repeats it, and where the copies meet there is usually a jump.  Every
/// jump sprays energy across the whole spectrum, and the cascade, being a long chain of gains,
/// happily amplifies whatever arrives at its resonances.  A window tapers the edges of the one
/// second block so the jumps at its own ends are quiet.  It does nothing about the seams inside
/// the block, which only disappear when the interval holds a whole number of periods.
///
/// With no window the block is used as is.  That is the sharpest choice for steady tones that fit
/// the interval exactly, and the loudest for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowFunction {
    /// Rectangle.  Identical to no window at all, -13.3dB first side lobe.
    BoxCar,
    /// Parabolic.  High weights right up to the edges, -21.3dB.
    Welch,
    /// Triangle.  -26.5dB and nothing to tune.
    Bartlett,
    /// Cancels the first side lobe to -42.7dB but never reaches zero at the edges.
    Hamming,
    /// Raised cosine.  Side lobes start at -31.5dB and keep falling, and the edges are true zeros,
    /// which is what a tiled block needs.
    Hann,
}

impl WindowFunction {
    pub fn make_window(&self, size: usize) -> Vec<f64> {
        match self {
            Self::BoxCar => bin_weights(&boxcar, size),
            Self::Bartlett => bin_weights(&bartlett, size),
            Self::Welch => bin_weights(&welch, size),
            Self::Hamming => bin_weights(&hamming, size),
            Self::Hann => bin_weights(&hann, size),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BoxCar => "box-car",
            Self::Welch => "welch",
            Self::Bartlett => "bartlett",
            Self::Hamming => "hamming",
            Self::Hann => "hann",
        }
    }
}

impl std::str::FromStr for WindowFunction {
    type Err = CochleaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box-car" => Ok(Self::BoxCar),
            "welch" => Ok(Self::Welch),
            "bartlett" => Ok(Self::Bartlett),
            "hamming" => Ok(Self::Hamming),
            "hann" => Ok(Self::Hann),
            other => Err(CochleaError::InvalidParameter(format!(
                "unknown window function {other}"
            ))),
        }
    }
}

fn boxcar(_x: f64) -> f64 {
    1.0
}

fn welch(x: f64) -> f64 {
    let t = 2.0 * x - 1.0;
    1.0 - t * t
}

fn bartlett(x: f64) -> f64 {
    if x < 0.5 { 2.0 * x } else { 2.0 - (2.0 * x) }
}

fn hamming(x: f64) -> f64 {
    const A0: f64 = 25.0 / 46.0;
    A0 - (1.0 - A0) * (2.0 * PI64 * x).cos()
}

fn hann(x: f64) -> f64 {
    0.5 - 0.5 * (TAU64 * x).cos()
}

/// Integrates discrete bin weights given a window_fn.  Windows are rescaled so that their largest
/// weight is exactly 1.0.
pub fn bin_weights(window_fn: &impl Fn(f64) -> f64, bins: usize) -> Vec<f64> {
    // Long windows converge with far fewer samples per bin.
    let samples_per_bin = (65_536 / bins.max(1)).clamp(4, 512);
    let mut weights = Vec::with_capacity(bins);
    for bin in 0..bins {
        let bin_start = bin as f64 / bins as f64;
        let bin_end = (bin + 1) as f64 / bins as f64;
        let step = (bin_end - bin_start) / samples_per_bin as f64;
        let sum: f64 = (0..samples_per_bin)
            .map(|s| window_fn(bin_start + (s as f64 + 0.5) * step))
            .sum();
        weights.push(sum / samples_per_bin as f64);
    }
    if !weights.iter().any(|x| *x == 1.0) {
        let max = weights.iter().fold(0.0f64, |max, x| max.max(*x));
        if max > 0.0 {
            let norm = 1.0 / max;
            weights.iter_mut().for_each(|x| *x *= norm);
        }
    }
    weights
}

/// Magnitude spectrum of one second of audio, one bin per Hz.
pub struct AmplitudeExtractor {
    sample_rate: usize,
    window: Option<Vec<f64>>,
    fft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl AmplitudeExtractor {
    pub fn new(sample_rate: u32, window: Option<WindowFunction>) -> Result<Self, CochleaError> {
        if sample_rate == 0 {
            return Err(CochleaError::InvalidParameter(
                "sample rate must be positive".to_owned(),
            ));
        }
        let n = sample_rate as usize;
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        let scratch = vec![Complex64::zero(); fft.get_inplace_scratch_len()];
        Ok(AmplitudeExtractor {
            sample_rate: n,
            window: window.map(|w| w.make_window(n)),
            fft,
            buffer: vec![Complex64::zero(); n],
            scratch,
        })
    }

    /// Number of bins returned by `amplitudes`.  The half bin of odd rates is dropped.
    pub fn bins(&self) -> usize {
        self.sample_rate / 2
    }

    pub fn amplitudes(&mut self, interval: &[f32]) -> Result<Vec<f64>, CochleaError> {
        if interval.is_empty() {
            return Err(CochleaError::InvalidParameter(
                "cannot take the spectrum of an empty interval".to_owned(),
            ));
        }
        let len = interval.len();
        match &self.window {
            Some(window) => {
                for (i, (b, w)) in self.buffer.iter_mut().zip(window).enumerate() {
                    *b = Complex64::new(interval[i % len] as f64 * w, 0.0);
                }
            }
            None => {
                for (i, b) in self.buffer.iter_mut().enumerate() {
                    *b = Complex64::new(interval[i % len] as f64, 0.0);
                }
            }
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        Ok(self.buffer[..self.bins()].iter().map(|c| c.norm()).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dsp::sine_gen;

    fn peak(amps: &[f64]) -> usize {
        amps.iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, a)| if *a > best.1 { (i, *a) } else { best })
            .0
    }

    #[test]
    fn test_window_shapes() {
        for w in [
            WindowFunction::BoxCar,
            WindowFunction::Welch,
            WindowFunction::Bartlett,
            WindowFunction::Hamming,
            WindowFunction::Hann,
        ] {
            let weights = w.make_window(64);
            assert_eq!(weights.len(), 64);
            let max = weights.iter().cloned().fold(0.0, f64::max);
            assert!((max - 1.0).abs() < 1e-12, "{w:?}");
            // symmetric
            for i in 0..32 {
                assert!((weights[i] - weights[63 - i]).abs() < 1e-9, "{w:?} {i}");
            }
            assert_eq!(w.name().parse::<WindowFunction>().unwrap(), w);
        }
        assert!(WindowFunction::Hann.make_window(64)[0] < 0.01);
        assert!("chebyshev".parse::<WindowFunction>().is_err());
    }

    #[test]
    fn test_amplitudes_peak_at_tone() {
        let mut extractor = AmplitudeExtractor::new(16_000, None).unwrap();
        assert_eq!(extractor.bins(), 8000);
        let interval: Vec<f32> = sine_gen(440.0, 16_000.0).take(1600).collect();
        let amps = extractor.amplitudes(&interval).unwrap();
        assert_eq!(amps.len(), 8000);
        assert_eq!(peak(&amps), 440);
        // A unit sine over n samples has magnitude n / 2 in its bin.
        assert!((amps[440] - 8000.0).abs() < 1.0, "{}", amps[440]);
    }

    #[test]
    fn test_amplitudes_windowed() {
        let mut extractor = AmplitudeExtractor::new(16_000, Some(WindowFunction::Hann)).unwrap();
        let interval: Vec<f32> = sine_gen(1000.0, 16_000.0).take(800).collect();
        let amps = extractor.amplitudes(&interval).unwrap();
        assert_eq!(peak(&amps), 1000);
        assert!(amps[1100] < amps[1000] * 1e-3);
    }

    #[test]
    fn test_amplitudes_odd_rate() {
        let extractor = AmplitudeExtractor::new(11_025, None).unwrap();
        assert_eq!(extractor.bins(), 5512);
    }

    #[test]
    fn test_amplitudes_rejects_empty() {
        assert!(AmplitudeExtractor::new(0, None).is_err());
        let mut extractor = AmplitudeExtractor::new(8_000, None).unwrap();
        match extractor.amplitudes(&[]) {
            Err(CochleaError::InvalidParameter(_)) => {}
            other => panic!("{other:?}"),
        }
    }
}
