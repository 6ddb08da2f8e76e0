// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Digital Signal Processing
//!
//! Lyon's model treats the cochlea as a long transmission line.  Each short section of the
//! basilar membrane behaves like a resonant second-order filter, and the wave travelling from the
//! base towards the apex passes through every section before it.  High frequencies are picked up
//! near the base and are gone by the time the wave reaches the apex, where only the low tones
//! remain.
//!
//! ## Frequency Domain, Once
//!
//! We never run the cascade sample by sample.  Every section is linear and time invariant, so the
//! whole cascade is described by its frequency response.  We evaluate each section once, on every
//! integer frequency up to Nyquist, and keep the running product.  Each step then only costs one
//! forward transform of the input and one inverse transform per channel.
//!
//! ## Layout
//!
//! - `filter`: coefficient algebra shared by every section.
//! - `plan`: how many channels, and where they sit.
//! - `cascade`: the response table.
//! - `dft`: window functions and the magnitude spectrum.
//! - `response`: channel energies.
//! - `spectrogram`: auditory post-processing of a column (decibels, outer ear).
//!
//! Calculations are 64bit throughout.  The tables are small and the cascade multiplies many
//! sections together, which is exactly where 32bit rounding accumulates.

use std::f64::consts::TAU as TAU64;

pub mod cascade;
pub mod dft;
pub mod filter;
pub mod plan;
pub mod response;
pub mod spectrogram;

/// Fixed sine wave generator.  Truncates to f32, the sample format of every `AudioSource`.
pub fn sine_gen(f0: f64, fs: f64) -> impl Iterator<Item = f32> {
    SineSweeper::new(f0, fs)
}

/// Recurrent sine oscillator with frequency modulation.  Use to generate test tones and rough
/// chirps for watching channels light up in order.
pub struct SineSweeper {
    re: f64,
    im: f64,
    cos: f64,
    sin: f64,
    fs: f64,
    f0: f64,
}

impl SineSweeper {
    pub fn new(f0: f64, fs: f64) -> Self {
        let omega = TAU64 * f0 / fs;
        Self {
            re: 1.0,
            im: 0.0,
            cos: omega.cos(),
            sin: omega.sin(),
            fs,
            f0,
        }
    }

    /// Update the frequency on the fly.  Phase is continuous.
    pub fn set_frequency(&mut self, f0: f64) {
        let omega = TAU64 * f0 / self.fs;
        self.cos = omega.cos();
        self.sin = omega.sin();
        self.f0 = f0;
    }

    /// Read the current frequency.
    pub fn center(&self) -> f64 {
        self.f0
    }

    /// Collect the next `n` samples.
    pub fn samples(&mut self, n: usize) -> Vec<f32> {
        self.take(n).collect()
    }
}

impl Iterator for SineSweeper {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.im as f32;
        let new_re = self.re * self.cos - self.im * self.sin;
        let new_im = self.re * self.sin + self.im * self.cos;
        // Renormalize so long renders do not drift in amplitude.
        let norm = (new_re * new_re + new_im * new_im).sqrt();
        self.re = new_re / norm;
        self.im = new_im / norm;
        Some(out)
    }
}
