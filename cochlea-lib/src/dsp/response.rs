// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Channel Responses
//!
//! Shaping the spectrum of the interval with each cascade row tells us what every channel would
//! have heard.  Back in the time domain, the mean magnitude of that signal is the channel's energy
//! for this step.
//!
//! The spectrum carries no phase, so the reconstructed signal is not the waveform the channel
//! would actually output.  Only its level is meaningful.

use std::sync::Arc;

use num_complex::Complex64;
use num_traits::Zero;
use rustfft::{Fft, FftPlanner};

use crate::CochleaError;
use crate::dsp::cascade::CochlearCascade;

pub struct ChannelResponses {
    bins: usize,
    ifft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl ChannelResponses {
    /// `bins` is both the spectrum length and the inverse transform length.
    pub fn new(bins: usize) -> Result<Self, CochleaError> {
        if bins == 0 {
            return Err(CochleaError::InvalidParameter(
                "channel responses need at least one bin".to_owned(),
            ));
        }
        let mut planner = FftPlanner::<f64>::new();
        let ifft = planner.plan_fft_inverse(bins);
        let scratch = vec![Complex64::zero(); ifft.get_inplace_scratch_len()];
        Ok(ChannelResponses {
            bins,
            ifft,
            buffer: vec![Complex64::zero(); bins],
            scratch,
        })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// One non-negative energy per channel, highest channel first.
    pub fn energies(
        &mut self,
        cascade: &CochlearCascade,
        amplitudes: &[f64],
    ) -> Result<Vec<f64>, CochleaError> {
        if amplitudes.len() != self.bins {
            return Err(CochleaError::InvalidParameter(format!(
                "expected {} amplitude bins, found {}",
                self.bins,
                amplitudes.len()
            )));
        }
        if cascade.bins() < self.bins {
            return Err(CochleaError::InvalidParameter(format!(
                "cascade covers {} bins, {} needed",
                cascade.bins(),
                self.bins
            )));
        }

        let mut energies = Vec::with_capacity(cascade.num_channels());
        for row in cascade.responses() {
            self.buffer
                .iter_mut()
                .zip(row.iter().zip(amplitudes))
                .for_each(|(b, (h, a))| *b = *h * *a);
            self.ifft
                .process_with_scratch(&mut self.buffer, &mut self.scratch);
            energies.push(energy(&self.buffer));
        }
        Ok(energies)
    }
}

/// Mean magnitude of an unnormalized inverse transform.  rustfft leaves the `1 / n` to us, so it
/// is applied together with the mean.
pub fn energy(time: &[Complex64]) -> f64 {
    if time.is_empty() {
        return 0.0;
    }
    let n = time.len() as f64;
    time.iter().map(|x| x.norm()).sum::<f64>() / (n * n)
}
