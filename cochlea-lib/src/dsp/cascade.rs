// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Cochlear Cascade
//!
//! The response table of the whole membrane.  Row `k` is what a listener at channel `k` hears: the
//! product of every section from the base down to `k`.
//!
//! The first stage is the odd one out.  Before the first resonance, sound passes the outer and
//! middle ear, modelled as a first order pre-emphasis, and a compensator that pulls the very top
//! of the band back down.  Those two and the first pole pair make stage 0.  Every later stage is
//! one zero pair over one pole pair, normalized at DC so that the low frequency tail of the
//! cascade neither grows nor decays from channel to channel.
//!
//! Values are kept complex.  Decibels are only for looking at.

use num_complex::Complex64;

use crate::CochleaError;
use crate::dsp::filter::{self, Coefficients, Stage};
use crate::dsp::plan::{ChannelPlan, EAR_PREEMPHASIS_CORNER};
use crate::dsp::spectrogram::to_decibels;

#[derive(Debug, Clone)]
pub struct CochlearCascade {
    sample_rate: u32,
    /// Sections of each channel's own stage.  Stage 0 has three, the rest one.
    stages: Vec<Vec<Stage>>,
    /// `[channel][bin]`, where bin `i` is `i` Hz.
    responses: Vec<Vec<Complex64>>,
}

impl CochlearCascade {
    pub fn build(plan: &ChannelPlan) -> Result<Self, CochleaError> {
        if plan.is_empty() {
            return Err(CochleaError::InvalidParameter(
                "a cascade needs at least one channel".to_owned(),
            ));
        }
        let sample_rate = plan.args().sample_rate;
        let fs = sample_rate as f64;
        let quarter = fs / 4.0;
        let channels = plan.channels();

        let outer_ear = Stage::new(
            filter::first_order_from_corner(EAR_PREEMPHASIS_CORNER, fs),
            Coefficients::IDENTITY,
        )
        .normalized(0.0, 1.0, fs);
        let compensator = Stage::new(
            Coefficients::new(1.0, 0.0, -1.0),
            Coefficients::new(0.0, 0.0, 1.0),
        )
        .normalized(quarter, 1.0, fs);
        let first_pole_pair = Stage::new(
            Coefficients::new(0.0, 0.0, 1.0),
            filter::second_order_from_center_q(channels[0].centre, channels[0].pole_q(), fs)?,
        )
        .normalized(quarter, 1.0, fs);

        let rest = &channels[1..];
        let zero_cfs: Vec<f64> = rest.iter().map(|c| c.zero_frequency).collect();
        let zero_qs: Vec<f64> = rest.iter().map(|c| c.zero_q).collect();
        let pole_cfs: Vec<f64> = rest.iter().map(|c| c.centre).collect();
        let pole_qs: Vec<f64> = rest.iter().map(|c| c.pole_q()).collect();
        let zeros = filter::second_order_bank(&zero_cfs, &zero_qs, fs)?;
        let poles = filter::second_order_bank(&pole_cfs, &pole_qs, fs)?;
        let later = filter::normalize_gains(&zeros, &poles, 0.0, &plan.stage_gains(), fs)?;

        let mut stages = Vec::with_capacity(plan.len());
        stages.push(vec![outer_ear, compensator, first_pole_pair]);
        stages.extend(later.into_iter().map(|s| vec![s]));

        let half = sample_rate as usize / 2;
        let frequencies: Vec<f64> = (0..=half).map(|f| f as f64).collect();

        let mut responses: Vec<Vec<Complex64>> = Vec::with_capacity(stages.len());
        for sections in &stages {
            let mut row: Vec<Complex64> = filter::evaluate(sections, &frequencies, fs)
                .into_iter()
                .map(|at| at.into_iter().product())
                .collect();
            if let Some(previous) = responses.last() {
                row.iter_mut().zip(previous).for_each(|(r, p)| *r *= *p);
            }
            responses.push(row);
        }

        log::debug!(
            "cascade of {} channels over {} bins at {} Hz",
            responses.len(),
            half + 1,
            sample_rate
        );
        Ok(CochlearCascade {
            sample_rate,
            stages,
            responses,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.responses.len()
    }

    /// Bins per row, `0..=sample_rate / 2`.
    pub fn bins(&self) -> usize {
        self.responses.first().map_or(0, |r| r.len())
    }

    pub fn response(&self, channel: usize) -> Option<&[Complex64]> {
        self.responses.get(channel).map(|r| r.as_slice())
    }

    pub fn responses(&self) -> &[Vec<Complex64>] {
        &self.responses
    }

    /// Sections of channel `channel`'s own stage, without the stages before it.
    pub fn stage(&self, channel: usize) -> Option<&[Stage]> {
        self.stages.get(channel).map(|s| s.as_slice())
    }

    /// Cascade response of `channel` at any frequency, including between bins.
    pub fn response_at(&self, channel: usize, frequency: f64) -> Option<Complex64> {
        if channel >= self.stages.len() {
            return None;
        }
        let fs = self.sample_rate as f64;
        let sections: Vec<Stage> = self.stages[..=channel].iter().flatten().copied().collect();
        filter::evaluate(&sections, &[frequency], fs)
            .pop()
            .map(|at| at.into_iter().product())
    }

    /// Row `channel` in decibels, for display.
    pub fn magnitudes_db(&self, channel: usize) -> Option<Vec<f64>> {
        self.response(channel)
            .map(|row| to_decibels(&row.iter().map(|h| h.norm()).collect::<Vec<_>>()))
    }
}
