// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Channel Plan
//!
//! *Where along the membrane do we listen?*
//!
//! Lyon's channels are not spaced on any musical scale.  The spacing follows the bandwidth of the
//! ear itself: above the break frequency the bandwidth is proportional to the centre frequency
//! (constant Q), below it the bandwidth flattens out to `break / Q`.  Each channel sits a fixed
//! fraction of its neighbour's bandwidth below that neighbour, so the spacing is logarithmic at
//! the top and linear at the bottom.
//!
//! The number of channels is the integral of `1 / bandwidth` from the minimum to the maximum
//! frequency, scaled by the overlap.  That integral has a closed form in `f + sqrt(f² + break²)`,
//! which is where the "expanded" frequencies come from.
//!
//! The minimum frequency is the point where a pole pair with this bandwidth would become
//! critically damped (`q = 0.5`).  Nothing below it can be built, so the plan stops above it.
//! The integral is only an estimate of the discrete walk: with few stages per bandwidth the walk
//! can overshoot the minimum before the estimated count is reached.  Those channels are dropped,
//! so [`ChannelPlan::len`] may be smaller than [`EarArgs::num_channels`].

use crate::CochleaError;

/// Below this frequency the ear's bandwidth stops shrinking.
pub const EAR_BREAK_FREQUENCY: f64 = 1000.0;
/// Zeros sit this many step sizes above their poles.
pub const EAR_ZERO_OFFSET: f64 = 1.5;
/// Sharpness of the zero pairs relative to the pole pairs.
pub const EAR_SHARPNESS: f64 = 5.0;
/// Corner frequency of the outer / middle ear pre-emphasis.
pub const EAR_PREEMPHASIS_CORNER: f64 = 300.0;
/// Every channel holds a full response row, so anything beyond this is a configuration mistake.
pub const MAX_CHANNELS: usize = 4096;

/// Frozen inputs of the plan.  Changing any of them means building a new cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarArgs {
    /// Samples per second of the audio the cascade will hear.
    pub sample_rate: u32,
    /// High frequency bandwidth is `centre / quality_factor`.
    pub quality_factor: f64,
    /// How many stages overlap inside one bandwidth.  Larger values mean more, closer channels.
    pub stage_overlap_factor: f64,
}

impl Default for EarArgs {
    fn default() -> Self {
        EarArgs {
            sample_rate: 16_000,
            quality_factor: 8.0,
            stage_overlap_factor: 4.0,
        }
    }
}

impl EarArgs {
    pub fn validate(&self) -> Result<(), CochleaError> {
        if self.sample_rate == 0 {
            return Err(CochleaError::InvalidParameter(
                "sample rate must be positive".to_owned(),
            ));
        }
        if !(self.quality_factor >= 0.5) || !self.quality_factor.is_finite() {
            return Err(CochleaError::InvalidParameter(format!(
                "quality factor {} must be at least 0.5",
                self.quality_factor
            )));
        }
        if !(self.stage_overlap_factor > 0.0) || !self.stage_overlap_factor.is_finite() {
            return Err(CochleaError::InvalidParameter(format!(
                "stage overlap factor {} must be positive",
                self.stage_overlap_factor
            )));
        }
        Ok(())
    }

    pub fn half_rate(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Fraction of a bandwidth between neighbouring channels.
    pub fn step_factor(&self) -> f64 {
        1.0 / self.stage_overlap_factor
    }

    pub fn bandwidth(&self, cf: f64) -> f64 {
        (cf * cf + EAR_BREAK_FREQUENCY * EAR_BREAK_FREQUENCY).sqrt() / self.quality_factor
    }

    /// Highest centre frequency.  Chosen so that the first zero pair lands on Nyquist.
    pub fn max_frequency(&self) -> f64 {
        let half = self.half_rate();
        let step = self.bandwidth(half) * self.step_factor();
        half + step - step * EAR_ZERO_OFFSET
    }

    /// Where the pole pairs would become critically damped.
    pub fn min_frequency(&self) -> f64 {
        let q = self.quality_factor;
        EAR_BREAK_FREQUENCY / (4.0 * q * q - 1.0).sqrt()
    }

    pub fn num_channels(&self) -> Result<usize, CochleaError> {
        self.validate()?;
        let expanded = |f: f64| f + (f * f + EAR_BREAK_FREQUENCY * EAR_BREAK_FREQUENCY).sqrt();
        let span = expanded(self.max_frequency()).ln() - expanded(self.min_frequency()).ln();
        let channels = (self.quality_factor * span / self.step_factor()).floor();
        if !(channels >= 1.0) || !channels.is_finite() {
            return Err(CochleaError::InvalidParameter(format!(
                "no cochlear channel fits between {:.2} Hz and {:.2} Hz with quality factor {}",
                self.min_frequency(),
                self.max_frequency(),
                self.quality_factor
            )));
        }
        if channels > MAX_CHANNELS as f64 {
            return Err(CochleaError::InvalidParameter(format!(
                "{channels} channels at {} Hz with quality factor {} and stage overlap factor {} \
                 exceed the limit of {MAX_CHANNELS}",
                self.sample_rate, self.quality_factor, self.stage_overlap_factor
            )));
        }
        Ok(channels as usize)
    }
}

/// One place on the membrane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    /// Centre frequency, also the pole frequency.
    pub centre: f64,
    pub bandwidth: f64,
    pub zero_frequency: f64,
    pub zero_q: f64,
}

impl Channel {
    /// Quality factor of the pole pair.
    pub fn pole_q(&self) -> f64 {
        self.centre / self.bandwidth
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPlan {
    args: EarArgs,
    channels: Vec<Channel>,
}

impl ChannelPlan {
    pub fn new(args: EarArgs) -> Result<Self, CochleaError> {
        let n = args.num_channels()?;
        let centres = centre_frequencies(&args, n);
        if centres.is_empty() {
            return Err(CochleaError::InvalidParameter(format!(
                "no pole pair at {} Hz with quality factor {} is at least critically damped",
                args.sample_rate, args.quality_factor
            )));
        }
        if centres.len() < n {
            log::debug!(
                "dropped {} channels below {:.2} Hz at {} Hz, quality factor {}, stage overlap \
                 factor {}",
                n - centres.len(),
                args.min_frequency(),
                args.sample_rate,
                args.quality_factor,
                args.stage_overlap_factor
            );
        }

        let step_factor = args.step_factor();
        let channels = centres
            .into_iter()
            .map(|centre| {
                let bandwidth = args.bandwidth(centre);
                let zero_frequency = centre + bandwidth * step_factor * EAR_ZERO_OFFSET;
                Channel {
                    centre,
                    bandwidth,
                    zero_frequency,
                    zero_q: EAR_SHARPNESS * zero_frequency / bandwidth,
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "planned {} channels from {:.1} Hz down to {:.1} Hz",
            channels.len(),
            channels[0].centre,
            channels[channels.len() - 1].centre
        );
        Ok(ChannelPlan { args, channels })
    }

    pub fn args(&self) -> &EarArgs {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn centre_frequencies(&self) -> Vec<f64> {
        self.channels.iter().map(|c| c.centre).collect()
    }

    /// DC gain of stage `k` relative to stage `k - 1`, for `k >= 1`.  The ratio of neighbouring
    /// centre frequencies keeps the low frequency tail of the cascade level.
    pub fn stage_gains(&self) -> Vec<f64> {
        self.channels
            .windows(2)
            .map(|pair| pair[0].centre / pair[1].centre)
            .collect()
    }
}

/// Top-down recursion.  Each centre only depends on its predecessor, so one pass suffices.  The
/// walk ends early where the pole pair would be overdamped.
fn centre_frequencies(args: &EarArgs, n: usize) -> Vec<f64> {
    let step_factor = args.step_factor();
    let mut centres = Vec::with_capacity(n);
    let mut cf = args.max_frequency();
    for _ in 0..n {
        if !(cf / args.bandwidth(cf) >= 0.5) {
            break;
        }
        centres.push(cf);
        cf -= step_factor * args.bandwidth(cf);
    }
    centres
}
