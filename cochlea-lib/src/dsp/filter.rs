// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Filter Algebra
//!
//! Sections of the cascade are ratios of two polynomials in `z`, each at most second order.  We
//! never run them as recursive filters, we only evaluate them on the unit circle, so the
//! representation is the bare coefficient triple and the evaluation is Horner's rule.
//!
//! Polynomials are stored lowest power first: `[c0, c1, c2]` is `c0 + c1·z + c2·z²`.  With real
//! coefficients the magnitude on the unit circle is the same whether we read the polynomial in `z`
//! or in `z⁻¹`, so the usual pole radius and angle derivations apply unchanged.
//!
//! ## Gain Normalization
//!
//! A section is normalized by scaling its zeros so that its magnitude at a reference frequency
//! equals a desired gain.  When the section has no response at all at the reference, there is
//! nothing to scale and the section collapses to silence.  Likewise a pole polynomial that
//! vanishes on the evaluated grid yields a zero response at that frequency rather than infinity.

use std::f64::consts::{PI as PI64, TAU as TAU64};

use num_complex::{Complex, Complex64};
use num_traits::Zero;

use crate::CochleaError;

/// Coefficients of `c0 + c1·z + c2·z²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients(pub [f64; 3]);

impl Coefficients {
    /// The constant polynomial 1.
    pub const IDENTITY: Self = Coefficients([1.0, 0.0, 0.0]);

    pub const fn new(c0: f64, c1: f64, c2: f64) -> Self {
        Coefficients([c0, c1, c2])
    }

    #[inline]
    pub fn eval(&self, z: Complex64) -> Complex64 {
        let [c0, c1, c2] = self.0;
        (z * c2 + c1) * z + c0
    }

    pub fn scale(&self, k: f64) -> Self {
        let [c0, c1, c2] = self.0;
        Coefficients([c0 * k, c1 * k, c2 * k])
    }
}

/// Zeros over poles.  One section of the cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub zeros: Coefficients,
    pub poles: Coefficients,
}

impl Stage {
    pub fn new(zeros: Coefficients, poles: Coefficients) -> Self {
        Stage { zeros, poles }
    }

    /// Response at a point `z`, normally on the unit circle.
    #[inline]
    pub fn eval(&self, z: Complex64) -> Complex64 {
        let p = self.poles.eval(z);
        if p.is_zero() {
            return Complex::zero();
        }
        self.zeros.eval(z) / p
    }

    /// Response at `frequency` Hz.
    pub fn response(&self, frequency: f64, sample_rate: f64) -> Complex64 {
        self.eval(unit_circle(frequency, sample_rate))
    }

    /// Rescale the zeros so that `|H(reference)| == desired_gain`.
    pub fn normalized(self, reference: f64, desired_gain: f64, sample_rate: f64) -> Self {
        let unit_gain = self.response(reference, sample_rate).norm();
        let scale = if unit_gain == 0.0 || !unit_gain.is_finite() {
            0.0
        } else {
            desired_gain / unit_gain
        };
        Stage {
            zeros: self.zeros.scale(scale),
            poles: self.poles,
        }
    }
}

/// `exp(2πi·f/fs)`
#[inline]
pub fn unit_circle(frequency: f64, sample_rate: f64) -> Complex64 {
    Complex::from_polar(1.0, TAU64 * frequency / sample_rate)
}

/// Single real pole at `exp(-2π·corner/fs)`, expressed as `z - pole`.
pub fn first_order_from_corner(corner: f64, sample_rate: f64) -> Coefficients {
    let pole = (-TAU64 * corner / sample_rate).exp();
    Coefficients::new(-pole, 1.0, 0.0)
}

/// Resonant pole pair at `center` Hz with quality factor `quality`.
///
/// The pole radius is `exp(-π·cf/(fs·q))` and the damped angle is
/// `2π·cf/fs·sqrt(1 - 1/(4q²))`.  Below `q = 0.5` the pair would be overdamped and the angle
/// imaginary, which is rejected.
pub fn second_order_from_center_q(
    center: f64,
    quality: f64,
    sample_rate: f64,
) -> Result<Coefficients, CochleaError> {
    if !(quality >= 0.5) || !quality.is_finite() {
        return Err(CochleaError::InvalidParameter(format!(
            "quality factor {quality} at {center:.2} Hz must be at least 0.5"
        )));
    }
    let ratio = center / sample_rate;
    let rho = (-PI64 * ratio / quality).exp();
    let theta = TAU64 * ratio * (1.0 - 1.0 / (4.0 * quality * quality)).sqrt();
    Ok(Coefficients::new(1.0, -2.0 * rho * theta.cos(), rho * rho))
}

/// Vectorized `second_order_from_center_q` over paired centres and qualities.
pub fn second_order_bank(
    centers: &[f64],
    qualities: &[f64],
    sample_rate: f64,
) -> Result<Vec<Coefficients>, CochleaError> {
    if centers.len() != qualities.len() {
        return Err(CochleaError::InvalidParameter(format!(
            "{} centre frequencies but {} quality factors",
            centers.len(),
            qualities.len()
        )));
    }
    centers
        .iter()
        .zip(qualities.iter())
        .map(|(cf, q)| second_order_from_center_q(*cf, *q, sample_rate))
        .collect()
}

/// Build and normalize one stage per `(zeros, poles, desired_gain)` triple, all against the same
/// reference frequency.
pub fn normalize_gains(
    zeros: &[Coefficients],
    poles: &[Coefficients],
    reference: f64,
    desired_gains: &[f64],
    sample_rate: f64,
) -> Result<Vec<Stage>, CochleaError> {
    if zeros.len() != poles.len() || zeros.len() != desired_gains.len() {
        return Err(CochleaError::InvalidParameter(format!(
            "cannot pair {} zero sets, {} pole sets and {} gains",
            zeros.len(),
            poles.len(),
            desired_gains.len()
        )));
    }
    Ok(zeros
        .iter()
        .zip(poles.iter())
        .zip(desired_gains.iter())
        .map(|((z, p), g)| Stage::new(*z, *p).normalized(reference, *g, sample_rate))
        .collect())
}

/// Evaluate every stage at every frequency.  The result is indexed `[frequency][stage]`.
pub fn evaluate(stages: &[Stage], frequencies: &[f64], sample_rate: f64) -> Vec<Vec<Complex64>> {
    frequencies
        .iter()
        .map(|f| {
            let z = unit_circle(*f, sample_rate);
            stages.iter().map(|s| s.eval(z)).collect()
        })
        .collect()
}
