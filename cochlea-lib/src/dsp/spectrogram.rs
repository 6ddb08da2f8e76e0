// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Spectrogram
//!
//! *What the ear does after the membrane has done its part.*
//!
//! Columns leaving the cascade are linear energies, highest frequency first.  Before they reach a
//! display they may pass a few pure stages: a gentle outer ear boost over a band of rows, and a
//! conversion to decibels.  Each stage validates its own parameters and knows nothing of the
//! others, so a [`Pipeline`] is just the list of stages that were configured.

use serde::{Deserialize, Serialize};

use crate::CochleaError;

/// `20·log10|a|`.  Exact zeros read as 0 dB instead of negative infinity.
pub fn to_decibels(amplitudes: &[f64]) -> Vec<f64> {
    amplitudes
        .iter()
        .map(|a| if *a == 0.0 { 0.0 } else { 20.0 * a.abs().log10() })
        .collect()
}

/// Symmetric Hann taper whose first and last points are zero.  A single point is left at full
/// weight.
pub fn hann_taper(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|n| 0.5 - 0.5 * (std::f64::consts::TAU * n as f64 / denom).cos())
                .collect()
        }
    }
}

fn default_amplify_from() -> f64 {
    1000.0
}

fn default_amplify_till() -> f64 {
    7000.0
}

fn default_amplify_by_percentage() -> f64 {
    3.0
}

/// Boost rows between two frequencies by up to a percentage, peaking in the middle of the band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OuterEar {
    #[serde(default = "default_amplify_from")]
    pub amplify_from: f64,
    #[serde(default = "default_amplify_till")]
    pub amplify_till: f64,
    #[serde(default = "default_amplify_by_percentage")]
    pub amplify_by_percentage: f64,
}

impl Default for OuterEar {
    fn default() -> Self {
        OuterEar {
            amplify_from: default_amplify_from(),
            amplify_till: default_amplify_till(),
            amplify_by_percentage: default_amplify_by_percentage(),
        }
    }
}

impl OuterEar {
    pub fn validate(&self) -> Result<(), CochleaError> {
        let values = [
            self.amplify_from,
            self.amplify_till,
            self.amplify_by_percentage,
        ];
        if values.iter().any(|v| !(*v >= 0.0) || !v.is_finite()) {
            return Err(CochleaError::InvalidParameter(
                "outer ear frequencies and percentage must be non-negative".to_owned(),
            ));
        }
        if self.amplify_from > self.amplify_till {
            return Err(CochleaError::InvalidParameter(format!(
                "outer ear amplifies from {} Hz, which is above {} Hz",
                self.amplify_from, self.amplify_till
            )));
        }
        Ok(())
    }

    /// One multiplier per row.  `row_frequencies` runs from high to low.
    pub fn gains(&self, row_frequencies: &[f64]) -> Result<Vec<f64>, CochleaError> {
        self.validate()?;
        let mut gains = vec![1.0; row_frequencies.len()];
        if self.amplify_by_percentage == 0.0 || row_frequencies.is_empty() {
            return Ok(gains);
        }

        let min = row_frequencies.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = row_frequencies.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let outside = |f: f64| f < min || f > max;
        if outside(self.amplify_from) {
            return Err(CochleaError::InvalidParameter(format!(
                "outer ear lower bound {} Hz is outside {min:.2}..{max:.2} Hz",
                self.amplify_from
            )));
        }
        if outside(self.amplify_till) {
            return Err(CochleaError::InvalidParameter(format!(
                "outer ear upper bound {} Hz is outside {min:.2}..{max:.2} Hz",
                self.amplify_till
            )));
        }

        let inside = |f: &f64| *f >= self.amplify_from && *f <= self.amplify_till;
        let (Some(start), Some(end)) = (
            row_frequencies.iter().position(inside),
            row_frequencies.iter().rposition(inside),
        ) else {
            // The band falls between two rows.
            return Ok(gains);
        };

        let taper = hann_taper(end - start + 1);
        gains[start..=end]
            .iter_mut()
            .zip(taper)
            .for_each(|(g, t)| *g = 1.0 + t * self.amplify_by_percentage / 100.0);
        Ok(gains)
    }
}

/// One pure step applied to a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    OuterEar(OuterEar),
    Decibels,
}

impl Transform {
    pub fn apply(&self, column: &mut [f64], row_frequencies: &[f64]) -> Result<(), CochleaError> {
        match self {
            Transform::OuterEar(ear) => {
                if column.len() != row_frequencies.len() {
                    return Err(CochleaError::InvalidParameter(format!(
                        "{} values for {} row frequencies",
                        column.len(),
                        row_frequencies.len()
                    )));
                }
                let gains = ear.gains(row_frequencies)?;
                column.iter_mut().zip(gains).for_each(|(v, g)| *v *= g);
            }
            Transform::Decibels => {
                let db = to_decibels(column);
                column.copy_from_slice(&db);
            }
        }
        Ok(())
    }
}

/// Configured stages, in order.  Amplification always comes before decibels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Transform>,
}

impl Pipeline {
    pub fn new(decibels: bool, outer_ear: Option<OuterEar>) -> Result<Self, CochleaError> {
        let mut stages = Vec::new();
        if let Some(ear) = outer_ear {
            ear.validate()?;
            stages.push(Transform::OuterEar(ear));
        }
        if decibels {
            stages.push(Transform::Decibels);
        }
        Ok(Pipeline { stages })
    }

    pub fn stages(&self) -> &[Transform] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn apply(&self, column: &mut [f64], row_frequencies: &[f64]) -> Result<(), CochleaError> {
        self.stages
            .iter()
            .try_for_each(|stage| stage.apply(column, row_frequencies))
    }
}
