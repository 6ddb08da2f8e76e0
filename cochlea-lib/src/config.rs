// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model configuration.  Everything here is frozen once a [`crate::model::LyonsModel`] is built;
//! the sample rate comes from the audio source, not from the file.
//!
//! ```toml
//! quality_factor = 8.0
//! stage_overlap_factor = 4.0
//! window = "hann"
//! decibels = false
//!
//! [outer_ear]
//! amplify_from = 1000.0
//! amplify_till = 7000.0
//! amplify_by_percentage = 3.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::CochleaError;
use crate::dsp::dft::WindowFunction;
use crate::dsp::plan::EarArgs;
use crate::dsp::spectrogram::{OuterEar, Pipeline};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Bandwidth of the high frequency channels is `centre / quality_factor`.
    #[serde(default = "ModelConfig::default_quality_factor")]
    pub quality_factor: f64,
    /// Stages overlapping within one bandwidth.
    #[serde(default = "ModelConfig::default_stage_overlap_factor")]
    pub stage_overlap_factor: f64,
    /// Applied to the one second block before the forward transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowFunction>,
    /// Report energies in decibels.
    #[serde(default)]
    pub decibels: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_ear: Option<OuterEar>,
}

impl ModelConfig {
    fn default_quality_factor() -> f64 {
        8.0
    }

    fn default_stage_overlap_factor() -> f64 {
        4.0
    }

    /// Read and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CochleaError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("loaded model configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CochleaError> {
        let config: ModelConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that do not need a sample rate.  The channel count is only known once one arrives.
    pub fn validate(&self) -> Result<(), CochleaError> {
        self.ear_args(1).validate()?;
        if let Some(ear) = &self.outer_ear {
            ear.validate()?;
        }
        Ok(())
    }

    pub fn ear_args(&self, sample_rate: u32) -> EarArgs {
        EarArgs {
            sample_rate,
            quality_factor: self.quality_factor,
            stage_overlap_factor: self.stage_overlap_factor,
        }
    }

    pub fn pipeline(&self) -> Result<Pipeline, CochleaError> {
        Pipeline::new(self.decibels, self.outer_ear)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            quality_factor: Self::default_quality_factor(),
            stage_overlap_factor: Self::default_stage_overlap_factor(),
            window: None,
            decibels: false,
            outer_ear: None,
        }
    }
}
