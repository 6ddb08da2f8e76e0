// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Lyon's Model
//!
//! Everything that can be computed ahead of time is computed in [`LyonsModel::new`]: the channel
//! plan, the cascade table, both transform plans and their buffers.  A step then pulls one
//! interval from the source and turns it into one column of channel energies.
//!
//! The model does not own its audio source or its cochleogram.  Both are passed in on every step,
//! so the caller decides how long they live.

use crate::cochleogram::CochleogramState;
use crate::config::ModelConfig;
use crate::dsp::cascade::CochlearCascade;
use crate::dsp::dft::AmplitudeExtractor;
use crate::dsp::plan::ChannelPlan;
use crate::dsp::response::ChannelResponses;
use crate::dsp::spectrogram::Pipeline;
use crate::source::AudioSource;
use crate::{CochleaError, Grid, Sheet};

pub struct LyonsModel {
    config: ModelConfig,
    plan: ChannelPlan,
    centre_frequencies: Vec<f64>,
    cascade: CochlearCascade,
    extractor: AmplitudeExtractor,
    responses: ChannelResponses,
    pipeline: Pipeline,
}

impl LyonsModel {
    pub fn new(config: ModelConfig, sample_rate: u32) -> Result<Self, CochleaError> {
        config.validate()?;
        let plan = ChannelPlan::new(config.ear_args(sample_rate))?;
        let centre_frequencies = plan.centre_frequencies();
        let pipeline = config.pipeline()?;
        if let Some(ear) = &config.outer_ear {
            // Band limits are only checkable against real channels.
            ear.gains(&centre_frequencies)?;
        }
        let cascade = CochlearCascade::build(&plan)?;
        let extractor = AmplitudeExtractor::new(sample_rate, config.window)?;
        let responses = ChannelResponses::new(extractor.bins())?;

        log::info!(
            "Lyon's model at {sample_rate} Hz: {} channels, {:.1} Hz to {:.1} Hz",
            plan.len(),
            centre_frequencies[0],
            centre_frequencies[centre_frequencies.len() - 1]
        );
        Ok(LyonsModel {
            config,
            plan,
            centre_frequencies,
            cascade,
            extractor,
            responses,
            pipeline,
        })
    }

    /// Build for the sample rate of `source`.
    pub fn for_source<S: AudioSource + ?Sized>(
        config: ModelConfig,
        source: &S,
    ) -> Result<Self, CochleaError> {
        Self::new(config, source.sample_rate())
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn plan(&self) -> &ChannelPlan {
        &self.plan
    }

    pub fn cascade(&self) -> &CochlearCascade {
        &self.cascade
    }

    pub fn sample_rate(&self) -> u32 {
        self.cascade.sample_rate()
    }

    pub fn num_channels(&self) -> usize {
        self.plan.len()
    }

    /// Row frequencies of every output, highest first.
    pub fn centre_frequencies(&self) -> &[f64] {
        &self.centre_frequencies
    }

    /// The grid must have one row per channel.
    pub fn check_grid(&self, grid: Grid) -> Result<(), CochleaError> {
        if grid.rows != self.num_channels() {
            return Err(CochleaError::ConfigurationMismatch {
                channels: self.num_channels(),
                rows: grid.rows,
            });
        }
        Ok(())
    }

    /// Pull one interval from `source` and reduce it to one energy per channel.
    pub fn column<S: AudioSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Vec<f64>, CochleaError> {
        if source.sample_rate() != self.sample_rate() {
            return Err(CochleaError::SampleRateMismatch {
                expected: self.sample_rate(),
                found: source.sample_rate(),
            });
        }
        let interval = source.next_interval()?;
        let amplitudes = self.extractor.amplitudes(&interval)?;
        let mut column = self.responses.energies(&self.cascade, &amplitudes)?;
        self.pipeline.apply(&mut column, &self.centre_frequencies)?;
        Ok(column)
    }

    /// One column, replicated across every column of `grid`.
    pub fn step<S: AudioSource + ?Sized>(
        &mut self,
        grid: Grid,
        source: &mut S,
    ) -> Result<Sheet, CochleaError> {
        self.check_grid(grid)?;
        let column = self.column(source)?;
        Ok(Sheet::from_column(&column, grid.cols))
    }

    /// One column, pushed into the history.  The history is as long as `grid` is wide.  Shapes
    /// are checked before any audio is pulled, and on error `state` keeps every earlier column.
    pub fn cochleogram_step<S: AudioSource + ?Sized>(
        &mut self,
        state: &mut CochleogramState,
        grid: Grid,
        source: &mut S,
    ) -> Result<(), CochleaError> {
        self.check_grid(grid)?;
        state.check(grid.rows, grid.cols)?;
        let column = self.column(source)?;
        state.push(&column, grid.cols)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dsp::sine_gen;
    use crate::source::{Clip, TimeSeries};

    fn tone(f0: f64, sample_rate: u32, interval: usize) -> TimeSeries {
        let samples = sine_gen(f0, sample_rate as f64)
            .take(sample_rate as usize)
            .collect();
        TimeSeries::new(Clip::new(sample_rate, samples), interval)
            .unwrap()
            .with_repeat(true)
    }

    #[test]
    fn test_model_grid_mismatch() {
        let mut model = LyonsModel::new(ModelConfig::default(), 16_000).unwrap();
        assert_eq!(model.num_channels(), 86);
        let mut source = tone(1000.0, 16_000, 1600);
        match model.step(Grid::new(80, 1), &mut source) {
            Err(CochleaError::ConfigurationMismatch { channels, rows }) => {
                assert_eq!((channels, rows), (86, 80));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_model_step_replicates() {
        let mut model = LyonsModel::new(ModelConfig::default(), 16_000).unwrap();
        let mut source = tone(1000.0, 16_000, 1600);
        let sheet = model.step(Grid::new(86, 3), &mut source).unwrap();
        assert_eq!(sheet.grid(), Grid::new(86, 3));
        for r in 0..86 {
            let row = sheet.row(r).unwrap();
            assert!(row[0] >= 0.0);
            assert!(row.iter().all(|v| *v == row[0]));
        }
    }

    #[test]
    fn test_model_sample_rate_mismatch() {
        let mut model = LyonsModel::new(ModelConfig::default(), 16_000).unwrap();
        let mut source = tone(1000.0, 8_000, 800);
        match model.column(&mut source) {
            Err(CochleaError::SampleRateMismatch { expected, found }) => {
                assert_eq!((expected, found), (16_000, 8_000));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_model_cochleogram_history() {
        let mut model = LyonsModel::new(ModelConfig::default(), 16_000).unwrap();
        let mut source = tone(2000.0, 16_000, 1600);
        let grid = Grid::new(86, 5);
        let mut state = CochleogramState::default();
        for _ in 0..3 {
            model.cochleogram_step(&mut state, grid, &mut source).unwrap();
        }
        // A steady tone gives the same column each step, and the history is still filling.
        for channel in 0..86 {
            let newest = state.get(channel, 0).unwrap();
            assert!((state.get(channel, 2).unwrap() - newest).abs() <= 1e-6 * (1.0 + newest));
            assert_eq!(state.get(channel, 3), Some(0.0));
        }
        assert!(model.cochleogram_step(&mut state, Grid::new(86, 6), &mut source).is_err());
        assert_eq!(state.shape(), Some((86, 5)));
    }

    #[test]
    fn test_model_history_outlives_exhaustion() {
        let mut model = LyonsModel::new(ModelConfig::default(), 16_000).unwrap();
        let samples = sine_gen(1000.0, 16_000.0).take(3200).collect();
        let mut source = TimeSeries::new(Clip::new(16_000, samples), 1600).unwrap();
        let grid = Grid::new(86, 4);
        let mut state = CochleogramState::default();
        model.cochleogram_step(&mut state, grid, &mut source).unwrap();
        model.cochleogram_step(&mut state, grid, &mut source).unwrap();
        let before = state.to_sheet();

        assert!(matches!(
            model.cochleogram_step(&mut state, grid, &mut source),
            Err(CochleaError::StreamExhausted)
        ));
        assert!(matches!(
            model.cochleogram_step(&mut state, Grid::new(80, 4), &mut source),
            Err(CochleaError::ConfigurationMismatch { .. })
        ));
        let after = state.to_sheet();
        assert_eq!(after, before);
        assert!(after.column(0).unwrap().iter().any(|e| *e > 0.0));
    }

    #[test]
    fn test_model_decibel_pipeline() {
        let linear_config = ModelConfig::default();
        let db_config = ModelConfig {
            decibels: true,
            ..Default::default()
        };
        let mut linear = LyonsModel::new(linear_config, 16_000).unwrap();
        let mut db = LyonsModel::new(db_config, 16_000).unwrap();
        let a = linear.column(&mut tone(500.0, 16_000, 1600)).unwrap();
        let b = db.column(&mut tone(500.0, 16_000, 1600)).unwrap();
        for (lin, dec) in a.iter().zip(&b) {
            let expected = if *lin == 0.0 { 0.0 } else { 20.0 * lin.log10() };
            assert!((dec - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_model_outer_ear_out_of_range() {
        let config = ModelConfig {
            outer_ear: Some(Default::default()),
            ..Default::default()
        };
        // At 8 kHz the top channel is far below 7 kHz.
        assert!(LyonsModel::new(config.clone(), 8_000).is_err());
        assert!(LyonsModel::new(config, 16_000).is_ok());
    }
}
