// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Cochleogram Tests
//!
//! Driving the model end to end, the way an enclosing simulation does.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cochlea_lib::dsp::sine_gen;
use cochlea_lib::prelude::*;

const RATE: u32 = 16_000;
const INTERVAL: usize = 1_600;

fn tone(f0: f64) -> Clip {
    Clip::new(RATE, sine_gen(f0, RATE as f64).take(INTERVAL).collect())
}

fn loudest_centre(model: &LyonsModel, state: &CochleogramState, age: usize) -> f64 {
    let mut best = 0;
    for k in 0..model.num_channels() {
        if state.get(k, age) > state.get(best, age) {
            best = k;
        }
    }
    model.centre_frequencies()[best]
}

#[test]
fn test_cochleogram_follows_queued_tones() {
    let mut source = TimeSeries::new(tone(1000.0), INTERVAL).unwrap();
    source.queue(tone(3000.0));
    let mut model = LyonsModel::for_source(ModelConfig::default(), &source).unwrap();
    let grid = Grid::new(model.num_channels(), 3);

    let mut state = CochleogramState::default();
    for _ in 0..2 {
        model.cochleogram_step(&mut state, grid, &mut source).unwrap();
    }

    // newest first
    let newest = loudest_centre(&model, &state, 0);
    let older = loudest_centre(&model, &state, 1);
    assert!(newest > 2700.0 && newest < 3750.0, "{newest}");
    assert!(older > 900.0 && older < 1250.0, "{older}");
    let sheet = state.to_sheet();
    assert_eq!(sheet.grid(), grid);
    assert!(sheet.column(2).unwrap().iter().all(|e| *e == 0.0));

    assert!(matches!(
        model.cochleogram_step(&mut state, grid, &mut source),
        Err(CochleaError::StreamExhausted)
    ));
    // The history of a finished stream is still there to read.
    assert_eq!(state.to_sheet(), sheet);
    assert_eq!(loudest_centre(&model, &state, 0), newest);
}

#[test]
fn test_noise_energies_are_finite() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let samples = (0..RATE).map(|_| rng.random_range(-1.0f32..1.0)).collect();
    let mut source = TimeSeries::new(Clip::new(RATE, samples), INTERVAL)
        .unwrap()
        .with_repeat(true);
    let config = ModelConfig {
        decibels: true,
        ..Default::default()
    };
    let mut model = LyonsModel::for_source(config, &source).unwrap();
    let grid = Grid::new(model.num_channels(), 2);

    for _ in 0..12 {
        let sheet = model.step(grid, &mut source).unwrap();
        assert!(sheet.as_slice().iter().all(|e| e.is_finite()));
    }
}

#[test]
fn test_noise_energies_are_non_negative() {
    let mut rng = StdRng::seed_from_u64(42);
    let samples = (0..INTERVAL).map(|_| rng.random_range(-0.5f32..0.5)).collect();
    let mut source = TimeSeries::new(Clip::new(RATE, samples), INTERVAL).unwrap();
    let mut model = LyonsModel::for_source(ModelConfig::default(), &source).unwrap();

    let column = model.column(&mut source).unwrap();
    assert_eq!(column.len(), model.num_channels());
    assert!(column.iter().all(|e| *e >= 0.0 && e.is_finite()));
    assert!(column.iter().any(|e| *e > 0.0));
}

#[test]
fn test_sheet_rows_must_match_channels() {
    let mut source = TimeSeries::new(tone(440.0), INTERVAL).unwrap();
    let mut model = LyonsModel::for_source(ModelConfig::default(), &source).unwrap();
    let rows = model.num_channels() + 1;

    let mut state = CochleogramState::default();
    match model.cochleogram_step(&mut state, Grid::new(rows, 4), &mut source) {
        Err(CochleaError::ConfigurationMismatch { channels, rows: found }) => {
            assert_eq!(channels, 86);
            assert_eq!(found, rows);
        }
        other => panic!("{other:?}"),
    }
    // The rejected step neither consumes audio nor sizes the history.
    assert!(!state.is_running());
    assert!(model.step(Grid::new(86, 1), &mut source).is_ok());
}
