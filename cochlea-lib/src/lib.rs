// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core cochlear modelling: Lyon's filter cascade and the cochleogram.
//!
//! The engine decomposes a time-domain signal into per-channel energies the way the basilar
//! membrane does, with a cascade of second-order sections whose outputs feed each other.  It is
//! driven once per time step by an enclosing simulation which maps the output column onto a sheet
//! of units, the display grid.
//!
//! The pieces, leaves first:
//!
//! - `dsp::filter`: coefficient algebra and z-transform evaluation.
//! - `dsp::plan`: channel count and centre frequencies.
//! - `dsp::cascade`: the cascade of stage responses over every integer frequency.
//! - `dsp::dft`: window functions and the magnitude spectrum of the current interval.
//! - `dsp::response`: per-channel energy from the cascade and the spectrum.
//! - `cochleogram`: the rolling history of energy columns.
//!
//! `model::LyonsModel` ties them together against an `source::AudioSource`.

#[cfg(feature = "dsp")]
pub mod cochleogram;
#[cfg(feature = "dsp")]
pub mod config;
#[cfg(feature = "dsp")]
pub mod dsp;
#[cfg(feature = "dsp")]
pub mod model;
pub mod source;

#[derive(thiserror::Error, Debug)]
pub enum CochleaError {
    /// The display grid must have exactly one row per cochlear channel.
    #[error(
        "the number of sheet rows must correspond to the number of Lyon filters: adjust the sheet \
         rows from {rows} to {channels}"
    )]
    ConfigurationMismatch { channels: usize, rows: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("reached the end of the time series")]
    StreamExhausted,

    #[error("all audio must share one sample rate: expected {expected} Hz, found {found} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },

    /// A running cochleogram never changes shape.
    #[error("cochleogram is fixed at {expected:?} (channels, history), found {found:?}")]
    HistoryMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// The display grid that consumes the engine output.  Rows are channels, highest frequency
/// first.  Columns are either copies of the current column or the cochleogram history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Grid { rows, cols }
    }
}

/// Dense, row-major output of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Sheet {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Sheet {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Replicate `column` across `cols` columns.
    pub fn from_column(column: &[f64], cols: usize) -> Self {
        let data = column
            .iter()
            .flat_map(|v| std::iter::repeat_n(*v, cols))
            .collect();
        Sheet {
            rows: column.len(),
            cols,
            data,
        }
    }

    /// Build from column-major storage, where each chunk of `rows` values is one column.
    pub fn from_columns(rows: usize, cols: usize, column_major: &[f64]) -> Self {
        let mut sheet = Sheet::zeros(rows, cols);
        if rows == 0 {
            return sheet;
        }
        for (c, column) in column_major.chunks_exact(rows).take(cols).enumerate() {
            for (r, v) in column.iter().enumerate() {
                sheet.data[r * cols + c] = *v;
            }
        }
        sheet
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        Some(&self.data[row * self.cols..(row + 1) * self.cols])
    }

    /// Columns are strided, so this copies.
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        if col >= self.cols {
            return None;
        }
        Some(
            (0..self.rows)
                .map(|r| self.data[r * self.cols + col])
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

pub mod prelude {
    pub use crate::source::{AudioSource, Clip, TimeSeries};
    pub use crate::{CochleaError, Grid, Sheet};

    #[cfg(feature = "dsp")]
    pub use crate::{cochleogram::CochleogramState, config::ModelConfig, model::LyonsModel};
}
