// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Cochleogram
//!
//! The response of the membrane over time.  Each step pushes the newest column of channel
//! energies in at the left and drops the oldest at the right, so reading a row from left to right
//! goes back in time.
//!
//! The state is a value owned by the caller and lent to every step, so a failed step leaves the
//! history readable.  It has no size until the first column arrives, and afterwards its size
//! never changes.

use cochlea_slide::{Slide, SlideError};

use crate::{CochleaError, Sheet};

#[derive(Debug, Clone, Default)]
pub enum CochleogramState {
    #[default]
    Uninitialized,
    Running(Slide<f64>),
}

impl CochleogramState {
    /// Insert `column` as the newest of `history` columns.  The first push allocates a zeroed
    /// history.  A rejected push leaves the state as it was.
    pub fn push(&mut self, column: &[f64], history: usize) -> Result<(), CochleaError> {
        self.check(column.len(), history)?;
        match self {
            CochleogramState::Running(slide) => {
                slide.push(column).map_err(|e| mismatch(e, history))
            }
            CochleogramState::Uninitialized => {
                log::debug!(
                    "allocating a cochleogram of {} channels by {history} steps",
                    column.len()
                );
                let mut slide = Slide::new(column.len(), history);
                slide.push(column).map_err(|e| mismatch(e, history))?;
                *self = CochleogramState::Running(slide);
                Ok(())
            }
        }
    }

    /// Would a column of `channels` fit a history of `history` steps?  Anything fits before the
    /// first push.
    pub fn check(&self, channels: usize, history: usize) -> Result<(), CochleaError> {
        match self.shape() {
            Some(expected) if expected != (channels, history) => {
                Err(CochleaError::HistoryMismatch {
                    expected,
                    found: (channels, history),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, CochleogramState::Running(_))
    }

    /// `(channels, history)`, or `None` before the first push.
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            CochleogramState::Uninitialized => None,
            CochleogramState::Running(slide) => Some((slide.height(), slide.width())),
        }
    }

    /// Energy of `channel`, `age` steps ago.
    pub fn get(&self, channel: usize, age: usize) -> Option<f64> {
        match self {
            CochleogramState::Uninitialized => None,
            CochleogramState::Running(slide) => slide.get(channel, age),
        }
    }

    /// Rows are channels, columns run from newest to oldest.
    pub fn to_sheet(&self) -> Sheet {
        match self {
            CochleogramState::Uninitialized => Sheet::zeros(0, 0),
            CochleogramState::Running(slide) => {
                Sheet::from_columns(slide.height(), slide.width(), slide.as_slice())
            }
        }
    }
}

fn mismatch(e: SlideError, history: usize) -> CochleaError {
    let SlideError::Height { expected, found } = e;
    CochleaError::HistoryMismatch {
        expected: (expected, history),
        found: (found, history),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cochleogram_reverse_chronological() {
        let mut state = CochleogramState::default();
        assert!(!state.is_running());
        assert_eq!(state.shape(), None);
        for step in 1..=4 {
            let v = step as f64;
            state.push(&[v, 10.0 * v], 4).unwrap();
        }
        assert_eq!(state.shape(), Some((2, 4)));
        let sheet = state.to_sheet();
        assert_eq!(sheet.row(0).unwrap(), &[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(sheet.row(1).unwrap(), &[40.0, 30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_cochleogram_starts_zeroed() {
        let mut state = CochleogramState::default();
        state.push(&[1.0, 2.0, 3.0], 3).unwrap();
        assert!(state.is_running());
        assert_eq!(state.get(2, 0), Some(3.0));
        assert_eq!(state.get(2, 1), Some(0.0));
        assert_eq!(state.get(2, 3), None);
        assert_eq!(state.to_sheet().column(2).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn test_cochleogram_drops_oldest() {
        let mut state = CochleogramState::default();
        for step in 0..10 {
            state.push(&[step as f64], 3).unwrap();
        }
        assert_eq!(state.to_sheet().row(0).unwrap(), &[9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_cochleogram_never_reshapes() {
        let mut state = CochleogramState::default();
        state.push(&[1.0, 2.0], 5).unwrap();
        match state.push(&[1.0, 2.0], 6) {
            Err(CochleaError::HistoryMismatch { expected, found }) => {
                assert_eq!(expected, (2, 5));
                assert_eq!(found, (2, 6));
            }
            other => panic!("{other:?}"),
        }
        match state.push(&[1.0, 2.0, 3.0], 5) {
            Err(CochleaError::HistoryMismatch { expected, found }) => {
                assert_eq!(expected, (2, 5));
                assert_eq!(found, (3, 5));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_cochleogram_survives_rejected_push() {
        let mut state = CochleogramState::default();
        state.push(&[1.0, 2.0], 3).unwrap();
        state.push(&[3.0, 4.0], 3).unwrap();
        assert!(state.push(&[5.0], 3).is_err());
        assert!(state.push(&[5.0, 6.0], 4).is_err());
        assert_eq!(state.shape(), Some((2, 3)));
        assert_eq!(state.to_sheet().row(1).unwrap(), &[4.0, 2.0, 0.0]);
    }
}
