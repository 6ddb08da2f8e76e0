// Copyright 2026 The Cochlea Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Audio Sources
//!
//! The engine pulls one fixed-length interval of mono samples per step.  Where they come from is
//! not its business: decoding files or reading devices happens elsewhere and arrives here as
//! [`Clip`]s.
//!
//! [`TimeSeries`] walks a queue of clips.  When the current clip cannot fill an interval, the
//! remainder, a silent gap and the next clip are joined so that steps continue seamlessly.  When
//! nothing is queued, the last partial interval is padded with silence and either the series
//! rewinds or the following step reports exhaustion.

use std::collections::VecDeque;

use crate::CochleaError;

/// Producer of fixed-length sample windows at a known sample rate.
pub trait AudioSource {
    fn sample_rate(&self) -> u32;

    /// Length of every interval returned by `next_interval`.
    fn samples_per_interval(&self) -> usize;

    fn next_interval(&mut self) -> Result<Vec<f32>, CochleaError>;
}

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl Clip {
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Self {
        Clip {
            sample_rate,
            samples,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[derive(Debug, Clone)]
pub struct TimeSeries {
    sample_rate: u32,
    samples_per_interval: usize,
    /// Samples to advance after each full interval.
    hop: usize,
    gap_seconds: f64,
    repeat: bool,
    series: Vec<f32>,
    next_start: usize,
    queue: VecDeque<Clip>,
}

impl TimeSeries {
    /// Step through `clip` one interval at a time, without overlap.
    pub fn new(clip: Clip, samples_per_interval: usize) -> Result<Self, CochleaError> {
        if clip.sample_rate == 0 {
            return Err(CochleaError::InvalidParameter(
                "sample rate must be positive".to_owned(),
            ));
        }
        if samples_per_interval == 0 {
            return Err(CochleaError::InvalidParameter(
                "samples per interval must be positive".to_owned(),
            ));
        }
        Ok(TimeSeries {
            sample_rate: clip.sample_rate,
            samples_per_interval,
            hop: samples_per_interval,
            gap_seconds: 0.0,
            repeat: false,
            series: clip.samples,
            next_start: 0,
            queue: VecDeque::new(),
        })
    }

    /// Rewind to the start instead of running out.
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Advance by this much time per step.  Shorter than an interval means overlapping intervals.
    pub fn with_seconds_per_iteration(mut self, seconds: f64) -> Result<Self, CochleaError> {
        let hop = (seconds * self.sample_rate as f64) as usize;
        if !seconds.is_finite() || hop == 0 {
            return Err(CochleaError::InvalidParameter(format!(
                "{seconds} seconds per iteration is less than one sample"
            )));
        }
        self.hop = hop;
        Ok(self)
    }

    /// Silence inserted between consecutive clips.
    pub fn with_gap_seconds(mut self, seconds: f64) -> Result<Self, CochleaError> {
        if !(seconds >= 0.0) || !seconds.is_finite() {
            return Err(CochleaError::InvalidParameter(format!(
                "gap between clips of {seconds} seconds must be non-negative"
            )));
        }
        self.gap_seconds = seconds;
        Ok(self)
    }

    /// Play `clip` after everything already queued.  Its sample rate is checked when it is
    /// reached.
    pub fn queue(&mut self, clip: Clip) {
        self.queue.push_back(clip);
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Samples left in the current series, from the next interval start.
    pub fn remaining(&self) -> usize {
        self.series.len().saturating_sub(self.next_start)
    }

    fn gap_samples(&self) -> usize {
        (self.gap_seconds * self.sample_rate as f64) as usize
    }

    fn join_next(&mut self, clip: Clip) -> Result<(), CochleaError> {
        if clip.sample_rate != self.sample_rate {
            return Err(CochleaError::SampleRateMismatch {
                expected: self.sample_rate,
                found: clip.sample_rate,
            });
        }
        let start = self.next_start.min(self.series.len());
        let mut joined = Vec::with_capacity(
            self.series.len() - start + self.gap_samples() + clip.samples.len(),
        );
        joined.extend_from_slice(&self.series[start..]);
        joined.resize(joined.len() + self.gap_samples(), 0.0);
        joined.extend(clip.samples);
        log::debug!(
            "joined next clip, {} samples now in the series",
            joined.len()
        );
        self.series = joined;
        self.next_start = 0;
        Ok(())
    }
}

impl AudioSource for TimeSeries {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn samples_per_interval(&self) -> usize {
        self.samples_per_interval
    }

    fn next_interval(&mut self) -> Result<Vec<f32>, CochleaError> {
        while self.next_start + self.samples_per_interval > self.series.len() {
            match self.queue.pop_front() {
                Some(clip) => self.join_next(clip)?,
                None => break,
            }
        }

        let start = self.next_start;
        let end = start + self.samples_per_interval;
        if end <= self.series.len() {
            self.next_start += self.hop;
            return Ok(self.series[start..end].to_vec());
        }

        if start >= self.series.len() {
            if !self.repeat || self.series.is_empty() {
                return Err(CochleaError::StreamExhausted);
            }
            // Ended exactly on an interval boundary.
            self.next_start = 0;
            return self.next_interval();
        }

        let mut last = self.series[start..].to_vec();
        last.resize(self.samples_per_interval, 0.0);
        if self.repeat {
            self.next_start = 0;
        } else {
            log::warn!("returning the last, zero padded, interval of the time series");
            self.next_start = self.series.len();
        }
        Ok(last)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ramp(sample_rate: u32, n: usize) -> Clip {
        Clip::new(sample_rate, (1..=n).map(|i| i as f32).collect())
    }

    #[test]
    fn test_time_series_steps() {
        let mut ts = TimeSeries::new(ramp(10, 9), 3).unwrap();
        assert_eq!(ts.sample_rate(), 10);
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![4.0, 5.0, 6.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![7.0, 8.0, 9.0]);
        assert!(matches!(
            ts.next_interval(),
            Err(CochleaError::StreamExhausted)
        ));
    }

    #[test]
    fn test_time_series_overlap() {
        let mut ts = TimeSeries::new(ramp(10, 6), 4)
            .unwrap()
            .with_seconds_per_iteration(0.2)
            .unwrap();
        assert_eq!(ts.hop(), 2);
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![3.0, 4.0, 5.0, 6.0]);
        // Two samples remain, padded.
        assert_eq!(ts.next_interval().unwrap(), vec![5.0, 6.0, 0.0, 0.0]);
        assert!(ts.next_interval().is_err());
    }

    #[test]
    fn test_time_series_partial_then_exhausted() {
        let mut ts = TimeSeries::new(ramp(10, 5), 4).unwrap();
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![5.0, 0.0, 0.0, 0.0]);
        assert_eq!(ts.remaining(), 0);
        assert!(matches!(
            ts.next_interval(),
            Err(CochleaError::StreamExhausted)
        ));
    }

    #[test]
    fn test_time_series_repeat() {
        let mut ts = TimeSeries::new(ramp(10, 5), 4).unwrap().with_repeat(true);
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![5.0, 0.0, 0.0, 0.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_time_series_repeat_on_boundary() {
        let mut ts = TimeSeries::new(ramp(10, 4), 2).unwrap().with_repeat(true);
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![3.0, 4.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_time_series_joins_with_gap() {
        let mut ts = TimeSeries::new(ramp(10, 5), 4)
            .unwrap()
            .with_gap_seconds(0.2)
            .unwrap();
        ts.queue(Clip::new(10, vec![-1.0, -2.0, -3.0]));
        assert_eq!(ts.queued(), 1);
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        // remainder, two samples of silence, then the next clip
        assert_eq!(ts.next_interval().unwrap(), vec![5.0, 0.0, 0.0, -1.0]);
        assert_eq!(ts.next_interval().unwrap(), vec![-2.0, -3.0, 0.0, 0.0]);
        assert_eq!(ts.queued(), 0);
    }

    #[test]
    fn test_time_series_joins_short_clips() {
        let mut ts = TimeSeries::new(ramp(10, 1), 4).unwrap();
        ts.queue(Clip::new(10, vec![2.0]));
        ts.queue(Clip::new(10, vec![3.0, 4.0, 5.0]));
        assert_eq!(ts.next_interval().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_time_series_sample_rate_mismatch() {
        let mut ts = TimeSeries::new(ramp(10, 4), 4).unwrap();
        ts.queue(Clip::new(20, vec![0.0; 8]));
        assert!(ts.next_interval().is_ok());
        match ts.next_interval() {
            Err(CochleaError::SampleRateMismatch { expected, found }) => {
                assert_eq!((expected, found), (10, 20));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_time_series_invalid() {
        assert!(TimeSeries::new(ramp(0, 4), 4).is_err());
        assert!(TimeSeries::new(ramp(10, 4), 0).is_err());
        let ts = TimeSeries::new(ramp(10, 4), 2).unwrap();
        assert!(ts.clone().with_seconds_per_iteration(0.01).is_err());
        assert!(ts.with_gap_seconds(-1.0).is_err());
        assert_eq!(ramp(10, 25).duration_seconds(), 2.5);
    }
}
