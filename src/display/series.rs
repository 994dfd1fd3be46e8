//! Frame-rate series
//!
//! A scrolling window of `(timestamp, fps)` samples. Appends only; once the
//! window is full the oldest sample falls off the front.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Samples kept when no capacity is configured
pub const DEFAULT_SERIES_CAPACITY: usize = 120;

/// One point on the frame-rate chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FpsSample {
    /// Timestamp in milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Frames per second
    pub value: f64,
}

impl FpsSample {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// Aggregate view over the samples currently in the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Bounded, time-indexed frame-rate series
#[derive(Debug, Clone, PartialEq)]
pub struct FpsSeries {
    samples: VecDeque<FpsSample>,
    capacity: usize,
}

impl Default for FpsSeries {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SERIES_CAPACITY)
    }
}

impl FpsSeries {
    /// Create a series that keeps at most `capacity` samples (at least one).
    /// Storage grows with the samples pushed, not with `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::new(),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    ///
    /// Timestamps never go backwards: a sample older than the newest one is
    /// recorded at the newest timestamp.
    pub fn push(&mut self, mut sample: FpsSample) {
        if let Some(last) = self.samples.back() {
            sample.timestamp_ms = sample.timestamp_ms.max(last.timestamp_ms);
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&FpsSample> {
        self.samples.back()
    }

    /// Oldest sample still in the window
    pub fn earliest(&self) -> Option<&FpsSample> {
        self.samples.front()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &FpsSample> + '_ {
        self.samples.iter()
    }

    /// Min, max and average over the window
    pub fn summary(&self) -> Option<SeriesSummary> {
        if self.samples.is_empty() {
            return None;
        }

        let min = self.samples.iter().map(|s| s.value).fold(f64::INFINITY, f64::min);
        let max = self
            .samples
            .iter()
            .map(|s| s.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let average =
            self.samples.iter().map(|s| s.value).sum::<f64>() / self.samples.len() as f64;

        Some(SeriesSummary { min, max, average })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_latest() {
        let mut series = FpsSeries::with_capacity(4);
        assert!(series.is_empty());
        assert!(series.summary().is_none());

        series.push(FpsSample::new(1_000, 60.0));
        series.push(FpsSample::new(1_500, 58.0));

        assert_eq!(series.len(), 2);
        assert_eq!(series.latest(), Some(&FpsSample::new(1_500, 58.0)));
        assert_eq!(series.earliest(), Some(&FpsSample::new(1_000, 60.0)));
    }

    #[test]
    fn test_scrolls_when_full() {
        let mut series = FpsSeries::with_capacity(3);
        for i in 0..5 {
            series.push(FpsSample::new(i * 100, i as f64));
        }

        assert_eq!(series.len(), 3);
        let values: Vec<f64> = series.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let mut series = FpsSeries::with_capacity(8);
        series.push(FpsSample::new(2_000, 60.0));
        series.push(FpsSample::new(1_000, 0.0));

        assert_eq!(series.latest().unwrap().timestamp_ms, 2_000);
        assert_eq!(series.latest().unwrap().value, 0.0);
    }

    #[test]
    fn test_large_capacity_is_not_preallocated() {
        let mut series = FpsSeries::with_capacity(usize::MAX);
        series.push(FpsSample::new(1, 60.0));
        assert_eq!(series.capacity(), usize::MAX);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut series = FpsSeries::with_capacity(0);
        series.push(FpsSample::new(1, 1.0));
        series.push(FpsSample::new(2, 2.0));
        assert_eq!(series.capacity(), 1);
        assert_eq!(series.len(), 1);
        assert_eq!(series.latest().unwrap().value, 2.0);
    }

    #[test]
    fn test_summary() {
        let mut series = FpsSeries::default();
        series.push(FpsSample::new(0, 50.0));
        series.push(FpsSample::new(1, 60.0));
        series.push(FpsSample::new(2, 70.0));

        let summary = series.summary().unwrap();
        assert_eq!(summary.min, 50.0);
        assert_eq!(summary.max, 70.0);
        assert_eq!(summary.average, 60.0);
    }
}
