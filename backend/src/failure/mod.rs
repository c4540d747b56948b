//! Failure-process sampling
//!
//! Turns a daily failure rate into a concrete sequence of failure dates over
//! the mission. A single exponential draw only gives one random instant, so
//! the sampler runs many independent Poisson trials, keeps the ones whose
//! event count sits inside a percentile band of all trial counts, and picks
//! one of the survivors uniformly. The result is a "typical" realization:
//! neither a degenerate zero-event trial nor a high-count outlier.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use om_simulator_core_rs::failure::{FailureProcessSampler, SamplerConfig};
//! use om_simulator_core_rs::RngManager;
//!
//! let mut rng = RngManager::new(42);
//! let sampler = FailureProcessSampler::new(SamplerConfig::default());
//! let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
//!
//! let dates: Vec<_> = sampler.sample(start, 365, 2.0 / 365.0, &mut rng).collect();
//! assert!(dates.iter().all(|d| d.date() <= NaiveDate::from_ymd_opt(2016, 12, 31).unwrap()));
//! ```

use crate::rng::RngManager;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// Tunable constants of the percentile-filtered Monte-Carlo scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Independent trial simulations per sample
    pub trials: usize,

    /// Lower percentile of the trial-count band (inclusive)
    pub lower_percentile: f64,

    /// Upper percentile of the trial-count band (inclusive)
    pub upper_percentile: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            trials: 2000,
            lower_percentile: 40.0,
            upper_percentile: 70.0,
        }
    }
}

/// Count band a trial must fall into to be eligible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountBand {
    pub lower: f64,
    pub upper: f64,
}

impl CountBand {
    pub fn contains(&self, count: usize) -> bool {
        let c = count as f64;
        c >= self.lower && c <= self.upper
    }
}

/// Generator of failure timestamps for one component failure mode.
#[derive(Debug, Clone, Default)]
pub struct FailureProcessSampler {
    config: SamplerConfig,
}

impl FailureProcessSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample failure dates in `[start, start + mission_days]`.
    ///
    /// Non-positive rates, non-positive mission lengths and an empty
    /// percentile band all yield an empty sequence.
    pub fn sample(
        &self,
        start: NaiveDate,
        mission_days: i64,
        daily_rate: f64,
        rng: &mut RngManager,
    ) -> FailureTimes {
        let origin = start.and_time(NaiveTime::MIN);
        if mission_days <= 0 || !(daily_rate > 0.0) || !daily_rate.is_finite() || self.config.trials == 0 {
            return FailureTimes::empty(origin, mission_days);
        }

        let horizon = mission_days as f64;
        let trials: Vec<Vec<f64>> = (0..self.config.trials)
            .map(|_| run_trial(horizon, daily_rate, rng))
            .collect();

        let counts: Vec<usize> = trials.iter().map(|t| t.len()).collect();
        let band = self.band(&counts);

        let mut survivors: Vec<Vec<f64>> = trials
            .into_iter()
            .filter(|t| band.contains(t.len()))
            .collect();

        if survivors.is_empty() {
            return FailureTimes::empty(origin, mission_days);
        }

        let pick = rng.range(0, survivors.len());
        let gaps = survivors.swap_remove(pick);
        FailureTimes::new(origin, mission_days, gaps)
    }

    /// Event counts of `trials` independent trials, without filtering.
    pub fn trial_counts(&self, mission_days: i64, daily_rate: f64, rng: &mut RngManager) -> Vec<usize> {
        if mission_days <= 0 || !(daily_rate > 0.0) {
            return vec![0; self.config.trials];
        }
        (0..self.config.trials)
            .map(|_| run_trial(mission_days as f64, daily_rate, rng).len())
            .collect()
    }

    /// Percentile band of the given trial counts.
    pub fn band(&self, counts: &[usize]) -> CountBand {
        let mut sorted: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        CountBand {
            lower: percentile(&sorted, self.config.lower_percentile),
            upper: percentile(&sorted, self.config.upper_percentile),
        }
    }
}

/// Exponential inter-arrival gaps whose cumulative sum stays within the
/// horizon; the final gap that overshoots is dropped.
fn run_trial(horizon: f64, rate: f64, rng: &mut RngManager) -> Vec<f64> {
    let mut gaps = Vec::new();
    let mut elapsed = 0.0;
    loop {
        let gap = rng.exponential(rate);
        elapsed += gap;
        if elapsed > horizon {
            break;
        }
        gaps.push(gap);
    }
    gaps
}

/// Linear-interpolated percentile over sorted data (`q` in percent).
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let q = q.clamp(0.0, 100.0) / 100.0;
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Lazy, finite, non-restartable sequence of failure timestamps.
///
/// Each gap is rounded to whole days and accumulated; iteration stops at the
/// first timestamp beyond the mission end.
#[derive(Debug)]
pub struct FailureTimes {
    origin: NaiveDateTime,
    mission_days: i64,
    elapsed_days: i64,
    gaps: std::vec::IntoIter<f64>,
    finished: bool,
}

impl FailureTimes {
    fn new(origin: NaiveDateTime, mission_days: i64, gaps: Vec<f64>) -> Self {
        Self {
            origin,
            mission_days,
            elapsed_days: 0,
            gaps: gaps.into_iter(),
            finished: false,
        }
    }

    fn empty(origin: NaiveDateTime, mission_days: i64) -> Self {
        Self::new(origin, mission_days, Vec::new())
    }
}

impl Iterator for FailureTimes {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.gaps.next() {
            Some(gap) => {
                self.elapsed_days += gap.round() as i64;
                if self.elapsed_days > self.mission_days {
                    self.finished = true;
                    return None;
                }
                Some(self.origin + Duration::days(self.elapsed_days))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, Some(self.gaps.len()))
        }
    }
}

impl FusedIterator for FailureTimes {}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let data = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&data, 0.0), 0.0);
        assert_eq!(percentile(&data, 100.0), 4.0);
        assert!((percentile(&data, 40.0) - 1.6).abs() < 1e-12);
        assert!((percentile(&data, 70.0) - 2.8).abs() < 1e-12);
    }

    #[test]
    fn test_zero_rate_yields_empty_sequence() {
        let mut rng = RngManager::new(1);
        let sampler = FailureProcessSampler::default();
        assert_eq!(sampler.sample(start(), 365, 0.0, &mut rng).count(), 0);
        assert_eq!(sampler.sample(start(), 365, -1.0, &mut rng).count(), 0);
    }

    #[test]
    fn test_zero_mission_yields_empty_sequence() {
        let mut rng = RngManager::new(1);
        let sampler = FailureProcessSampler::default();
        assert_eq!(sampler.sample(start(), 0, 0.1, &mut rng).count(), 0);
    }

    #[test]
    fn test_timestamps_are_ordered() {
        let mut rng = RngManager::new(77);
        let sampler = FailureProcessSampler::default();
        let dates: Vec<_> = sampler.sample(start(), 3650, 0.01, &mut rng).collect();
        assert!(!dates.is_empty());
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_sequence_is_fused() {
        let mut rng = RngManager::new(3);
        let sampler = FailureProcessSampler::default();
        let mut times = sampler.sample(start(), 30, 0.2, &mut rng);
        while times.next().is_some() {}
        assert!(times.next().is_none());
        assert!(times.next().is_none());
    }

    #[test]
    fn test_band_contains_inclusive_edges() {
        let band = CountBand { lower: 2.0, upper: 4.0 };
        assert!(band.contains(2));
        assert!(band.contains(4));
        assert!(!band.contains(1));
        assert!(!band.contains(5));
    }
}
