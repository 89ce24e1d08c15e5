//! Aggregation of request results into summary statistics.
//!
//! Everything here is a pure function of its input collection: repeated
//! invocation over the same results yields identical values, and a run with
//! 100% failures still produces a valid all-zero summary.

use crate::http::RequestResult;
use anyhow::Result;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reduction of one result collection.
///
/// Response-time statistics cover successful requests only and are zero when
/// there are none. The wall-clock span is the spread of completion
/// timestamps across all results, successes and failures alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestSummary {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub success_rate: f64,
    pub mean_response_time: Duration,
    pub min_response_time: Duration,
    pub max_response_time: Duration,
    pub wall_clock_span: Duration,
}

/// Reduce a result collection into a [`LoadTestSummary`].
pub fn summarize(results: &[RequestResult]) -> LoadTestSummary {
    let total_requests = results.len();
    let response_times: Vec<Duration> = results
        .iter()
        .filter(|r| r.success)
        .map(|r| r.timing.total)
        .collect();
    let successful_requests = response_times.len();
    let failed_requests = total_requests - successful_requests;

    let success_rate = if total_requests == 0 {
        0.0
    } else {
        successful_requests as f64 / total_requests as f64
    };

    let mean_response_time = if successful_requests == 0 {
        Duration::ZERO
    } else {
        response_times.iter().sum::<Duration>() / successful_requests as u32
    };

    LoadTestSummary {
        total_requests,
        successful_requests,
        failed_requests,
        success_rate,
        mean_response_time,
        min_response_time: response_times.iter().min().copied().unwrap_or_default(),
        max_response_time: response_times.iter().max().copied().unwrap_or_default(),
        wall_clock_span: wall_clock_span(results),
    }
}

/// Successful requests per second over a run's wall-clock duration.
pub fn throughput(summary: &LoadTestSummary, duration: Duration) -> f64 {
    if duration.is_zero() {
        0.0
    } else {
        summary.successful_requests as f64 / duration.as_secs_f64()
    }
}

fn wall_clock_span(results: &[RequestResult]) -> Duration {
    let first = results.iter().map(|r| r.completed_at).min();
    let last = results.iter().map(|r| r.completed_at).max();
    match (first, last) {
        (Some(first), Some(last)) => (last - first).to_std().unwrap_or_default(),
        _ => Duration::ZERO,
    }
}

/// One percentile of the response-time distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: Duration,
}

/// Response-time distribution over the successful requests of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyDistribution {
    pub samples: usize,
    pub percentiles: Vec<PercentileValue>,
}

/// Compute the requested percentiles of successful response times.
///
/// Uses an HDR histogram with nanosecond values and three significant
/// figures, so the percentile resolution does not depend on sample count.
pub fn distribution(results: &[RequestResult], percentiles: &[f64]) -> Result<LatencyDistribution> {
    let mut histogram = Histogram::<u64>::new(3)?;
    let mut samples = 0;
    for result in results.iter().filter(|r| r.success) {
        let nanos = result.timing.total.as_nanos() as u64;
        histogram.record(nanos.max(1))?;
        samples += 1;
    }

    let percentiles = percentiles
        .iter()
        .map(|&p| PercentileValue {
            percentile: p,
            value: if samples == 0 {
                Duration::ZERO
            } else {
                Duration::from_nanos(histogram.value_at_percentile(p))
            },
        })
        .collect();

    Ok(LatencyDistribution {
        samples,
        percentiles,
    })
}

/// Statistics across the repeats of one scenario.
///
/// Response-time figures average each repeat's mean, mirroring how the run
/// summaries themselves are compared; the standard deviation is the sample
/// deviation and zero for fewer than two repeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatStats {
    pub iterations: usize,
    pub success_rate_mean: f64,
    pub success_rate_std_dev: f64,
    pub success_rate_min: f64,
    pub success_rate_max: f64,
    pub response_time_mean: Duration,
    pub response_time_std_dev: Duration,
}

/// Aggregate the summaries of a scenario's statistical repeats.
pub fn aggregate_repeats(summaries: &[LoadTestSummary]) -> RepeatStats {
    let iterations = summaries.len();
    let rates: Vec<f64> = summaries.iter().map(|s| s.success_rate).collect();
    let times: Vec<f64> = summaries
        .iter()
        .map(|s| s.mean_response_time.as_secs_f64())
        .collect();

    let (rate_min, rate_max) = if rates.is_empty() {
        (0.0, 0.0)
    } else {
        (
            rates.iter().copied().fold(f64::INFINITY, f64::min),
            rates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    RepeatStats {
        iterations,
        success_rate_mean: mean(&rates),
        success_rate_std_dev: std_dev(&rates),
        success_rate_min: rate_min,
        success_rate_max: rate_max,
        response_time_mean: Duration::from_secs_f64(mean(&times)),
        response_time_std_dev: Duration::from_secs_f64(std_dev(&times)),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
