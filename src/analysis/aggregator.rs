//! Award statistics.
//!
//! This module computes the descriptive statistics of a record set and
//! the award-amount histogram used by the chart.

use crate::analysis::ranker::{top_recipients, SUMMARY_TOP_N};
use crate::error::AggregationError;
use crate::models::{AwardRecord, Statistics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compute the statistics summary for `records`.
///
/// Fails on an empty set and when no award is positive, since the
/// smallest award would be undefined.
pub fn aggregate(records: &[AwardRecord]) -> Result<Statistics, AggregationError> {
    if records.is_empty() {
        return Err(AggregationError::EmptyInput);
    }

    let mut amounts = Vec::with_capacity(records.len());
    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        amounts.push(record.award_amount);
        *distribution
            .entry(record.contract_award_type.clone())
            .or_default() += 1;
    }

    let min_award = amounts
        .iter()
        .copied()
        .filter(|&a| a > 0.0)
        .fold(None, |min: Option<f64>, a| Some(min.map_or(a, |m| m.min(a))))
        .ok_or(AggregationError::NoPositiveAward)?;

    let total_awards = amounts.len();
    let total_value: f64 = amounts.iter().sum();
    let average_award = total_value / total_awards as f64;
    let max_award = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(Statistics {
        total_awards,
        total_value,
        average_award,
        median_award: median(&amounts),
        std_dev: sample_std_dev(&amounts, average_award),
        max_award,
        min_award,
        contract_type_distribution: distribution,
        top_recipients: top_recipients(records, SUMMARY_TOP_N),
    })
}

/// Middle value of the sorted series; the mean of the two middle values
/// for an even count. The series must not be empty.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two values.
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// One histogram bar: `[lower, upper)`, the last bucket also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of award amounts over `[min, max]`.
///
/// A degenerate range (all amounts equal) is widened by 0.5 on each side.
pub fn award_histogram(records: &[AwardRecord], bins: usize) -> Vec<HistogramBucket> {
    if records.is_empty() || bins == 0 {
        return Vec::new();
    }

    let amounts: Vec<f64> = records.iter().map(|r| r.award_amount).collect();
    let mut lo = amounts.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut buckets: Vec<HistogramBucket> = (0..bins)
        .map(|i| HistogramBucket {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for amount in amounts {
        let slot = (((amount - lo) / width) as usize).min(bins - 1);
        buckets[slot].count += 1;
    }

    buckets
}
