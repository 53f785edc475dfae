//! Descriptive numeric primitives shared by every test family
//!
//! All functions operate on already-cleaned slices (missing values removed by
//! the caller) and use the sample (n - 1) denominator unless stated otherwise.

use crate::{Error, Result};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Number of decimal places every reported statistic is rounded to
pub const REPORT_DECIMALS: i32 = 4;

/// Round to the reporting precision used in result records
///
/// Non-finite values pass through unchanged so that callers can still
/// detect them after rounding.
pub fn round4(x: f64) -> f64 {
    round_to(x, REPORT_DECIMALS)
}

/// Round half away from zero to `decimals` places
pub fn round_to(x: f64, decimals: i32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let factor = 10f64.powi(decimals);
    let scaled = x * factor;
    if scaled.abs() >= 1e15 {
        return x;
    }
    scaled.round() / factor
}

/// Arithmetic mean
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(Error::empty_input("mean"));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sum of squared deviations from `center`
pub fn sum_of_squares(data: &[f64], center: f64) -> f64 {
    data.iter().map(|&x| (x - center).powi(2)).sum()
}

/// Sample variance (ddof = 1)
pub fn variance(data: &[f64]) -> Result<f64> {
    if data.len() < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: data.len(),
        });
    }
    let m = mean(data)?;
    Ok(sum_of_squares(data, m) / (data.len() - 1) as f64)
}

/// Sample standard deviation (ddof = 1)
pub fn std_dev(data: &[f64]) -> Result<f64> {
    variance(data).map(f64::sqrt)
}

/// Standard error of the mean
pub fn std_error(data: &[f64]) -> Result<f64> {
    Ok(std_dev(data)? / (data.len() as f64).sqrt())
}

/// Sorted copy of the data
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut v = data.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// Quantile with linear interpolation between order statistics
/// (Hyndman-Fan type 7, the default of most statistics packages)
pub fn quantile(data: &[f64], p: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(Error::empty_input("quantile"));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidParameter(format!("Quantile {p} must be in [0, 1]")));
    }
    let s = sorted(data);
    Ok(quantile_sorted(&s, p))
}

/// Type 7 quantile of pre-sorted, non-empty data
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Median
pub fn median(data: &[f64]) -> Result<f64> {
    quantile(data, 0.5)
}

/// Interquartile range (Q3 - Q1)
pub fn iqr(data: &[f64]) -> Result<f64> {
    let s = sorted(data);
    if s.is_empty() {
        return Err(Error::empty_input("iqr"));
    }
    Ok(quantile_sorted(&s, 0.75) - quantile_sorted(&s, 0.25))
}

/// Minimum and maximum
pub fn min_max(data: &[f64]) -> Result<(f64, f64)> {
    if data.is_empty() {
        return Err(Error::empty_input("min_max"));
    }
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((min, max))
}

/// Average ranks (1-based); tied values share the mean of their positions
pub fn ranks(data: &[f64]) -> Vec<f64> {
    let mut idx: Vec<usize> = (0..data.len()).collect();
    idx.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut out = vec![0.0; data.len()];
    let mut i = 0;
    while i < idx.len() {
        let mut j = i;
        while j + 1 < idx.len() && data[idx[j + 1]] == data[idx[i]] {
            j += 1;
        }
        // positions i..=j (0-based) share rank mean((i+1)..=(j+1))
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &idx[i..=j] {
            out[k] = rank;
        }
        i = j + 1;
    }
    out
}

/// Sizes of each group of tied values (singletons included)
pub fn tie_counts(data: &[f64]) -> Vec<usize> {
    let mut counts: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
    for &x in data {
        *counts.entry(OrderedFloat(x)).or_insert(0) += 1;
    }
    counts.into_values().collect()
}

/// Number of distinct values
pub fn distinct_count(data: &[f64]) -> usize {
    tie_counts(data).len()
}

/// Central moments m2, m3, m4 (population denominators)
fn central_moments(data: &[f64]) -> Result<(f64, f64, f64)> {
    let m = mean(data)?;
    let n = data.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &x in data {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Ok((m2 / n, m3 / n, m4 / n))
}

/// Population skewness g1 = m3 / m2^1.5
pub fn skewness_biased(data: &[f64]) -> Result<f64> {
    let (m2, m3, _) = central_moments(data)?;
    if m2 == 0.0 {
        return Ok(0.0);
    }
    Ok(m3 / m2.powf(1.5))
}

/// Population excess kurtosis g2 = m4 / m2^2 - 3
pub fn kurtosis_biased(data: &[f64]) -> Result<f64> {
    let (m2, _, m4) = central_moments(data)?;
    if m2 == 0.0 {
        return Ok(0.0);
    }
    Ok(m4 / (m2 * m2) - 3.0)
}

/// Bias-corrected sample skewness (G1)
pub fn skewness(data: &[f64]) -> Result<f64> {
    let n = data.len();
    if n < 3 {
        return Err(Error::InsufficientData { expected: 3, actual: n });
    }
    let g1 = skewness_biased(data)?;
    let n = n as f64;
    Ok(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Bias-corrected sample excess kurtosis (G2)
pub fn kurtosis(data: &[f64]) -> Result<f64> {
    let n = data.len();
    if n < 4 {
        return Err(Error::InsufficientData { expected: 4, actual: n });
    }
    let g2 = kurtosis_biased(data)?;
    let n = n as f64;
    Ok(((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

/// Pearson product-moment correlation
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(Error::size_mismatch(x.len(), y.len(), "pearson correlation"));
    }
    if x.len() < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: x.len(),
        });
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut num = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        num += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return Err(Error::Computation(
            "Cannot compute correlation: zero variance".to_string(),
        ));
    }
    Ok((num / denom).clamp(-1.0, 1.0))
}

/// Drop pairs where either side is missing
pub fn pairwise_complete(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .unzip()
}
