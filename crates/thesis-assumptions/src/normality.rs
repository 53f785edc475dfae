//! Normality tests
//!
//! Shapiro-Wilk follows Royston's AS R94 approximation (valid for
//! 3 <= n <= 5000). D'Agostino-Pearson combines the skewness and kurtosis
//! z-scores into an omnibus K² statistic with two degrees of freedom.

use crate::types::{NormalityResult, Recommendation, ShapeIndicators, SubTest, TestStatistic};
use crate::Result;
use thesis_core::distributions::{chi2_upper_p, normal_quantile, normal_sf};
use thesis_core::numeric::{kurtosis, kurtosis_biased, mean, skewness, skewness_biased, sorted};
use thesis_core::{round4, Error};
use tracing::{debug, instrument};

pub const SHAPIRO_MIN_N: usize = 3;
pub const SHAPIRO_MAX_N: usize = 5000;
pub const DAGOSTINO_MIN_N: usize = 20;

const SKEW_CONCERN: f64 = 2.0;
const KURTOSIS_CONCERN: f64 = 7.0;

/// Polynomial with ascending coefficients
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Shapiro-Wilk W and its p-value
pub fn shapiro_wilk(data: &[f64]) -> thesis_core::Result<TestStatistic> {
    const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
    const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
    const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
    const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
    const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
    const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
    const G: [f64; 2] = [-2.273, 0.459];

    let n = data.len();
    if !(SHAPIRO_MIN_N..=SHAPIRO_MAX_N).contains(&n) {
        return Err(Error::InvalidInput(format!(
            "Shapiro-Wilk requires {SHAPIRO_MIN_N} to {SHAPIRO_MAX_N} observations, got {n}"
        )));
    }
    let x = sorted(data);
    if x[n - 1] - x[0] < 1e-19 {
        return Err(Error::Computation(
            "Shapiro-Wilk is undefined for constant data".to_string(),
        ));
    }

    let half = n / 2;
    let an = n as f64;
    let mut a = vec![0.0; half];
    if n == 3 {
        a[0] = std::f64::consts::FRAC_1_SQRT_2;
    } else {
        let m: Vec<f64> = (1..=half)
            .map(|i| normal_quantile((i as f64 - 0.375) / (an + 0.25)))
            .collect::<thesis_core::Result<_>>()?;
        let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
        let ssumm2 = summ2.sqrt();
        let rsn = 1.0 / an.sqrt();
        let a1 = poly(&C1, rsn) - m[0] / ssumm2;
        let (first, fac) = if n > 5 {
            let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
            let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
                / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
                .sqrt();
            a[1] = a2;
            (2, fac)
        } else {
            let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
            (1, fac)
        };
        a[0] = a1;
        for i in first..half {
            a[i] = -m[i] / fac;
        }
    }

    let xbar = mean(&x)?;
    let ssq: f64 = x.iter().map(|v| (v - xbar).powi(2)).sum();
    let num: f64 = (0..half).map(|i| a[i] * (x[n - 1 - i] - x[i])).sum();
    let w = (num * num / ssq).min(1.0);

    let p = if n == 3 {
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = std::f64::consts::FRAC_PI_3;
        (pi6 * (w.sqrt().asin() - stqr)).max(0.0)
    } else {
        let w1 = 1.0 - w;
        if w1 <= 0.0 {
            1.0
        } else {
            let mut y = w1.ln();
            let (mu, sigma) = if n <= 11 {
                let gamma = poly(&G, an);
                if y >= gamma {
                    return Ok(TestStatistic::new(w, 1e-99));
                }
                y = -(gamma - y).ln();
                (poly(&C3, an), poly(&C4, an).exp())
            } else {
                let ln_n = an.ln();
                (poly(&C5, ln_n), poly(&C6, ln_n).exp())
            };
            normal_sf((y - mu) / sigma)
        }
    };
    Ok(TestStatistic::new(w, p.clamp(0.0, 1.0)))
}

/// Skewness z-score (requires n >= 8)
fn skew_z(data: &[f64]) -> thesis_core::Result<f64> {
    let n = data.len() as f64;
    if data.len() < 8 {
        return Err(Error::InsufficientData {
            expected: 8,
            actual: data.len(),
        });
    }
    let b2 = skewness_biased(data)?;
    let y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let ya = y / alpha;
    Ok(delta * (ya + (ya * ya + 1.0).sqrt()).ln())
}

/// Kurtosis z-score (Anscombe-Glynn)
fn kurtosis_z(data: &[f64]) -> thesis_core::Result<f64> {
    let n = data.len() as f64;
    if data.len() < 5 {
        return Err(Error::InsufficientData {
            expected: 5,
            actual: data.len(),
        });
    }
    let b2 = kurtosis_biased(data)? + 3.0;
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 =
        24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return Err(Error::Computation(
            "kurtosis test is undefined for this sample".to_string(),
        ));
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    Ok((term1 - term2) / (2.0 / (9.0 * a)).sqrt())
}

/// D'Agostino-Pearson omnibus K²
pub fn dagostino_pearson(data: &[f64]) -> thesis_core::Result<TestStatistic> {
    let zs = skew_z(data)?;
    let zk = kurtosis_z(data)?;
    let k2 = zs * zs + zk * zk;
    Ok(TestStatistic::new(k2, chi2_upper_p(k2, 2.0)?))
}

/// Normality of one variable
///
/// Non-finite values are dropped first. Tests that are not applicable at
/// this sample size are omitted rather than reported as failures.
#[instrument(skip(data), fields(n = data.len()))]
pub fn check_normality(
    data: &[f64],
    variable: Option<&str>,
    alpha: f64,
) -> Result<NormalityResult> {
    thesis_core::check_alpha(alpha)?;
    let clean: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    let n = clean.len();

    let shapiro = if (SHAPIRO_MIN_N..=SHAPIRO_MAX_N).contains(&n) {
        omit_on_error("shapiro-wilk", shapiro_wilk(&clean), alpha)
    } else {
        None
    };
    let dagostino = if n >= DAGOSTINO_MIN_N {
        omit_on_error("d'agostino-pearson", dagostino_pearson(&clean), alpha)
    } else {
        None
    };

    let skew = skewness(&clean).ok().map(round4);
    let kurt = kurtosis(&clean).ok().map(round4);
    let descriptive = ShapeIndicators {
        skewness: skew,
        kurtosis: kurt,
        skewness_concern: skew.is_some_and(|s| s.abs() > SKEW_CONCERN),
        kurtosis_concern: kurt.is_some_and(|k| k.abs() > KURTOSIS_CONCERN),
    };

    let verdicts: Vec<bool> = [shapiro, dagostino]
        .iter()
        .flatten()
        .map(|t| t.assumption_met)
        .collect();
    let normal = if verdicts.is_empty() {
        None
    } else {
        Some(verdicts.iter().all(|&v| v))
    };
    let recommendation = if normal == Some(false) {
        Recommendation::NonParametric
    } else {
        Recommendation::Parametric
    };

    Ok(NormalityResult {
        variable: variable.map(str::to_string),
        sample_size: n,
        shapiro_wilk: shapiro,
        dagostino_pearson: dagostino,
        descriptive,
        normal,
        recommendation,
    })
}

fn omit_on_error(
    test: &str,
    outcome: thesis_core::Result<TestStatistic>,
    alpha: f64,
) -> Option<SubTest> {
    match outcome {
        Ok(t) => Some(SubTest::from_statistic(t, alpha)),
        Err(e) => {
            debug!(test, error = %e, "normality test not computable");
            None
        }
    }
}
