//! Descriptive and inferential statistics shared by the store-backed analyzer
//! and the file mode.
//!
//! Estimates over too little data are NaN rather than zero, so an absent
//! signal is never mistaken for a measured one. The one exception is
//! [`t_test`] and [`linear_slope`], which report [`InsufficientData`] because
//! their callers surface it per section.

use fxo_core::{failure::InsufficientData, models::Map};
use serde::{Deserialize, Serialize};
use statrs::{
    distribution::{ContinuousCDF, StudentsT},
    statistics::Statistics,
};
use std::hash::Hash;

/// The arithmetic mean, NaN for no values
pub fn mean(values: &[f64]) -> f64 {
    values.mean()
}

/// Sum the values that share a key, then average the sums.
///
/// With the transaction date as key this is the mean daily volume.
pub fn mean_of_totals<K: Eq + Hash>(records: impl IntoIterator<Item = (K, f64)>) -> f64 {
    let mut totals: Map<K> = Map::default();
    for (key, value) in records {
        *totals.entry(key).or_insert(0.0) += value;
    }
    totals.values().mean()
}

/// Pearson correlation over the rows where both values are present.
///
/// NaN when fewer than two complete rows remain or either side has zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();

    if xs.len() < 2 {
        return f64::NAN;
    }

    let (mx, my) = (mean(&xs), mean(&ys));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        f64::NAN
    } else {
        // rounding can push a perfect correlation a hair past 1
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    }
}

/// The symmetric correlation matrix of the given columns, in column order.
///
/// Every column must have one entry per row; absent values are `None`.
pub fn correlation_matrix(columns: &Map<String, Vec<Option<f64>>>) -> Map<String, Map<String>> {
    columns
        .iter()
        .map(|(a, xs)| {
            let row = columns
                .iter()
                .map(|(b, ys)| {
                    let rho = pearson(xs, ys);
                    // zero variance stays NaN, even on the diagonal
                    let rho = if a == b && !rho.is_nan() { 1.0 } else { rho };
                    (b.clone(), rho)
                })
                .collect();
            (a.clone(), row)
        })
        .collect()
}

/// How the two samples' variances are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    /// Student's test, assuming equal variances
    #[default]
    Pooled,
    /// Welch's test, without that assumption
    Welch,
}

/// The result of a two-sample unpaired t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    /// Mean of the first sample
    pub mean_a: f64,
    /// Mean of the second sample
    pub mean_b: f64,
    /// `mean_a - mean_b`
    pub mean_diff: f64,
    /// The t statistic
    #[serde(deserialize_with = "crate::encoding::nan")]
    pub t_stat: f64,
    /// Two-sided p-value
    #[serde(deserialize_with = "crate::encoding::nan")]
    pub p_value: f64,
}

/// Two-sample unpaired t-test with a two-sided p-value.
///
/// Both samples need at least two observations.
pub fn t_test(a: &[f64], b: &[f64], variance: Variance) -> Result<TTest, InsufficientData> {
    InsufficientData::check("first comparison sample", 2, a.len())?;
    InsufficientData::check("second comparison sample", 2, b.len())?;

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (mean_a, mean_b) = (mean(a), mean(b));
    let (var_a, var_b) = (a.variance(), b.variance());

    let (standard_error, dof) = match variance {
        Variance::Pooled => {
            let dof = na + nb - 2.0;
            let pooled = ((na - 1.0) * var_a + (nb - 1.0) * var_b) / dof;
            ((pooled * (1.0 / na + 1.0 / nb)).sqrt(), dof)
        }
        Variance::Welch => {
            let (sa, sb) = (var_a / na, var_b / nb);
            let dof = (sa + sb).powi(2) / (sa.powi(2) / (na - 1.0) + sb.powi(2) / (nb - 1.0));
            ((sa + sb).sqrt(), dof)
        }
    };

    let mean_diff = mean_a - mean_b;
    let t_stat = mean_diff / standard_error;
    let p_value = match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) if t_stat.is_finite() => 2.0 * (1.0 - dist.cdf(t_stat.abs())),
        _ => f64::NAN,
    };

    Ok(TTest {
        mean_a,
        mean_b,
        mean_diff,
        t_stat,
        p_value,
    })
}

/// Ordinary least-squares slope of the values against their index `0..n`.
pub fn linear_slope(values: &[f64]) -> Result<f64, InsufficientData> {
    InsufficientData::check("trend periods", 2, values.len())?;

    let mx = (values.len() - 1) as f64 / 2.0;
    let my = mean(values);
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in values.iter().enumerate() {
        let dx = x as f64 - mx;
        sxy += dx * (y - my);
        sxx += dx * dx;
    }

    Ok(sxy / sxx)
}
