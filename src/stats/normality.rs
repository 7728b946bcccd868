//! Shapiro-Wilk normality test
//!
//! Royston's approximation of the Shapiro-Wilk W statistic and its
//! significance level, valid for 3 <= n <= 5000. For n = 3 the p-value is
//! exact.
//!
//! References:
//! - Shapiro & Wilk (1965): An analysis of variance test for normality
//! - Royston (1992): Approximating the Shapiro-Wilk W-test for non-normality
//! - Royston (1995): Algorithm AS R94, Applied Statistics 44(4)

use super::normal_sf;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

/// Largest sample the approximation is calibrated for
pub const MAX_SAMPLE_SIZE: usize = 5000;

/// Ranges below this are treated as zero
const SMALL: f64 = 1e-19;

// Polynomial coefficients from AS R94
const G: [f64; 2] = [-2.273, 0.459];
const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_19, 4.434_685, -2.706_056];
const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
const C3: [f64; 4] = [0.544, -0.399_78, 0.025_054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.778_57, 0.062_767, -0.002_032_2];
const C5: [f64; 4] = [-1.5861, -0.310_82, -0.083_751, 0.003_891_5];
const C6: [f64; 3] = [-0.4803, -0.082_676, 0.003_030_2];

/// Result of a Shapiro-Wilk test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapiroWilk {
    /// W statistic in (0, 1]; values near 1 are consistent with normality
    pub w: f64,
    /// Probability of a W this small under normality
    pub p_value: f64,
}

impl ShapiroWilk {
    /// Whether normality is retained at significance level `alpha`
    #[must_use]
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// Run the Shapiro-Wilk test on one sample
///
/// # Errors
///
/// - [`Error::InsufficientObservations`] when the sample has fewer than 3 values
/// - [`Error::InvalidInput`] for more than 5000 values or non-finite values
/// - [`Error::DegenerateSample`] when all values are identical
pub fn shapiro_wilk(sample: &[f64]) -> Result<ShapiroWilk> {
    let n = sample.len();
    if n < 3 {
        return Err(Error::InsufficientObservations {
            group: "sample".to_string(),
            test: "Shapiro-Wilk",
            required: 3,
            actual: n,
        });
    }
    if n > MAX_SAMPLE_SIZE {
        return Err(Error::InvalidInput(format!(
            "Shapiro-Wilk supports at most {MAX_SAMPLE_SIZE} observations, got {n}"
        )));
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidInput(
            "Shapiro-Wilk: sample contains a non-finite value".to_string(),
        ));
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);

    let range = sorted[n - 1] - sorted[0];
    if range < SMALL {
        return Err(Error::DegenerateSample(
            "Shapiro-Wilk: all observations are identical".to_string(),
        ));
    }

    let half = coefficients(n)?;
    let weights: Vec<f64> = (0..n)
        .map(|i| {
            let mirror = n - 1 - i;
            if i < half.len() {
                -half[i]
            } else if mirror < half.len() {
                half[mirror]
            } else {
                0.0
            }
        })
        .collect();

    // W as the squared correlation between the ordered data and the weights
    #[allow(clippy::cast_precision_loss)]
    let nf = n as f64;
    let scaled: Vec<f64> = sorted.iter().map(|x| x / range).collect();
    let mean_w = weights.iter().sum::<f64>() / nf;
    let mean_x = scaled.iter().sum::<f64>() / nf;

    let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
    for (a, x) in weights.iter().zip(&scaled) {
        let da = a - mean_w;
        let dx = x - mean_x;
        ssa += da * da;
        ssx += dx * dx;
        sax += da * dx;
    }

    // w1 = 1 - W, computed directly to keep precision when W is close to 1
    let ssassx = (ssa * ssx).sqrt();
    let w1 = (ssassx - sax) * (ssassx + sax) / (ssa * ssx);
    let w = 1.0 - w1;

    Ok(ShapiroWilk {
        w,
        p_value: significance(w, w1, n),
    })
}

/// Upper-half coefficients a_1..a_m (m = n / 2), a_1 pairing the extremes
fn coefficients(n: usize) -> Result<Vec<f64>> {
    let half = n / 2;
    if n == 3 {
        return Ok(vec![std::f64::consts::FRAC_1_SQRT_2]);
    }

    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::Distribution(e.to_string()))?;

    #[allow(clippy::cast_precision_loss)]
    let an = n as f64;
    let an25 = an + 0.25;

    // Blom scores for the upper half, largest first
    #[allow(clippy::cast_precision_loss)]
    let m: Vec<f64> = (1..=half)
        .map(|i| -normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();

    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();

    let a1 = m[0] / ssumm2 + poly(&C1, rsn);
    let mut a = Vec::with_capacity(half);

    if n > 5 {
        let a2 = m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a.push(a1);
        a.push(a2);
        a.extend(m[2..].iter().map(|v| v / fac));
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        a.push(a1);
        a.extend(m[1..].iter().map(|v| v / fac));
    }

    Ok(a)
}

/// Significance level for W (AS R94 normalizing transformations)
fn significance(w: f64, w1: f64, n: usize) -> f64 {
    if n == 3 {
        // Exact: 6/pi * (asin(sqrt(W)) - asin(sqrt(3/4)))
        let p = 6.0 / PI * (w.clamp(0.0, 1.0).sqrt().asin() - PI / 3.0);
        return p.clamp(0.0, 1.0);
    }

    if w1 <= 0.0 {
        return 1.0;
    }

    let y = w1.ln();
    #[allow(clippy::cast_precision_loss)]
    let an = n as f64;

    let (y, m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 1e-99;
        }
        (-(gamma - y).ln(), poly(&C3, an), poly(&C4, an).exp())
    } else {
        let ln_n = an.ln();
        (y, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    normal_sf((y - m) / s).clamp(0.0, 1.0)
}

/// Evaluate c[0] + c[1] x + c[2] x^2 + ...
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
