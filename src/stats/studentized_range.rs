//! Studentized range distribution
//!
//! Distribution of `(max - min) / s` for `k` independent standard normal
//! means, with `s` an independent standard deviation estimate on `df`
//! degrees of freedom. Tukey HSD draws its p-values and critical values
//! from it.
//!
//! The CDF integrates Hartley's form of the range distribution with
//! Gauss-Legendre quadrature (16-point outer integral over the chi density
//! of `s`, 12-point inner integral over the range). The quantile brackets the
//! root starting from a closed-form guess, then narrows the bracket with
//! Illinois regula falsi, bisecting whenever the interpolated step leaves it.
//!
//! References:
//! - Copenhaver & Holland (1988): Computation of the distribution of the
//!   maximum studentized range statistic with application to multiple
//!   significance testing of simple effects
//! - Lund & Lund (1983): Algorithm AS 190, Applied Statistics 32(2)

use super::normal_cdf;
use crate::{Error, Result};
use statrs::function::gamma::ln_gamma;

/// Gauss-Legendre nodes (positive half) for the 12-point inner rule
const XLEG: [f64; 6] = [
    0.981_560_634_246_719_250_690_549_090_149,
    0.904_117_256_370_474_856_678_465_866_119,
    0.769_902_674_194_304_687_036_893_833_213,
    0.587_317_954_286_617_447_296_702_418_941,
    0.367_831_498_998_180_193_752_691_536_644,
    0.125_233_408_511_468_915_472_441_369_464,
];

/// Gauss-Legendre weights for the 12-point inner rule
const ALEG: [f64; 6] = [
    0.047_175_336_386_511_827_194_615_961_485,
    0.106_939_325_995_318_430_960_254_718_194,
    0.160_078_328_543_346_226_334_652_529_543,
    0.203_167_426_723_065_921_749_064_455_810,
    0.233_492_536_538_354_808_760_849_898_925,
    0.249_147_045_813_402_785_000_562_436_043,
];

/// Gauss-Legendre nodes (positive half) for the 16-point outer rule
const XLEGQ: [f64; 8] = [
    0.989_400_934_991_649_932_596_154_173_450,
    0.944_575_023_073_232_576_077_988_415_535,
    0.865_631_202_387_831_743_880_467_897_712,
    0.755_404_408_355_003_033_895_101_194_847,
    0.617_876_244_402_643_748_446_671_764_049,
    0.458_016_777_657_227_386_342_419_442_984,
    0.281_603_550_779_258_913_230_460_501_460,
    0.095_012_509_837_637_440_185_319_335_425,
];

/// Gauss-Legendre weights for the 16-point outer rule
const ALEGQ: [f64; 8] = [
    0.027_152_459_411_754_094_851_780_572_456,
    0.062_253_523_938_647_892_862_843_836_994,
    0.095_158_511_682_492_784_809_925_107_602,
    0.124_628_971_255_533_872_052_476_282_192,
    0.149_595_988_816_576_732_081_501_730_547,
    0.169_156_519_395_002_538_189_312_079_030,
    0.182_603_415_044_923_588_866_763_667_969,
    0.189_450_610_455_068_496_285_396_723_208,
];

/// Above this many df the chi integral is replaced by the infinite-df limit
const DF_LARGE: f64 = 25_000.0;

const SQRT_2PI: f64 = 2.506_628_274_631_000_5;

/// Quantile iteration tolerance on q
const QUANTILE_TOLERANCE: f64 = 1e-8;
const QUANTILE_MAX_ITER: usize = 100;
/// Doublings of the upper bracket before giving up
const QUANTILE_MAX_EXPAND: usize = 60;

fn validate(k: usize, df: f64) -> Result<()> {
    if k < 2 {
        return Err(Error::InvalidInput(format!(
            "studentized range needs at least 2 means, got {k}"
        )));
    }
    if !(df >= 2.0) {
        return Err(Error::InvalidInput(format!(
            "studentized range needs df >= 2, got {df}"
        )));
    }
    Ok(())
}

/// P(Q <= q) for `k` means and `df` degrees of freedom
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when `k < 2` or `df < 2`
pub fn cdf(q: f64, k: usize, df: f64) -> Result<f64> {
    validate(k, df)?;
    if q.is_nan() {
        return Err(Error::InvalidInput("studentized range: q is NaN".to_string()));
    }
    if q <= 0.0 {
        return Ok(0.0);
    }
    if q.is_infinite() {
        return Ok(1.0);
    }

    #[allow(clippy::cast_precision_loss)]
    let cc = k as f64;

    if df > DF_LARGE {
        return Ok(range_cdf(q, cc));
    }

    let f2 = df * 0.5;
    let f21 = f2 - 1.0;
    let ff4 = df * 0.25;

    // Interval length shrinks as the chi density narrows
    let ulen: f64 = if df <= 100.0 {
        1.0
    } else if df <= 800.0 {
        0.5
    } else if df <= 5000.0 {
        0.25
    } else {
        0.125
    };

    // log of the chi density's leading constant, folded with the interval width
    let f2lf = f2 * df.ln() - df * std::f64::consts::LN_2 - ln_gamma(f2) + ulen.ln();

    let mut ans: f64 = 0.0;
    for i in 1..=50_i32 {
        let mut otsum = 0.0;
        let twa1 = f64::from(2 * i - 1) * ulen;

        for (node, weight) in XLEGQ.iter().zip(&ALEGQ) {
            for sign in [-1.0, 1.0] {
                let u = twa1 + sign * node * ulen;
                let t1 = f2lf + f21 * u.ln() - u * ff4;
                // exp(t1) below 9e-14 contributes nothing
                if t1 >= -30.0 {
                    let qsqz = q * (u * 0.5).sqrt();
                    otsum += range_cdf(qsqz, cc) * weight * t1.exp();
                }
            }
        }

        // At least 1 / ulen intervals so the left tail is covered
        if f64::from(i) * ulen >= 1.0 && otsum <= 1e-14 {
            break;
        }
        ans += otsum;
    }

    Ok(ans.min(1.0))
}

/// P(Q > q) for `k` means and `df` degrees of freedom
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when `k < 2` or `df < 2`
pub fn sf(q: f64, k: usize, df: f64) -> Result<f64> {
    Ok((1.0 - cdf(q, k, df)?).clamp(0.0, 1.0))
}

/// Value `q` with P(Q <= q) = `p`
///
/// # Errors
///
/// - [`Error::InvalidInput`] when `p` is outside (0, 1), `k < 2` or `df < 2`
/// - [`Error::Distribution`] when no bracket is found or the search does not
///   converge
pub fn quantile(p: f64, k: usize, df: f64) -> Result<f64> {
    validate(k, df)?;
    if !(p > 0.0 && p < 1.0) {
        return Err(Error::InvalidInput(format!(
            "studentized range quantile needs 0 < p < 1, got {p}"
        )));
    }

    // cdf(0) = 0 < p, so 0 is always a valid lower bound
    let (mut lo, mut f_lo) = (0.0, -p);

    #[allow(clippy::cast_precision_loss)]
    let guess = initial_guess(p, k as f64, df);
    let mut hi = if guess.is_finite() && guess > 0.0 { guess } else { 1.0 };
    let mut f_hi = cdf(hi, k, df)? - p;

    let mut expansions = 0;
    while f_hi < 0.0 {
        if expansions == QUANTILE_MAX_EXPAND {
            return Err(Error::Distribution(format!(
                "studentized range quantile: no upper bracket for p={p}, k={k}, df={df}"
            )));
        }
        (lo, f_lo) = (hi, f_hi);
        hi *= 2.0;
        f_hi = cdf(hi, k, df)? - p;
        expansions += 1;
    }

    // Illinois: halve the stale endpoint's residual when the same side
    // moves twice in a row
    let mut last_moved = 0_i8;
    let mut previous = f64::NAN;

    for _ in 0..QUANTILE_MAX_ITER {
        let mut x = (lo * f_hi - hi * f_lo) / (f_hi - f_lo);
        if !(x.is_finite() && x > lo && x < hi) {
            x = 0.5 * (lo + hi);
        }

        let f_x = cdf(x, k, df)? - p;
        if f_x == 0.0 {
            return Ok(x);
        }
        if f_x < 0.0 {
            (lo, f_lo) = (x, f_x);
            if last_moved == -1 {
                f_hi *= 0.5;
            }
            last_moved = -1;
        } else {
            (hi, f_hi) = (x, f_x);
            if last_moved == 1 {
                f_lo *= 0.5;
            }
            last_moved = 1;
        }

        if hi - lo < QUANTILE_TOLERANCE || (x - previous).abs() < QUANTILE_TOLERANCE {
            return Ok(x);
        }
        previous = x;
    }

    tracing::warn!(p, k, df, lo, hi, "studentized range quantile did not converge");
    Err(Error::Distribution(format!(
        "studentized range quantile did not converge for p={p}, k={k}, df={df}"
    )))
}

/// Starting point for the quantile search (AS 190 style approximation)
fn initial_guess(p: f64, c: f64, v: f64) -> f64 {
    const P0: f64 = 0.322_232_421_088;
    const Q0: f64 = 0.099_348_462_606_0;
    const P1: f64 = -1.0;
    const Q1: f64 = 0.588_581_570_495;
    const P2: f64 = -0.342_242_088_547;
    const Q2: f64 = 0.531_103_462_366;
    const P3: f64 = -0.204_231_210_125;
    const Q3: f64 = 0.103_537_752_850;
    const P4: f64 = -0.453_642_210_148e-4;
    const Q4: f64 = 0.385_607_006_34e-2;
    const C1: f64 = 0.8832;
    const C2: f64 = 0.2368;
    const C3: f64 = 1.214;
    const C4: f64 = 1.208;
    const C5: f64 = 1.4142;
    const VMAX: f64 = 120.0;

    let ps = 0.5 - 0.5 * p;
    let yi = (1.0 / (ps * ps)).ln().sqrt();
    let mut t = yi
        + ((((yi * P4 + P3) * yi + P2) * yi + P1) * yi + P0)
            / ((((yi * Q4 + Q3) * yi + Q2) * yi + Q1) * yi + Q0);
    if v < VMAX {
        t += (t * t * t + t) / v / 4.0;
    }
    let mut q = C1 - C2 * t;
    if v < VMAX {
        q += -C3 / v + C4 * t / v;
    }
    t * (q * (c - 1.0).ln() + C5)
}

/// P(range of `cc` standard normals <= w), i.e. the infinite-df limit
fn range_cdf(w: f64, cc: f64) -> f64 {
    const UPPER: f64 = 8.0;

    let qsqz = w * 0.5;
    // Beyond w = 16 the integral is 1 to 14 digits
    if qsqz >= UPPER {
        return 1.0;
    }

    // (2 Phi(w/2) - 1)^cc: probability that all values fall in [-w/2, w/2]
    let mut pr_w = 2.0 * normal_cdf(qsqz) - 1.0;
    pr_w = if pr_w >= (-50.0 / cc).exp() {
        pr_w.powf(cc)
    } else {
        0.0
    };

    // Second term of Hartley's form over (w/2, 8) in 2 or 3 equal intervals
    let intervals: u32 = if w > 3.0 { 2 } else { 3 };
    let binc = (UPPER - qsqz) / f64::from(intervals);
    let cc1 = cc - 1.0;
    let mut blb = qsqz;
    let mut einsum = 0.0;

    for _ in 0..intervals {
        let bub = blb + binc;
        let a = 0.5 * (bub + blb);
        let b = 0.5 * (bub - blb);
        let mut elsum = 0.0;

        for (node, weight) in XLEG.iter().zip(&ALEG) {
            for sign in [-1.0, 1.0] {
                let ac = a + sign * b * node;
                let qexpo = ac * ac;
                if qexpo > 60.0 {
                    continue;
                }
                let rinsum = normal_cdf(ac) - normal_cdf(ac - w);
                if rinsum >= (-30.0 / cc1).exp() {
                    elsum += weight * (-0.5 * qexpo).exp() * rinsum.powf(cc1);
                }
            }
        }

        einsum += elsum * 2.0 * b * cc / SQRT_2PI;
        blb = bub;
    }

    pr_w += einsum;
    if pr_w <= (-30.0_f64).exp() {
        return 0.0;
    }
    pr_w.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_bounds() {
        assert!(cdf(0.0, 5, 10.0).unwrap().abs() < f64::EPSILON);
        assert!(cdf(-1.0, 5, 10.0).unwrap().abs() < f64::EPSILON);
        assert!((cdf(f64::INFINITY, 5, 10.0).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(cdf(100.0, 5, 10.0).unwrap() > 0.999_999);
    }

    #[test]
    fn test_cdf_is_monotonic() {
        let mut previous = 0.0;
        for step in 1..40 {
            let q = f64::from(step) * 0.25;
            let p = cdf(q, 5, 10.0).unwrap();
            assert!(p >= previous, "cdf decreased at q={q}");
            previous = p;
        }
    }

    #[test]
    fn test_two_means_match_t_distribution() {
        // For k = 2, Q = sqrt(2) |T|; with df = infinity Q/sqrt(2) is |Z|
        let q = 1.959_963_984_540_054 * std::f64::consts::SQRT_2;
        let p = cdf(q, 2, 30_000.0).unwrap();
        assert!((p - 0.95).abs() < 1e-6, "p = {p}");
    }

    #[test]
    fn test_table_critical_values() {
        // Tukey tables, alpha = 0.05
        let cases = [
            (3, 10.0, 3.877),
            (5, 10.0, 4.654),
            (5, 20.0, 4.232),
            (4, 60.0, 3.737),
        ];
        for (k, df, expected) in cases {
            let q = quantile(0.95, k, df).unwrap();
            assert!((q - expected).abs() < 2e-3, "k={k} df={df}: {q} vs {expected}");
            let p = sf(q, k, df).unwrap();
            assert!((p - 0.05).abs() < 1e-6, "k={k} df={df}: sf = {p}");
        }
    }

    #[test]
    fn test_quantile_inverts_cdf() {
        for p in [0.1, 0.5, 0.9, 0.99] {
            let q = quantile(p, 4, 12.0).unwrap();
            assert!((cdf(q, 4, 12.0).unwrap() - p).abs() < 1e-7, "p={p}");
        }
    }

    #[test]
    fn test_quantile_many_means_and_large_df() {
        // far from the starting guess; the search must stay bracketed
        let cases = [
            (0.1, 20, 100.0, 2.81),
            (0.05, 20, 1000.0, 2.622),
            (0.1, 20, 1000.0, 2.836),
            (0.999, 20, 2.0, 66.435),
            (0.01, 2, 2.0, 0.02),
        ];
        for (p, k, df, expected) in cases {
            let q = quantile(p, k, df).unwrap();
            assert!(q.is_finite() && q > 0.0, "p={p} k={k} df={df}: q = {q}");
            assert!((q - expected).abs() < 5e-3, "p={p} k={k} df={df}: {q} vs {expected}");
            assert!((cdf(q, k, df).unwrap() - p).abs() < 1e-7, "p={p} k={k} df={df}");
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(cdf(1.0, 1, 10.0), Err(Error::InvalidInput(_))));
        assert!(matches!(cdf(1.0, 3, 1.0), Err(Error::InvalidInput(_))));
        assert!(matches!(quantile(1.0, 3, 10.0), Err(Error::InvalidInput(_))));
        assert!(matches!(quantile(0.0, 3, 10.0), Err(Error::InvalidInput(_))));
        assert!(matches!(cdf(f64::NAN, 3, 10.0), Err(Error::InvalidInput(_))));
    }
}
