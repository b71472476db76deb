//! Click-through-rate significance check: a one-sided binomial test of whether a
//! placement's CTR is below a target rate.
use serde::Serialize;
use statrs::distribution::{Binomial, ContinuousCDF, DiscreteCDF, Normal};

use crate::error::{Error, Result};

/// Default null-hypothesis CTR (0.1%).
pub const DEFAULT_TARGET_CTR: f64 = 0.001;
pub const DEFAULT_ALPHA: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtrTestResult {
    pub clicks: u64,
    pub impressions: u64,
    pub target_ctr: f64,
    pub alpha: f64,
    pub observed_ctr: f64,
    /// P(X <= clicks) for X ~ Binomial(impressions, target_ctr)
    pub p_value: f64,
    pub method: PValueMethod,
    pub significant: bool,
    pub interpretation: String,
}

/// Above this variance the exact tail is replaced by a normal approximation.
const EXACT_VARIANCE_LIMIT: f64 = 1e4;

/// How `p_value` was obtained.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PValueMethod {
    Exact,
    /// Normal approximation with continuity correction.
    Normal,
}

/// Lower tail `P(X <= k)` of a binomial distribution.
pub fn binomial_cdf(k: u64, n: u64, p: f64) -> Result<(f64, PValueMethod)> {
    if k >= n || p <= 0.0 {
        return Ok((1.0, PValueMethod::Exact));
    }
    if p >= 1.0 {
        return Ok((0.0, PValueMethod::Exact));
    }
    let mean = n as f64 * p;
    let variance = mean * (1.0 - p);
    if variance <= EXACT_VARIANCE_LIMIT {
        let dist = Binomial::new(p, n).map_err(Error::external)?;
        return Ok((dist.cdf(k).clamp(0.0, 1.0), PValueMethod::Exact));
    }

    let normal = Normal::new(mean, variance.sqrt()).map_err(Error::external)?;
    Ok((normal.cdf(k as f64 + 0.5), PValueMethod::Normal))
}

/// Python-style `%.Ng` formatting: `sig` significant digits, trailing zeros trimmed.
fn format_general(value: f64, sig: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let sig = sig.max(1);
    // The exponent is taken after rounding, so 9.99996e-5 becomes 1e-4.
    let scientific = format!("{:.*e}", sig - 1, value);
    let (mantissa, exp) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exp.parse().unwrap_or(0);
    if exponent < -4 || exponent >= sig as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        let decimals = (sig as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Tests H1: true CTR < `target_ctr`, at significance level `alpha`.
pub fn site_ctr_test(
    clicks: u64,
    impressions: u64,
    target_ctr: f64,
    alpha: f64,
) -> Result<CtrTestResult> {
    if impressions == 0 {
        return Err(Error::invalid_argument("impressions", impressions));
    }
    if clicks > impressions {
        return Err(Error::invalid_argument("clicks", clicks));
    }
    if !(0.0..=1.0).contains(&target_ctr) {
        return Err(Error::invalid_argument("target_ctr", target_ctr));
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::invalid_argument("alpha", alpha));
    }

    let (p_value, method) = binomial_cdf(clicks, impressions, target_ctr)?;
    let significant = p_value < alpha;
    let interpretation = if significant {
        format!(
            "CTR is significantly below {:.3}% (p={})",
            target_ctr * 100.0,
            format_general(p_value, 4)
        )
    } else {
        format!(
            "No evidence CTR is below {:.3}% (p={})",
            target_ctr * 100.0,
            format_general(p_value, 4)
        )
    };

    Ok(CtrTestResult {
        clicks,
        impressions,
        target_ctr,
        alpha,
        observed_ctr: clicks as f64 / impressions as f64,
        p_value,
        method,
        significant,
        interpretation,
    })
}
