//! Risk and return metrics over a daily-returns series.
//!
//! Returns are given as an `Option<f64>` series; undefined entries (the first
//! day of a percent-change series) are skipped by the mean and standard
//! deviation. Division by zero is not guarded: a flat or loss-free series
//! yields NaN or infinity, never a panic.

use super::series::present;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskMetrics {
    pub annualized_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
}

impl RiskMetrics {
    pub fn compute(daily_returns: &[Option<f64>]) -> Self {
        RiskMetrics {
            annualized_return: annualized_return(daily_returns),
            annual_volatility: annual_volatility(daily_returns),
            sharpe_ratio: sharpe_ratio(daily_returns),
            sortino_ratio: sortino_ratio(daily_returns),
        }
    }
}

/// Arithmetic mean of the defined values; NaN when there are none.
pub fn mean(values: &[Option<f64>]) -> f64 {
    let (sum, n) = present(values).fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample standard deviation (n - 1 denominator); NaN below two values.
pub fn sample_std(values: &[Option<f64>]) -> f64 {
    let xs: Vec<f64> = present(values).collect();
    if xs.len() < 2 {
        return f64::NAN;
    }
    let n = xs.len() as f64;
    let m = xs.iter().sum::<f64>() / n;
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

pub fn annualized_return(daily_returns: &[Option<f64>]) -> f64 {
    mean(daily_returns) * TRADING_DAYS_PER_YEAR
}

pub fn annual_volatility(daily_returns: &[Option<f64>]) -> f64 {
    sample_std(daily_returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

pub fn sharpe_ratio(daily_returns: &[Option<f64>]) -> f64 {
    annualized_return(daily_returns) / annual_volatility(daily_returns)
}

/// Annualized return over annualized downside deviation.
///
/// The downside column holds r² for negative returns and 0 for every other
/// entry, undefined ones included, so the downside mean is taken over the
/// full length of the input.
pub fn sortino_ratio(daily_returns: &[Option<f64>]) -> f64 {
    let downside: Vec<f64> = daily_returns
        .iter()
        .map(|r| match r {
            Some(r) if *r < 0.0 => r * r,
            _ => 0.0,
        })
        .collect();

    let downside_mean = if downside.is_empty() {
        f64::NAN
    } else {
        downside.iter().sum::<f64>() / downside.len() as f64
    };
    let downside_std = downside_mean.sqrt() * TRADING_DAYS_PER_YEAR.sqrt();

    annualized_return(daily_returns) / downside_std
}
