//! Portfolio evaluation: per-coin risk metrics and backtest result, ranked by
//! cumulative return.
//!
//! Each coin is evaluated independently into its own `CoinEvaluation`; the
//! rows are merged once and sorted ascending by cumulative return, with
//! undefined (NaN) returns placed last. A coin with too little history still
//! produces a row, with NaN wherever a metric cannot be computed.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::backtest::{run_backtest, BacktestConfig};
use super::metrics::RiskMetrics;
use super::price::{group_by_coin, CoinSeries, PriceRecord};
use super::series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AnnualizedReturn,
    AnnualVolatility,
    SharpeRatio,
    SortinoRatio,
    CumulativeReturns,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::AnnualizedReturn,
        Metric::AnnualVolatility,
        Metric::SharpeRatio,
        Metric::SortinoRatio,
        Metric::CumulativeReturns,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::AnnualizedReturn => "Annualized Return",
            Metric::AnnualVolatility => "Annual Volatility",
            Metric::SharpeRatio => "Sharpe Ratio",
            Metric::SortinoRatio => "Sortino Ratio",
            Metric::CumulativeReturns => "Portfolio Cumulative Returns",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinEvaluation {
    pub coin: String,
    #[serde(rename = "Annualized Return")]
    pub annualized_return: f64,
    #[serde(rename = "Annual Volatility")]
    pub annual_volatility: f64,
    #[serde(rename = "Sharpe Ratio")]
    pub sharpe_ratio: f64,
    #[serde(rename = "Sortino Ratio")]
    pub sortino_ratio: f64,
    #[serde(rename = "Portfolio Cumulative Returns")]
    pub cumulative_returns: f64,
}

impl CoinEvaluation {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::AnnualizedReturn => self.annualized_return,
            Metric::AnnualVolatility => self.annual_volatility,
            Metric::SharpeRatio => self.sharpe_ratio,
            Metric::SortinoRatio => self.sortino_ratio,
            Metric::CumulativeReturns => self.cumulative_returns,
        }
    }

    /// Metrics that came out NaN or infinite.
    pub fn non_finite(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| !self.get(*m).is_finite())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvaluationTable {
    pub rows: Vec<CoinEvaluation>,
}

impl EvaluationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, coin: &str) -> Option<&CoinEvaluation> {
        self.rows.iter().find(|r| r.coin == coin)
    }

    pub fn coins(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.coin.as_str()).collect()
    }

    /// Position of a coin in the ranking, 0 = lowest cumulative return.
    pub fn rank_of(&self, coin: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.coin == coin)
    }
}

pub fn evaluate_coin(series: &CoinSeries, config: &BacktestConfig) -> CoinEvaluation {
    let prices = series.prices();

    let daily_returns = series::pct_change(&series::defined(&prices));
    let risk = RiskMetrics::compute(&daily_returns);

    let trace = run_backtest(&prices, config);

    let evaluation = CoinEvaluation {
        coin: series.coin.clone(),
        annualized_return: risk.annualized_return,
        annual_volatility: risk.annual_volatility,
        sharpe_ratio: risk.sharpe_ratio,
        sortino_ratio: risk.sortino_ratio,
        cumulative_returns: trace.final_cumulative_return(),
    };

    debug!(
        coin = %evaluation.coin,
        observations = prices.len(),
        cumulative_returns = evaluation.cumulative_returns,
        "evaluated coin"
    );

    if prices.len() < config.long_window {
        warn!(
            coin = %evaluation.coin,
            observations = prices.len(),
            long_window = config.long_window,
            "not enough history for the long moving average, no position taken"
        );
    }

    evaluation
}

/// NaN sorts after every number; ties keep input order.
fn ascending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

pub fn rank_by_cumulative_returns(mut rows: Vec<CoinEvaluation>) -> EvaluationTable {
    rows.sort_by(|a, b| ascending_nan_last(a.cumulative_returns, b.cumulative_returns));
    EvaluationTable { rows }
}

pub fn evaluate_portfolio(records: &[PriceRecord], config: &BacktestConfig) -> EvaluationTable {
    let rows: Vec<CoinEvaluation> = group_by_coin(records)
        .iter()
        .map(|coin| evaluate_coin(coin, config))
        .collect();

    for row in &rows {
        let bad = row.non_finite();
        if !bad.is_empty() {
            let names: Vec<&str> = bad.iter().map(|m| m.label()).collect();
            warn!(coin = %row.coin, metrics = ?names, "undefined metrics");
        }
    }

    rank_by_cumulative_returns(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn records(coin: &str, prices: &[f64]) -> Vec<PriceRecord> {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PriceRecord {
                coin: coin.into(),
                date: start + chrono::Duration::days(i as i64),
                price,
                total_vol: None,
                market_cap: None,
            })
            .collect()
    }

    fn row(coin: &str, cumulative: f64) -> CoinEvaluation {
        CoinEvaluation {
            coin: coin.into(),
            annualized_return: 0.0,
            annual_volatility: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            cumulative_returns: cumulative,
        }
    }

    #[test]
    fn metric_labels() {
        assert_eq!(Metric::AnnualizedReturn.to_string(), "Annualized Return");
        assert_eq!(
            Metric::CumulativeReturns.to_string(),
            "Portfolio Cumulative Returns"
        );
        assert_eq!(Metric::ALL.len(), 5);
    }

    #[test]
    fn get_reads_each_metric() {
        let r = CoinEvaluation {
            coin: "btc".into(),
            annualized_return: 1.0,
            annual_volatility: 2.0,
            sharpe_ratio: 3.0,
            sortino_ratio: 4.0,
            cumulative_returns: 5.0,
        };
        let values: Vec<f64> = Metric::ALL.iter().map(|m| r.get(*m)).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn ranking_ascending_with_nan_last() {
        let table = rank_by_cumulative_returns(vec![
            row("a", 0.3),
            row("b", f64::NAN),
            row("c", -0.1),
            row("d", 0.0),
        ]);
        assert_eq!(table.coins(), vec!["c", "d", "a", "b"]);
        assert_eq!(table.rank_of("b"), Some(3));
        assert_eq!(table.rank_of("zzz"), None);
    }

    #[test]
    fn ranking_ties_keep_input_order() {
        let table = rank_by_cumulative_returns(vec![row("x", 0.0), row("y", 0.0)]);
        assert_eq!(table.coins(), vec!["x", "y"]);
    }

    #[test]
    fn flat_coin_has_zero_volatility() {
        let table = evaluate_portfolio(&records("usd-coin", &[1.0; 30]), &BacktestConfig::default());
        let r = table.get("usd-coin").unwrap();
        assert_eq!(r.annualized_return, 0.0);
        assert_eq!(r.annual_volatility, 0.0);
        assert!(!r.sharpe_ratio.is_finite());
        assert!(!r.sortino_ratio.is_finite());
        assert_eq!(r.cumulative_returns, 0.0);
        assert!(r.non_finite().contains(&Metric::SharpeRatio));
    }

    #[test]
    fn single_observation_row_is_all_nan() {
        let table = evaluate_portfolio(&records("new-coin", &[5.0]), &BacktestConfig::default());
        assert_eq!(table.len(), 1);
        let r = &table.rows[0];
        assert!(Metric::ALL.iter().all(|m| r.get(*m).is_nan()));
    }

    #[test]
    fn every_coin_gets_a_row() {
        let mut input = records("bitcoin", &[10.0, 11.0, 12.0]);
        input.extend(records("dogecoin", &[1.0]));
        input.extend(records("tether", &[1.0, 1.0, 1.0]));
        let table = evaluate_portfolio(&input, &BacktestConfig::default());
        assert_eq!(table.len(), 3);
        assert_eq!(table.coins(), vec!["bitcoin", "tether", "dogecoin"]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = evaluate_portfolio(&[], &BacktestConfig::default());
        assert!(table.is_empty());
    }
}
