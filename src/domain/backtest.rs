//! Dual moving average backtest for a single coin.
//!
//! BacktestConfig defines the windows, share size and starting capital.

use super::series::{self, Series};

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 100;
pub const DEFAULT_SHARE_SIZE: f64 = -500.0;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub short_window: usize,
    pub long_window: usize,
    /// Shares held while the signal is on. Negative means a short position.
    pub share_size: f64,
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            share_size: DEFAULT_SHARE_SIZE,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

/// Every intermediate column of one backtest run, row-aligned with the prices.
#[derive(Debug, Clone)]
pub struct BacktestTrace {
    pub sma_short: Series,
    pub sma_long: Series,
    pub signal: Vec<f64>,
    pub entry_exit: Series,
    pub position: Vec<f64>,
    pub entry_exit_position: Series,
    pub holdings: Series,
    pub cash: Series,
    pub total: Series,
    pub daily_returns: Series,
    pub cumulative_returns: Series,
}

impl BacktestTrace {
    /// Last cumulative return, NaN when undefined or the series is empty.
    pub fn final_cumulative_return(&self) -> f64 {
        self.cumulative_returns
            .last()
            .copied()
            .flatten()
            .unwrap_or(f64::NAN)
    }

    pub fn len(&self) -> usize {
        self.signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }
}

/// Signal is 1.0 while SMA(short) < SMA(long), assigned from index
/// `short_window` on. Earlier rows keep 0.0, and a comparison against an
/// undefined average counts as false.
pub fn crossover_signal(
    sma_short: &[Option<f64>],
    sma_long: &[Option<f64>],
    short_window: usize,
) -> Vec<f64> {
    let mut signal = vec![0.0; sma_short.len()];
    for t in short_window..signal.len() {
        if let (Some(s), Some(l)) = (sma_short[t], sma_long[t]) {
            if s < l {
                signal[t] = 1.0;
            }
        }
    }
    signal
}

pub fn run_backtest(prices: &[f64], config: &BacktestConfig) -> BacktestTrace {
    let sma_short = series::rolling_mean(prices, config.short_window);
    let sma_long = series::rolling_mean(prices, config.long_window);

    let signal = crossover_signal(&sma_short, &sma_long, config.short_window);
    let entry_exit = series::diff(&series::defined(&signal));

    let position: Vec<f64> = signal.iter().map(|s| config.share_size * s).collect();
    let entry_exit_position = series::diff(&series::defined(&position));

    let price_col = series::defined(prices);
    let shares_held = series::cumsum(&entry_exit_position);
    let holdings = series::zip_with(&price_col, &shares_held, |p, q| p * q);

    let traded_value = series::zip_with(&price_col, &entry_exit_position, |p, q| p * q);
    let cash = series::map_defined(&series::cumsum(&traded_value), |spent| {
        config.initial_capital - spent
    });

    let total = series::zip_with(&cash, &holdings, |c, h| c + h);
    let daily_returns = series::pct_change(&total);
    let growth = series::cumprod(&series::map_defined(&daily_returns, |r| 1.0 + r));
    let cumulative_returns = series::map_defined(&growth, |g| g - 1.0);

    BacktestTrace {
        sma_short,
        sma_long,
        signal,
        entry_exit,
        position,
        entry_exit_position,
        holdings,
        cash,
        total,
        daily_returns,
        cumulative_returns,
    }
}
