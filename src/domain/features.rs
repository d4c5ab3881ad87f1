//! Lagged-price feature table for forecasting.

use super::price::{group_by_coin, Labeled, PriceRecord};
use super::split::DEFAULT_TRAIN_DAYS;

pub const DEFAULT_LAGS: usize = 3;

/// Parameters of the forecasting-preparation path.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub lags: usize,
    pub train_days: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            lags: DEFAULT_LAGS,
            train_days: DEFAULT_TRAIN_DAYS,
        }
    }
}

/// Target price plus the previous `lags.len()` prices of the same coin.
/// `lags[0]` is t-1, `lags[1]` is t-2, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub coin: String,
    pub price: f64,
    pub lags: Vec<f64>,
}

impl Labeled for FeatureRow {
    fn coin(&self) -> &str {
        &self.coin
    }
}

/// Column names for a feature table with `lags` lag columns.
pub fn feature_columns(lags: usize) -> Vec<String> {
    let mut cols = vec!["coin".to_string(), "prices".to_string()];
    cols.extend((1..=lags).map(|k| format!("prices_t-{k}")));
    cols
}

/// Build lag features per coin. The first `lags` rows of each coin have an
/// undefined lag and are dropped; date, volume and market cap are not carried.
pub fn build_features(records: &[PriceRecord], lags: usize) -> Vec<FeatureRow> {
    let mut rows = Vec::new();
    for series in group_by_coin(records) {
        let prices = series.prices();
        for t in lags..prices.len() {
            rows.push(FeatureRow {
                coin: series.coin.clone(),
                price: prices[t],
                lags: (1..=lags).map(|k| prices[t - k]).collect(),
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(coin: &str, day: u32, price: f64) -> PriceRecord {
        PriceRecord {
            coin: coin.into(),
            date: NaiveDate::from_ymd_opt(2021, 6, day).unwrap(),
            price,
            total_vol: Some(1e9),
            market_cap: Some(1e12),
        }
    }

    #[test]
    fn columns_for_three_lags() {
        assert_eq!(
            feature_columns(3),
            vec!["coin", "prices", "prices_t-1", "prices_t-2", "prices_t-3"]
        );
    }

    #[test]
    fn drops_first_rows_and_aligns_lags() {
        let records: Vec<_> = (1..=5).map(|d| record("bitcoin", d, d as f64 * 10.0)).collect();
        let rows = build_features(&records, DEFAULT_LAGS);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price, 40.0);
        assert_eq!(rows[0].lags, vec![30.0, 20.0, 10.0]);
        assert_eq!(rows[1].price, 50.0);
        assert_eq!(rows[1].lags, vec![40.0, 30.0, 20.0]);
    }

    #[test]
    fn lags_never_cross_coins() {
        let mut records: Vec<_> = (1..=4).map(|d| record("bitcoin", d, d as f64)).collect();
        records.extend((1..=4).map(|d| record("ethereum", d, 100.0 + d as f64)));
        let rows = build_features(&records, DEFAULT_LAGS);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].coin, "bitcoin");
        assert_eq!(rows[0].lags, vec![3.0, 2.0, 1.0]);
        assert_eq!(rows[1].coin, "ethereum");
        assert_eq!(rows[1].lags, vec![103.0, 102.0, 101.0]);
    }

    #[test]
    fn short_coin_contributes_nothing() {
        let records: Vec<_> = (1..=3).map(|d| record("tiny", d, 1.0)).collect();
        assert!(build_features(&records, DEFAULT_LAGS).is_empty());
    }
}
