//! Price data access port trait.

use crate::domain::error::CoinfolioError;
use crate::domain::price::{group_by_coin, PriceRecord};

pub trait PriceSource {
    /// All price records, in source order.
    fn fetch_prices(&self) -> Result<Vec<PriceRecord>, CoinfolioError>;

    /// Distinct coins in first-seen order with their row counts.
    fn list_coins(&self) -> Result<Vec<(String, usize)>, CoinfolioError> {
        let records = self.fetch_prices()?;
        Ok(group_by_coin(&records)
            .into_iter()
            .map(|series| {
                let rows = series.len();
                (series.coin, rows)
            })
            .collect())
    }
}
