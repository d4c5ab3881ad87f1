#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use coinfolio::domain::error::CoinfolioError;
pub use coinfolio::domain::price::PriceRecord;
use coinfolio::ports::data_port::PriceSource;
use std::io::Write;

pub struct MockPriceSource {
    pub records: Vec<PriceRecord>,
    pub error: Option<String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            error: None,
        }
    }

    pub fn with_series(mut self, coin: &str, prices: &[f64]) -> Self {
        self.records.extend(generate_series(coin, date(2021, 1, 1), prices));
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_prices(&self) -> Result<Vec<PriceRecord>, CoinfolioError> {
        if let Some(reason) = &self.error {
            return Err(CoinfolioError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.records.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_record(coin: &str, date: &str, price: f64) -> PriceRecord {
    PriceRecord {
        coin: coin.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        price,
        total_vol: Some(1_000_000.0),
        market_cap: Some(50_000_000.0),
    }
}

/// One record per consecutive day starting at `start`.
pub fn generate_series(coin: &str, start: NaiveDate, prices: &[f64]) -> Vec<PriceRecord> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PriceRecord {
            coin: coin.to_string(),
            date: start + Duration::days(i as i64),
            price,
            total_vol: Some(1_000_000.0),
            market_cap: Some(50_000_000.0),
        })
        .collect()
}

pub fn increasing(n: usize) -> Vec<f64> {
    (0..n).map(|t| 100.0 + t as f64).collect()
}

pub fn decreasing(n: usize) -> Vec<f64> {
    (0..n).map(|t| 1000.0 - t as f64).collect()
}

/// Render records in the price file layout.
pub fn prices_csv(records: &[PriceRecord]) -> String {
    let mut out = String::from("coin,date,prices,total_vol,market_caps\n");
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            r.coin,
            r.date.format("%Y-%m-%d"),
            r.price,
            r.total_vol.unwrap_or_default(),
            r.market_cap.unwrap_or_default()
        ));
    }
    out
}

pub fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
