//! CSV file adapters: price input, evaluation and feature table output.

use crate::domain::backtest::BacktestConfig;
use crate::domain::coin_id::Identified;
use crate::domain::error::CoinfolioError;
use crate::domain::evaluation::EvaluationTable;
use crate::domain::features::{feature_columns, FeatureRow};
use crate::domain::price::PriceRecord;
use crate::ports::data_port::PriceSource;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw row as read from disk; columns are matched by header name.
#[derive(Debug, Deserialize)]
struct PriceRow {
    coin: String,
    #[serde(deserialize_with = "deserialize_date")]
    date: NaiveDate,
    prices: f64,
    #[serde(default)]
    total_vol: Option<f64>,
    #[serde(default)]
    market_caps: Option<f64>,
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| serde::de::Error::custom(format!("invalid date {raw:?}: {e}")))
}

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSource for CsvAdapter {
    fn fetch_prices(&self) -> Result<Vec<PriceRecord>, CoinfolioError> {
        let content = fs::read_to_string(&self.path).map_err(|e| CoinfolioError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut records = Vec::new();

        for result in rdr.deserialize::<PriceRow>() {
            let row = result.map_err(|e| CoinfolioError::Data {
                reason: format!("CSV parse error in {}: {}", self.path.display(), e),
            })?;
            records.push(PriceRecord {
                coin: row.coin,
                date: row.date,
                price: row.prices,
                total_vol: row.total_vol,
                market_cap: row.market_caps,
            });
        }

        debug!(path = %self.path.display(), rows = records.len(), "loaded prices");
        Ok(records)
    }
}

fn csv_error(path: &Path, e: csv::Error) -> CoinfolioError {
    CoinfolioError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

/// Writes the evaluation table as CSV, one row per coin in ranking order.
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        table: &EvaluationTable,
        _config: &BacktestConfig,
        output_path: &Path,
    ) -> Result<(), CoinfolioError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;
        for row in &table.rows {
            wtr.serialize(row).map_err(|e| csv_error(output_path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Write feature rows tagged with coin ids. Every row must carry `lags`
/// lag values.
pub fn write_feature_table(
    output_path: &Path,
    rows: &[Identified<FeatureRow>],
    lags: usize,
) -> Result<(), CoinfolioError> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;

    let mut header = vec!["coin_id".to_string()];
    header.extend(feature_columns(lags));
    wtr.write_record(&header)
        .map_err(|e| csv_error(output_path, e))?;

    for tagged in rows {
        let row = &tagged.row;
        if row.lags.len() != lags {
            return Err(CoinfolioError::Data {
                reason: format!(
                    "feature row for {} has {} lags, expected {}",
                    row.coin,
                    row.lags.len(),
                    lags
                ),
            });
        }
        let mut record = vec![
            tagged.coin_id.to_string(),
            row.coin.clone(),
            row.price.to_string(),
        ];
        record.extend(row.lags.iter().map(f64::to_string));
        wtr.write_record(&record)
            .map_err(|e| csv_error(output_path, e))?;
    }

    wtr.flush()?;
    Ok(())
}
