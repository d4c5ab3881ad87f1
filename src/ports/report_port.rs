//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::CoinfolioError;
use crate::domain::evaluation::EvaluationTable;

/// Port for writing evaluation reports.
pub trait ReportPort {
    fn write(
        &self,
        table: &EvaluationTable,
        config: &BacktestConfig,
        output_path: &Path,
    ) -> Result<(), CoinfolioError>;
}
