//! Markdown report adapter implementing ReportPort.
//!
//! Produces a self-contained Markdown document: backtest parameters, the
//! ranked evaluation table, and a list of coins with undefined metrics.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::CoinfolioError;
use crate::domain::evaluation::{EvaluationTable, Metric};
use crate::ports::report_port::ReportPort;

/// Percent metrics are shown as percentages, ratios with two decimals.
/// Undefined values read `n/a`, infinities `inf` / `-inf`.
pub fn format_metric(metric: Metric, value: f64) -> String {
    if value.is_nan() {
        return "n/a".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    match metric {
        Metric::AnnualizedReturn | Metric::AnnualVolatility | Metric::CumulativeReturns => {
            format!("{:.2}%", value * 100.0)
        }
        Metric::SharpeRatio | Metric::SortinoRatio => format!("{:.2}", value),
    }
}

pub fn render(table: &EvaluationTable, config: &BacktestConfig) -> String {
    let mut out = String::from("# Portfolio Evaluation\n\n## Parameters\n\n");

    out.push_str("| Parameter | Value |\n|---|---|\n");
    out.push_str(&format!("| Short window | {} |\n", config.short_window));
    out.push_str(&format!("| Long window | {} |\n", config.long_window));
    out.push_str(&format!("| Share size | {} |\n", config.share_size));
    out.push_str(&format!("| Initial capital | {:.2} |\n", config.initial_capital));
    out.push_str(&format!("| Coins | {} |\n", table.len()));

    out.push_str("\n## Ranking\n\n");
    if table.is_empty() {
        out.push_str("_No coins evaluated._\n");
        return out;
    }

    out.push_str("| Coin |");
    for metric in Metric::ALL {
        out.push_str(&format!(" {metric} |"));
    }
    out.push_str("\n|---|");
    for _ in Metric::ALL {
        out.push_str("---:|");
    }
    out.push('\n');

    for row in &table.rows {
        out.push_str(&format!("| {} |", row.coin));
        for metric in Metric::ALL {
            out.push_str(&format!(" {} |", format_metric(metric, row.get(metric))));
        }
        out.push('\n');
    }

    let undefined: Vec<_> = table
        .rows
        .iter()
        .filter(|r| !r.non_finite().is_empty())
        .collect();
    if !undefined.is_empty() {
        out.push_str("\n## Undefined metrics\n\n");
        for row in undefined {
            let names: Vec<&str> = row.non_finite().iter().map(|m| m.label()).collect();
            out.push_str(&format!("- {}: {}\n", row.coin, names.join(", ")));
        }
    }

    out
}

pub struct MarkdownReportAdapter;

impl MarkdownReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for MarkdownReportAdapter {
    fn write(
        &self,
        table: &EvaluationTable,
        config: &BacktestConfig,
        output_path: &Path,
    ) -> Result<(), CoinfolioError> {
        fs::write(output_path, render(table, config))?;
        Ok(())
    }
}
