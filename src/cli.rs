//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::{write_feature_table, CsvAdapter, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::markdown_report::{format_metric, MarkdownReportAdapter};
use crate::domain::advisor;
use crate::domain::backtest::{
    BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_LONG_WINDOW, DEFAULT_SHARE_SIZE,
    DEFAULT_SHORT_WINDOW,
};
use crate::domain::coin_id::{attach_ids, Identified};
use crate::domain::config_validation::{
    validate_config, validate_evaluation_config, validate_forecast_config,
};
use crate::domain::error::CoinfolioError;
use crate::domain::evaluation::{evaluate_portfolio, EvaluationTable, Metric};
use crate::domain::features::{build_features, FeatureRow, ForecastConfig, DEFAULT_LAGS};
use crate::domain::split::{split_train_test, TrainTestSplit, DEFAULT_TRAIN_DAYS};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceSource;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "coinfolio", about = "Crypto portfolio evaluation and robo-advisor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank coins by risk metrics and moving-average backtest
    Evaluate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Write the table to a .csv or .md file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build lag features, tag coin ids and split into train/test CSVs
    Prepare {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long)]
        train: PathBuf,
        #[arg(long)]
        test: PathBuf,
    },
    /// List coins in a price file
    ListCoins {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Answer a dialog request (JSON from a file or stdin)
    Advise {
        #[arg(short, long)]
        request: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Evaluate {
            config,
            input,
            output,
        } => run_evaluate(config.as_deref(), input.as_deref(), output.as_deref()),
        Command::Prepare {
            config,
            input,
            train,
            test,
        } => run_prepare(config.as_deref(), input.as_deref(), &train, &test),
        Command::ListCoins { config, input } => run_list_coins(config.as_deref(), input.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Advise { request } => run_advise(request.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Load the INI file when given; otherwise every setting takes its default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, CoinfolioError> {
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, CoinfolioError> {
    validate_evaluation_config(adapter)?;

    Ok(BacktestConfig {
        short_window: adapter.get_int("evaluation", "short_window", DEFAULT_SHORT_WINDOW as i64)
            as usize,
        long_window: adapter.get_int("evaluation", "long_window", DEFAULT_LONG_WINDOW as i64)
            as usize,
        share_size: adapter.get_double("evaluation", "share_size", DEFAULT_SHARE_SIZE),
        initial_capital: adapter.get_double(
            "evaluation",
            "initial_capital",
            DEFAULT_INITIAL_CAPITAL,
        ),
    })
}

pub fn build_forecast_config(adapter: &dyn ConfigPort) -> Result<ForecastConfig, CoinfolioError> {
    validate_forecast_config(adapter)?;

    Ok(ForecastConfig {
        lags: adapter.get_int("forecast", "lags", DEFAULT_LAGS as i64) as usize,
        train_days: adapter.get_int("forecast", "train_days", DEFAULT_TRAIN_DAYS as i64) as usize,
    })
}

/// `--input` wins over `[data] prices_path`.
pub fn resolve_input(
    input_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, CoinfolioError> {
    if let Some(path) = input_override {
        return Ok(path.to_path_buf());
    }
    config
        .get_string("data", "prices_path")
        .map(PathBuf::from)
        .ok_or_else(|| CoinfolioError::ConfigMissing {
            section: "data".into(),
            key: "prices_path".into(),
        })
}

/// Report adapter chosen by file extension: `.md` for Markdown, CSV otherwise.
pub fn report_for(path: &Path) -> Box<dyn ReportPort> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("md") => Box::new(MarkdownReportAdapter::new()),
        _ => Box::new(CsvReportAdapter::new()),
    }
}

pub fn render_console_table(table: &EvaluationTable) -> String {
    let coin_width = table
        .rows
        .iter()
        .map(|r| r.coin.len())
        .chain(std::iter::once("Coin".len()))
        .max()
        .unwrap_or(4);

    let mut out = format!("{:<coin_width$}", "Coin");
    for metric in Metric::ALL {
        out.push_str(&format!("  {:>w$}", metric.label(), w = metric.label().len()));
    }
    out.push('\n');

    for row in &table.rows {
        out.push_str(&format!("{:<coin_width$}", row.coin));
        for metric in Metric::ALL {
            out.push_str(&format!(
                "  {:>w$}",
                format_metric(metric, row.get(metric)),
                w = metric.label().len()
            ));
        }
        out.push('\n');
    }
    out
}

pub fn run_evaluation_pipeline(
    source: &dyn PriceSource,
    config: &BacktestConfig,
    output_path: Option<&Path>,
) -> Result<EvaluationTable, CoinfolioError> {
    // Stage 1: Load prices
    let records = source.fetch_prices()?;

    // Stage 2: Evaluate every coin
    let table = evaluate_portfolio(&records, config);
    info!(
        coins = table.len(),
        rows = records.len(),
        short_window = config.short_window,
        long_window = config.long_window,
        "Evaluated portfolio"
    );

    // Stage 3: Write report
    if let Some(path) = output_path {
        report_for(path).write(&table, config, path)?;
        info!("Report written to: {}", path.display());
    }

    Ok(table)
}

pub fn run_prepare_pipeline(
    source: &dyn PriceSource,
    config: &ForecastConfig,
    train_path: &Path,
    test_path: &Path,
) -> Result<TrainTestSplit<Identified<FeatureRow>>, CoinfolioError> {
    let records = source.fetch_prices()?;

    let features = build_features(&records, config.lags);
    if features.is_empty() {
        warn!(lags = config.lags, "no coin has enough history for lag features");
    }

    let tagged = attach_ids(features);
    let split = split_train_test(&tagged, config.train_days);

    write_feature_table(train_path, &split.train, config.lags)?;
    write_feature_table(test_path, &split.test, config.lags)?;
    info!(
        train_rows = split.train.len(),
        test_rows = split.test.len(),
        "Wrote {} and {}",
        train_path.display(),
        test_path.display()
    );

    Ok(split)
}

fn run_evaluate(
    config_path: Option<&Path>,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), CoinfolioError> {
    let adapter = load_config(config_path)?;
    let bt_config = build_backtest_config(&adapter)?;
    let source = CsvAdapter::new(resolve_input(input, &adapter)?);

    info!("Reading prices from {}", source.path().display());
    let table = run_evaluation_pipeline(&source, &bt_config, output)?;

    if table.is_empty() {
        return Err(CoinfolioError::NoData {
            source_name: source.path().display().to_string(),
        });
    }

    print!("{}", render_console_table(&table));
    Ok(())
}

fn run_prepare(
    config_path: Option<&Path>,
    input: Option<&Path>,
    train: &Path,
    test: &Path,
) -> Result<(), CoinfolioError> {
    let adapter = load_config(config_path)?;
    let forecast = build_forecast_config(&adapter)?;
    let source = CsvAdapter::new(resolve_input(input, &adapter)?);

    run_prepare_pipeline(&source, &forecast, train, test)?;
    Ok(())
}

fn run_list_coins(config_path: Option<&Path>, input: Option<&Path>) -> Result<(), CoinfolioError> {
    let adapter = load_config(config_path)?;
    let source = CsvAdapter::new(resolve_input(input, &adapter)?);

    let coins = source.list_coins()?;
    if coins.is_empty() {
        return Err(CoinfolioError::NoData {
            source_name: source.path().display().to_string(),
        });
    }

    for (coin, rows) in &coins {
        println!("{coin}\t{rows}");
    }
    info!("{} coins found", coins.len());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), CoinfolioError> {
    let adapter = load_config(Some(config_path))?;
    validate_config(&adapter)?;

    let bt = build_backtest_config(&adapter)?;
    let forecast = build_forecast_config(&adapter)?;

    println!(
        "evaluation: short_window={} long_window={} share_size={} initial_capital={}",
        bt.short_window, bt.long_window, bt.share_size, bt.initial_capital
    );
    println!("forecast: lags={} train_days={}", forecast.lags, forecast.train_days);
    match adapter.get_string("data", "prices_path") {
        Some(path) => println!("data: prices_path={path}"),
        None => warn!("[data] prices_path not set, --input will be required"),
    }
    info!("Configuration is valid");
    Ok(())
}

fn run_advise(request_path: Option<&Path>) -> Result<(), CoinfolioError> {
    let input = match request_path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    println!("{}", advisor::handle_json(&input)?);
    Ok(())
}
