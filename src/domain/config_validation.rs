//! Configuration validation.
//!
//! Every key is optional; a key that is present must parse and be in range.

use crate::domain::backtest::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::domain::error::CoinfolioError;
use crate::ports::config_port::ConfigPort;

pub fn validate_evaluation_config(config: &dyn ConfigPort) -> Result<(), CoinfolioError> {
    validate_windows(config)?;
    validate_share_size(config)?;
    validate_initial_capital(config)?;
    Ok(())
}

pub fn validate_forecast_config(config: &dyn ConfigPort) -> Result<(), CoinfolioError> {
    validate_lags(config)?;
    validate_train_days(config)?;
    Ok(())
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), CoinfolioError> {
    validate_evaluation_config(config)?;
    validate_forecast_config(config)?;
    Ok(())
}

/// The key's integer value, `None` when absent.
fn int_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, CoinfolioError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| {
            CoinfolioError::invalid(section, key, format!("expected an integer, got {raw:?}"))
        }),
    }
}

fn float_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, CoinfolioError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(CoinfolioError::invalid(
                section,
                key,
                format!("expected a number, got {raw:?}"),
            )),
        },
    }
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), CoinfolioError> {
    let short = int_value(config, "evaluation", "short_window")?
        .unwrap_or(DEFAULT_SHORT_WINDOW as i64);
    let long = int_value(config, "evaluation", "long_window")?
        .unwrap_or(DEFAULT_LONG_WINDOW as i64);

    if short < 1 {
        return Err(CoinfolioError::invalid(
            "evaluation",
            "short_window",
            "short_window must be at least 1",
        ));
    }
    if long < 1 {
        return Err(CoinfolioError::invalid(
            "evaluation",
            "long_window",
            "long_window must be at least 1",
        ));
    }
    if short >= long {
        return Err(CoinfolioError::invalid(
            "evaluation",
            "short_window",
            "short_window must be less than long_window",
        ));
    }
    Ok(())
}

fn validate_share_size(config: &dyn ConfigPort) -> Result<(), CoinfolioError> {
    if let Some(value) = float_value(config, "evaluation", "share_size")? {
        if value == 0.0 {
            return Err(CoinfolioError::invalid(
                "evaluation",
                "share_size",
                "share_size must be non-zero",
            ));
        }
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), CoinfolioError> {
    if let Some(value) = float_value(config, "evaluation", "initial_capital")? {
        if value <= 0.0 {
            return Err(CoinfolioError::invalid(
                "evaluation",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_lags(config: &dyn ConfigPort) -> Result<(), CoinfolioError> {
    if let Some(value) = int_value(config, "forecast", "lags")? {
        if value < 1 {
            return Err(CoinfolioError::invalid(
                "forecast",
                "lags",
                "lags must be at least 1",
            ));
        }
    }
    Ok(())
}

fn validate_train_days(config: &dyn ConfigPort) -> Result<(), CoinfolioError> {
    if let Some(value) = int_value(config, "forecast", "train_days")? {
        if value < 0 {
            return Err(CoinfolioError::invalid(
                "forecast",
                "train_days",
                "train_days must be non-negative",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(result: Result<(), CoinfolioError>) -> String {
        match result {
            Err(CoinfolioError::ConfigInvalid { key, .. }) => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_config(&FileConfigAdapter::empty()).is_ok());
    }

    #[test]
    fn full_config_is_valid() {
        let config = make_config(
            "[evaluation]\nshort_window = 20\nlong_window = 40\nshare_size = 100\n\
             initial_capital = 5000\n[forecast]\nlags = 5\ntrain_days = 90\n",
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn short_window_zero_fails() {
        let config = make_config("[evaluation]\nshort_window = 0\n");
        assert_eq!(invalid_key(validate_evaluation_config(&config)), "short_window");
    }

    #[test]
    fn short_not_below_long_fails() {
        let config = make_config("[evaluation]\nshort_window = 100\nlong_window = 100\n");
        assert_eq!(invalid_key(validate_evaluation_config(&config)), "short_window");
    }

    #[test]
    fn short_window_against_default_long() {
        let config = make_config("[evaluation]\nshort_window = 150\n");
        assert!(validate_evaluation_config(&config).is_err());
    }

    #[test]
    fn non_numeric_window_fails() {
        let config = make_config("[evaluation]\nlong_window = lots\n");
        assert_eq!(invalid_key(validate_evaluation_config(&config)), "long_window");
    }

    #[test]
    fn zero_share_size_fails() {
        let config = make_config("[evaluation]\nshare_size = 0\n");
        assert_eq!(invalid_key(validate_evaluation_config(&config)), "share_size");
    }

    #[test]
    fn negative_share_size_is_a_short() {
        let config = make_config("[evaluation]\nshare_size = -500\n");
        assert!(validate_evaluation_config(&config).is_ok());
    }

    #[test]
    fn non_positive_capital_fails() {
        let config = make_config("[evaluation]\ninitial_capital = 0\n");
        assert_eq!(invalid_key(validate_evaluation_config(&config)), "initial_capital");
    }

    #[test]
    fn zero_lags_fails() {
        let config = make_config("[forecast]\nlags = 0\n");
        assert_eq!(invalid_key(validate_forecast_config(&config)), "lags");
    }

    #[test]
    fn negative_train_days_fails() {
        let config = make_config("[forecast]\ntrain_days = -1\n");
        assert_eq!(invalid_key(validate_forecast_config(&config)), "train_days");
    }

    #[test]
    fn zero_train_days_allowed() {
        let config = make_config("[forecast]\ntrain_days = 0\n");
        assert!(validate_forecast_config(&config).is_ok());
    }
}
