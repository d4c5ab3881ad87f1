//! Column operations over numeric series.
//!
//! A series is a `Vec<Option<f64>>`; `None` marks an undefined entry (no prior
//! value, window not yet filled). The cumulative operations skip undefined
//! entries and leave them undefined in the output, carrying the running value
//! over to the next defined entry.

pub type Series = Vec<Option<f64>>;

/// Wrap plain values as a fully defined series.
pub fn defined(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

/// Fractional change from the previous entry. The first entry is undefined.
pub fn pct_change(values: &[Option<f64>]) -> Series {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let change = match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
            (Some(prev), Some(curr)) => Some(curr / prev - 1.0),
            _ => None,
        };
        out.push(change);
    }
    out
}

/// Trailing simple moving average.
/// SMA(n)[i] = sum(x[i-n+1..=i]) / n
/// Warmup: first (n-1) entries are undefined.
pub fn rolling_mean(values: &[f64], window: usize) -> Series {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut window_sum = 0.0;
    for (i, &value) in values.iter().enumerate() {
        window_sum += value;
        if i >= window {
            window_sum -= values[i - window];
        }
        if i + 1 >= window {
            out[i] = Some(window_sum / window as f64);
        }
    }
    out
}

/// First difference: x[i] - x[i-1]. The first entry is undefined.
pub fn diff(values: &[Option<f64>]) -> Series {
    (0..values.len())
        .map(|i| match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
            (Some(prev), Some(curr)) => Some(curr - prev),
            _ => None,
        })
        .collect()
}

pub fn cumsum(values: &[Option<f64>]) -> Series {
    let mut total = 0.0;
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                total += x;
                total
            })
        })
        .collect()
}

pub fn cumprod(values: &[Option<f64>]) -> Series {
    let mut product = 1.0;
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                product *= x;
                product
            })
        })
        .collect()
}

/// Element-wise combination; undefined where either side is undefined.
pub fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Series {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Apply `f` to every defined entry.
pub fn map_defined(values: &[Option<f64>], f: impl Fn(f64) -> f64) -> Series {
    values.iter().map(|v| v.map(&f)).collect()
}

/// Defined, non-NaN values in order.
pub fn present(values: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    values.iter().filter_map(|v| v.filter(|x| !x.is_nan()))
}
