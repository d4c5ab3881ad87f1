//! Price observations and per-coin grouping.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the input price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub coin: String,
    pub date: NaiveDate,
    #[serde(rename = "prices")]
    pub price: f64,
    #[serde(default)]
    pub total_vol: Option<f64>,
    #[serde(rename = "market_caps", default)]
    pub market_cap: Option<f64>,
}

/// Rows that carry a coin label.
pub trait Labeled {
    fn coin(&self) -> &str;
}

impl Labeled for PriceRecord {
    fn coin(&self) -> &str {
        &self.coin
    }
}

/// The chronological subsequence of records for one coin.
#[derive(Debug, Clone)]
pub struct CoinSeries {
    pub coin: String,
    pub records: Vec<PriceRecord>,
}

impl CoinSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.price).collect()
    }
}

/// Split rows into per-coin groups, keeping first-seen coin order and the
/// input order within each group.
pub fn group_rows<T: Labeled + Clone>(rows: &[T]) -> Vec<(String, Vec<T>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();
    for row in rows {
        match index.get(row.coin()) {
            Some(&i) => groups[i].1.push(row.clone()),
            None => {
                index.insert(row.coin(), groups.len());
                groups.push((row.coin().to_string(), vec![row.clone()]));
            }
        }
    }
    groups
}

pub fn group_by_coin(records: &[PriceRecord]) -> Vec<CoinSeries> {
    group_rows(records)
        .into_iter()
        .map(|(coin, records)| CoinSeries { coin, records })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(coin: &str, day: u32, price: f64) -> PriceRecord {
        PriceRecord {
            coin: coin.into(),
            date: NaiveDate::from_ymd_opt(2021, 3, day).unwrap(),
            price,
            total_vol: None,
            market_cap: None,
        }
    }

    #[test]
    fn groups_in_first_seen_order() {
        let records = vec![
            record("bitcoin", 1, 50.0),
            record("ethereum", 1, 2.0),
            record("bitcoin", 2, 51.0),
            record("tether", 1, 1.0),
            record("ethereum", 2, 2.1),
        ];
        let groups = group_by_coin(&records);

        let coins: Vec<_> = groups.iter().map(|g| g.coin.as_str()).collect();
        assert_eq!(coins, vec!["bitcoin", "ethereum", "tether"]);
        assert_eq!(groups[0].prices(), vec![50.0, 51.0]);
        assert_eq!(groups[1].prices(), vec![2.0, 2.1]);
        assert_eq!(groups[2].len(), 1);
    }

    #[test]
    fn group_keeps_row_order() {
        let records = vec![record("bitcoin", 3, 3.0), record("bitcoin", 1, 1.0)];
        let groups = group_by_coin(&records);
        let dates: Vec<NaiveDate> = groups[0].records.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2021, 3, 3).unwrap(),
                NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(group_by_coin(&[]).is_empty());
    }
}
