//! Per-coin train/test split.

use super::price::{group_rows, Labeled};

/// Leading rows of each coin used for training.
pub const DEFAULT_TRAIN_DAYS: usize = 181;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// For every coin, rows `[0, train_days)` go to `train` and the rest to
/// `test`. Coins are concatenated in first-seen order in both tables.
pub fn split_train_test<T: Labeled + Clone>(rows: &[T], train_days: usize) -> TrainTestSplit<T> {
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (_, mut members) in group_rows(rows) {
        let tail = members.split_off(train_days.min(members.len()));
        train.extend(members);
        test.extend(tail);
    }

    TrainTestSplit { train, test }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        coin: String,
        day: usize,
    }

    impl Labeled for Row {
        fn coin(&self) -> &str {
            &self.coin
        }
    }

    fn coin_rows(coin: &str, n: usize) -> Vec<Row> {
        (0..n)
            .map(|day| Row {
                coin: coin.into(),
                day,
            })
            .collect()
    }

    #[test]
    fn two_hundred_rows() {
        let split = split_train_test(&coin_rows("bitcoin", 200), DEFAULT_TRAIN_DAYS);
        assert_eq!(split.train.len(), 181);
        assert_eq!(split.test.len(), 19);
        assert_eq!(split.train.last().unwrap().day, 180);
        assert_eq!(split.test.first().unwrap().day, 181);
        assert_eq!(split.test.last().unwrap().day, 199);
    }

    #[test]
    fn totals_across_coins() {
        let mut rows = coin_rows("bitcoin", 200);
        rows.extend(coin_rows("ethereum", 190));
        rows.extend(coin_rows("tether", 50));
        let split = split_train_test(&rows, DEFAULT_TRAIN_DAYS);

        assert_eq!(split.train.len(), 181 + 181 + 50);
        assert_eq!(split.test.len(), 19 + 9);
        assert_eq!(split.train.len() + split.test.len(), rows.len());
        assert!(split.test.iter().all(|r| r.coin != "tether"));
    }

    #[test]
    fn coins_stay_contiguous() {
        let mut rows = coin_rows("a", 3);
        rows.extend(coin_rows("b", 3));
        let split = split_train_test(&rows, 2);
        let train: Vec<_> = split.train.iter().map(|r| (r.coin.as_str(), r.day)).collect();
        assert_eq!(train, vec![("a", 0), ("a", 1), ("b", 0), ("b", 1)]);
        let test: Vec<_> = split.test.iter().map(|r| (r.coin.as_str(), r.day)).collect();
        assert_eq!(test, vec![("a", 2), ("b", 2)]);
    }

    #[test]
    fn zero_train_days_sends_all_to_test() {
        let split = split_train_test(&coin_rows("a", 4), 0);
        assert!(split.train.is_empty());
        assert_eq!(split.test.len(), 4);
    }
}
