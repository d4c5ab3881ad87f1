//! Stable integer ids for coin labels.

use std::collections::HashMap;

use super::price::Labeled;

/// A row tagged with its coin id.
#[derive(Debug, Clone, PartialEq)]
pub struct Identified<T> {
    pub coin_id: u32,
    pub row: T,
}

impl<T: Labeled> Labeled for Identified<T> {
    fn coin(&self) -> &str {
        self.row.coin()
    }
}

/// One id per row. Ids start at 1 and follow first-seen coin order.
pub fn assign_ids<T: Labeled>(rows: &[T]) -> Vec<u32> {
    let mut ids: HashMap<&str, u32> = HashMap::new();
    rows.iter()
        .map(|row| {
            let next = ids.len() as u32 + 1;
            *ids.entry(row.coin()).or_insert(next)
        })
        .collect()
}

pub fn attach_ids<T: Labeled>(rows: Vec<T>) -> Vec<Identified<T>> {
    let ids = assign_ids(&rows);
    ids.into_iter()
        .zip(rows)
        .map(|(coin_id, row)| Identified { coin_id, row })
        .collect()
}
