use std::collections::BTreeMap;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use crate::types::aggregate::AggregateRecord;
use crate::types::symbol::Symbol;

/// Symbol → record map filled concurrently by symbol tasks. A key is written
/// at most once; later writers are refused rather than overwriting.
#[derive(Debug, Default)]
pub struct ResultSet {
    entries: DashMap<Symbol, AggregateRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the symbol already has a record.
    pub fn insert_once(&self, symbol: Symbol, record: AggregateRecord) -> bool {
        match self.entries.entry(symbol) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Key-ordered copy, independent of task completion order
    pub fn to_sorted(&self) -> BTreeMap<Symbol, AggregateRecord> {
        self.entries.iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sum: f64) -> AggregateRecord {
        AggregateRecord {
            sum_24h: sum,
            sum_48h: sum,
            sum_168h: sum,
            current_rate: None,
            interval_hours: None,
            next_payout_time: None,
            ask_notional: 0.0,
            bid_notional: 0.0,
            approximated: false,
        }
    }

    #[test]
    fn second_write_is_refused() {
        let results = ResultSet::new();

        assert!(results.insert_once(Symbol::from("A"), record(1.0)));
        assert!(!results.insert_once(Symbol::from("A"), record(2.0)));

        let stored = results.to_sorted();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[&Symbol::from("A")].sum_24h, 1.0);
    }

    #[test]
    fn sorted_view_orders_by_symbol() {
        let results = ResultSet::new();
        for name in ["C", "A", "B"] {
            results.insert_once(Symbol::from(name), record(0.0));
        }

        let keys: Vec<_> = results.to_sorted().into_keys().map(|s| s.to_string()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }
}
