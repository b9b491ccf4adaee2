//! The summary engine: point-in-time aggregate statistics over the full
//! ledger.
//!
//! The report is derived on demand from a single scan of the store, not
//! maintained incrementally.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use serde::Serialize;

use crate::{EntryFilter, FetchMode, LedgerStore, Tag};

/// Aggregate statistics over every entry in a [LedgerStore].
///
/// Note that `total_credit_count` and `total_debit_count` are row counts,
/// not monetary totals. Per-sender monetary totals live in
/// `credited_amount_by_sender` and `debited_amount_by_sender`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SummaryReport {
    /// The number of stored entries.
    pub total_transactions: usize,
    /// The number of entries tagged CREDIT.
    pub total_credit_count: usize,
    /// The number of entries tagged DEBIT.
    pub total_debit_count: usize,
    /// The unique `from_person` values across all entries.
    pub distinct_senders: BTreeSet<String>,
    /// The unique `to_person` values across all entries.
    pub distinct_receivers: BTreeSet<String>,
    /// For each distinct sender, the sum of amounts over their CREDIT
    /// entries. Every distinct sender has a key, defaulting to zero.
    pub credited_amount_by_sender: BTreeMap<String, f64>,
    /// For each distinct sender, the sum of amounts over their DEBIT
    /// entries. Every distinct sender has a key, defaulting to zero.
    pub debited_amount_by_sender: BTreeMap<String, f64>,
}

/// Compute an aggregate snapshot over the full contents of `store`.
///
/// Performs one full scan and groups in memory. The engine does no error
/// handling of its own: if the read fails, the failure is logged and the
/// empty report is returned.
pub fn summarize(store: &LedgerStore) -> SummaryReport {
    let entries = match store.query(&EntryFilter::all(), FetchMode::All) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::error!("could not read entries for summary: {error}");
            return SummaryReport::default();
        }
    };

    let mut report = SummaryReport {
        total_transactions: entries.len(),
        ..Default::default()
    };

    for entry in &entries {
        match entry.tag {
            Tag::Credit => report.total_credit_count += 1,
            Tag::Debit => report.total_debit_count += 1,
        }

        report.distinct_senders.insert(entry.from_person.clone());
        report.distinct_receivers.insert(entry.to_person.clone());
    }

    // Every sender appears in both maps, even with nothing on one side.
    for sender in &report.distinct_senders {
        report
            .credited_amount_by_sender
            .insert(sender.clone(), 0.0);
        report.debited_amount_by_sender.insert(sender.clone(), 0.0);
    }

    for entry in &entries {
        let by_sender = match entry.tag {
            Tag::Credit => &mut report.credited_amount_by_sender,
            Tag::Debit => &mut report.debited_amount_by_sender,
        };

        if let Some(total) = by_sender.get_mut(&entry.from_person) {
            *total += entry.amount;
        }
    }

    report
}

impl Display for SummaryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Transactions: {}", self.total_transactions)?;
        writeln!(
            f,
            "Credits: {}, Debits: {}",
            self.total_credit_count, self.total_debit_count
        )?;
        writeln!(
            f,
            "Senders: {}",
            self.distinct_senders
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(
            f,
            "Receivers: {}",
            self.distinct_receivers
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )?;

        for sender in &self.distinct_senders {
            let credited = self
                .credited_amount_by_sender
                .get(sender)
                .copied()
                .unwrap_or_default();
            let debited = self
                .debited_amount_by_sender
                .get(sender)
                .copied()
                .unwrap_or_default();
            writeln!(f, "{sender}: credited {credited:.2}, debited {debited:.2}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod summary_tests {
    use crate::{LedgerEntry, LedgerStore, Tag};

    use super::{SummaryReport, summarize};

    fn get_test_store() -> LedgerStore {
        LedgerStore::in_memory().unwrap()
    }

    #[test]
    fn empty_store_yields_empty_report() {
        let store = get_test_store();

        let report = summarize(&store);

        assert_eq!(report, SummaryReport::default());
        assert_eq!(report.total_transactions, 0);
        assert!(report.distinct_senders.is_empty());
    }

    #[test]
    fn summarizes_counts_names_and_per_sender_amounts() {
        let store = get_test_store();
        assert!(store.insert(LedgerEntry::build("Rudran", "Parvathi", 100.0, Tag::Credit)));
        assert!(store.insert(LedgerEntry::build("Rudran", "Shakthi", 50.0, Tag::Debit)));
        assert!(store.insert(LedgerEntry::build("Yogi", "Devi", 200.0, Tag::Credit)));

        let report = summarize(&store);

        assert_eq!(report.total_transactions, 3);
        assert_eq!(report.total_credit_count, 2);
        assert_eq!(report.total_debit_count, 1);

        let senders: Vec<_> = report.distinct_senders.iter().cloned().collect();
        assert_eq!(senders, vec!["Rudran".to_string(), "Yogi".to_string()]);

        let receivers: Vec<_> = report.distinct_receivers.iter().cloned().collect();
        assert_eq!(
            receivers,
            vec![
                "Devi".to_string(),
                "Parvathi".to_string(),
                "Shakthi".to_string()
            ]
        );

        assert_eq!(report.credited_amount_by_sender["Rudran"], 100.0);
        assert_eq!(report.debited_amount_by_sender["Rudran"], 50.0);
        assert_eq!(report.credited_amount_by_sender["Yogi"], 200.0);
    }

    #[test]
    fn every_sender_appears_in_both_amount_maps() {
        let store = get_test_store();
        // Yogi only ever credits; the debit map must still carry a zero for
        // him.
        assert!(store.insert(LedgerEntry::build("Yogi", "Devi", 200.0, Tag::Credit)));

        let report = summarize(&store);

        assert_eq!(report.credited_amount_by_sender["Yogi"], 200.0);
        assert_eq!(report.debited_amount_by_sender["Yogi"], 0.0);
    }

    #[test]
    fn credit_and_debit_totals_are_row_counts_not_sums() {
        let store = get_test_store();
        assert!(store.insert(LedgerEntry::build("A", "B", 1000.0, Tag::Credit)));
        assert!(store.insert(LedgerEntry::build("A", "B", 2000.0, Tag::Credit)));

        let report = summarize(&store);

        // Two credit rows, regardless of their amounts.
        assert_eq!(report.total_credit_count, 2);
    }

    #[test]
    fn amounts_accumulate_across_multiple_entries() {
        let store = get_test_store();
        assert!(store.insert(LedgerEntry::build("Rudran", "Parvathi", 100.0, Tag::Credit)));
        assert!(store.insert(LedgerEntry::build("Rudran", "Devi", 25.5, Tag::Credit)));
        assert!(store.insert(LedgerEntry::build("Rudran", "Shakthi", -10.0, Tag::Credit)));

        let report = summarize(&store);

        assert_eq!(report.credited_amount_by_sender["Rudran"], 115.5);
    }

    #[test]
    fn display_includes_headline_numbers() {
        let store = get_test_store();
        assert!(store.insert(LedgerEntry::build("Rudran", "Parvathi", 100.0, Tag::Credit)));

        let rendered = summarize(&store).to_string();

        assert!(rendered.contains("Transactions: 1"));
        assert!(rendered.contains("Credits: 1, Debits: 0"));
        assert!(rendered.contains("Rudran: credited 100.00, debited 0.00"));
    }

    #[test]
    fn report_serializes_to_json() {
        let store = get_test_store();
        assert!(store.insert(LedgerEntry::build("Rudran", "Parvathi", 100.0, Tag::Credit)));

        let json = serde_json::to_value(summarize(&store)).unwrap();

        assert_eq!(json["total_transactions"], 1);
        assert_eq!(json["credited_amount_by_sender"]["Rudran"], 100.0);
    }
}
