//! Dense archive x operator result table and its single writer.

use crate::audit::AuditReport;
use crate::error::{EngineError, Result};
use crate::record::CountMessage;
use serde::Serialize;
use std::collections::BTreeMap;

/// Archive name -> operator name -> running total, both levels in
/// lexicographic key order.
///
/// Every cell exists before counting starts; aggregation only updates cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    cells: BTreeMap<String, BTreeMap<String, u64>>,
}

impl ResultTable {
    /// Zero-initialised table for every archive x operator pair.
    pub fn dense<A, O>(archives: A, operators: &[O]) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        O: AsRef<str>,
    {
        let row: BTreeMap<String, u64> = operators
            .iter()
            .map(|op| (op.as_ref().to_owned(), 0))
            .collect();
        let cells = archives
            .into_iter()
            .map(|a| (a.into(), row.clone()))
            .collect();
        Self { cells }
    }

    /// Add `total` to an existing cell.
    ///
    /// # Errors
    /// `EngineError::MissingCell` when the pair was not pre-initialised.
    pub fn accumulate(&mut self, archive: &str, operator: &str, total: u64) -> Result<()> {
        let cell = self
            .cells
            .get_mut(archive)
            .and_then(|row| row.get_mut(operator))
            .ok_or_else(|| EngineError::MissingCell {
                archive: archive.to_owned(),
                operator: operator.to_owned(),
            })?;
        *cell += total;
        Ok(())
    }

    pub fn get(&self, archive: &str, operator: &str) -> Option<u64> {
        self.cells.get(archive)?.get(operator).copied()
    }

    pub fn row(&self, archive: &str) -> Option<&BTreeMap<String, u64>> {
        self.cells.get(archive)
    }

    pub fn archives(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, u64>)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Final state handed back once the counters have drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub table: ResultTable,
    pub messages: usize,
    pub audit: Option<AuditReport>,
}

/// Sole consumer of count messages.
pub struct Aggregator {
    table: ResultTable,
    messages: usize,
    audit: Option<AuditReport>,
}

impl Aggregator {
    pub fn new(table: ResultTable, audit: Option<AuditReport>) -> Self {
        Self {
            table,
            messages: 0,
            audit,
        }
    }

    pub fn add(&mut self, msg: &CountMessage) -> Result<()> {
        self.table
            .accumulate(&msg.archive, &msg.count.operator, msg.count.total)?;
        self.messages += 1;
        if let Some(audit) = self.audit.as_mut() {
            audit.record(msg);
        }
        Ok(())
    }

    /// Drain `messages` until every sender is gone.
    pub fn consume<I>(mut self, messages: I) -> Result<Aggregate>
    where
        I: IntoIterator<Item = CountMessage>,
    {
        for msg in messages {
            self.add(&msg)?;
        }
        Ok(self.finish())
    }

    pub fn finish(self) -> Aggregate {
        Aggregate {
            table: self.table,
            messages: self.messages,
            audit: self.audit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ContentRecord;

    fn msg(archive: &str, operator: &str, total: u64) -> CountMessage {
        CountMessage::new(&ContentRecord::new(archive, "F.java", ""), operator, total)
    }

    #[test]
    fn test_dense_table_has_every_cell() {
        let table = ResultTable::dense(["b.tar.gz", "a.tar.gz"], &["map", "filter"]);
        assert_eq!(table.len(), 2);
        for archive in ["a.tar.gz", "b.tar.gz"] {
            let ops: Vec<_> = table.row(archive).unwrap().keys().cloned().collect();
            assert_eq!(ops, ["filter", "map"]);
            assert_eq!(table.get(archive, "map"), Some(0));
        }
        assert_eq!(table.archives().collect::<Vec<_>>(), ["a.tar.gz", "b.tar.gz"]);
    }

    #[test]
    fn test_accumulate_adds_instead_of_overwriting() {
        let mut agg = Aggregator::new(ResultTable::dense(["r"], &["map"]), None);
        agg.add(&msg("r", "map", 2)).unwrap();
        agg.add(&msg("r", "map", 3)).unwrap();
        agg.add(&msg("r", "map", 0)).unwrap();
        let out = agg.finish();
        assert_eq!(out.table.get("r", "map"), Some(5));
        assert_eq!(out.messages, 3);
    }

    #[test]
    fn test_unknown_cell_is_rejected() {
        let mut table = ResultTable::dense(["r"], &["map"]);
        assert!(matches!(
            table.accumulate("other", "map", 1),
            Err(EngineError::MissingCell { .. })
        ));
        assert!(matches!(
            table.accumulate("r", "scan", 1),
            Err(EngineError::MissingCell { .. })
        ));
    }

    #[test]
    fn test_serialises_sorted_nested_object() {
        let mut table = ResultTable::dense(["z.tar.gz", "a.tar.gz"], &["map", "filter"]);
        table.accumulate("z.tar.gz", "map", 2).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"{"a.tar.gz":{"filter":0,"map":0},"z.tar.gz":{"filter":0,"map":2}}"#
        );
    }
}
