//! Per-operator counting pools and the broadcast feeding them.

use crate::error::{EngineError, Result};
use crate::record::{ContentRecord, CountMessage};
use crate::scan;
use crate::stage::{Emitter, Stage};
use crossbeam_channel::{Receiver, Sender};
use fancy_regex::{Regex, RegexBuilder};
use log::warn;
use std::sync::Arc;

/// Call-like use of `operator`: the name, optional whitespace, then `(` or a
/// trailing-closure `{`. The look-behind rejects names that merely end with
/// the operator (`flatMap` is not `map`).
pub fn operator_regex(operator: &str, backtrack_limit: usize) -> Result<Regex> {
    let pattern = format!(r"(?<!\w){}\s*[({{]", regex::escape(operator));
    Ok(RegexBuilder::new(&pattern)
        .backtrack_limit(backtrack_limit)
        .build()?)
}

/// Number of non-overlapping matches of `re`, the pattern built for
/// `operator`. When the pattern gives up on a huge text the call sites are
/// counted by a linear scan instead.
pub fn count_occurrences(re: &Regex, operator: &str, text: &str) -> Result<u64> {
    let mut total = 0;
    for m in re.find_iter(text) {
        match m {
            Ok(_) => total += 1,
            Err(fancy_regex::Error::RuntimeError(e)) => {
                warn!(
                    "count {operator}: pattern gave up on {} bytes ({e}); using linear scan",
                    text.len()
                );
                return Ok(scan::count_call_sites(text, operator));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(total)
}

/// Counting worker of one operator's pool. Workers of a pool share the
/// compiled pattern.
pub struct OperatorCounter {
    operator: Arc<str>,
    re: Arc<Regex>,
}

impl OperatorCounter {
    pub fn new(operator: Arc<str>, re: Arc<Regex>) -> Self {
        Self { operator, re }
    }

    /// `workers` counters for `operator`, built around one compiled pattern.
    pub fn pool(operator: &str, workers: usize, backtrack_limit: usize) -> Result<Vec<Self>> {
        let re = Arc::new(operator_regex(operator, backtrack_limit)?);
        let operator: Arc<str> = Arc::from(operator);
        Ok((0..workers)
            .map(|_| Self::new(Arc::clone(&operator), Arc::clone(&re)))
            .collect())
    }
}

impl Stage for OperatorCounter {
    type Input = Arc<ContentRecord>;
    type Output = CountMessage;
    const NAME: &'static str = "count";

    /// Always emits, zero counts included, so every cell receives a message.
    fn process(&mut self, record: Arc<ContentRecord>, out: &Emitter<CountMessage>) -> Result<()> {
        let total = count_occurrences(&self.re, &self.operator, &record.content)?;
        out.emit(CountMessage::new(&record, &self.operator, total))
    }
}

/// Deliver every record to every operator pool, then close all pool inputs.
pub fn broadcast(input: Receiver<ContentRecord>, pools: Vec<Sender<Arc<ContentRecord>>>) -> Result<usize> {
    let mut records = 0;
    for record in input {
        let shared = Arc::new(record);
        for pool in &pools {
            pool.send(Arc::clone(&shared))
                .map_err(|_| EngineError::Disconnected("broadcast"))?;
        }
        records += 1;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::DEFAULT_BACKTRACK_LIMIT;

    fn count(operator: &str, text: &str) -> u64 {
        let re = operator_regex(operator, DEFAULT_BACKTRACK_LIMIT).unwrap();
        count_occurrences(&re, operator, text).unwrap()
    }

    #[test]
    fn test_call_forms_are_counted() {
        assert_eq!(count("map", "a.map(f)"), 1);
        assert_eq!(count("map", "a.map (f)"), 1);
        assert_eq!(count("map", "a.map{ $0 }"), 1);
        assert_eq!(count("map", "a.map\n  { $0 }"), 1);
        assert_eq!(count("map", "map(x).map(y)"), 2);
    }

    #[test]
    fn test_word_boundary() {
        assert_eq!(count("map", "a.flatMap(f)"), 0);
        assert_eq!(count("map", "a.mapError(f)"), 0);
        assert_eq!(count("map", "a.flatmap(f)"), 0);
        assert_eq!(count("map", "a._map(f)"), 0);
        assert_eq!(count("map", "val map = 1"), 0);
    }

    #[test]
    fn test_operator_name_is_escaped() {
        assert_eq!(count("$map", "x.$map(y)"), 1);
        assert_eq!(count("a.b", "aXb(1)"), 0);
    }

    #[test]
    fn test_zero_count_still_emitted() {
        let mut counters = OperatorCounter::pool("filter", 1, DEFAULT_BACKTRACK_LIMIT).unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();
        let record = Arc::new(ContentRecord::new("r.tar.gz", "A.java", "x.map(y)"));
        counters[0]
            .process(record, &Emitter::new(tx, OperatorCounter::NAME))
            .unwrap();

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.archive, "r.tar.gz");
        assert_eq!(msg.count.operator, "filter");
        assert_eq!(msg.count.total, 0);
    }

    #[test]
    fn test_broadcast_reaches_every_pool() {
        let (in_tx, in_rx) = crossbeam_channel::unbounded();
        let (a_tx, a_rx) = crossbeam_channel::unbounded();
        let (b_tx, b_rx) = crossbeam_channel::unbounded();
        in_tx.send(ContentRecord::new("r", "A", "1")).unwrap();
        in_tx.send(ContentRecord::new("r", "B", "2")).unwrap();
        drop(in_tx);

        assert_eq!(broadcast(in_rx, vec![a_tx, b_tx]).unwrap(), 2);
        assert_eq!(a_rx.iter().count(), 2);
        let b: Vec<_> = b_rx.iter().map(|r| r.inner_file.clone()).collect();
        assert_eq!(b, ["A", "B"]);
    }
}
