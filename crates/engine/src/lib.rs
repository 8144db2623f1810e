// crates/engine/src/lib.rs
use crossbeam_channel::bounded;
use log::info;
use std::sync::Arc;
use std::thread;

pub mod aggregate;
pub mod archive;
pub mod audit;
pub mod config;
pub mod counter;
pub mod error;
pub mod import;
pub mod operators;
pub mod record;
pub mod scan;
pub mod stage;
pub mod strip;

use crate::aggregate::{Aggregator, ResultTable};
use crate::archive::ArchiveExtractor;
use crate::audit::{AuditReport, InspectedLib};
use crate::config::PipelineConfig;
use crate::counter::OperatorCounter;
use crate::error::{EngineError, Result};
use crate::import::{ImportFilter, import_regex};
use crate::operators::Operators;
use crate::stage::spawn_pool;
use crate::strip::{CommentStripper, StringStripper};

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub table: ResultTable,
    /// Count messages folded into the table.
    pub messages: usize,
    pub audit: Option<AuditReport>,
}

impl PipelineOutcome {
    /// Records that reached the counters.
    pub fn files_processed(&self, operators: &Operators) -> usize {
        self.messages / operators.len().max(1)
    }
}

/// Run the mining pipeline to completion.
///
/// extract -> strip comments -> check import -> strip strings -> broadcast
/// to one counting pool per operator -> aggregate. Every arrow is a bounded
/// channel; each pool's workers share its input and merge into its output.
///
/// # Errors
///
/// Any archive-level failure aborts the run: no partial table is returned.
pub fn run(config: &PipelineConfig, operators: &Operators) -> Result<PipelineOutcome> {
    config.validate()?;
    let cap = config.queue_capacity;
    let workers = config.workers;

    let archives = archive::list_archives(&config.archives_dir, &config.excluded_archives)?;
    let known: Vec<String> = match &config.known_archives {
        Some(names) => names
            .iter()
            .filter(|n| !config.excluded_archives.contains(*n))
            .cloned()
            .collect(),
        None => archives.iter().map(|a| a.name.clone()).collect(),
    };
    let table = ResultTable::dense(known, operators.names());

    let counter_workers = config.counter_workers_for(operators.len());
    info!(
        "Mining {} archive(s) for {} operator(s) of {} ({} workers per stage, {} per operator)",
        archives.len(),
        operators.len(),
        config.distribution,
        workers,
        counter_workers
    );

    let inspected: Option<Arc<[InspectedLib]>> = match config.audit {
        Some(_) => Some(audit::inspected_libs()?.into()),
        None => None,
    };
    let report = config.audit.as_ref().map(AuditReport::new);

    // archive list
    let (archive_tx, archive_rx) = bounded(archives.len().max(1));
    for entry in archives {
        archive_tx
            .send(entry)
            .map_err(|_| EngineError::Disconnected("list-archives"))?;
    }
    drop(archive_tx);

    // extraction
    let allowed = Arc::new(config.allowed_extensions.clone());
    let (raw_tx, raw_rx) = bounded(cap);
    let extract = spawn_pool(
        (0..workers)
            .map(|_| ArchiveExtractor::new(Arc::clone(&allowed)))
            .collect(),
        &archive_rx,
        raw_tx,
    )?;
    drop(archive_rx);

    // comments; one compiled pattern per worker
    let (uncommented_tx, uncommented_rx) = bounded(cap);
    let comments = spawn_pool(
        (0..workers)
            .map(|_| CommentStripper::new(config.backtrack_limit))
            .collect::<Result<Vec<_>>>()?,
        &raw_rx,
        uncommented_tx,
    )?;
    drop(raw_rx);

    // imports, checked while string literals are still present
    let import_re = import_regex(&config.distribution)?;
    let (imported_tx, imported_rx) = bounded(cap);
    let imports = spawn_pool(
        (0..workers)
            .map(|_| {
                let filter = ImportFilter::new(import_re.clone());
                match &inspected {
                    Some(libs) => filter.with_audit(Arc::clone(libs)),
                    None => filter,
                }
            })
            .collect(),
        &uncommented_rx,
        imported_tx,
    )?;
    drop(uncommented_rx);

    // strings
    let (cleaned_tx, cleaned_rx) = bounded(cap);
    let strings = spawn_pool(
        (0..workers)
            .map(|_| StringStripper::new(config.backtrack_limit))
            .collect::<Result<Vec<_>>>()?,
        &imported_rx,
        cleaned_tx,
    )?;
    drop(imported_rx);

    // one counting pool per operator, all merged into `counts`
    let (counts_tx, counts_rx) = bounded(cap);
    let mut pool_inputs = Vec::with_capacity(operators.len());
    let mut counters = Vec::with_capacity(operators.len());
    for name in operators.names() {
        let (op_tx, op_rx) = bounded(cap);
        let pool = OperatorCounter::pool(name, counter_workers, config.backtrack_limit)?;
        counters.push(spawn_pool(pool, &op_rx, counts_tx.clone())?);
        pool_inputs.push(op_tx);
    }
    drop(counts_tx);

    let broadcaster = thread::Builder::new()
        .name("broadcast".into())
        .spawn(move || counter::broadcast(cleaned_rx, pool_inputs))?;

    let aggregated = Aggregator::new(table, report).consume(counts_rx);

    let mut errors = Vec::new();
    let mut note = |res: Result<()>| {
        if let Err(e) = res {
            errors.push(e);
        }
    };
    note(extract.join().map(drop));
    note(comments.join().map(drop));
    let filters = match imports.join() {
        Ok(filters) => Some(filters),
        Err(e) => {
            note(Err(e));
            None
        }
    };
    note(strings.join().map(drop));
    note(match broadcaster.join() {
        Ok(res) => res.map(drop),
        Err(_) => Err(EngineError::WorkerPanic("broadcast")),
    });
    for pool in counters {
        note(pool.join().map(drop));
    }

    let mut aggregate = match aggregated {
        Ok(aggregate) if errors.is_empty() => aggregate,
        Ok(_) => return Err(root_cause(errors)),
        Err(e) => {
            errors.insert(0, e);
            return Err(root_cause(errors));
        }
    };

    if let (Some(report), Some(libs), Some(filters)) =
        (aggregate.audit.as_mut(), inspected.as_deref(), filters.as_deref())
    {
        for filter in filters {
            report.add_import_tallies(libs, filter.tallies());
        }
        for (lib, files) in &report.import_counts {
            info!("{lib} File Count: {files}");
        }
    }

    Ok(PipelineOutcome {
        table: aggregate.table,
        messages: aggregate.messages,
        audit: aggregate.audit,
    })
}

/// Prefer a failure that is not merely a stage noticing its neighbour died.
/// `errors` is never empty here.
fn root_cause(mut errors: Vec<EngineError>) -> EngineError {
    let idx = errors
        .iter()
        .position(|e| !matches!(e, EngineError::Disconnected(_)))
        .unwrap_or(0);
    errors.swap_remove(idx)
}
