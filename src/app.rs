// src/app.rs
use crate::args::Args;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::{index, languages, output};
use hashbrown::HashSet;
use log::info;
use opsminer_engine::audit::AuditConfig;
use opsminer_engine::config::PipelineConfigBuilder;
use opsminer_engine::operators::Operators;

/// One complete mining run as described by the config file.
pub fn run(args: &Args) -> Result<()> {
    let config = AppConfig::load(&args.config)?;
    let layout = config.layout();
    info!(
        "opsminer v{} mining {} ({})",
        crate::VERSION,
        config.distribution,
        config.file_extensions.join(", ")
    );

    let table = languages::load(&layout.languages_file)?;
    let extensions = languages::resolve(&table, &config.file_extensions);
    if extensions.is_empty() {
        return Err(AppError::Config(format!(
            "no file extensions known for {}",
            config.file_extensions.join(", ")
        )));
    }

    let operators = Operators::load_from_dir(&layout.operators_dir, &config.distribution)?;
    info!("Loaded {} operators", operators.len());

    let mut builder = PipelineConfigBuilder::default();
    builder
        .archives_dir(layout.archives_dir.clone())
        .distribution(config.distribution.clone())
        .allowed_extensions(extensions)
        .known_archives(index::load_known_archives(&layout.archive_index)?)
        .excluded_archives(
            config
                .excluded_archives
                .iter()
                .cloned()
                .collect::<HashSet<_>>(),
        )
        .counter_workers(config.counter_workers);
    if let Some(workers) = config.workers {
        builder.workers(workers);
    }
    if let Some(capacity) = config.queue_capacity {
        builder.queue_capacity(capacity);
    }
    if let Some(limit) = config.backtrack_limit {
        builder.backtrack_limit(limit);
    }
    if args.check_false_positives {
        builder.audit(AuditConfig::load_sample(&layout.audit_sample())?);
    }
    let pipeline = builder
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let outcome = opsminer_engine::run(&pipeline, &operators)?;
    info!(
        "Number of processed files: {}",
        outcome.files_processed(&operators)
    );

    let path = output::write_results(
        &layout.results_dir,
        &config.distribution,
        &config.file_extensions,
        &outcome.table,
    )?;
    info!("Results written to {}", path.display());

    if let Some(report) = &outcome.audit {
        let path = layout.audit_output();
        output::write_audit(&path, report)?;
        info!("False-positive report written to {}", path.display());
    }
    Ok(())
}
