//! `junit-attachments collect` - capture attachments of a finished run.

use anyhow::{Context, Result};
use junit_attachments_core::{
    save_record, AttachmentCollector, LocalStore, LocalWorkspace, RecordingSink, TestRun,
};
use tracing::info;

use super::read_config;
use crate::cli::args::CollectArgs;
use crate::exit_codes::EXIT_SUCCESS;

pub fn run(args: CollectArgs) -> Result<i32> {
    let mut config = read_config(args.config.as_deref())?;
    if args.preserve_dirs {
        config.collect.preserve_directory_structure = true;
    }

    let raw = std::fs::read_to_string(&args.results)
        .with_context(|| format!("failed to read results {}", args.results.display()))?;
    let test_run: TestRun = serde_json::from_str(&raw)
        .with_context(|| format!("invalid results document {}", args.results.display()))?;

    let workspace = LocalWorkspace::new(&args.workspace);
    let store = LocalStore::for_run(&args.run_root);
    let collector = AttachmentCollector::new(&workspace, &store, config.collect);

    let mut sink = RecordingSink::new();
    let index = collector
        .collect(&test_run, &mut sink)
        .with_context(|| format!("collecting attachments into {}", args.run_root.display()))?;

    let written = save_record(&args.run_root, &index)
        .with_context(|| format!("saving attachment record in {}", args.run_root.display()))?;

    if written {
        info!(run = %args.run_root.display(), "saved attachment record");
        println!(
            "Collected {} attachment(s) for {} class(es), {} warning(s)",
            index.file_count(),
            index.class_count(),
            sink.len()
        );
    } else {
        println!("No attachments found, {} warning(s)", sink.len());
    }
    for warning in sink.into_warnings() {
        eprintln!("warning: {}", warning);
    }

    Ok(EXIT_SUCCESS)
}
