//! `junit-attachments migrate` - rewrite an older attachment record.

use anyhow::{Context, Result};
use junit_attachments_core::migrate_record;

use crate::cli::args::MigrateArgs;
use crate::exit_codes::EXIT_SUCCESS;

pub fn run(args: MigrateArgs) -> Result<i32> {
    let changed = migrate_record(&args.run_root)
        .with_context(|| format!("migrating attachment record of {}", args.run_root.display()))?;
    if changed {
        println!("Migrated attachment record in {}", args.run_root.display());
    } else {
        println!("Attachment record in {} is up to date", args.run_root.display());
    }
    Ok(EXIT_SUCCESS)
}
