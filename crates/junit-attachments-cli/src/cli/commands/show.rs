//! `junit-attachments show` - list stored attachments of a class or case.

use anyhow::{Context, Result};
use junit_attachments_core::{load_record, AttachmentQuery, AttachmentView, LocalStore};

use super::read_config;
use crate::cli::args::{OutputFormat, ShowArgs};
use crate::exit_codes::{EXIT_NOT_FOUND, EXIT_SUCCESS};

pub fn run(args: ShowArgs) -> Result<i32> {
    let mut config = read_config(args.config.as_deref())?;
    if args.no_class_level {
        config.display.show_class_level = false;
    }

    let Some(record) = load_record(&args.run_root)
        .with_context(|| format!("loading attachment record of {}", args.run_root.display()))?
    else {
        eprintln!("No attachment record in {}", args.run_root.display());
        return Ok(EXIT_NOT_FOUND);
    };

    let store = LocalStore::for_run(&args.run_root);
    let view = AttachmentView::new(&record, &store, config.display);
    let query = match &args.case_name {
        Some(case_name) => AttachmentQuery::case(&args.class_name, case_name),
        None => AttachmentQuery::class(&args.class_name),
    };

    let resolved = view.resolved_attachments(&query);
    if resolved.is_empty() {
        eprintln!("No attachments for {}", describe(&query));
        return Ok(EXIT_NOT_FOUND);
    }

    match args.format {
        OutputFormat::Text => {
            for entry in &resolved {
                println!("{}\t{}", entry.name, entry.path.display());
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "class": query.class_name(),
                "case": args.case_name,
                "storage_dir": view.storage_dir(&query),
                "attachments": resolved,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(EXIT_SUCCESS)
}

fn describe(query: &AttachmentQuery) -> String {
    match query {
        AttachmentQuery::Class { class_name } => format!("class {}", class_name),
        AttachmentQuery::Case {
            class_name,
            case_name,
        } => format!("{} in class {}", case_name, class_name),
    }
}
