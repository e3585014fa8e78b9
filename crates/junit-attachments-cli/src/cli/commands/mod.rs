use super::args::*;

pub mod collect;
pub mod migrate;
pub mod show;

use anyhow::Context;
use junit_attachments_core::{load_config, AttachmentsConfig};
use std::path::Path;

use crate::exit_codes::EXIT_SUCCESS;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Collect(args) => collect::run(args),
        Command::Show(args) => show::run(args),
        Command::Migrate(args) => migrate::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Config from `path`, or defaults when no file was given.
pub(crate) fn read_config(path: Option<&Path>) -> anyhow::Result<AttachmentsConfig> {
    match path {
        Some(path) => {
            load_config(path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(AttachmentsConfig::default()),
    }
}
