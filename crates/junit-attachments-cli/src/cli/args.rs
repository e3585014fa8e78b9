use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "junit-attachments",
    version,
    about = "Capture, store and look up attachments of JUnit-style test runs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Collect attachments of a finished run into its run directory
    Collect(CollectArgs),
    /// List the attachments of a class or test case
    Show(ShowArgs),
    /// Rewrite an older attachment record in the current format
    Migrate(MigrateArgs),
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Test results document (JSON)
    #[arg(long)]
    pub results: PathBuf,

    /// Workspace the tests ran in; marker paths resolve against it
    #[arg(long, env = "JUNIT_ATTACHMENTS_WORKSPACE")]
    pub workspace: PathBuf,

    /// Durable run directory (attachments go to <run-root>/junit-attachments)
    #[arg(long, env = "JUNIT_ATTACHMENTS_RUN_ROOT")]
    pub run_root: PathBuf,

    /// YAML configuration file
    #[arg(long, env = "JUNIT_ATTACHMENTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keep the directory structure of marker attachments
    #[arg(long)]
    pub preserve_dirs: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(long, env = "JUNIT_ATTACHMENTS_RUN_ROOT")]
    pub run_root: PathBuf,

    /// Fully-qualified class name
    #[arg(long = "class")]
    pub class_name: String,

    /// Test case name; omit for the merged class view
    #[arg(long = "case")]
    pub case_name: Option<String>,

    #[arg(long, env = "JUNIT_ATTACHMENTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hide the merged class-level list
    #[arg(long)]
    pub no_class_level: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    #[arg(long, env = "JUNIT_ATTACHMENTS_RUN_ROOT")]
    pub run_root: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
