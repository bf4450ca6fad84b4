use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "refvault",
    about = "refvault — typed reference documents with generational backups",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base directory holding the document
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Number of backup generations to keep
    #[arg(long, global = true)]
    pub depth: Option<usize>,

    /// Backup subdirectory name
    #[arg(long, global = true)]
    pub backup_dir: Option<String>,

    /// TOML file with base settings; flags override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new empty document and its backup chain
    Init(FileArgs),
    /// Print the references and diagnostics of a document
    Show(ShowArgs),
    /// Add a reference to a document
    Add(AddArgs),
    /// Read a document and write it back, rotating the backups
    Resave(FileArgs),
    /// Show the file layout and which backup generations exist
    Status(FileArgs),
}

#[derive(Args)]
pub struct FileArgs {
    /// Document file name, e.g. refs.json
    pub file: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub target: FileArgs,
    /// Only list references of this type
    #[arg(long = "type")]
    pub kind: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub target: FileArgs,
    #[arg(long)]
    pub id: String,
    #[arg(long = "type")]
    pub kind: String,
    /// JSON object with extra fields
    #[arg(long)]
    pub payload: Option<String>,
}
