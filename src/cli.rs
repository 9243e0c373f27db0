use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::page::{DEFAULT_ASSET_PREFIX, PageLayout};
use crate::question_code::{GroupingMode, ValidityRule};

#[derive(Parser, Debug)]
#[command(
    name = "qbank",
    version,
    about = "Compile question-bank exports into consolidated HTML pages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Compile(CompileArgs),
    Codes(CodesArgs),
    Inventory(InventoryArgs),
}

/// Seed page and question selection, shared by `compile` and `codes`.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Seed page as a filesystem path or a file:// URL.
    pub source: String,

    #[arg(long, value_enum, default_value_t = PageLayout::Rows)]
    pub layout: PageLayout,

    #[arg(long, value_enum, default_value_t = GroupingMode::TrailingLetter)]
    pub grouping: GroupingMode,

    #[arg(long, value_enum, default_value_t = ValidityRule::QuestionNumber)]
    pub validity: ValidityRule,

    #[arg(long, default_value_t = false)]
    pub strict_parsing: bool,

    #[arg(long, default_value_t = false)]
    pub include_subsections: bool,

    /// Substring filter; accepts a JSON array or a comma-separated list.
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Directory holding the per-question fragment files.
    #[arg(long)]
    pub fragment_dir: Option<PathBuf>,

    /// Reference-code manifest written by `inventory`.
    #[arg(long)]
    pub corpus_manifest: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long, default_value = "copy.html")]
    pub output: PathBuf,

    #[arg(long, default_value = DEFAULT_ASSET_PREFIX)]
    pub asset_prefix: String,

    /// Replacement for the asset prefix; links are left alone when unset.
    #[arg(long)]
    pub asset_root: Option<String>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CodesArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long)]
    pub fragment_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
