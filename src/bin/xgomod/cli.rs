//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// xgomod - Inspect and edit XGo module manifests
#[derive(Parser)]
#[command(name = "xgomod")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Never download missing modules
    #[arg(long, global = true)]
    pub offline: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create go.mod for a new module
    Init(InitArgs),

    /// Check the module manifests and rewrite them in canonical form
    Fmt(FmtArgs),

    /// Require a module, optionally importing its classfiles
    Add(AddArgs),

    /// List the classfile bindings of the current module
    Classes(ClassesArgs),

    /// Tell whether files are project or work class files
    Kind(KindArgs),

    /// Find the directory of imported packages
    Lookup(LookupArgs),

    /// Show the effective version of every dependency
    Deps(DepsArgs),

    /// Classify every class file under a directory
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Module path, e.g. github.com/user/game
    pub module_path: String,

    /// Go version for the `go` statement
    #[arg(long = "go", value_name = "VERSION")]
    pub go_version: Option<String>,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct FmtArgs {
    /// Only check; fail if a manifest is invalid or not canonical
    #[arg(long)]
    pub check: bool,

    /// Also reject unknown directives in gox.mod
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Module to require, as path or path@version
    pub module: String,

    /// Fail unless the module is a classfile module
    #[arg(long)]
    pub class: bool,
}

#[derive(Args)]
pub struct ClassesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct KindArgs {
    /// File names to classify
    #[arg(required = true)]
    pub files: Vec<String>,
}

#[derive(Args)]
pub struct LookupArgs {
    /// Import paths to locate
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Print the package id instead of the directory
    #[arg(long)]
    pub id: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Directory to scan (defaults to the module root)
    pub path: Option<PathBuf>,

    /// Also list files that are not class files
    #[arg(long)]
    pub all: bool,
}
