use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "treekit",
    version,
    about = "Directory listing and declarative tree creation"
)]
pub struct Cli {
    #[arg(short = 'C', long = "chdir")]
    pub chdir: Option<PathBuf>,
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the regular files directly inside a directory.
    List(ListArgs),
    /// Create a directory tree from a spec and print the reference mapping.
    Build(BuildArgs),
    /// Resolve a spec to its reference mapping using the suffix-based rules.
    Resolve(ResolveArgs),
    /// Spec file helpers.
    Spec {
        #[command(subcommand)]
        command: SpecCommand,
    },
    /// Configuration display and template generation.
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommand>,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    pub directory: PathBuf,
    /// Keep only files whose name ends with this suffix (e.g. `.txt`).
    #[arg(short = 'e', long = "ext")]
    pub extension: Option<String>,
    /// Show size and modification time alongside each path.
    #[arg(short = 'l', long = "long", default_value_t = false)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Spec file path, or the name of an entry in the config `[specs]` table.
    pub spec: String,
    #[arg(long = "root")]
    pub root: Option<PathBuf>,
    /// Create directories only; file entries stay registered but untouched.
    #[arg(long = "no-files", default_value_t = false)]
    pub no_files: bool,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Spec file path, or the name of an entry in the config `[specs]` table.
    pub spec: String,
    #[arg(long = "root")]
    pub root: Option<PathBuf>,
    /// Print paths relative to the root.
    #[arg(long = "strip-root", default_value_t = false)]
    pub strip_root: bool,
    /// Create a directory for every resolved path without an extension.
    #[arg(long = "create", default_value_t = false)]
    pub create: bool,
    /// With --create, also touch files for paths that have an extension.
    #[arg(long = "create-files", default_value_t = false)]
    pub create_files: bool,
}

#[derive(Subcommand, Debug)]
pub enum SpecCommand {
    /// Write the example spec to a path, or print it when no path is given.
    Generate {
        #[arg()]
        path: Option<PathBuf>,
        #[arg(long = "force", default_value_t = false)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Path,
    Generate {
        #[arg()]
        path: Option<PathBuf>,
        #[arg(long = "force", default_value_t = false)]
        force: bool,
    },
    SetRoot {
        root: String,
    },
}

/// Helper entry point so `main` can stay minimal.
pub fn parse() -> Cli {
    Cli::parse()
}
