use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};

use crate::cli::{BuildArgs, Cli, Command, ConfigCommand, ListArgs, ResolveArgs, SpecCommand};
use crate::config::{self, TreekitConfig};
use crate::list;
use crate::templates;
use crate::tree::{DirectoryTree, TreeSpec, create_tree};

const CONFIG_DIR: &str = ".treekit";
const CONFIG_FILENAME: &str = "config.toml";
const EXAMPLE_SPEC_TEMPLATE: &str = "tree/example.tree.json";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ConfigPathSource {
    Explicit,
    Discovered,
    HomeDefault,
}

impl ConfigPathSource {
    fn as_str(&self) -> &'static str {
        match self {
            ConfigPathSource::Explicit => "explicit",
            ConfigPathSource::Discovered => "discovered",
            ConfigPathSource::HomeDefault => "home-default",
        }
    }
}

#[derive(Clone, Debug)]
struct ResolvedConfigPath {
    path: Utf8PathBuf,
    source: ConfigPathSource,
}

struct CliContext {
    chdir: Option<PathBuf>,
    file: Option<PathBuf>,
    verbose: u8,
}

impl From<&Cli> for CliContext {
    fn from(cli: &Cli) -> Self {
        Self {
            chdir: cli.chdir.clone(),
            file: cli.file.clone(),
            verbose: cli.verbose,
        }
    }
}

impl CliContext {
    fn apply_chdir(&self) -> Result<()> {
        if let Some(dir) = &self.chdir {
            std::env::set_current_dir(dir)
                .with_context(|| format!("changing directory to {}", dir.display()))?;
        }
        Ok(())
    }

    fn resolve_config_path(&self) -> Result<ResolvedConfigPath> {
        if let Some(file) = &self.file {
            let path = Utf8PathBuf::from_path_buf(file.clone())
                .map_err(|_| anyhow!("config path is not valid UTF-8"))?;
            return Ok(ResolvedConfigPath {
                path,
                source: ConfigPathSource::Explicit,
            });
        }

        let cwd = current_dir_utf8()?;
        if let Some(path) = discover_config(&cwd) {
            return Ok(ResolvedConfigPath {
                path,
                source: ConfigPathSource::Discovered,
            });
        }

        let home = dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
        let home =
            Utf8PathBuf::from_path_buf(home).map_err(|_| anyhow!("home directory is not valid UTF-8"))?;
        Ok(ResolvedConfigPath {
            path: home.join(CONFIG_DIR).join(CONFIG_FILENAME),
            source: ConfigPathSource::HomeDefault,
        })
    }

    fn load_config(&self) -> Result<TreekitConfig> {
        let resolved = self.resolve_config_path()?;
        if !resolved.path.exists() {
            if resolved.source == ConfigPathSource::Explicit {
                bail!("config {} does not exist", resolved.path);
            }
            tracing::debug!("no config at {}; using defaults", resolved.path);
            return Ok(TreekitConfig::default());
        }
        tracing::debug!(
            "loading {} config from {}",
            resolved.source.as_str(),
            resolved.path
        );
        config::load_from_path(&resolved.path)
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::from(&cli);
    ctx.apply_chdir()?;
    let _ = ctx.verbose;

    match cli.command {
        Command::List(args) => handle_list(&args),
        Command::Build(args) => handle_build(&ctx, &args),
        Command::Resolve(args) => handle_resolve(&ctx, &args),
        Command::Spec { command } => handle_spec(command),
        Command::Config { command } => handle_config(&ctx, command),
    }
}

fn handle_list(args: &ListArgs) -> Result<()> {
    let dir = utf8_path(&args.directory)?;
    if args.long {
        for entry in list::list_entries(&dir, args.extension.as_deref())? {
            let modified = entry
                .modified
                .map(format_timestamp)
                .unwrap_or_else(|| "unknown".to_string());
            println!("{:>10}  {}  {}", entry.size, modified, entry.path);
        }
    } else {
        for path in list::list_files(&dir, args.extension.as_deref())? {
            println!("{}", path);
        }
    }
    Ok(())
}

fn handle_build(ctx: &CliContext, args: &BuildArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let spec_path = resolve_spec_source(&config, &args.spec);
    let spec = load_spec(&spec_path)?;
    let root = resolve_root(&config, args.root.as_deref())?;
    let create_files = if args.no_files {
        false
    } else {
        config.create_files.unwrap_or(true)
    };

    let registry = create_tree(&root, &spec, create_files)
        .with_context(|| format!("building tree under {}", root))?;
    for (reference, path) in &registry {
        println!("{} -> {}", reference, path);
    }
    Ok(())
}

fn handle_resolve(ctx: &CliContext, args: &ResolveArgs) -> Result<()> {
    if args.create_files && !args.create {
        bail!("--create-files requires --create");
    }

    let config = ctx.load_config()?;
    let spec_path = resolve_spec_source(&config, &args.spec);
    let spec = load_spec(&spec_path)?;
    let root = resolve_root(&config, args.root.as_deref())?;

    let tree = DirectoryTree::new(root, &spec);
    if args.create {
        tree.create_directory_structure(args.create_files)
            .with_context(|| format!("creating structure under {}", tree.root()))?;
    }
    for (reference, path) in tree.get_dir(args.strip_root) {
        println!("{} -> {}", reference, path);
    }
    Ok(())
}

fn handle_spec(command: SpecCommand) -> Result<()> {
    match command {
        SpecCommand::Generate { path, force } => {
            let Some(path) = path else {
                print!("{}", templates::get_string(EXAMPLE_SPEC_TEMPLATE)?);
                return Ok(());
            };
            let path = utf8_path(&path)?;
            if path.exists() && !force {
                bail!("{} already exists; rerun with --force to overwrite", path);
            }
            templates::write_template(&path, EXAMPLE_SPEC_TEMPLATE)?;
            println!("Wrote example spec to {}", path);
            Ok(())
        }
    }
}

fn handle_config(ctx: &CliContext, command: Option<ConfigCommand>) -> Result<()> {
    match command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => {
            let config = ctx.load_config()?;
            print!("{}", config::format_summary(&config));
            Ok(())
        }
        ConfigCommand::Path => {
            let resolved = ctx.resolve_config_path()?;
            println!("{} ({})", resolved.path, resolved.source.as_str());
            Ok(())
        }
        ConfigCommand::Generate { path, force } => {
            let path = match path {
                Some(path) => utf8_path(&path)?,
                None => ctx.resolve_config_path()?.path,
            };
            config::write_example_config(&path, force)?;
            println!("Wrote example config to {}", path);
            Ok(())
        }
        ConfigCommand::SetRoot { root } => {
            let resolved = ctx.resolve_config_path()?;
            config::set_default_root(&resolved.path, &root)?;
            println!("Set default_root = {} in {}", root, resolved.path);
            Ok(())
        }
    }
}

/// A spec argument is either the name of a config `[specs]` entry or a
/// path to a spec document.
fn resolve_spec_source(config: &TreekitConfig, spec: &str) -> Utf8PathBuf {
    if let Some(specs) = &config.specs {
        if let Some(path) = specs.get(spec) {
            return Utf8PathBuf::from(path);
        }
    }
    Utf8PathBuf::from(spec)
}

fn load_spec(path: &Utf8Path) -> Result<TreeSpec> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading spec {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing spec {}", path))
}

fn resolve_root(config: &TreekitConfig, root: Option<&Path>) -> Result<Utf8PathBuf> {
    if let Some(root) = root {
        return utf8_path(root);
    }
    if let Some(root) = &config.default_root {
        return Ok(Utf8PathBuf::from(root));
    }
    current_dir_utf8()
}

fn discover_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}

fn current_dir_utf8() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("determining current directory")?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|_| anyhow!("current directory is not valid UTF-8"))
}

fn utf8_path(path: &Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|_| anyhow!("path {} is not valid UTF-8", path.display()))
}

fn format_timestamp(time: SystemTime) -> String {
    use std::time::UNIX_EPOCH;
    if let Ok(duration) = time.duration_since(UNIX_EPOCH) {
        let secs = duration.as_secs();
        let datetime = chrono::DateTime::<chrono::Utc>::from_timestamp(secs as i64, 0);
        if let Some(dt) = datetime {
            return dt.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
    "unknown".to_string()
}
