use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use serde::Deserialize;
use toml_edit::{DocumentMut, value};

use crate::templates;

/// Root configuration document loaded from `~/.treekit/config.toml` by
/// default.
#[derive(Debug, Default, Deserialize)]
pub struct TreekitConfig {
    pub default_root: Option<String>,
    pub create_files: Option<bool>,
    pub specs: Option<BTreeMap<String, String>>,
}

/// Load a configuration file from disk and deserialize it.
pub fn load_from_path(path: &Utf8Path) -> Result<TreekitConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path))
}

pub fn write_example_config(path: &Utf8Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists; rerun with --force to overwrite", path);
    }

    templates::write_template(path, "config/example.config.toml")
}

pub fn set_default_root(path: &Utf8Path, root: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent))?;
    }

    let mut doc: DocumentMut = if path.exists() {
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
        raw.parse()
            .with_context(|| format!("parsing config {}", path))?
    } else {
        DocumentMut::new()
    };

    doc["default_root"] = value(root);

    fs::write(path, doc.to_string()).with_context(|| format!("writing config {}", path))
}

pub fn format_summary(config: &TreekitConfig) -> String {
    let mut out = String::new();
    let default_root = config.default_root.as_deref().unwrap_or("<none>");
    let create_files = config.create_files.unwrap_or(true);
    let spec_count = config.specs.as_ref().map(|s| s.len()).unwrap_or(0);

    let _ = writeln!(out, "Default root: {}", default_root);
    let _ = writeln!(out, "Create files by default: {}", create_files);
    let _ = writeln!(out, "Named specs: {}", spec_count);

    if let Some(specs) = &config.specs {
        for (name, path) in specs {
            let _ = writeln!(out, "  - {} -> {}", name, path);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir() -> Utf8PathBuf {
        let mut dir = std::env::temp_dir();
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("treekit-test-{ts}"));
        Utf8PathBuf::from_path_buf(dir).unwrap()
    }

    #[test]
    fn loads_a_full_config() {
        let dir = unique_temp_dir();
        fs::create_dir_all(dir.as_std_path()).unwrap();
        let path = dir.join("config.toml");
        fs::write(
            path.as_std_path(),
            r#"default_root = "/srv/trees"
create_files = false

[specs]
project = "specs/project.tree.json"
"#,
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.default_root.as_deref(), Some("/srv/trees"));
        assert_eq!(config.create_files, Some(false));
        assert_eq!(
            config.specs.unwrap().get("project").map(String::as_str),
            Some("specs/project.tree.json")
        );

        let _ = fs::remove_dir_all(dir.as_std_path());
    }

    #[test]
    fn set_default_root_preserves_other_keys() {
        let dir = unique_temp_dir();
        fs::create_dir_all(dir.as_std_path()).unwrap();
        let path = dir.join("config.toml");
        fs::write(path.as_std_path(), "create_files = false\n").unwrap();

        set_default_root(&path, "/data/out").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.default_root.as_deref(), Some("/data/out"));
        assert_eq!(config.create_files, Some(false));

        let _ = fs::remove_dir_all(dir.as_std_path());
    }

    #[test]
    fn set_default_root_creates_missing_config() {
        let dir = unique_temp_dir();
        let path = dir.join("nested").join("config.toml");

        set_default_root(&path, "/data/out").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.default_root.as_deref(), Some("/data/out"));

        let _ = fs::remove_dir_all(dir.as_std_path());
    }
}
