use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};

use super::spec::{SpecNode, TreeSpec};

/// Flat lookup from (possibly numbered) reference name to the physical path
/// recorded for it.
pub type PathRegistry = BTreeMap<String, Utf8PathBuf>;

/// Tracks how many times each reference has been seen during one build.
/// Owned by the top-level call and threaded through the recursion, so
/// colliding references anywhere in the tree are numbered consistently.
#[derive(Debug, Default)]
struct BuildContext {
    seen: BTreeMap<String, u32>,
}

impl BuildContext {
    /// First sighting keeps the reference verbatim; every repeat gets a
    /// `_{n}` inserted before the extension (`file1.txt`, `file1_1.txt`,
    /// `file1_2.txt`, ...).
    fn disambiguate(&mut self, reference: &str) -> String {
        if let Some(count) = self.seen.get_mut(reference) {
            *count += 1;
            let (stem, ext) = split_reference(reference);
            format!("{stem}_{count}{ext}")
        } else {
            self.seen.insert(reference.to_owned(), 0);
            reference.to_owned()
        }
    }
}

/// Split a reference into stem and extension at the last `.`, unless that
/// dot is the first character (`.bashrc` has no extension).
fn split_reference(reference: &str) -> (&str, &str) {
    match reference.rfind('.') {
        Some(idx) if idx > 0 => reference.split_at(idx),
        _ => (reference, ""),
    }
}

/// Create the directories and files described by `spec` under `root` and
/// return the reference → path registry for everything visited.
///
/// Numbering applies to registry keys only — the on-disk path is always
/// built from the entry's `name`, so sibling entries sharing a name land on
/// the same physical path (directories are reused, files rewritten). That
/// is a property of the structure, not an error.
///
/// Directory creation is idempotent and file creation truncates, so
/// rebuilding the same spec over an existing tree succeeds and returns an
/// identical registry. With `create_files` false, file entries are still
/// registered (and their parent directories created) but nothing is written.
pub fn create_tree(
    root: &Utf8Path,
    spec: &TreeSpec,
    create_files: bool,
) -> io::Result<PathRegistry> {
    let mut ctx = BuildContext::default();
    let mut registry = PathRegistry::new();
    build_level(root, spec, create_files, &mut ctx, &mut registry)?;
    Ok(registry)
}

fn build_level(
    dir: &Utf8Path,
    spec: &TreeSpec,
    create_files: bool,
    ctx: &mut BuildContext,
    registry: &mut PathRegistry,
) -> io::Result<()> {
    for (key, node) in spec.entries() {
        let reference = ctx.disambiguate(&key.reference);
        let path = dir.join(&key.name);
        match node {
            SpecNode::Folder(contents) => {
                fs::create_dir_all(&path)?;
                registry.insert(reference, path.clone());
                build_level(&path, contents, create_files, ctx, registry)?;
            }
            SpecNode::File => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                if create_files {
                    File::create(&path)?;
                }
                registry.insert(reference, path);
            }
        }
    }
    Ok(())
}
