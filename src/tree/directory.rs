use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};

use super::spec::{SpecNode, TreeSpec};

/// Resolves a [`TreeSpec`] to a reference → path mapping without touching
/// disk, then optionally creates the structure by classifying each resolved
/// path on its suffix: no extension means directory, extension means file.
///
/// This is a deliberately separate path from [`create_tree`]: it carries no
/// duplicate counter (a repeated reference simply overwrites the earlier
/// entry), and the suffix heuristic misreads a folder named with a dot in
/// it (`v1.0`) as a file.
///
/// [`create_tree`]: super::create_tree
#[derive(Debug)]
pub struct DirectoryTree {
    root: Utf8PathBuf,
    dir: BTreeMap<String, Utf8PathBuf>,
}

impl DirectoryTree {
    pub fn new(root: impl Into<Utf8PathBuf>, spec: &TreeSpec) -> Self {
        let root = root.into();
        let mut dir = BTreeMap::new();
        resolve_level(&root, spec, &mut dir);
        Self { root, dir }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn get(&self, reference: &str) -> Option<&Utf8Path> {
        self.dir.get(reference).map(Utf8PathBuf::as_path)
    }

    pub fn paths(&self) -> &BTreeMap<String, Utf8PathBuf> {
        &self.dir
    }

    /// The resolved mapping in string form, optionally relative to the root.
    pub fn get_dir(&self, strip_root: bool) -> BTreeMap<String, String> {
        self.dir
            .iter()
            .map(|(reference, path)| {
                let rendered = if strip_root {
                    path.strip_prefix(&self.root)
                        .unwrap_or(path.as_path())
                        .to_string()
                } else {
                    path.to_string()
                };
                (reference.clone(), rendered)
            })
            .collect()
    }

    /// Create a directory for every resolved path without an extension,
    /// then, if `create_files` is set, touch a file for every path that has
    /// one. Existing files keep their contents.
    pub fn create_directory_structure(&self, create_files: bool) -> io::Result<()> {
        for path in self.dir.values() {
            if path.extension().is_none() {
                fs::create_dir_all(path)?;
            }
        }
        if create_files {
            for path in self.dir.values() {
                if path.extension().is_some() {
                    OpenOptions::new().create(true).write(true).open(path)?;
                }
            }
        }
        Ok(())
    }
}

fn resolve_level(dir: &Utf8Path, spec: &TreeSpec, out: &mut BTreeMap<String, Utf8PathBuf>) {
    for (key, node) in spec.entries() {
        let path = dir.join(&key.name);
        out.insert(key.reference.clone(), path.clone());
        if let SpecNode::Folder(contents) = node {
            resolve_level(&path, contents, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn sample_spec() -> TreeSpec {
        TreeSpec::new()
            .folder_as(
                "folder1",
                "unique_folder1",
                TreeSpec::new()
                    .folder_as(
                        "subfolder1",
                        "unique_subfolder1",
                        TreeSpec::new().file_as("file1.txt", "unique_file1.txt"),
                    )
                    .folder("subfolder2", TreeSpec::new()),
            )
            .folder("folder2", TreeSpec::new().file("file2.txt"))
    }

    #[test]
    fn resolves_without_touching_disk() {
        let root = unique_temp_dir();
        let tree = DirectoryTree::new(root.clone(), &sample_spec());

        assert!(!root.exists());
        assert_eq!(
            tree.get("unique_file1.txt"),
            Some(
                root.join("folder1")
                    .join("subfolder1")
                    .join("file1.txt")
                    .as_path()
            )
        );
        assert_eq!(tree.paths().len(), 5);
    }

    #[test]
    fn get_dir_can_strip_the_root() {
        let root = unique_temp_dir();
        let tree = DirectoryTree::new(root.clone(), &sample_spec());

        let absolute = tree.get_dir(false);
        assert_eq!(
            absolute.get("unique_folder1"),
            Some(&root.join("folder1").to_string())
        );

        let relative = tree.get_dir(true);
        assert_eq!(relative.get("unique_folder1"), Some(&"folder1".to_string()));
        assert_eq!(
            relative.get("unique_file1.txt"),
            Some(&"folder1/subfolder1/file1.txt".to_string())
        );
    }

    #[test]
    fn creates_directories_then_optionally_files() {
        let root = unique_temp_dir();
        let tree = DirectoryTree::new(root.clone(), &sample_spec());

        tree.create_directory_structure(false).unwrap();
        assert!(root.join("folder1").join("subfolder1").is_dir());
        assert!(root.join("folder1").join("subfolder2").is_dir());
        assert!(!root.join("folder1").join("subfolder1").join("file1.txt").exists());

        tree.create_directory_structure(true).unwrap();
        assert!(root.join("folder1").join("subfolder1").join("file1.txt").is_file());
        assert!(root.join("folder2").join("file2.txt").is_file());

        let _ = fs::remove_dir_all(root.as_std_path());
    }

    #[test]
    fn touching_an_existing_file_keeps_its_contents() {
        let root = unique_temp_dir();
        let tree = DirectoryTree::new(root.clone(), &sample_spec());

        tree.create_directory_structure(false).unwrap();
        let file = root.join("folder2").join("file2.txt");
        fs::write(file.as_std_path(), "kept").unwrap();

        tree.create_directory_structure(true).unwrap();
        assert_eq!(fs::read_to_string(file.as_std_path()).unwrap(), "kept");

        let _ = fs::remove_dir_all(root.as_std_path());
    }

    #[test]
    fn duplicate_references_overwrite_without_numbering() {
        let root = unique_temp_dir();
        let spec = TreeSpec::new()
            .file_as("a.toml", "cfg")
            .file_as("b.toml", "cfg");
        let tree = DirectoryTree::new(root.clone(), &spec);

        assert_eq!(tree.paths().len(), 1);
        assert_eq!(tree.get("cfg"), Some(root.join("b.toml").as_path()));
    }

    #[test]
    fn dotted_folder_name_is_classified_as_a_file() {
        let root = unique_temp_dir();
        let spec = TreeSpec::new().folder("v1.0", TreeSpec::new());
        let tree = DirectoryTree::new(root.clone(), &spec);

        tree.create_directory_structure(false).unwrap();
        assert!(!root.join("v1.0").exists());

        let _ = fs::remove_dir_all(root.as_std_path());
    }
}
