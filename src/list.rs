use std::fs;
use std::io;
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};

/// One regular file picked up by [`list_entries`].
#[derive(Debug)]
pub struct FileEntry {
    pub path: Utf8PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Full paths of the regular files directly inside `dir`, optionally keeping
/// only names that end with `extension`.
///
/// Entries come back in the order the OS enumerates them, which is not
/// guaranteed to be sorted. Subdirectories are never descended into or
/// reported. Errors are the underlying filesystem errors, untouched, so a
/// missing `dir` surfaces as [`io::ErrorKind::NotFound`].
pub fn list_files(dir: &Utf8Path, extension: Option<&str>) -> io::Result<Vec<Utf8PathBuf>> {
    Ok(list_entries(dir, extension)?
        .into_iter()
        .map(|entry| entry.path)
        .collect())
}

/// Same selection as [`list_files`], with size and modification time for
/// each file.
pub fn list_entries(dir: &Utf8Path, extension: Option<&str>) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file name {:?} is not valid UTF-8", file_name),
            ));
        };
        if let Some(suffix) = extension {
            if !name.ends_with(suffix) {
                continue;
            }
        }
        entries.push(FileEntry {
            path: dir.join(name),
            size: metadata.len(),
            modified: metadata.modified().ok(),
        });
    }
    Ok(entries)
}
