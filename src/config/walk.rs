//! Directory traversal with symlink resolution.
//!
//! Walks a tree with an explicit worklist of real (symlink-free) directory
//! paths. Every real directory is visited at most once per [`Walker`], which
//! keeps symlink cycles and aliased directories from being walked twice.

use super::fragment::FragmentName;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// A YAML fragment found during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Real path of the file
    pub path: PathBuf,
    /// Real directory the entry was found in
    pub dir: PathBuf,
    /// Parsed entry name (the link name for symlinked files)
    pub name: FragmentName,
    /// Index of the root this file was discovered under
    pub root_index: usize,
}

/// What a directory entry turned out to be after resolution.
enum EntryKind {
    Dir(PathBuf),
    File(PathBuf),
    Other,
}

/// Resolve a caller-supplied root to its real directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::invalid_argument(path, "path is empty"));
    }

    match fs::symlink_metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(Error::io("stat", path, e)),
    }

    let real = resolve(path)?;
    let metadata = fs::metadata(&real).map_err(|e| Error::io("stat", &real, e))?;
    if !metadata.is_dir() {
        return Err(Error::invalid_argument(path, "not a directory"));
    }
    Ok(real)
}

/// Resolve every symlink in `path`.
fn resolve(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| Error::io("resolve", path, e))
}

/// Worklist walker shared across all roots of one collection.
#[derive(Debug, Default)]
pub struct Walker {
    visited: HashSet<PathBuf>,
}

impl Walker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the tree under `root` (already resolved by [`resolve_root`]).
    ///
    /// Entries are read in file-name order so discovery is deterministic.
    /// Any unresolvable symlink or unreadable directory aborts the walk.
    pub fn walk(&mut self, root: &Path, root_index: usize) -> Result<Vec<DiscoveredFile>> {
        let mut files = Vec::new();
        if !self.visited.insert(root.to_path_buf()) {
            trace!(root = %root.display(), "Root already walked, skipping");
            return Ok(files);
        }

        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let mut subdirs = Vec::new();

            for entry_path in sorted_entries(&dir)? {
                match classify(&entry_path)? {
                    EntryKind::Dir(real) => {
                        if self.visited.insert(real.clone()) {
                            subdirs.push(real);
                        } else {
                            trace!(path = %entry_path.display(), "Directory already visited");
                        }
                    }
                    EntryKind::File(real) => {
                        // Files are not deduplicated: one target linked from two
                        // directories belongs to two merge groups
                        let name = entry_path
                            .file_name()
                            .and_then(|n| n.to_str())
                            .and_then(FragmentName::parse);
                        let Some(name) = name else {
                            trace!(path = %entry_path.display(), "Skipping non-YAML file");
                            continue;
                        };
                        files.push(DiscoveredFile {
                            path: real,
                            dir: dir.clone(),
                            name,
                            root_index,
                        });
                    }
                    EntryKind::Other => {
                        trace!(path = %entry_path.display(), "Skipping special file");
                    }
                }
            }

            // Reverse so the lexicographically first subdirectory is popped next
            pending.extend(subdirs.into_iter().rev());
        }

        Ok(files)
    }
}

/// List a directory's entries sorted by file name.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = fs::read_dir(dir).map_err(|e| Error::io("read directory", dir, e))?;
    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| Error::io("read directory", dir, e))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Determine what an entry is, following symlinks to their real target.
fn classify(path: &Path) -> Result<EntryKind> {
    let metadata = fs::symlink_metadata(path).map_err(|e| Error::io("stat", path, e))?;
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        let real = resolve(path)?;
        let target = fs::metadata(&real).map_err(|e| Error::io("stat", &real, e))?;
        return Ok(if target.is_dir() {
            EntryKind::Dir(real)
        } else if target.is_file() {
            EntryKind::File(real)
        } else {
            EntryKind::Other
        });
    }

    // Non-link entries of a real directory are already real paths
    Ok(if file_type.is_dir() {
        EntryKind::Dir(path.to_path_buf())
    } else if file_type.is_file() {
        EntryKind::File(path.to_path_buf())
    } else {
        EntryKind::Other
    })
}
