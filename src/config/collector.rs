//! Collects YAML fragments from one or more roots into a single stream.
//!
//! Fragments are grouped per root, directory and base name. Each group
//! contributes its base fragment followed by the override for the active
//! stage. Groups are emitted by root order, then base name, then directory.

use super::walk::{DiscoveredFile, Walker, resolve_root};
use crate::env::Environment;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Separator inserted between fragments in the merged stream.
pub const DOCUMENT_SEPARATOR: &[u8] = b"---\n";

/// Options for a single collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectOptions {
    stage: Option<String>,
}

impl CollectOptions {
    /// Options with no active stage (base fragments only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the given stage.
    pub fn for_stage(stage: impl Into<String>) -> Self {
        Self::new().with_stage(Some(stage.into()))
    }

    /// Set the active stage. Surrounding whitespace is trimmed and an empty
    /// stage is the same as none.
    pub fn with_stage(mut self, stage: Option<String>) -> Self {
        self.stage = stage
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// The active stage, if any.
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }
}

/// A fragment chosen for the merged stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Real path of the file
    pub path: PathBuf,
    /// Real directory the fragment belongs to
    pub dir: PathBuf,
    /// Logical base name of its merge group
    pub base: String,
    /// Stage of an override, `None` for the base fragment
    pub stage: Option<String>,
    /// Index of the root it was discovered under
    pub root_index: usize,
}

impl From<DiscoveredFile> for SelectedFile {
    fn from(file: DiscoveredFile) -> Self {
        Self {
            path: file.path,
            dir: file.dir,
            base: file.name.base,
            stage: file.name.stage,
            root_index: file.root_index,
        }
    }
}

/// Ordered fragments selected for one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    files: Vec<SelectedFile>,
}

impl Collection {
    /// Selected fragments in load order.
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Read and concatenate the fragments.
    ///
    /// Any unreadable file fails the whole read; no partial buffer is returned.
    pub fn read(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        for (index, file) in self.files.iter().enumerate() {
            let content =
                std::fs::read(&file.path).map_err(|e| Error::io("read", &file.path, e))?;
            if index > 0 {
                if !buffer.ends_with(b"\n") {
                    buffer.push(b'\n');
                }
                buffer.extend_from_slice(DOCUMENT_SEPARATOR);
            }
            buffer.extend_from_slice(&content);
        }
        Ok(buffer)
    }
}

/// Merge group identity: root, base name, then real directory.
type GroupKey = (usize, String, PathBuf);

#[derive(Default)]
struct Group {
    base: Option<DiscoveredFile>,
    stage: Option<DiscoveredFile>,
}

impl Group {
    /// Place a fragment in its slot. The first fragment seen for a slot wins.
    fn offer(&mut self, file: DiscoveredFile) {
        let slot = if file.name.is_base() {
            &mut self.base
        } else {
            &mut self.stage
        };
        if let Some(kept) = slot.as_ref() {
            warn!(
                kept = %kept.path.display(),
                ignored = %file.path.display(),
                "Duplicate config fragment in group, ignoring"
            );
        } else {
            *slot = Some(file);
        }
    }

    fn into_files(self) -> impl Iterator<Item = DiscoveredFile> {
        self.base.into_iter().chain(self.stage)
    }
}

/// Walks configuration roots and merges their YAML fragments.
#[derive(Debug, Clone, Default)]
pub struct ConfigCollector {
    options: CollectOptions,
}

impl ConfigCollector {
    pub fn new(options: CollectOptions) -> Self {
        Self { options }
    }

    /// Collector configured from the current process environment.
    pub fn from_env() -> Self {
        Self::new(Environment::capture().collect_options())
    }

    pub fn options(&self) -> &CollectOptions {
        &self.options
    }

    /// Discover and select fragments under `roots`, later roots overriding
    /// earlier ones.
    pub fn collect<P: AsRef<Path>>(&self, roots: &[P]) -> Result<Collection> {
        if roots.is_empty() {
            return Err(Error::invalid_argument("", "no config roots given"));
        }

        // Resolve every root before walking so bad input fails fast
        let resolved = roots
            .iter()
            .map(|root| resolve_root(root.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let stage = self.options.stage();
        let mut walker = Walker::new();
        let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();

        for (root_index, root) in resolved.iter().enumerate() {
            debug!(root = %root.display(), index = root_index, "Walking config root");
            for file in walker.walk(root, root_index)? {
                if !file.name.applies_to(stage) {
                    debug!(path = %file.path.display(), "Skipping fragment for another stage");
                    continue;
                }
                let key = (file.root_index, file.name.base.clone(), file.dir.clone());
                groups.entry(key).or_default().offer(file);
            }
        }

        let files: Vec<SelectedFile> = groups
            .into_values()
            .flat_map(Group::into_files)
            .map(SelectedFile::from)
            .collect();

        for file in &files {
            debug!(
                path = %file.path.display(),
                base = %file.base,
                stage = file.stage.as_deref().unwrap_or(""),
                "Selected config fragment"
            );
        }
        debug!(count = files.len(), stage = stage.unwrap_or(""), "Collected config fragments");

        Ok(Collection { files })
    }

    /// Collect and concatenate the fragments under `roots`.
    pub fn read<P: AsRef<Path>>(&self, roots: &[P]) -> Result<Vec<u8>> {
        self.collect(roots)?.read()
    }
}

/// Read and merge every YAML fragment under `path`, using `STAGE` from the
/// environment to select overrides.
pub fn read_configs(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    read_configs_from(&[path])
}

/// Like [`read_configs`] over several roots; later roots override earlier ones.
pub fn read_configs_from<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<u8>> {
    ConfigCollector::from_env().read(roots)
}
