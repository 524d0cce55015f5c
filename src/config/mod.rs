//! Staged YAML configuration trees.
//!
//! A configuration tree is a directory of YAML fragments, nested to any
//! depth, with symlinked files and directories followed to their targets:
//! 1. **Base fragments** - `<name>.yaml` / `<name>.yml`, always loaded
//! 2. **Stage overrides** - `<name>.<stage>.yaml`, loaded after the base
//!    fragment only when `<stage>` is the active stage
//!
//! ## Merge Strategy
//! - Collection: fragments are concatenated into one multi-document stream
//! - Decoding: documents are deep merged in order, later documents winning
//!
//! ## Environment Variables
//! - `STAGE` - Active stage (empty or unset means base fragments only)

mod collector;
mod fragment;
mod merge;
mod walk;

pub use collector::{
    CollectOptions, Collection, ConfigCollector, DOCUMENT_SEPARATOR, SelectedFile, read_configs,
    read_configs_from,
};
pub use fragment::{FragmentName, YAML_EXTENSIONS};
pub use merge::{decode, deep_merge, deep_merge_all, merge_documents};
pub use walk::{DiscoveredFile, Walker, resolve_root};
