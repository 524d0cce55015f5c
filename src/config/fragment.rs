//! File naming convention for configuration fragments.
//!
//! - `<name>.yaml` / `<name>.yml` - base fragment
//! - `<name>.<stage>.yaml` / `<name>.<stage>.yml` - stage override
//!
//! The stage is always the last dot-separated segment before the extension,
//! so `app.v1.yaml` is the `v1` override of `app`.

/// Extensions recognized as YAML.
pub const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Parsed file name of a YAML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentName {
    /// Logical base name (file name without stage suffix and extension)
    pub base: String,
    /// Stage suffix, `None` for base fragments
    pub stage: Option<String>,
    /// Extension without the leading dot
    pub extension: String,
}

impl FragmentName {
    /// Parse a file name. Returns `None` for anything that is not YAML.
    pub fn parse(file_name: &str) -> Option<Self> {
        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() || !YAML_EXTENSIONS.contains(&extension) {
            return None;
        }

        let (base, stage) = match stem.rsplit_once('.') {
            // A leading dot belongs to the name (".hidden.yaml")
            Some((base, stage)) if !base.is_empty() && !stage.is_empty() => {
                (base.to_string(), Some(stage.to_string()))
            }
            _ => (stem.to_string(), None),
        };

        Some(Self {
            base,
            stage,
            extension: extension.to_string(),
        })
    }

    /// Whether this is a base fragment.
    pub fn is_base(&self) -> bool {
        self.stage.is_none()
    }

    /// Whether this fragment should load under `active_stage`.
    ///
    /// Base fragments always load; overrides only when their stage matches.
    pub fn applies_to(&self, active_stage: Option<&str>) -> bool {
        match (&self.stage, active_stage) {
            (None, _) => true,
            (Some(stage), Some(active)) => stage == active,
            (Some(_), None) => false,
        }
    }
}

impl std::fmt::Display for FragmentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.stage {
            Some(stage) => write!(f, "{}.{}.{}", self.base, stage, self.extension),
            None => write!(f, "{}.{}", self.base, self.extension),
        }
    }
}
