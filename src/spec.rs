//! Resource kind contract: how one category of resource is loaded and saved.

use std::path::Path;

use anyhow::Context;

/// Pertinent information for loading and saving one kind of resource.
///
/// A spec is an immutable strategy object defined once per resource kind
/// and shared by every consumer: the filename extension plus the load and
/// save functions. Failure behavior of `load` and `save` (malformed
/// content, I/O errors) belongs to the implementation; groups and managers
/// propagate those errors to the caller unchanged.
pub trait ResourceSpec: Send + Sync {
    /// The in-memory type this spec produces and consumes.
    type Kind;

    /// Filename extension including the dot, e.g. `".yml"`.
    fn extension(&self) -> &str;

    /// Fully deserialize the file at `path` into a [`Self::Kind`] value.
    fn load(&self, path: &Path) -> anyhow::Result<Self::Kind>;

    /// Fully serialize `value` to `path`, overwriting its contents.
    ///
    /// The parent directory and the file itself are guaranteed to exist by
    /// the time this is invoked (see [`ResourceManager::save`]).
    ///
    /// [`ResourceManager::save`]: crate::ResourceManager::save
    fn save(&self, value: &Self::Kind, path: &Path) -> anyhow::Result<()>;
}

/// Plain UTF-8 text resources.
///
/// The minimal concrete spec; structured formats (YAML, TOML, ...) are
/// supplied by callers through their own [`ResourceSpec`] implementations.
#[derive(Debug, Clone)]
pub struct TextSpec {
    extension: String,
}

impl TextSpec {
    /// Create a text spec with the given extension (including the dot).
    pub fn new<S: Into<String>>(extension: S) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl Default for TextSpec {
    fn default() -> Self {
        Self::new(".txt")
    }
}

impl ResourceSpec for TextSpec {
    type Kind = String;

    fn extension(&self) -> &str {
        &self.extension
    }

    fn load(&self, path: &Path) -> anyhow::Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read text resource {:?}", path))
    }

    fn save(&self, value: &String, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, value)
            .with_context(|| format!("Failed to write text resource {:?}", path))
    }
}
