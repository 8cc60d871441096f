//! Resource manager: bridges a read-only bundle and a mutable data folder.
//!
//! The manager exports packaged resources from a [`Bundle`] into its data
//! root on first access, then loads them from disk. It holds no cache of
//! its own; the [`LocaleGroup`]s it creates own their caches.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bundle::Bundle;
use crate::error::ResourceError;
use crate::group::LocaleGroup;
use crate::locale::Locale;
use crate::spec::ResourceSpec;

/// Exports bundle resources to a working folder on demand and loads them.
///
/// Paths handed to the manager are slash-separated and relative; they name
/// both the bundle subtree and the location under the data root. A bundle
/// with no matching entries (including [`EmptyBundle`]) makes export a
/// silent no-op, since a loose-file run has its resources on disk already.
///
/// Concurrent first-time exports of the same target are not mutually
/// excluded. Exported bytes are deterministic per entry, so the race can
/// duplicate work but not corrupt the result.
///
/// [`EmptyBundle`]: crate::bundle::EmptyBundle
pub struct ResourceManager {
    bundle: Arc<dyn Bundle>,
    data_root: PathBuf,
}

impl ResourceManager {
    /// Create a manager over `bundle` with `data_root` as working folder.
    pub fn new<P: AsRef<Path>>(bundle: Arc<dyn Bundle>, data_root: P) -> Self {
        Self {
            bundle,
            data_root: data_root.as_ref().to_path_buf(),
        }
    }

    /// The on-disk root all relative target paths resolve against.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Obtain a locale group rooted at `data_root/target`.
    ///
    /// When the folder does not exist yet, the bundle subtree at `target`
    /// is exported into it first. A partially exported folder from an
    /// earlier failure is NOT retried: existence of the folder is the only
    /// check.
    pub fn group<S: ResourceSpec>(
        &self,
        spec: S,
        target: &str,
    ) -> Result<LocaleGroup<S>, ResourceError> {
        self.group_with_fallback(spec, target, Locale::Default)
    }

    /// Like [`group`](Self::group) with an explicit fallback locale.
    pub fn group_with_fallback<S: ResourceSpec>(
        &self,
        spec: S,
        target: &str,
        fallback: Locale,
    ) -> Result<LocaleGroup<S>, ResourceError> {
        let folder = self.data_root.join(target);
        if !folder.exists() {
            self.export(target, target)?;
        }
        Ok(LocaleGroup::with_fallback(folder, spec, fallback))
    }

    /// Load a single resource from the bundle, exporting it on first use.
    ///
    /// When `data_root/target` does not exist, its parent directories are
    /// created and every bundle entry prefixed by `source` is exported
    /// under `target` (a single file or a whole subtree). Returns
    /// `Ok(None)` when the bundle held nothing for the target and no file
    /// exists on disk afterwards; loader failures for a file that does
    /// exist pass through unchanged.
    ///
    /// `target` defaults to `source` when `None`.
    pub fn load_from_bundle<S: ResourceSpec>(
        &self,
        spec: &S,
        source: &str,
        target: Option<&str>,
    ) -> Result<Option<S::Kind>, ResourceError> {
        let target = target.unwrap_or(source);
        let absolute = self.data_root.join(target);
        if !absolute.exists() {
            if let Some(parent) = absolute.parent() {
                fs::create_dir_all(parent)?;
            }
            self.export(source, target)?;
        }
        if !absolute.exists() {
            return Ok(None);
        }
        Ok(Some(spec.load(&absolute)?))
    }

    /// Like [`load_from_bundle`](Self::load_from_bundle), but absence is
    /// a [`ResourceError::MissingResource`].
    pub fn load_from_bundle_required<S: ResourceSpec>(
        &self,
        spec: &S,
        source: &str,
        target: Option<&str>,
    ) -> Result<S::Kind, ResourceError> {
        let resolved = target.unwrap_or(source);
        self.load_from_bundle(spec, source, target)?
            .ok_or_else(|| ResourceError::MissingResource(self.data_root.join(resolved)))
    }

    /// Save a resource to `data_root/target`.
    ///
    /// Parent directories and the (empty) file are created when absent, so
    /// the spec's `save` always finds an existing path to overwrite.
    pub fn save<S: ResourceSpec>(
        &self,
        spec: &S,
        value: &S::Kind,
        target: &str,
    ) -> Result<(), ResourceError> {
        let absolute = self.data_root.join(target);
        if !absolute.exists() {
            if let Some(parent) = absolute.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::File::create(&absolute)?;
        }
        spec.save(value, &absolute)?;
        Ok(())
    }

    /// Copy every bundle entry under `source` to `data_root/target`.
    ///
    /// Entry names are matched by string prefix; the prefix and one
    /// leading slash are stripped to form the path relative to the target.
    /// Directory entries become directories, file entries are copied byte
    /// for byte. A prefix matching nothing is a silent no-op. A failure
    /// partway leaves the already-exported files in place; there is no
    /// rollback.
    fn export(&self, source: &str, target: &str) -> Result<(), ResourceError> {
        let target_root = self.data_root.join(target);
        let mut exported = 0usize;

        for entry in self.bundle.entries() {
            let Some(tail) = entry.name.strip_prefix(source) else {
                continue;
            };
            let tail = tail.strip_prefix('/').unwrap_or(tail);
            let absolute = if tail.is_empty() {
                target_root.clone()
            } else {
                target_root.join(tail)
            };

            if entry.is_dir {
                fs::create_dir_all(&absolute)?;
                continue;
            }
            if let Some(parent) = absolute.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&absolute, self.bundle.read(&entry.name)?)?;
            exported += 1;
        }

        if exported > 0 {
            log::debug!(
                "Exported {} bundle entries from '{}' to {:?}",
                exported,
                source,
                target_root
            );
        }
        Ok(())
    }
}
