//! Locale-keyed resource groups.
//!
//! A [`LocaleGroup`] resolves a requested locale to one loaded resource
//! instance. Resolution searches the locale's filename variants in order
//! and falls back to the group's fallback locale when nothing matches.
//! Loaded values are cached for the life of the group and a given locale
//! is loaded at most once, even under concurrent access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::ResourceError;
use crate::locale::Locale;
use crate::spec::ResourceSpec;

type VariantStrategy = dyn Fn(&Locale) -> Vec<String> + Send + Sync;

/// Outcome of probing one locale inside its cache cell. `NoFile` leaves
/// the cell uninitialized so a fallthrough stays re-resolvable.
enum Probe {
    NoFile,
    LoadFailed(ResourceError),
}

/// A group of locale variants of one resource, resolved and cached lazily.
///
/// Similar in spirit to a resource bundle, but rooted at an explicit
/// folder and independent of any packaging. Files inside the folder are
/// named `<stem><extension>`, e.g. `en_US.yml` or `default.yml`.
pub struct LocaleGroup<S: ResourceSpec> {
    folder: PathBuf,
    spec: S,
    fallback: Locale,
    variants: Box<VariantStrategy>,
    cache: Mutex<HashMap<Locale, Arc<OnceCell<Arc<S::Kind>>>>>,
}

impl<S: ResourceSpec> LocaleGroup<S> {
    /// Create a group over `folder` with [`Locale::Default`] as fallback.
    pub fn new<P: AsRef<Path>>(folder: P, spec: S) -> Self {
        Self::with_fallback(folder, spec, Locale::Default)
    }

    /// Create a group with an explicit fallback locale.
    pub fn with_fallback<P: AsRef<Path>>(folder: P, spec: S, fallback: Locale) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
            spec,
            fallback,
            variants: Box::new(|locale: &Locale| vec![locale.stem()]),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the variant-stem strategy.
    ///
    /// The default strategy searches only the canonical stem of the
    /// requested locale. Pass e.g. `|l| l.fallback_stems()` to search
    /// language-only stems after the full `language_REGION` form.
    pub fn with_variant_strategy<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&Locale) -> Vec<String> + Send + Sync + 'static,
    {
        self.variants = Box::new(strategy);
        self
    }

    /// The folder this group resolves files in.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The locale used when a requested locale has no matching file.
    pub fn fallback(&self) -> &Locale {
        &self.fallback
    }

    /// Filename stems searched for `locale`, most preferred first.
    pub fn locale_variants(&self, locale: &Locale) -> Vec<String> {
        (self.variants)(locale)
    }

    /// Resolve `locale` to a loaded resource.
    ///
    /// A cache hit returns the stored value without touching the
    /// filesystem. On a miss the variant stems are searched in order and
    /// the first existing file wins; the loaded value is cached under the
    /// requested locale. When no variant file exists the group resolves
    /// its fallback locale instead, WITHOUT caching under the requested
    /// key, so a locale file added later is picked up by the next call.
    ///
    /// # Errors
    /// * `MissingDefaultResource` - the fallback locale itself has no file
    /// * loader failures pass through unchanged
    pub fn get(&self, locale: &Locale) -> Result<Arc<S::Kind>, ResourceError> {
        let cell = self.cell(locale);
        let outcome = cell.get_or_try_init(|| match self.find_variant_file(locale) {
            Some(path) => self
                .spec
                .load(&path)
                .map(Arc::new)
                .map_err(|e| Probe::LoadFailed(ResourceError::from(e))),
            None => Err(Probe::NoFile),
        });

        match outcome {
            Ok(value) => Ok(Arc::clone(value)),
            Err(Probe::LoadFailed(err)) => Err(err),
            Err(Probe::NoFile) => {
                if *locale == self.fallback {
                    return Err(ResourceError::MissingDefaultResource {
                        folder: self.folder.clone(),
                        stems: self.locale_variants(locale),
                        extension: self.spec.extension().to_string(),
                    });
                }
                log::debug!(
                    "No '{}' resource for {} in {:?}, falling back to {}",
                    self.spec.extension(),
                    locale,
                    self.folder,
                    self.fallback
                );
                self.get(&self.fallback)
            }
        }
    }

    /// Resolve the fallback locale directly.
    pub fn get_default(&self) -> Result<Arc<S::Kind>, ResourceError> {
        self.get(&self.fallback)
    }

    /// Number of locales with a completed cache entry.
    pub fn cached_count(&self) -> usize {
        let cache = self.cache.lock();
        cache.values().filter(|cell| cell.get().is_some()).count()
    }

    fn cell(&self, locale: &Locale) -> Arc<OnceCell<Arc<S::Kind>>> {
        let mut cache = self.cache.lock();
        Arc::clone(cache.entry(locale.clone()).or_default())
    }

    fn find_variant_file(&self, locale: &Locale) -> Option<PathBuf> {
        for stem in self.locale_variants(locale) {
            let candidate = self
                .folder
                .join(format!("{}{}", stem, self.spec.extension()));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::TextSpec;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Text spec that counts how many loads actually hit the filesystem.
    struct CountingSpec {
        loads: Arc<AtomicUsize>,
    }

    impl ResourceSpec for CountingSpec {
        type Kind = String;

        fn extension(&self) -> &str {
            ".txt"
        }

        fn load(&self, path: &Path) -> anyhow::Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(std::fs::read_to_string(path)?)
        }

        fn save(&self, value: &String, path: &Path) -> anyhow::Result<()> {
            std::fs::write(path, value)?;
            Ok(())
        }
    }

    fn locale(s: &str) -> Locale {
        s.parse().expect("valid locale")
    }

    fn setup_folder(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            std::fs::write(temp_dir.path().join(name), content).unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_get_exact_locale() {
        let temp_dir = setup_folder(&[("en_US.txt", "Hello"), ("default.txt", "Fallback")]);
        let group = LocaleGroup::new(temp_dir.path(), TextSpec::default());

        let value = group.get(&locale("en_US")).expect("Should resolve");
        assert_eq!(value.as_str(), "Hello");
    }

    #[test]
    fn test_cache_stability_and_single_load() {
        let temp_dir = setup_folder(&[("en_US.txt", "Hello")]);
        let loads = Arc::new(AtomicUsize::new(0));
        let group = LocaleGroup::new(
            temp_dir.path(),
            CountingSpec {
                loads: Arc::clone(&loads),
            },
        );

        let first = group.get(&locale("en_US")).unwrap();
        let second = group.get(&locale("en_US")).unwrap();
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_default_is_fatal() {
        let temp_dir = setup_folder(&[]);
        let group = LocaleGroup::new(temp_dir.path(), TextSpec::default());

        let err = group.get(&Locale::Default).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::MissingDefaultResource { .. }
        ));
    }

    #[test]
    fn test_fallback_to_default() {
        let temp_dir = setup_folder(&[("default.txt", "Fallback")]);
        let group = LocaleGroup::new(temp_dir.path(), TextSpec::default());

        let value = group.get(&locale("fr_FR")).expect("Should fall back");
        assert_eq!(value.as_str(), "Fallback");
        assert_eq!(*value, *group.get_default().unwrap());
    }

    #[test]
    fn test_fallthrough_is_not_cached() {
        let temp_dir = setup_folder(&[("default.txt", "Fallback")]);
        let group = LocaleGroup::new(temp_dir.path(), TextSpec::default());

        assert_eq!(group.get(&locale("fr_FR")).unwrap().as_str(), "Fallback");
        // Only the default entry is cached; fr_FR stays re-resolvable.
        assert_eq!(group.cached_count(), 1);

        std::fs::write(temp_dir.path().join("fr_FR.txt"), "Bonjour").unwrap();
        assert_eq!(group.get(&locale("fr_FR")).unwrap().as_str(), "Bonjour");
        assert_eq!(group.cached_count(), 2);
    }

    #[test]
    fn test_custom_fallback_locale() {
        let temp_dir = setup_folder(&[("en.txt", "English")]);
        let group =
            LocaleGroup::with_fallback(temp_dir.path(), TextSpec::default(), locale("en"));

        let value = group.get(&locale("de_DE")).expect("Should fall back");
        assert_eq!(value.as_str(), "English");
    }

    #[rstest]
    #[case(&["en_US.txt", "en.txt"], "US English")]
    #[case(&["en.txt"], "English")]
    fn test_variant_order_first_match_wins(
        #[case] files: &[&str],
        #[case] expected: &str,
    ) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("en_US.txt"), "US English").unwrap();
        std::fs::write(temp_dir.path().join("en.txt"), "English").unwrap();
        // Restrict the search to the case's files by pointing the strategy
        // at their stems in order.
        let stems: Vec<String> = files
            .iter()
            .map(|f| f.trim_end_matches(".txt").to_string())
            .collect();
        let group = LocaleGroup::new(temp_dir.path(), TextSpec::default())
            .with_variant_strategy(move |_| stems.clone());

        let value = group.get(&locale("en_US")).expect("Should resolve");
        assert_eq!(value.as_str(), expected);
    }

    #[test]
    fn test_fallback_stems_strategy() {
        // Only the language-level file exists; the richer chain finds it.
        let temp_dir = setup_folder(&[("en.txt", "English")]);
        let group = LocaleGroup::new(temp_dir.path(), TextSpec::default())
            .with_variant_strategy(|l| l.fallback_stems());

        let value = group.get(&locale("en_US")).expect("Should resolve");
        assert_eq!(value.as_str(), "English");
    }

    #[test]
    fn test_locale_variants_default_strategy() {
        let temp_dir = setup_folder(&[]);
        let group = LocaleGroup::new(temp_dir.path(), TextSpec::default());

        assert_eq!(group.locale_variants(&locale("en_US")), vec!["en_US"]);
        assert_eq!(group.locale_variants(&Locale::Default), vec!["default"]);
    }

    #[test]
    fn test_loader_error_passes_through() {
        struct FailingSpec;
        impl ResourceSpec for FailingSpec {
            type Kind = String;
            fn extension(&self) -> &str {
                ".txt"
            }
            fn load(&self, _path: &Path) -> anyhow::Result<String> {
                anyhow::bail!("malformed content")
            }
            fn save(&self, _value: &String, _path: &Path) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let temp_dir = setup_folder(&[("default.txt", "anything")]);
        let group = LocaleGroup::new(temp_dir.path(), FailingSpec);

        let err = group.get(&Locale::Default).unwrap_err();
        assert!(matches!(err, ResourceError::Resource(_)));
        assert!(err.to_string().contains("malformed content"));
    }

    #[test]
    fn test_concurrent_same_locale_loads_once() {
        let temp_dir = setup_folder(&[("en_US.txt", "Hello")]);
        let loads = Arc::new(AtomicUsize::new(0));
        let group = Arc::new(LocaleGroup::new(
            temp_dir.path(),
            CountingSpec {
                loads: Arc::clone(&loads),
            },
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let group = Arc::clone(&group);
            handles.push(std::thread::spawn(move || {
                group.get(&locale("en_US")).unwrap().as_str().to_string()
            }));
        }
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "Hello");
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
