//! Bundle access: the read-only packaged form of an application.
//!
//! A [`Bundle`] is an injected capability for listing and reading archive
//! entries addressed by slash-separated relative paths. [`ZipBundle`]
//! reads a packaged zip archive, [`DirBundle`] reads a loose directory
//! tree (the development layout), and [`EmptyBundle`] stands in when the
//! process is not running from a packaged archive at all; exporting from
//! it is a silent no-op, never an error.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use zip::ZipArchive;

/// One entry in a bundle, named by slash-separated relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub name: String,
    pub is_dir: bool,
}

impl BundleEntry {
    pub fn file<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Read-only access to the entries of a packaged application archive.
pub trait Bundle: Send + Sync {
    /// List every entry in the bundle.
    fn entries(&self) -> Vec<BundleEntry>;

    /// Read the bytes of the named file entry.
    ///
    /// # Errors
    /// `NotFound` when no such entry exists; other I/O errors for a
    /// corrupt or unreadable archive.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// A bundle backed by a zip archive on disk.
pub struct ZipBundle {
    archive: Mutex<ZipArchive<File>>,
}

impl ZipBundle {
    /// Open a zip archive as a bundle.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let archive = ZipArchive::new(file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self {
            archive: Mutex::new(archive),
        })
    }
}

impl Bundle for ZipBundle {
    fn entries(&self) -> Vec<BundleEntry> {
        let mut archive = self.archive.lock();
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            match archive.by_index(index) {
                Ok(entry) => {
                    let is_dir = entry.is_dir();
                    // Directory names keep no trailing slash so prefix
                    // matching treats files and directories alike.
                    let name = entry.name().trim_end_matches('/').to_string();
                    entries.push(BundleEntry { name, is_dir });
                }
                Err(e) => {
                    log::warn!("Skipping unreadable archive entry {}: {}", index, e);
                }
            }
        }
        entries
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let mut archive = self.archive.lock();
        let mut entry = archive.by_name(name).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => io::Error::new(
                io::ErrorKind::NotFound,
                format!("no bundle entry '{}'", name),
            ),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        })?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// A bundle backed by a loose directory tree.
///
/// Entry names are paths relative to the root with `/` separators,
/// regardless of platform.
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn collect(&self, dir: &Path, prefix: &str, entries: &mut Vec<BundleEntry>) -> io::Result<()> {
        let mut names: Vec<(String, bool)> = Vec::new();
        for item in std::fs::read_dir(dir)? {
            let item = item?;
            let Some(file_name) = item.file_name().to_str().map(str::to_string) else {
                log::warn!("Skipping non-UTF-8 entry under {:?}", dir);
                continue;
            };
            names.push((file_name, item.file_type()?.is_dir()));
        }
        names.sort();

        for (file_name, is_dir) in names {
            let name = if prefix.is_empty() {
                file_name.clone()
            } else {
                format!("{}/{}", prefix, file_name)
            };
            if is_dir {
                entries.push(BundleEntry::dir(name.clone()));
                self.collect(&dir.join(&file_name), &name, entries)?;
            } else {
                entries.push(BundleEntry::file(name));
            }
        }
        Ok(())
    }
}

impl Bundle for DirBundle {
    fn entries(&self) -> Vec<BundleEntry> {
        let mut entries = Vec::new();
        if let Err(e) = self.collect(&self.root, "", &mut entries) {
            log::warn!("Failed to list bundle directory {:?}: {}", self.root, e);
        }
        entries
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let mut path = self.root.clone();
        for part in name.split('/') {
            path.push(part);
        }
        std::fs::read(path)
    }
}

/// The no-bundle case: a process running from loose files has its
/// resources on disk already, so every export is a silent no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyBundle;

impl Bundle for EmptyBundle {
    fn entries(&self) -> Vec<BundleEntry> {
        Vec::new()
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no bundle entry '{}'", name),
        ))
    }
}
