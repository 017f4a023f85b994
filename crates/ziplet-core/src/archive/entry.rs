//! Input path enumeration

use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One file or directory scheduled for an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    /// Absolute path of the source on disk
    pub source_path: PathBuf,
    /// Forward-slash separated name inside the archive; directories end with `/`
    pub archive_path: String,
    /// Whether this is a directory marker
    pub is_dir: bool,
    /// Size in bytes, used for progress weighting
    pub size_hint: u64,
}

impl ArchiveEntry {
    fn file(source_path: PathBuf, archive_path: String, size_hint: u64) -> Self {
        Self {
            source_path,
            archive_path,
            is_dir: false,
            size_hint,
        }
    }

    fn directory(source_path: PathBuf, mut archive_path: String) -> Self {
        if !archive_path.ends_with('/') {
            archive_path.push('/');
        }
        Self {
            source_path,
            archive_path,
            is_dir: true,
            size_hint: 0,
        }
    }
}

/// Expand input paths into a deterministic list of archive entries.
///
/// A file becomes one entry named after its base name. A directory becomes a
/// directory entry followed by its contents in file-name order, named
/// relative to the directory's parent. Symlinks are followed; a link back to
/// one of its own ancestors is recorded as a directory but not expanded.
pub fn enumerate<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let source = absolute(path)?;
        let name = base_name(&source)?;

        if metadata.is_dir() {
            enumerate_directory(&source, &name, &mut entries)?;
        } else {
            debug!("Enumerated file {:?} as {}", source, name);
            entries.push(ArchiveEntry::file(source, name, metadata.len()));
        }
    }

    Ok(entries)
}

fn enumerate_directory(root: &Path, name: &str, entries: &mut Vec<ArchiveEntry>) -> Result<()> {
    for item in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let item = match item {
            Ok(item) => item,
            Err(err) => {
                let Some(link) = err.path().map(Path::to_path_buf) else {
                    return Err(err.into());
                };
                if let Some(ancestor) = err.loop_ancestor() {
                    warn!(link = ?link, ancestor = ?ancestor, "Symlink loop, not expanding");
                    let archive_path = archive_name(root, name, &link)?;
                    entries.push(ArchiveEntry::directory(link, archive_path));
                    continue;
                }
                if link.is_symlink() {
                    warn!(link = ?link, "Broken symlink, skipping");
                    continue;
                }
                return Err(err.into());
            }
        };

        let path = item.path();
        let archive_path = archive_name(root, name, path)?;

        if item.file_type().is_dir() {
            debug!("Enumerated directory {:?} as {}", path, archive_path);
            entries.push(ArchiveEntry::directory(path.to_path_buf(), archive_path));
        } else if item.file_type().is_file() {
            let size = match item.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    warn!("Cannot read size of {:?}, counting it as empty: {}", path, err);
                    0
                }
            };
            debug!("Enumerated file {:?} as {}", path, archive_path);
            entries.push(ArchiveEntry::file(path.to_path_buf(), archive_path, size));
        } else {
            warn!("Skipping special file {:?}", path);
        }
    }

    Ok(())
}

/// Archive name of `path`, which lies under `root` whose own name is `name`
fn archive_name(root: &Path, name: &str, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::entry(path, "path escaped its enumeration root"))?;

    let mut archive_path = name.to_string();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                archive_path.push('/');
                archive_path.push_str(&portable_name(&part.to_string_lossy(), path)?);
            }
            _ => return Err(Error::entry(path, "unexpected path component")),
        }
    }
    Ok(archive_path)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

fn base_name(path: &Path) -> Result<String> {
    // `dir/..` or `.` have no file name until resolved
    let resolved;
    let path = if path.file_name().is_some() {
        path
    } else {
        resolved = path.canonicalize()?;
        &resolved
    };

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::entry(path, "path has no base name"))?;
    portable_name(&name, path)?;
    Ok(name)
}

/// Rejects names holding a backslash, which unpacking reads as a separator
fn portable_name<'a>(part: &'a str, path: &Path) -> Result<&'a str> {
    if part.contains('\\') {
        return Err(Error::entry(path, "file name contains a backslash"));
    }
    Ok(part)
}
