//! Unpacking a ZIP container into a directory tree

use super::UnzipOptions;
use crate::metadata::{zip_datetime_to_unix, EntryAttributes};
use crate::progress::Progress;
use crate::security::sanitize_entry_name;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

const BUFFER_SIZE: usize = 64 * 1024;

/// Header information of one container record, read without decrypting
#[derive(Debug)]
struct RecordInfo {
    name: String,
    is_dir: bool,
    size: u64,
    attributes: EntryAttributes,
}

/// Reads an archive and recreates its entries under a destination root
#[derive(Debug, Clone, Default)]
pub struct ArchiveReader {
    options: UnzipOptions,
}

impl ArchiveReader {
    pub fn new(options: UnzipOptions) -> Self {
        Self { options }
    }

    /// Unpack `source` into `destination`.
    ///
    /// Existing files are skipped unless `overwrite` is set; skipped entries
    /// still count as done. Any entry whose name resolves outside
    /// `destination` aborts the operation with [`Error::PathTraversal`].
    pub fn read(
        &self,
        source: &Path,
        destination: &Path,
        overwrite: bool,
        password: Option<&str>,
        progress: &Progress,
    ) -> Result<()> {
        match fs::metadata(source) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(Error::NotFound(source.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound(source.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            "Extracting ZIP {:?} to {:?} (overwrite: {})",
            source, destination, overwrite
        );

        let mut archive = ZipArchive::new(File::open(source)?)?;
        fs::create_dir_all(destination)?;

        let records = (0..archive.len())
            .map(|index| record_info(&mut archive, index))
            .collect::<Result<Vec<_>>>()?;
        let total = records
            .iter()
            .map(|record| self.options.unit.weight(record.size))
            .sum();
        progress.begin(total);

        let mut directories = Vec::new();

        for (index, record) in records.iter().enumerate() {
            progress.report_entry(&record.name);
            let target = sanitize_entry_name(destination, &record.name)?;

            if !record.is_dir && target == destination {
                return Err(Error::entry(&target, "file entry names the destination root"));
            }

            if record.is_dir {
                if self.create_directory(&target, overwrite)? {
                    directories.push((target, record.attributes));
                }
            } else {
                self.extract_file(&mut archive, index, record, &target, overwrite, password)?;
            }

            progress.advance(self.options.unit.weight(record.size));
        }

        // Deepest directories first, after all their children were written
        for (path, attributes) in directories.iter().rev() {
            self.apply_attributes(path, attributes)?;
        }

        info!("Successfully extracted ZIP archive {:?}", source);
        Ok(())
    }

    /// Returns whether the directory is ours to restore attributes on.
    ///
    /// Existing directories are only claimed when overwriting; they are made
    /// writable so a previous read-only restore does not block their children.
    fn create_directory(&self, target: &Path, overwrite: bool) -> Result<bool> {
        match fs::symlink_metadata(target) {
            Ok(metadata) if metadata.is_dir() && !overwrite => {
                debug!("Keeping existing directory untouched: {:?}", target);
                Ok(false)
            }
            Ok(metadata) if metadata.is_dir() => {
                ensure_writable(target, &metadata).map_err(|e| Error::entry(target, e))?;
                Ok(true)
            }
            Ok(_) if !overwrite => {
                warn!("Skipping directory, a file exists at {:?}", target);
                Ok(false)
            }
            Ok(_) => {
                debug!("Replacing file with directory: {:?}", target);
                fs::remove_file(target).map_err(|e| Error::entry(target, e))?;
                fs::create_dir_all(target).map_err(|e| Error::entry(target, e))?;
                Ok(true)
            }
            Err(_) => {
                debug!("Creating directory: {:?}", target);
                fs::create_dir_all(target).map_err(|e| Error::entry(target, e))?;
                Ok(true)
            }
        }
    }

    fn extract_file<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        index: usize,
        record: &RecordInfo,
        target: &Path,
        overwrite: bool,
        password: Option<&str>,
    ) -> Result<()> {
        let existing = fs::symlink_metadata(target).ok();
        if existing.is_some() && !overwrite {
            info!("Skipping existing file: {:?}", target);
            return Ok(());
        }

        // Open first so a bad password leaves existing files alone
        let opened = match password {
            Some(password) => archive.by_index_decrypt(index, password.as_bytes()),
            None => archive.by_index(index),
        };
        let mut file = opened.map_err(|e| match e {
            ZipError::InvalidPassword => Error::BadPassword(record.name.clone()),
            ZipError::UnsupportedArchive(msg) if msg == ZipError::PASSWORD_REQUIRED => {
                Error::BadPassword(record.name.clone())
            }
            other => Error::from(other),
        })?;

        if let Some(existing) = existing {
            debug!("Overwriting existing entry: {:?}", target);
            // Removing needs only a writable parent, so read-only files are replaced too
            if let Some(parent) = target.parent() {
                if let Ok(metadata) = fs::metadata(parent) {
                    ensure_writable(parent, &metadata).map_err(|e| Error::entry(target, e))?;
                }
            }
            if existing.is_dir() {
                fs::remove_dir_all(target).map_err(|e| Error::entry(target, e))?;
            } else {
                fs::remove_file(target).map_err(|e| Error::entry(target, e))?;
            }
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::entry(target, e))?;
        }

        debug!("Extracting: {} -> {:?}", record.name, target);
        let encrypted = file.encrypted();
        if let Err(err) = write_contents(&mut file, target) {
            // Never leave a truncated file behind
            let _ = fs::remove_file(target);
            return Err(match err {
                // ZipCrypto's header check lets some wrong passwords through to the CRC
                CopyError::Read(_) if encrypted => Error::BadPassword(record.name.clone()),
                CopyError::Read(e) | CopyError::Write(e) => Error::entry(target, e),
            });
        }
        drop(file);

        self.apply_attributes(target, &record.attributes)
    }

    fn apply_attributes(&self, path: &Path, attributes: &EntryAttributes) -> Result<()> {
        attributes
            .apply(
                path,
                self.options.preserve_permissions,
                self.options.preserve_timestamps,
            )
            .map_err(|e| Error::entry(path, e))
    }
}

#[cfg(unix)]
fn ensure_writable(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    if mode & 0o700 != 0o700 {
        debug!("Making directory writable for extraction: {:?}", path);
        fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o700))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_writable(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

fn record_info<R: Read + Seek>(archive: &mut ZipArchive<R>, index: usize) -> Result<RecordInfo> {
    let file = archive.by_index_raw(index)?;
    Ok(RecordInfo {
        name: file.name().to_string(),
        is_dir: file.is_dir(),
        size: file.size(),
        attributes: EntryAttributes {
            mode: file.unix_mode(),
            mtime: file
                .last_modified()
                .and_then(|modified| zip_datetime_to_unix(&modified)),
        },
    })
}

enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

fn write_contents<R: Read>(reader: &mut R, target: &Path) -> std::result::Result<(), CopyError> {
    let mut output = File::create(target).map_err(CopyError::Write)?;
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        output.write_all(&buffer[..read]).map_err(CopyError::Write)?;
    }
    output.flush().map_err(CopyError::Write)
}

/// Archive names inside `source`, in container order
pub fn list_entries(source: &Path) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(File::open(source)?)?;
    (0..archive.len())
        .map(|index| record_info(&mut archive, index).map(|record| record.name))
        .collect()
}

/// Destination directory used when none is given: the archive stem next to it
pub fn default_destination(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "extracted".into());
    source.with_file_name(stem)
}
