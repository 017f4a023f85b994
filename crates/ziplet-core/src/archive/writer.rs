//! Writing enumerated entries into a ZIP container

use super::{ArchiveEntry, Compression, ZipOptions};
use crate::metadata::EntryAttributes;
use crate::progress::Progress;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::write::FileOptions;
use zip::{AesMode, CompressionMethod, ZipWriter};

const BUFFER_SIZE: usize = 64 * 1024;

/// Writes a list of entries into a new archive file
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    options: ZipOptions,
}

impl ArchiveWriter {
    pub fn new(options: ZipOptions) -> Self {
        Self { options }
    }

    /// Write `entries` into a new container at `destination`.
    ///
    /// Every file entry is encrypted with `password` when one is given.
    /// On failure the partially written container is removed.
    pub fn write(
        &self,
        entries: &[ArchiveEntry],
        destination: &Path,
        password: Option<&str>,
        progress: &Progress,
    ) -> Result<()> {
        let destination_abs = std::path::absolute(destination)?;
        let entries: Vec<&ArchiveEntry> = entries
            .iter()
            .filter(|entry| {
                let is_self = entry.source_path == destination_abs;
                if is_self {
                    warn!("Skipping the archive being written: {:?}", entry.source_path);
                }
                !is_self
            })
            .collect();

        let total = entries
            .iter()
            .map(|entry| self.options.unit.weight(entry.size_hint))
            .sum();
        progress.begin(total);

        info!(
            "Writing {} entries into ZIP {:?} (encrypted: {})",
            entries.len(),
            destination,
            password.is_some()
        );

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(destination)?;
        let mut zip = ZipWriter::new(file);

        if let Err(err) = self.write_entries(&mut zip, &entries, password, progress) {
            drop(zip);
            discard_partial(destination);
            return Err(err);
        }

        if let Err(err) = zip.finish() {
            discard_partial(destination);
            return Err(err.into());
        }

        info!("Successfully wrote ZIP archive: {:?}", destination);
        Ok(())
    }

    fn write_entries<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        entries: &[&ArchiveEntry],
        password: Option<&str>,
        progress: &Progress,
    ) -> Result<()> {
        let mut buffer = vec![0u8; BUFFER_SIZE];

        for entry in entries {
            progress.report_entry(&entry.archive_path);

            if entry.is_dir {
                self.write_directory(zip, entry)?;
            } else {
                self.write_file(zip, entry, password, &mut buffer)?;
            }

            progress.advance(self.options.unit.weight(entry.size_hint));
        }

        Ok(())
    }

    fn write_directory<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        entry: &ArchiveEntry,
    ) -> Result<()> {
        debug!("Adding directory to ZIP: {}", entry.archive_path);

        let attributes = source_attributes(entry)?;
        let options = self
            .entry_options(&attributes, None, false)
            .compression_method(CompressionMethod::Stored);

        zip.add_directory(entry.archive_path.as_str(), options)
            .map_err(|e| Error::entry(&entry.source_path, e))
    }

    fn write_file<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        entry: &ArchiveEntry,
        password: Option<&str>,
        buffer: &mut [u8],
    ) -> Result<()> {
        debug!(
            "Adding file to ZIP: {:?} as {}",
            entry.source_path, entry.archive_path
        );

        let mut file =
            File::open(&entry.source_path).map_err(|e| Error::entry(&entry.source_path, e))?;
        let attributes = source_attributes(entry)?;
        let large_file = entry.size_hint >= u32::MAX as u64;
        let options = self.entry_options(&attributes, password, large_file);

        zip.start_file(entry.archive_path.as_str(), options)
            .map_err(|e| Error::entry(&entry.source_path, e))?;

        // Read failures belong to the entry, write failures to the container
        loop {
            let read = match file.read(buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::entry(&entry.source_path, e)),
            };
            zip.write_all(&buffer[..read])?;
        }

        Ok(())
    }

    fn entry_options<'k>(
        &self,
        attributes: &EntryAttributes,
        password: Option<&'k str>,
        large_file: bool,
    ) -> FileOptions<'k, ()> {
        let mut options = FileOptions::<'k, ()>::default()
            .compression_method(self.options.compression.into())
            .large_file(large_file);

        if self.options.compression == Compression::Deflated {
            options = options.compression_level(self.options.level);
        }

        if self.options.preserve_permissions {
            if let Some(mode) = attributes.mode {
                options = options.unix_permissions(mode);
            }
        }

        if self.options.preserve_timestamps {
            if let Some(modified) = attributes.zip_datetime() {
                options = options.last_modified_time(modified);
            }
        }

        match password {
            Some(password) => options.with_aes_encryption(AesMode::Aes256, password),
            None => options,
        }
    }
}

fn source_attributes(entry: &ArchiveEntry) -> Result<EntryAttributes> {
    let metadata =
        fs::metadata(&entry.source_path).map_err(|e| Error::entry(&entry.source_path, e))?;
    Ok(EntryAttributes::from_metadata(&metadata))
}

fn discard_partial(destination: &Path) {
    match fs::remove_file(destination) {
        Ok(()) => debug!("Removed partial archive {:?}", destination),
        Err(e) => warn!("Failed to remove partial archive {:?}: {}", destination, e),
    }
}
