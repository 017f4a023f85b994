//! Archive operations module
//!
//! [`Archiver`] is the entry point: it validates the archive name against an
//! [`ExtensionPolicy`], enumerates inputs, and drives the writer or reader
//! with a progress tracker.

pub mod entry;
pub mod reader;
pub mod writer;

pub use entry::{enumerate, ArchiveEntry};
pub use reader::ArchiveReader;
pub use writer::ArchiveWriter;

use crate::extension::ExtensionPolicy;
use crate::progress::{Progress, ProgressUnit};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Compression applied to file entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression
    Stored,
    /// DEFLATE
    #[default]
    Deflated,
}

impl From<Compression> for zip::CompressionMethod {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Stored => zip::CompressionMethod::Stored,
            Compression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Options for packing
#[derive(Debug, Clone)]
pub struct ZipOptions {
    pub compression: Compression,
    /// Compression level (codec default if `None`)
    pub level: Option<i64>,
    /// What one progress unit stands for
    pub unit: ProgressUnit,
    /// Record unix permission bits of each source
    pub preserve_permissions: bool,
    /// Record the modification time of each source
    pub preserve_timestamps: bool,
}

impl Default for ZipOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            level: None,
            unit: ProgressUnit::Entries,
            preserve_permissions: true,
            preserve_timestamps: true,
        }
    }
}

/// Options for unpacking
#[derive(Debug, Clone)]
pub struct UnzipOptions {
    /// What one progress unit stands for
    pub unit: ProgressUnit,
    /// Restore recorded unix permission bits
    pub preserve_permissions: bool,
    /// Restore recorded modification times
    pub preserve_timestamps: bool,
}

impl Default for UnzipOptions {
    fn default() -> Self {
        Self {
            unit: ProgressUnit::Entries,
            preserve_permissions: true,
            preserve_timestamps: true,
        }
    }
}

/// Public entry points bound to one extension policy
#[derive(Debug, Clone, Copy)]
pub struct Archiver<'p> {
    policy: &'p ExtensionPolicy,
}

impl Default for Archiver<'static> {
    fn default() -> Self {
        Self::new(ExtensionPolicy::global())
    }
}

impl<'p> Archiver<'p> {
    pub fn new(policy: &'p ExtensionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &'p ExtensionPolicy {
        self.policy
    }

    /// Pack `paths` into `archive` with default options
    pub fn zip_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        archive: &Path,
        password: Option<&str>,
        progress: Option<&Progress>,
    ) -> Result<()> {
        self.zip_files_with_options(paths, archive, password, progress, &ZipOptions::default())
    }

    /// Pack `paths` into `archive`.
    ///
    /// The archive name must carry an extension accepted by the policy. When
    /// `progress` is given its total is set from the enumerated entries;
    /// attach it to a parent with [`Progress::child`] to compose progress.
    pub fn zip_files_with_options<P: AsRef<Path>>(
        &self,
        paths: &[P],
        archive: &Path,
        password: Option<&str>,
        progress: Option<&Progress>,
        options: &ZipOptions,
    ) -> Result<()> {
        let extension = archive.extension().and_then(|ext| ext.to_str());
        if self.policy.is_invalid(extension) {
            return Err(Error::InvalidExtension {
                path: archive.to_path_buf(),
                extension: extension.map(str::to_string),
            });
        }

        info!("Packing {} input path(s) into {:?}", paths.len(), archive);
        let entries = enumerate(paths)?;

        let owned;
        let progress = match progress {
            Some(progress) => progress,
            None => {
                owned = Progress::new();
                &owned
            }
        };

        ArchiveWriter::new(options.clone()).write(&entries, archive, password, progress)
    }

    /// Unpack `archive` into `destination` with default options
    pub fn unzip_file(
        &self,
        archive: &Path,
        destination: &Path,
        overwrite: bool,
        password: Option<&str>,
        progress: Option<&Progress>,
    ) -> Result<()> {
        self.unzip_file_with_options(
            archive,
            destination,
            overwrite,
            password,
            progress,
            &UnzipOptions::default(),
        )
    }

    /// Unpack `archive` into `destination`.
    ///
    /// The archive's extension is not checked here; only packing enforces
    /// the policy.
    pub fn unzip_file_with_options(
        &self,
        archive: &Path,
        destination: &Path,
        overwrite: bool,
        password: Option<&str>,
        progress: Option<&Progress>,
        options: &UnzipOptions,
    ) -> Result<()> {
        let owned;
        let progress = match progress {
            Some(progress) => progress,
            None => {
                owned = Progress::new();
                &owned
            }
        };

        ArchiveReader::new(options.clone()).read(archive, destination, overwrite, password, progress)
    }
}

/// Pack `paths` into `archive` using the process-wide extension policy
pub fn zip_files<P: AsRef<Path>>(
    paths: &[P],
    archive: impl AsRef<Path>,
    password: Option<&str>,
    progress: Option<&Progress>,
) -> Result<()> {
    Archiver::default().zip_files(paths, archive.as_ref(), password, progress)
}

/// Unpack `archive` into `destination`
pub fn unzip_file(
    archive: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    overwrite: bool,
    password: Option<&str>,
    progress: Option<&Progress>,
) -> Result<()> {
    Archiver::default().unzip_file(
        archive.as_ref(),
        destination.as_ref(),
        overwrite,
        password,
        progress,
    )
}

/// Whether `extension` is recognized by the process-wide policy
pub fn is_valid_file_extension(extension: &str) -> bool {
    ExtensionPolicy::global().is_valid(extension)
}

/// Whether `extension` is missing or not recognized by the process-wide policy
pub fn file_extension_is_invalid(extension: Option<&str>) -> bool {
    ExtensionPolicy::global().is_invalid(extension)
}

pub fn add_custom_file_extension(extension: &str) {
    ExtensionPolicy::global().add_custom(extension)
}

pub fn remove_custom_file_extension(extension: &str) {
    ExtensionPolicy::global().remove_custom(extension)
}
