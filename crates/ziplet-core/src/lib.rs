//! Ziplet - pack filesystem paths into ZIP archives and unpack them again
//!
//! The library walks input paths into a deterministic entry list, writes
//! them into a ZIP container (optionally AES-encrypted with a password),
//! unpacks containers back into a directory tree with traversal protection,
//! and reports progress that can be composed into a parent operation.

pub mod archive;
pub mod config;
pub mod error;
pub mod extension;
pub mod metadata;
pub mod progress;
pub mod security;

pub use error::{Error, Result};

// Re-export commonly used types
pub use archive::{
    add_custom_file_extension, file_extension_is_invalid, is_valid_file_extension,
    remove_custom_file_extension, unzip_file, zip_files, ArchiveEntry, Archiver, UnzipOptions,
    ZipOptions,
};
pub use extension::ExtensionPolicy;
pub use progress::{Progress, ProgressCallback, ProgressUnit};
