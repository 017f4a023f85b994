//! Path safety checks for unpacking untrusted archives

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::error;

/// Resolve an archive entry name against the destination root.
///
/// Entry names are split on both `/` and `\`. `.` segments are dropped and
/// `..` segments pop the previous segment; popping past the root, a leading
/// separator, or a drive prefix is rejected with [`Error::PathTraversal`].
pub fn sanitize_entry_name(base: &Path, name: &str) -> Result<PathBuf> {
    if name.contains('\0') {
        error!(entry = %name.escape_debug(), "Entry name contains NUL byte");
        return Err(Error::PathTraversal(name.escape_debug().to_string()));
    }

    if name.starts_with('/') || name.starts_with('\\') {
        error!(entry = %name, "Entry name is absolute");
        return Err(Error::PathTraversal(name.to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    for (index, segment) in name.split(['/', '\\']).enumerate() {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    error!(entry = %name, "Entry name escapes destination directory");
                    return Err(Error::PathTraversal(name.to_string()));
                }
            }
            _ if index == 0 && is_drive_prefix(segment) => {
                error!(entry = %name, "Entry name contains a drive prefix");
                return Err(Error::PathTraversal(name.to_string()));
            }
            _ => segments.push(segment),
        }
    }

    let mut resolved = base.to_path_buf();
    resolved.extend(segments);
    Ok(resolved)
}

fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
