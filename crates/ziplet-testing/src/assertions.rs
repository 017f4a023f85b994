//! Common assertions for ziplet testing

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Asserts that two directory structures are identical
pub fn assert_dirs_equal(dir1: &Path, dir2: &Path) -> Result<()> {
    let entries1 = collect_entries(dir1)?;
    let entries2 = collect_entries(dir2)?;

    let relative1: Vec<&Path> = entries1
        .iter()
        .map(|p| p.strip_prefix(dir1))
        .collect::<Result<_, _>>()?;
    let relative2: Vec<&Path> = entries2
        .iter()
        .map(|p| p.strip_prefix(dir2))
        .collect::<Result<_, _>>()?;
    assert_eq!(relative1, relative2, "Directory trees differ");

    for (path1, path2) in entries1.iter().zip(entries2.iter()) {
        let meta1 = std::fs::metadata(path1)?;
        let meta2 = std::fs::metadata(path2)?;

        assert_eq!(
            meta1.is_file(),
            meta2.is_file(),
            "File type mismatch for {:?}",
            path1
        );

        if meta1.is_file() {
            let content1 = std::fs::read(path1)?;
            let content2 = std::fs::read(path2)?;
            assert!(content1 == content2, "Content mismatch for {:?}", path1);
        }
    }

    Ok(())
}

/// Asserts that a file has specific permissions (Unix only)
#[cfg(unix)]
pub fn assert_file_permissions(path: &Path, expected: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;

    assert_eq!(
        mode, expected,
        "Permission mismatch for {:?}: expected {:o}, got {:o}",
        path, expected, mode
    );

    Ok(())
}

/// Asserts that `archive` holds exactly `expected` names, in order
pub fn assert_archive_names(archive: &Path, expected: &[&str]) -> Result<()> {
    let names = ziplet_core::archive::reader::list_entries(archive)?;
    assert_eq!(names, expected, "Archive names differ for {:?}", archive);
    Ok(())
}

fn collect_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        entries.push(entry?.path().to_path_buf());
    }
    Ok(entries)
}
