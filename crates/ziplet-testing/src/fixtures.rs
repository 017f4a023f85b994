//! Common test fixtures

use crate::TestDir;
use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Creates a comic-book style tree under `comic/` and returns its root
pub fn create_comic_tree(test_dir: &TestDir) -> Result<PathBuf> {
    let root = test_dir.create_dir("comic")?;

    test_dir.create_file("comic/cover.gif", b"GIF89a cover")?;
    test_dir.create_file("comic/pages/001.gif", b"GIF89a page one")?;
    test_dir.create_file("comic/pages/002.gif", b"GIF89a page two")?;
    test_dir.create_file("comic/notes/credits.txt", b"Drawn by somebody.")?;
    test_dir.create_dir("comic/extras")?;

    // Incompressible-ish payload so stored and deflated archives differ
    let payload: Vec<u8> = (0..256 * 1024u32).map(|i| (i * 31 % 251) as u8).collect();
    test_dir.create_file("comic/pages/spread.raw", &payload)?;

    Ok(root)
}

/// Writes an archive whose records have exactly the given names.
///
/// Names ending in `/` become directory markers; the rest carry `content`.
/// The names are not checked, so this can produce hostile archives.
pub fn create_raw_archive(path: &Path, names: &[&str], content: &[u8]) -> Result<()> {
    let mut zip = ZipWriter::new(File::create(path)?);
    for name in names {
        if name.ends_with('/') {
            zip.add_directory(*name, FileOptions::<()>::default())?;
        } else {
            zip.start_file(*name, FileOptions::<()>::default())?;
            zip.write_all(content)?;
        }
    }
    zip.finish()?;
    Ok(())
}

/// Creates a symlink test structure (Unix only)
#[cfg(unix)]
pub fn create_symlink_structure(test_dir: &TestDir) -> Result<PathBuf> {
    use std::os::unix::fs::symlink;

    let root = test_dir.create_dir("linked")?;
    let target = test_dir.create_file("outside.txt", b"Original file")?;
    test_dir.create_file("linked/sub/file.txt", b"inside")?;

    symlink(&target, root.join("link_to_outside.txt"))?;
    symlink(&root, root.join("sub/loop"))?;

    Ok(root)
}
