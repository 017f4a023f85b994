//! Process-wide extension policy behavior

use ziplet_core::{
    add_custom_file_extension, file_extension_is_invalid, is_valid_file_extension,
    remove_custom_file_extension,
};

fn extension_of(name: &str) -> Option<&str> {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
}

#[test]
fn test_file_extension_is_not_invalid_for_valid_name() {
    assert!(!file_extension_is_invalid(extension_of("file.cbz")));
}

#[test]
fn test_file_extension_is_invalid_for_invalid_name() {
    assert!(file_extension_is_invalid(extension_of("file.xyz")));
}

#[test]
fn test_missing_extension_is_invalid() {
    assert!(file_extension_is_invalid(extension_of("file")));
    assert!(file_extension_is_invalid(None));
}

#[test]
fn test_added_then_removed_custom_extension() {
    add_custom_file_extension("cstm");
    assert!(is_valid_file_extension("cstm"));
    assert!(is_valid_file_extension("CSTM"));

    remove_custom_file_extension("cstm");
    assert!(!is_valid_file_extension("cstm"));
}

#[test]
fn test_default_file_extensions_are_valid() {
    assert!(is_valid_file_extension("zip"));
    assert!(is_valid_file_extension("cbz"));
}

#[test]
fn test_default_file_extensions_are_not_removed() {
    remove_custom_file_extension("zip");
    remove_custom_file_extension("cbz");
    assert!(is_valid_file_extension("zip"));
    assert!(is_valid_file_extension("cbz"));
}
