//! Registry of file extensions accepted as archive names

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use tracing::debug;

/// Extensions that are always recognized and cannot be removed
pub const BUILTIN_EXTENSIONS: &[&str] = &["zip", "cbz"];

static GLOBAL: Lazy<ExtensionPolicy> = Lazy::new(ExtensionPolicy::new);

/// Set of recognized archive extensions.
///
/// Lookups are case-insensitive and ignore a leading dot. The built-in
/// subset is fixed; only the custom subset can be changed at runtime.
#[derive(Debug, Default)]
pub struct ExtensionPolicy {
    custom: RwLock<BTreeSet<String>>,
}

impl ExtensionPolicy {
    /// Create an isolated policy seeded with the built-in extensions
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide policy used by the free functions of this crate
    pub fn global() -> &'static ExtensionPolicy {
        &GLOBAL
    }

    /// Whether `extension` is a built-in or custom archive extension
    pub fn is_valid(&self, extension: &str) -> bool {
        let extension = normalize(extension);
        is_builtin(&extension) || self.custom.read().contains(&extension)
    }

    /// Negation of [`is_valid`](Self::is_valid); a missing extension is invalid
    pub fn is_invalid(&self, extension: Option<&str>) -> bool {
        match extension {
            Some(ext) => !self.is_valid(ext),
            None => true,
        }
    }

    /// Register a custom extension. Adding one twice is a no-op.
    pub fn add_custom(&self, extension: &str) {
        let extension = normalize(extension);
        if extension.is_empty() || is_builtin(&extension) {
            return;
        }
        if self.custom.write().insert(extension.clone()) {
            debug!(extension = %extension, "Registered custom archive extension");
        }
    }

    /// Remove a custom extension. Built-in extensions are left untouched.
    pub fn remove_custom(&self, extension: &str) {
        let extension = normalize(extension);
        if is_builtin(&extension) {
            debug!(extension = %extension, "Ignoring removal of built-in extension");
            return;
        }
        if self.custom.write().remove(&extension) {
            debug!(extension = %extension, "Removed custom archive extension");
        }
    }

    /// All recognized extensions, built-ins first, then custom ones sorted
    pub fn extensions(&self) -> Vec<String> {
        BUILTIN_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .chain(self.custom.read().iter().cloned())
            .collect()
    }
}

fn normalize(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

fn is_builtin(extension: &str) -> bool {
    BUILTIN_EXTENSIONS.contains(&extension)
}
