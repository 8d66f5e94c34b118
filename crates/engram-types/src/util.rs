use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::ProjectNamespace;

/// Calculate a project namespace from the project root path using SHA256
///
/// The path is canonicalized before hashing so that symlinked and relative
/// spellings of the same directory produce the same namespace. For example,
/// `/var/folders/...` and `/private/var/folders/...` hash identically on
/// macOS where `/var` is a symlink to `/private/var`.
pub fn namespace_from_root(project_root: &str) -> ProjectNamespace {
    let normalized = normalize_path(Path::new(project_root));
    let path_str = normalized.to_string_lossy();

    let mut hasher = Sha256::new();
    hasher.update(path_str.as_bytes());
    ProjectNamespace::new(format!("{:x}", hasher.finalize()))
}

/// Check if string is 64-character hexadecimal
pub fn is_64_char_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalize a path for comparison (resolve to absolute, canonicalize if possible)
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}
