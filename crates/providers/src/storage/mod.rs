//! Publish destinations for rendered artifacts.

pub mod file_share;
pub mod object_store;
pub mod sigv4;

pub use file_share::FileShare;
pub use object_store::ObjectStore;

/// Artifact names are flat: ASCII letters, digits, `.`, `_` and `-`, no leading dot.
pub fn is_safe_artifact_name(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && filename.bytes().all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-'))
}

#[cfg(test)]
mod tests {
    use super::is_safe_artifact_name;

    #[test]
    fn artifact_names_cannot_traverse() {
        assert!(is_safe_artifact_name("wren-images-1700000000.html"));
        assert!(!is_safe_artifact_name("../secret"));
        assert!(!is_safe_artifact_name("nested/file.html"));
        assert!(!is_safe_artifact_name(".hidden"));
        assert!(!is_safe_artifact_name(""));
    }
}
