//! Icon resolution
//!
//! A token is first matched against the built-in presets, then read as a
//! path relative to the configuration directory. Resolution never fails
//! for the caller: unresolved tokens fall back to built-in bytes.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

/// Raw image bytes, shared between bindings and tray updates
pub type IconBytes = Arc<[u8]>;

/// Preset used when a token cannot be resolved
pub const DEFAULT_PRESET: &str = "kb_light";

/// Preset used when the configured disconnect icon cannot be resolved
pub const DISCONNECTED_PRESET: &str = "disconnected";

const PRESETS: &[(&str, &[u8])] = &[
    ("kb_light", include_bytes!("../../assets/kb_light.png")),
    ("kb_dark", include_bytes!("../../assets/kb_dark.png")),
    ("disconnected", include_bytes!("../../assets/disconnected.png")),
    ("disconnected_light", include_bytes!("../../assets/disconnected.png")),
    ("disconnected_dark", include_bytes!("../../assets/disconnected_dark.png")),
];

/// Reasons a token could not be resolved
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("empty icon name")]
    Empty,

    #[error("icon file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read icon {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Look up a built-in preset by case-insensitive name
pub fn preset(name: &str) -> Option<IconBytes> {
    let lower = name.trim().to_ascii_lowercase();
    PRESETS
        .iter()
        .find(|(preset, _)| *preset == lower)
        .map(|(_, bytes)| IconBytes::from(*bytes))
}

/// The default keyboard icon
pub fn default_icon() -> IconBytes {
    IconBytes::from(PRESETS[0].1)
}

/// Resolves icon tokens against presets and a base directory
#[derive(Debug, Clone)]
pub struct IconResolver {
    base_dir: PathBuf,
}

impl IconResolver {
    /// Create a resolver reading relative paths from `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve a token, reporting why it could not be resolved
    pub fn try_resolve(&self, token: &str) -> Result<IconBytes, IconError> {
        if token.trim().is_empty() {
            return Err(IconError::Empty);
        }

        if let Some(bytes) = preset(token) {
            return Ok(bytes);
        }

        let path = self.base_dir.join(token);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(IconBytes::from(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(IconError::NotFound(path)),
            Err(source) => Err(IconError::Read { path, source }),
        }
    }

    /// Resolve a token, falling back to the default icon
    pub fn resolve(&self, token: &str) -> IconBytes {
        self.resolve_or(token, DEFAULT_PRESET)
    }

    /// Resolve a token, falling back to the named preset
    pub fn resolve_or(&self, token: &str, fallback: &str) -> IconBytes {
        match self.try_resolve(token) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(token, fallback, error = %e, "icon unresolved, using fallback");
                preset(fallback).unwrap_or_else(default_icon)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_case_insensitive() {
        let resolver = IconResolver::new("/nonexistent");
        let light = resolver.try_resolve("KB_Light").unwrap();
        assert_eq!(&*light, &*default_icon());
        assert!(resolver.try_resolve("kb_dark").is_ok());
        assert!(resolver.try_resolve("disconnected").is_ok());
    }

    #[test]
    fn test_reads_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("icons")).unwrap();
        std::fs::write(dir.path().join("icons/gaming.png"), b"gaming-bytes").unwrap();

        let resolver = IconResolver::new(dir.path());
        let bytes = resolver.try_resolve("icons/gaming.png").unwrap();
        assert_eq!(&*bytes, b"gaming-bytes");
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = IconResolver::new(dir.path());
        assert!(matches!(
            resolver.try_resolve("missing.png"),
            Err(IconError::NotFound(_))
        ));
        assert!(matches!(resolver.try_resolve("  "), Err(IconError::Empty)));
    }

    #[test]
    fn test_resolve_always_returns_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = IconResolver::new(dir.path());
        for token in ["", "missing.png", "../../etc", "icons/", "kb_dark"] {
            assert!(!resolver.resolve(token).is_empty(), "token {token:?}");
        }
        assert_eq!(&*resolver.resolve("missing.png"), &*default_icon());
    }

    #[test]
    fn test_resolve_or_uses_named_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = IconResolver::new(dir.path());
        let bytes = resolver.resolve_or("nope.png", DISCONNECTED_PRESET);
        assert_eq!(&*bytes, &*preset("disconnected").unwrap());
    }
}
