//! UNC path formatting.
//!
//! Transfer-log consumers expect UNC-style paths. The adapter only formats
//! paths for logging; it never participates in copy semantics.

use std::path::Path;

/// Path formatting operations used when building transfer-log records.
pub trait PathAdapter {
    /// Format a path as a UNC share path. Idempotent on paths that are
    /// already UNC.
    fn to_unc(&self, path: &Path) -> String;

    /// True when the string is usable as a path (non-empty, no control or
    /// reserved characters).
    fn is_valid_path(&self, path: &str) -> bool;
}

/// Formats local paths as administrative-share UNC paths under the current
/// machine name (`C:\data` becomes `\\HOST\C$\data`).
#[derive(Debug, Clone)]
pub struct UncPathAdapter {
    machine_name: String,
}

impl UncPathAdapter {
    pub fn new() -> Self {
        let machine_name = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        UncPathAdapter { machine_name }
    }

    /// Build an adapter with an explicit machine name.
    pub fn with_machine_name(machine_name: &str) -> Self {
        UncPathAdapter {
            machine_name: machine_name.to_string(),
        }
    }
}

impl Default for UncPathAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PathAdapter for UncPathAdapter {
    fn to_unc(&self, path: &Path) -> String {
        let path = path.to_string_lossy();
        if path.starts_with("\\\\") {
            return path.into_owned();
        }

        let normalized = path.replace('/', "\\");
        let normalized = normalized.trim_start_matches('\\');

        // Drive letter becomes an administrative share (C: -> C$)
        let bytes = normalized.as_bytes();
        let normalized = if bytes.len() >= 2 && bytes[1] == b':' {
            format!("{}${}", &normalized[..1], &normalized[2..])
        } else {
            normalized.to_string()
        };

        format!("\\\\{}\\{}", self.machine_name, normalized)
    }

    fn is_valid_path(&self, path: &str) -> bool {
        if path.trim().is_empty() {
            return false;
        }
        !path
            .chars()
            .any(|c| c.is_control() || matches!(c, '<' | '>' | '"' | '|' | '?' | '*'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> UncPathAdapter {
        UncPathAdapter::with_machine_name("HOST")
    }

    #[test]
    fn test_unc_paths_pass_through_unchanged() {
        let unc = "\\\\server\\share\\file.txt";
        assert_eq!(adapter().to_unc(Path::new(unc)), unc);
    }

    #[test]
    fn test_drive_letter_becomes_administrative_share() {
        assert_eq!(
            adapter().to_unc(Path::new("C:\\data\\file.txt")),
            "\\\\HOST\\C$\\data\\file.txt"
        );
    }

    #[test]
    fn test_forward_slashes_are_normalized() {
        assert_eq!(
            adapter().to_unc(Path::new("/var/backups/a.txt")),
            "\\\\HOST\\var\\backups\\a.txt"
        );
    }

    #[test]
    fn test_to_unc_is_idempotent() {
        let adapter = adapter();
        let once = adapter.to_unc(Path::new("C:/data/file.txt"));
        let twice = adapter.to_unc(Path::new(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_is_valid_path() {
        let adapter = adapter();
        assert!(adapter.is_valid_path("/var/backups"));
        assert!(!adapter.is_valid_path("   "));
        assert!(!adapter.is_valid_path("bad|path"));
        assert!(!adapter.is_valid_path("bad\u{1}path"));
    }
}
