// src/utils/path.rs

//! Windows and UNC path helpers.
//!
//! The anonymization servers only understand UNC paths such as
//! `\\server\share\folder`. Paths are handled as strings because they refer
//! to network locations, not to the local filesystem.

/// True for `\\server\share` and anything below it.
pub fn is_unc_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix(r"\\") else {
        return false;
    };
    let mut parts = rest.split(['\\', '/']);
    let server = parts.next().unwrap_or_default();
    let share = parts.next().unwrap_or_default();
    !server.is_empty() && !share.is_empty() && !server.contains(':')
}

/// True for UNC paths and drive paths like `C:\data`.
pub fn is_absolute_windows_path(path: &str) -> bool {
    if path.starts_with(r"\\") {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Relative paths do not start at a root or a drive.
pub fn is_relative_path(path: &str) -> bool {
    !path.is_empty()
        && !is_absolute_windows_path(path)
        && !path.starts_with('\\')
        && !path.starts_with('/')
}

/// Join a relative path onto a Windows root using backslashes.
pub fn join_windows(root: &str, relative: &str) -> String {
    let relative = relative
        .trim_start_matches(".\\")
        .trim_start_matches("./")
        .replace('/', "\\");
    format!("{}\\{}", root.trim_end_matches(['\\', '/']), relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unc_path() {
        assert!(is_unc_path(r"\\server\share"));
        assert!(is_unc_path(r"\\umcsanfsclp01\radng_imaging\temp\test"));
        assert!(!is_unc_path(r"\\server"));
        assert!(!is_unc_path(r"C:\temp"));
        assert!(!is_unc_path("/folder/file0"));
        assert!(!is_unc_path(r"folder\sub"));
    }

    #[test]
    fn test_relative_detection() {
        assert!(is_relative_path(r"example\folder1"));
        assert!(is_relative_path("folder2/fileselection.txt"));
        assert!(!is_relative_path(r"C:\temp"));
        assert!(!is_relative_path(r"\\server\share\x"));
        assert!(!is_relative_path("/folder/file0"));
        assert!(!is_relative_path(""));
    }

    #[test]
    fn test_join_windows() {
        assert_eq!(
            join_windows(r"\\server\share\", "folder2/fileselection.txt"),
            r"\\server\share\folder2\fileselection.txt"
        );
        assert_eq!(
            join_windows(r"\\server\share", r".\example\folder1"),
            r"\\server\share\example\folder1"
        );
    }
}
