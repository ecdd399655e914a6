// perlnav Path Conversion Utilities
//
// Handles conversion between `file://` document URIs, as editors send them, and
// native filesystem paths. Only the `file` scheme is understood; any other URI
// has no path.

use std::path::{Path, PathBuf};
use url::Url;

/// Convert a `file://` URI to a native path
///
/// Percent-escapes are decoded. A bare path (no scheme) is accepted as-is so
/// callers can pass either form.
///
/// # Examples
/// ```
/// // "file:///home/murphy/lib/My%20Mod.pm" => "/home/murphy/lib/My Mod.pm"
/// // "file:///C:/work/lib/Foo.pm"          => "C:\work\lib\Foo.pm" (Windows)
/// ```
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        // `C:\work\Foo.pm` parses with the drive letter as its scheme
        Ok(url) if url.scheme().len() == 1 => Some(PathBuf::from(uri)),
        Ok(_) => None,
        Err(url::ParseError::RelativeUrlWithoutBase) => Some(PathBuf::from(uri)),
        Err(_) => None,
    }
}

/// Convert a native path to a `file://` URI
///
/// Relative paths are resolved against the current directory first.
pub fn path_to_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match Url::from_file_path(&absolute) {
        Ok(url) => url.to_string(),
        Err(()) => absolute.to_string_lossy().into_owned(),
    }
}

/// Turn a file name from compiler output into a URI; URIs pass through
pub fn file_reference_to_uri(file: &str) -> String {
    match Url::parse(file) {
        Ok(url) if url.scheme() == "file" => url.to_string(),
        _ => path_to_uri(Path::new(file)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_unix_uri_to_path() {
        let path = uri_to_path("file:///home/murphy/lib/Foo/Bar.pm").unwrap();
        assert_eq!(path, PathBuf::from("/home/murphy/lib/Foo/Bar.pm"));
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_spaces_are_percent_encoded_both_ways() {
        let path = PathBuf::from("/home/murphy/My Project/lib/Foo.pm");
        let uri = path_to_uri(&path);
        assert_eq!(uri, "file:///home/murphy/My%20Project/lib/Foo.pm");
        assert_eq!(uri_to_path(&uri).unwrap(), path);
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_unicode_in_paths() {
        let uri = path_to_uri(Path::new("/home/murphy/プロジェクト/Foo.pm"));
        assert!(uri.starts_with("file:///home/murphy/%E3%83%97"));
        assert_eq!(
            uri_to_path(&uri).unwrap(),
            PathBuf::from("/home/murphy/プロジェクト/Foo.pm")
        );
    }

    #[test]
    fn test_other_schemes_have_no_path() {
        assert_eq!(uri_to_path("untitled://Untitled-1"), None);
        assert_eq!(uri_to_path("lib/Foo.pm"), Some(PathBuf::from("lib/Foo.pm")));
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_only_local_hosts_have_paths() {
        assert_eq!(
            uri_to_path("file://localhost/tmp/Foo.pm"),
            Some(PathBuf::from("/tmp/Foo.pm"))
        );
        assert_eq!(uri_to_path("file://buildhost/tmp/Foo.pm"), None);
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_file_references_keep_existing_uris() {
        assert_eq!(
            file_reference_to_uri("file:///tmp/Foo.pm"),
            "file:///tmp/Foo.pm"
        );
        assert_eq!(file_reference_to_uri("/tmp/Foo.pm"), "file:///tmp/Foo.pm");
    }

    #[test]
    fn test_relative_paths_become_absolute_uris() {
        let uri = path_to_uri(Path::new("lib/Foo.pm"));
        assert!(uri.starts_with("file:///"));
        assert!(uri.ends_with("/lib/Foo.pm"));
    }

    #[test]
    fn test_round_trip_points_at_real_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Some Module.pm");
        fs::write(&file, "package Some::Module;\n1;\n").unwrap();

        let path = uri_to_path(&path_to_uri(&file)).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "package Some::Module;\n1;\n");
    }
}
