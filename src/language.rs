//! Language Support - Perl source file detection
//!
//! Decides which documents the navigator handles. Editors also send files
//! without an extension (scripts with a `#!perl` line), so content is checked
//! when the name is not conclusive.

use std::path::Path;

/// Detect language from file extension
///
/// Returns `"perl"` for Perl modules, scripts, tests and PSGI/CGI entry points.
pub fn detect_language_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "pm" | "pl" | "t" | "psgi" | "cgi" | "pod" => Some("perl"),
        _ => None,
    }
}

/// Whether a document should be parsed as Perl
pub fn is_perl_document(path: &Path, content: &str) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(extension) => detect_language_from_extension(extension).is_some(),
        None => has_perl_shebang(content),
    }
}

fn has_perl_shebang(content: &str) -> bool {
    content
        .lines()
        .next()
        .is_some_and(|first| first.starts_with("#!") && first.contains("perl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perl_extensions() {
        for ext in ["pm", "pl", "t", "psgi", "cgi"] {
            assert_eq!(detect_language_from_extension(ext), Some("perl"));
        }
        assert_eq!(detect_language_from_extension("rs"), None);
    }

    #[test]
    fn test_extensionless_scripts_use_shebang() {
        assert!(is_perl_document(
            Path::new("bin/deploy"),
            "#!/usr/bin/env perl\nuse strict;\n"
        ));
        assert!(!is_perl_document(Path::new("bin/run"), "#!/bin/sh\n"));
        assert!(!is_perl_document(Path::new("README.md"), "#!perl"));
    }
}
