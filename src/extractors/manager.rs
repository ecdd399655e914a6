//! ExtractorManager - Public API for symbol extraction
//!
//! Ties the preprocessor, the Perl extractor and the compiler-output reader
//! together. This module provides the main public interface for clients to
//! turn documents into symbol tables, one at a time or in parallel batches.

use anyhow::Context;
use rayon::prelude::*;
use std::fs;
use std::path::Path;

use crate::config::NavigatorConfig;
use crate::error::{NavigatorError, Result};
use crate::extractors::base::{ParseMode, SymbolTable};
use crate::extractors::compiler_output;
use crate::extractors::perl::PerlExtractor;
use crate::language::is_perl_document;
use crate::utils::paths::{path_to_uri, uri_to_path};

/// Entry point for building symbol tables
///
/// Stateless apart from its configuration, so one manager can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct ExtractorManager {
    config: NavigatorConfig,
}

impl ExtractorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NavigatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Parse one document's text
    ///
    /// Never fails: text the extractor cannot make sense of yields fewer
    /// records, not an error.
    pub fn parse_document(&self, uri: &str, text: &str, mode: ParseMode) -> SymbolTable {
        let table = PerlExtractor::new(uri, text, mode, self.config.clone()).extract();
        tracing::debug!(
            "Extracted {} symbols ({} typed) from {} in {} mode",
            table.symbol_count(),
            table.canonical_elems.len(),
            uri,
            mode
        );
        table
    }

    /// Read and parse a Perl file from disk; the table is keyed by the file's URI
    pub fn parse_file(&self, path: &Path, mode: ParseMode) -> anyhow::Result<SymbolTable> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read Perl source: {}", path.display()))?;
        if !is_perl_document(path, &content) {
            anyhow::bail!("Not a Perl source file: {}", path.display());
        }
        Ok(self.parse_document(&path_to_uri(path), &content, mode))
    }

    /// Parse many `(uri, text)` documents in parallel
    ///
    /// Results are in input order.
    pub fn parse_documents_batch(
        &self,
        documents: &[(String, String)],
        mode: ParseMode,
    ) -> Vec<SymbolTable> {
        documents
            .par_iter()
            .map(|(uri, text)| self.parse_document(uri, text, mode))
            .collect()
    }

    /// Build a table from the compiler's introspection output
    pub fn parse_compiler_output(&self, uri: &str, output: &str) -> SymbolTable {
        compiler_output::parse_compiler_output(uri, output)
    }

    /// Text of the file behind a document URI
    pub fn read_document(&self, uri: &str) -> Result<String> {
        let path = uri_to_path(uri).ok_or_else(|| NavigatorError::Io {
            path: uri.into(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file URI"),
        })?;
        fs::read_to_string(&path).map_err(|source| NavigatorError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::SymbolKind;
    use tempfile::TempDir;

    const WIDGET: &str = include_str!("../../test_samples/Acme/Widget.pm");

    #[test]
    fn test_parse_document_outline() {
        let manager = ExtractorManager::new();
        let table = manager.parse_document("file:///lib/Acme/Widget.pm", WIDGET, ParseMode::Outline);

        let package = &table.records("Acme::Widget")[0];
        assert_eq!(package.kind, SymbolKind::Package);
        assert!(package.location.end_line > package.location.start_line);
        assert_eq!(table.records("spin")[0].kind, SymbolKind::LocalSub);
        assert!(table.imported.contains_key("Acme::Base"));
    }

    #[test]
    fn test_parse_file_uses_file_uri() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Widget.pm");
        fs::write(&file, WIDGET).unwrap();

        let manager = ExtractorManager::new();
        let table = manager.parse_file(&file, ParseMode::SelfNavigation).unwrap();
        assert!(table.uri.starts_with("file://"));
        assert_eq!(table.records("spin")[0].location.uri, table.uri);
    }

    #[test]
    fn test_parse_file_missing_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("Gone.pm");

        let err = ExtractorManager::new()
            .parse_file(&missing, ParseMode::Outline)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Gone.pm"));
    }

    #[test]
    fn test_parse_file_rejects_other_languages() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("notes.txt");
        fs::write(&file, "sub looks_like_perl { }\n").unwrap();

        let err = ExtractorManager::new()
            .parse_file(&file, ParseMode::Outline)
            .unwrap_err();
        assert!(err.to_string().contains("Not a Perl source file"));
    }

    #[test]
    fn test_batch_matches_sequential_order() {
        let manager = ExtractorManager::new();
        let documents: Vec<(String, String)> = (0..8)
            .map(|i| {
                (
                    format!("file:///t/{}.pl", i),
                    format!("package P{};\nsub f{} {{ }}\n", i, i),
                )
            })
            .collect();

        let tables = manager.parse_documents_batch(&documents, ParseMode::SelfNavigation);
        assert_eq!(tables.len(), 8);
        for (i, table) in tables.iter().enumerate() {
            assert_eq!(table.uri, format!("file:///t/{}.pl", i));
            assert_eq!(table.records(&format!("f{}", i)).len(), 1);
        }
    }

    #[test]
    fn test_config_reaches_the_extractor() {
        let config = NavigatorConfig {
            web_framework_modules: vec!["My::Web".to_string()],
            ..Default::default()
        };
        let manager = ExtractorManager::with_config(config);
        let table = manager.parse_document(
            "file:///app.pl",
            "use My::Web;\nget '/ping' => sub { 'pong' };\n",
            ParseMode::SelfNavigation,
        );
        assert_eq!(table.records("get /ping")[0].kind, SymbolKind::HttpRoute);
    }

    #[test]
    fn test_read_document_errors_are_io_errors() {
        let manager = ExtractorManager::new();
        let err = manager
            .read_document("file:///definitely/not/here.pm")
            .unwrap_err();
        assert!(matches!(err, NavigatorError::Io { .. }));
        assert!(manager.read_document("untitled://1").is_err());
    }
}
