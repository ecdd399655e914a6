// BaseExtractor implementation for perlnav
//
// Holds the pieces every language extractor needs: document identity, the
// parse mode, the cleaned line array, the table under construction and the
// line cursor.

use crate::config::NavigatorConfig;

use super::table::SymbolTable;
use super::types::ParseMode;

/// Base implementation for line-oriented extractors
pub struct BaseExtractor {
    pub uri: String,
    pub mode: ParseMode,
    /// Cleaned statements, one per source line
    pub code_lines: Vec<String>,
    pub table: SymbolTable,
    /// 0-based line currently being classified
    pub line_number: usize,
    pub config: NavigatorConfig,
}

impl BaseExtractor {
    pub fn new(
        uri: &str,
        mode: ParseMode,
        code_lines: Vec<String>,
        config: NavigatorConfig,
    ) -> Self {
        Self {
            uri: uri.to_string(),
            mode,
            code_lines,
            table: SymbolTable::new(uri),
            line_number: 0,
            config,
        }
    }

    /// Clean text of a line, empty past the end of the document
    pub fn line_text(&self, index: usize) -> &str {
        self.code_lines.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.code_lines.len()
    }

    /// Hand the finished table to the caller
    pub fn into_table(self) -> SymbolTable {
        self.table
    }
}
