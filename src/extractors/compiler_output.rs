//! Compiler-output reader
//!
//! The compiler's introspection hooks print one symbol per line as seven
//! tab-separated fields:
//!
//! ```text
//! name  kind-code  type-detail  file  package  line-range  value
//! ```
//!
//! `line-range` is `start` or `start;end`, 1-based. Lines with any other field
//! count, and lines whose name is empty or `_`, are skipped without comment.

use crate::extractors::base::{Origin, SourceLocation, SymbolKind, SymbolRecord, SymbolTable};
use crate::utils::paths::file_reference_to_uri;

const FIELD_COUNT: usize = 7;
const IMPORT_CODE: &str = "u";
const PARENT_CODE: &str = "_";

/// Build a table from compiler introspection output for document `uri`
pub fn parse_compiler_output(uri: &str, output: &str) -> SymbolTable {
    let mut table = SymbolTable::new(uri);

    for raw_line in output.lines() {
        let line = raw_line.replace('\r', "");
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != FIELD_COUNT {
            continue;
        }
        let [name, code, type_detail, file, package, range, value] = [
            fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], fields[6],
        ];
        if name.is_empty() || name == "_" {
            continue;
        }
        let (start_line, end_line) = parse_line_range(range);

        match code {
            IMPORT_CODE => {
                table.imported.insert(name.to_string(), start_line);
            }
            PARENT_CODE => {
                table
                    .parents
                    .insert(name.to_string(), type_detail.to_string());
            }
            _ => {
                let Some(kind) = SymbolKind::from_code(code) else {
                    continue;
                };
                let file_uri = if file.is_empty() {
                    uri.to_string()
                } else {
                    file_reference_to_uri(file)
                };
                table.add_record(SymbolRecord {
                    name: name.to_string(),
                    kind,
                    type_detail: type_detail.to_string(),
                    signature: kind.is_callable().then(Vec::new),
                    location: SourceLocation::new(&file_uri, start_line, end_line),
                    package: package.to_string(),
                    value: value.to_string(),
                    origin: Origin::SymbolTableDump,
                });
            }
        }
    }

    tracing::debug!(
        "Read {} symbols, {} imports and {} parents from compiler output for {}",
        table.symbol_count(),
        table.imported.len(),
        table.parents.len(),
        uri
    );
    table
}

/// `"12"` or `"12;30"` (1-based) to a 0-based inclusive range
fn parse_line_range(range: &str) -> (usize, usize) {
    let mut parts = range.splitn(2, ';');
    let start = parts.next().map_or(0, to_zero_based);
    let end = parts.next().map_or(start, to_zero_based);
    (start, end.max(start))
}

fn to_zero_based(text: &str) -> usize {
    text.trim()
        .parse::<usize>()
        .map_or(0, |line| line.saturating_sub(1))
}
