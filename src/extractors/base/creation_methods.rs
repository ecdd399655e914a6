// Record creation methods
//
// Kept apart from extractor.rs the same way the symbol factories are split
// from the extractor state.

use super::extractor::BaseExtractor;
use super::types::{Origin, RecordOptions, SourceLocation, SymbolKind, SymbolRecord};

impl BaseExtractor {
    /// Create a record on the current line and store it in the table
    ///
    /// Returns the record's index among the records sharing its name, which is
    /// what signature continuations use to find it again. Empty names are
    /// dropped.
    pub fn create_record(
        &mut self,
        name: &str,
        kind: SymbolKind,
        package: &str,
        options: RecordOptions,
    ) -> Option<usize> {
        if name.is_empty() {
            return None;
        }

        let start_line = self.line_number;
        let end_line = options.end_line.unwrap_or(start_line);
        let index = self.table.records(name).len();

        let record = SymbolRecord {
            name: name.to_string(),
            kind,
            type_detail: options.type_detail.unwrap_or_default(),
            signature: options.signature,
            location: SourceLocation::new(&self.uri, start_line, end_line),
            package: package.to_string(),
            value: options.value.unwrap_or_default(),
            origin: Origin::HeuristicParser,
        };

        self.table.add_record(record);
        Some(index)
    }

    /// Append parameters to a sub recorded earlier
    pub fn append_signature(&mut self, name: &str, index: usize, params: &[String]) {
        if params.is_empty() {
            return;
        }
        if let Some(record) = self
            .table
            .elems
            .get_mut(name)
            .and_then(|records| records.get_mut(index))
        {
            record
                .signature
                .get_or_insert_with(Vec::new)
                .extend(params.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::NavigatorConfig;
    use crate::extractors::base::{BaseExtractor, ParseMode, RecordOptions, SymbolKind};

    #[test]
    fn test_create_record_uses_current_line_and_indexes_per_name() {
        let mut base = BaseExtractor::new(
            "file:///a.pl",
            ParseMode::SelfNavigation,
            vec![String::new(); 5],
            NavigatorConfig::default(),
        );
        base.line_number = 3;
        let first = base.create_record("foo", SymbolKind::LocalSub, "", RecordOptions::default());
        let second = base.create_record("foo", SymbolKind::LocalSub, "", RecordOptions::default());
        assert_eq!(first, Some(0));
        assert_eq!(second, Some(1));
        assert_eq!(base.table.records("foo")[1].line(), 3);

        assert_eq!(
            base.create_record("", SymbolKind::LocalVar, "", RecordOptions::default()),
            None
        );
    }

    #[test]
    fn test_append_signature_extends_existing_sub() {
        let mut base = BaseExtractor::new(
            "file:///a.pl",
            ParseMode::SelfNavigation,
            vec![String::new()],
            NavigatorConfig::default(),
        );
        let index = base
            .create_record(
                "run",
                SymbolKind::LocalSub,
                "",
                RecordOptions {
                    signature: Some(vec!["$self".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();
        base.append_signature("run", index, &["$arg".to_string()]);
        assert_eq!(
            base.table.records("run")[0].signature,
            Some(vec!["$self".to_string(), "$arg".to_string()])
        );
    }
}
