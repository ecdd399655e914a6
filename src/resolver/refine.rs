// Refinement - upgrade approximate records from their defining file
//
// Records from the compiler dump or the module index know roughly where a sub
// lives but carry no usable signature and sometimes a stale line. Re-parsing
// the target file in Refinement mode gives both.

use rayon::prelude::*;

use crate::extractors::base::{Origin, ParseMode, SymbolRecord};
use crate::extractors::ExtractorManager;

/// Re-derive location and signature of a sub-like record from its file
///
/// Anything that cannot be refined (not sub-like, already from the parser,
/// unreadable file, no matching declaration) comes back unchanged.
pub fn refine_record(record: &SymbolRecord, manager: &ExtractorManager) -> SymbolRecord {
    let approximate = matches!(record.origin, Origin::SymbolTableDump | Origin::ModuleScan);
    if !approximate || !record.kind.is_refinable() {
        return record.clone();
    }

    let text = match manager.read_document(&record.location.uri) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("Keeping {} unrefined: {}", record.name, e);
            return record.clone();
        }
    };
    let table = manager.parse_document(&record.location.uri, &text, ParseMode::Refinement);

    let owner = owning_package(record);
    let candidates: Vec<&SymbolRecord> = table
        .records(record.bare_name())
        .iter()
        .filter(|found| found.kind.is_refinable())
        .collect();
    let best = candidates
        .iter()
        .find(|found| !owner.is_empty() && found.package == owner)
        .or_else(|| candidates.first());

    let Some(found) = best else {
        tracing::debug!(
            "No declaration of {} in {}",
            record.name,
            record.location.uri
        );
        return record.clone();
    };

    SymbolRecord {
        location: found.location.clone(),
        signature: found.signature.clone(),
        package: if record.package.is_empty() {
            found.package.clone()
        } else {
            record.package.clone()
        },
        origin: Origin::HeuristicParser,
        ..record.clone()
    }
}

/// Refine a batch in parallel; output order matches input order
pub fn refine_records(records: &[SymbolRecord], manager: &ExtractorManager) -> Vec<SymbolRecord> {
    records
        .par_iter()
        .map(|record| refine_record(record, manager))
        .collect()
}

/// The package a record belongs to, from its field or its qualified name
fn owning_package(record: &SymbolRecord) -> &str {
    if !record.package.is_empty() {
        return &record.package;
    }
    record
        .name
        .rsplit_once("::")
        .map_or("", |(package, _)| package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{MergePolicy, SourceLocation, SymbolKind};
    use crate::resolver::{resolve, ModuleIndex};
    use crate::utils::paths::path_to_uri;
    use std::fs;
    use tempfile::TempDir;

    const WIDGET: &str = include_str!("../../test_samples/Acme/Widget.pm");
    const BASE: &str = include_str!("../../test_samples/Acme/Base.pm");
    const APP: &str = include_str!("../../test_samples/app.pl");

    fn dumped(name: &str, uri: &str, package: &str) -> SymbolRecord {
        SymbolRecord {
            name: name.to_string(),
            kind: SymbolKind::Method,
            type_detail: String::new(),
            signature: Some(vec![]),
            location: SourceLocation::new(uri, 0, 0),
            package: package.to_string(),
            value: String::new(),
            origin: Origin::SymbolTableDump,
        }
    }

    #[test]
    fn test_refines_signature_and_location() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Widget.pm");
        fs::write(&file, WIDGET).unwrap();
        let uri = path_to_uri(&file);

        let manager = ExtractorManager::new();
        let refined = refine_record(&dumped("Acme::Widget::spin", &uri, ""), &manager);

        assert_eq!(refined.origin, Origin::HeuristicParser);
        assert_eq!(refined.name, "Acme::Widget::spin");
        assert_eq!(refined.kind, SymbolKind::Method);
        assert_eq!(refined.line(), 16);
        assert_eq!(refined.package, "Acme::Widget");
        assert_eq!(
            refined.signature,
            Some(vec!["$self".to_string(), "$times".to_string()])
        );
    }

    #[test]
    fn test_prefers_declaration_in_owning_package() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Two.pm");
        fs::write(&file, "package One;\nsub run { }\npackage Two;\nsub run {\n    my ($self, $n) = @_;\n}\n").unwrap();
        let uri = path_to_uri(&file);

        let refined = refine_record(&dumped("run", &uri, "Two"), &ExtractorManager::new());
        assert_eq!(refined.line(), 3);
        assert_eq!(refined.signature, Some(vec!["$self".to_string(), "$n".to_string()]));
    }

    #[test]
    fn test_missing_file_returns_record_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let uri = path_to_uri(&temp_dir.path().join("Gone.pm"));
        let record = dumped("Gone::away", &uri, "Gone");

        assert_eq!(refine_record(&record, &ExtractorManager::new()), record);
    }

    #[test]
    fn test_parser_records_and_non_subs_are_left_alone() {
        let mut record = dumped("spin", "file:///nowhere.pm", "");
        record.origin = Origin::HeuristicParser;
        assert_eq!(refine_record(&record, &ExtractorManager::new()), record);

        let mut variable = dumped("$x", "file:///nowhere.pm", "");
        variable.kind = SymbolKind::LocalVar;
        assert_eq!(refine_record(&variable, &ExtractorManager::new()), variable);
    }

    #[test]
    fn test_batch_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Widget.pm");
        fs::write(&file, WIDGET).unwrap();
        let uri = path_to_uri(&file);

        let records = vec![
            dumped("Acme::Widget::_reset", &uri, ""),
            dumped("Acme::Widget::missing", &uri, ""),
            dumped("Acme::Widget::spin", &uri, ""),
        ];
        let refined = refine_records(&records, &ExtractorManager::new());

        assert_eq!(refined.len(), 3);
        assert_eq!(refined[0].line(), 25);
        assert_eq!(refined[1], records[1]);
        assert_eq!(refined[2].line(), 16);
    }

    #[test]
    fn test_script_calls_land_on_refined_declarations() {
        let temp_dir = TempDir::new().unwrap();
        let lib = temp_dir.path().join("lib").join("Acme");
        fs::create_dir_all(&lib).unwrap();
        let widget = lib.join("Widget.pm");
        let base = lib.join("Base.pm");
        let script = temp_dir.path().join("app.pl");
        fs::write(&widget, WIDGET).unwrap();
        fs::write(&base, BASE).unwrap();
        fs::write(&script, APP).unwrap();

        let manager = ExtractorManager::new();
        let mut table = manager
            .parse_file(&script, ParseMode::SelfNavigation)
            .unwrap();
        assert_eq!(table.canonical_type("$w"), Some("Acme::Widget"));
        assert_eq!(table.canonical_type("$other"), Some("Acme::Base"));

        // the dump knows the files but not the lines
        let output = format!(
            "Acme::Widget::spin\tx\t\t{}\tAcme::Widget\t1\t\nAcme::Base::describe\tx\t\t{}\tAcme::Base\t1\t\n",
            widget.display(),
            base.display()
        );
        let uri = table.uri.clone();
        table.merge(
            manager.parse_compiler_output(&uri, &output),
            MergePolicy::LastWriterWins,
        );
        let modules: ModuleIndex = [(
            "Acme::Base".to_string(),
            SourceLocation::new(&path_to_uri(&base), 0, 0),
        )]
        .into_iter()
        .collect();

        let spin = resolve(&table, &modules, "$w->spin", 6);
        assert_eq!(spin.len(), 1);
        let spin = refine_record(&spin[0], &manager);
        assert_eq!(spin.location.uri, path_to_uri(&widget));
        assert_eq!(spin.line(), 16);

        let describe = resolve(&table, &modules, "$other->describe", 9);
        assert_eq!(describe.len(), 1);
        let describe = refine_record(&describe[0], &manager);
        assert_eq!(describe.line(), 10);
        assert_eq!(
            describe.signature,
            Some(vec!["$self".to_string(), "$verbose".to_string()])
        );

        let module = resolve(&table, &modules, "Acme::Base", 12);
        assert_eq!(module[0].kind, SymbolKind::Module);
        assert_eq!(module[0].location.uri, path_to_uri(&base));
    }
}
