/// Package, class and role declarations (rule 5)
use super::extents::package_end_line;
use super::helpers::{Statement, CLASS_PARENT_RE, PACKAGE_DECL_RE};
use super::{PerlExtractor, RuleOutcome};
use crate::extractors::base::{RecordOptions, SymbolKind};

pub(super) fn package_declaration(
    extractor: &mut PerlExtractor,
    statement: &Statement,
) -> RuleOutcome {
    let Some(caps) = PACKAGE_DECL_RE.captures(&statement.text) else {
        return RuleOutcome::Skipped;
    };
    let kind = match &caps[1] {
        "class" => SymbolKind::Class,
        "role" => SymbolKind::Role,
        _ => SymbolKind::Package,
    };
    let name = caps[2].to_string();
    let rest = caps.get(3).map_or("", |m| m.as_str());

    extractor.state.current_package = name.clone();

    let end_line = extractor
        .base
        .mode
        .needs_extents()
        .then(|| package_end_line(&extractor.base.code_lines, extractor.base.line_number));
    extractor.emit(
        &name,
        kind,
        RecordOptions {
            end_line,
            ..Default::default()
        },
    );

    // `class Foo :isa(Bar)` / `class Foo isa Bar` / `class Foo extends Bar`
    if let Some(parent) = CLASS_PARENT_RE
        .captures(rest)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
    {
        extractor
            .base
            .table
            .parents
            .insert(name, parent.as_str().to_string());
    }
    RuleOutcome::OpensBlock
}
