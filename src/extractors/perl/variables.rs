/// Variable rules: known constructors, lexical declarations, loop variables
/// and conditional bindings (rules 1-4)
use super::helpers::{
    sigil_variables, Statement, CATCH_BINDING_RE, CONDITIONAL_BINDING_RE, ISA_ASSIGN_RE,
    KNOWN_CONSTRUCTOR_RE, LEXICAL_DECL_RE, LOOP_VAR_RE,
};
use super::state::Continuation;
use super::{PerlExtractor, RuleOutcome};
use crate::extractors::base::{RecordOptions, SymbolKind};

/// Characters that show a `my` declaration is complete on its line
const DECLARATION_TERMINATORS: [char; 5] = [';', ')', '=', '}', '{'];

/// Rule 1: `my $x = Foo::Bar->new(...)` or `my $x = new Foo::Bar(...)`
pub(super) fn known_constructor(
    extractor: &mut PerlExtractor,
    statement: &Statement,
) -> RuleOutcome {
    let Some(caps) = KNOWN_CONSTRUCTOR_RE.captures(&statement.text) else {
        return RuleOutcome::Skipped;
    };
    let rest = caps
        .get(0)
        .map_or("", |m| &statement.text[m.end()..]);
    // `->new(...)->chain` says nothing reliable about `$x`
    if rest.contains(")->") || rest.trim_start().starts_with("->") {
        return RuleOutcome::Skipped;
    }

    let Some(type_name) = caps.get(2).or_else(|| caps.get(3)) else {
        return RuleOutcome::Skipped;
    };
    extractor.emit(
        &caps[1],
        SymbolKind::LocalVar,
        RecordOptions {
            type_detail: Some(type_name.as_str().to_string()),
            ..Default::default()
        },
    );
    RuleOutcome::Handled
}

/// Rule 2: `my`/`our`/`local`/`state` declarations
pub(super) fn lexical_variables(
    extractor: &mut PerlExtractor,
    statement: &Statement,
) -> RuleOutcome {
    let Some(caps) = LEXICAL_DECL_RE.captures(&statement.text) else {
        return RuleOutcome::Skipped;
    };
    let rest = caps.get(1).map_or("", |m| m.as_str());
    if matches!(rest.split_whitespace().next(), Some("sub" | "method")) {
        return RuleOutcome::Skipped;
    }

    let declared = rest.split('=').next().unwrap_or(rest);
    extractor.emit_local_vars(&sigil_variables(declared));

    if let Some(parent) = ISA_ASSIGN_RE.captures(&statement.text) {
        let child = extractor.state.package_or_main().to_string();
        extractor
            .base
            .table
            .parents
            .insert(child, parent[1].to_string());
    }

    if !statement.terminated && !statement.text.contains(DECLARATION_TERMINATORS) {
        extractor.state.continuation = Continuation::Variables;
    }
    RuleOutcome::Handled
}

/// Rule 3: `foreach my $x`, optionally labelled
pub(super) fn loop_variable(extractor: &mut PerlExtractor, statement: &Statement) -> RuleOutcome {
    let Some(caps) = LOOP_VAR_RE.captures(&statement.text) else {
        return RuleOutcome::Skipped;
    };
    if let Some(label) = caps.get(1) {
        extractor.emit(label.as_str(), SymbolKind::Label, RecordOptions::default());
    }
    extractor.emit(&caps[2], SymbolKind::LocalVar, RecordOptions::default());
    RuleOutcome::Handled
}

/// Rule 4: `if (my $x = ...)`, `while (my ($k, $v) = ...)`, `catch ($e)`
pub(super) fn conditional_binding(
    extractor: &mut PerlExtractor,
    statement: &Statement,
) -> RuleOutcome {
    if let Some(caps) = CONDITIONAL_BINDING_RE.captures(&statement.text) {
        extractor.emit_local_vars(&sigil_variables(&caps[1]));
        return RuleOutcome::Handled;
    }
    if let Some(caps) = CATCH_BINDING_RE.captures(&statement.text) {
        extractor.emit(&caps[1], SymbolKind::LocalVar, RecordOptions::default());
        return RuleOutcome::Handled;
    }
    RuleOutcome::Skipped
}

/// Continue a `my (...)` list opened on an earlier line
pub(super) fn continue_variables(extractor: &mut PerlExtractor, line: &str) {
    let declared = line.split('=').next().unwrap_or(line);
    extractor.emit_local_vars(&sigil_variables(declared));
    if !line.contains(DECLARATION_TERMINATORS) {
        extractor.state.continuation = Continuation::Variables;
    }
}
