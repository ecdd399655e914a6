/// Imports, parents and autoload accessors (rules 11 and 12)
///
/// Every import is recorded with its line. Imports also switch on the
/// framework markers that later rules check.
use super::helpers::{
    first_package_name, Statement, AUTOLOAD_ACCESSOR_RE, EXTENDS_RE, IMPORT_RE,
};
use super::state::Framework;
use super::{PerlExtractor, RuleOutcome};
use crate::extractors::base::{RecordOptions, SymbolKind};

const MOOSE_FAMILY: &[&str] = &[
    "Moose",
    "Moose::Role",
    "Moo",
    "Moo::Role",
    "Mouse",
    "Mouse::Role",
    "Mo",
    "Role::Tiny",
    "Mojo::Base",
];

/// Imports whose arguments name the parent class
const PARENT_PRAGMAS: &[&str] = &["parent", "base", "Mojo::Base"];

/// Rule 11: `use Module`, `require Module`, `extends 'Parent'`
pub(super) fn module_import(extractor: &mut PerlExtractor, statement: &Statement) -> RuleOutcome {
    if let Some(caps) = EXTENDS_RE.captures(&statement.text) {
        register_parent(extractor, &caps[1]);
        return RuleOutcome::Handled;
    }

    let Some(caps) = IMPORT_RE.captures(&statement.text) else {
        return RuleOutcome::Skipped;
    };
    let module = &caps[2];
    let rest = caps.get(3).map_or("", |m| m.as_str());
    // `use v5.36`
    if is_version(module) {
        return RuleOutcome::Handled;
    }

    extractor
        .base
        .table
        .imported
        .insert(module.to_string(), extractor.base.line_number);
    activate_frameworks(extractor, module, rest);

    if &caps[1] == "use" && PARENT_PRAGMAS.contains(&module) {
        if let Some(parent) = first_package_name(rest) {
            register_parent(extractor, parent);
        }
    }
    RuleOutcome::Handled
}

/// Rule 12: `$self->{_name} ||= ...` implies a `name` getter
pub(super) fn autoload_accessor(
    extractor: &mut PerlExtractor,
    statement: &Statement,
) -> RuleOutcome {
    let Some(caps) = AUTOLOAD_ACCESSOR_RE.captures(&statement.text) else {
        return RuleOutcome::Skipped;
    };
    extractor.emit(&caps[1], SymbolKind::AutoLoadVar, RecordOptions::default());
    RuleOutcome::Handled
}

fn activate_frameworks(extractor: &mut PerlExtractor, module: &str, rest: &str) {
    let framework = if MOOSE_FAMILY.contains(&module) {
        Framework::MooseFamily
    } else if module == "Object::Pad" {
        Framework::ObjectPad
    } else if matches!(module, "feature" | "experimental") && rest.contains("class") {
        Framework::FeatureClass
    } else if module == "Function::Parameters" {
        Framework::FunctionParameters
    } else if extractor
        .base
        .config
        .web_framework_modules
        .iter()
        .any(|web| web == module)
    {
        Framework::WebFramework
    } else {
        return;
    };
    tracing::trace!("{:?} enabled by import of {}", framework, module);
    extractor.state.activate(framework);
}

fn register_parent(extractor: &mut PerlExtractor, parent: &str) {
    let child = extractor.state.package_or_main().to_string();
    extractor
        .base
        .table
        .parents
        .insert(child, parent.to_string());
}

fn is_version(module: &str) -> bool {
    let mut chars = module.chars();
    chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
}
