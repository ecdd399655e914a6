/// Phasers, labels, constants and object fields (rules 7, 8 and 9)
use super::helpers::{
    bare_words, literal_value, Statement, CONSTANT_BLOCK_RE, CONSTANT_PAIR_RE, CONSTANT_RE,
    LABEL_RE, MOOSE_ATTR_LIST_RE, MOOSE_ATTR_RE, PAD_FIELD_RE, PHASER_RE, READONLY_RE,
};
use super::state::{Continuation, Framework};
use super::{PerlExtractor, RuleOutcome};
use crate::extractors::base::{RecordOptions, SymbolKind};

/// Rule 7: `BEGIN { ... }` and friends, or a `LABEL:` line
pub(super) fn phaser_or_label(extractor: &mut PerlExtractor, statement: &Statement) -> RuleOutcome {
    if let Some(caps) = PHASER_RE.captures(&statement.text) {
        let end_line = extractor.block_end(None);
        extractor.emit(
            &caps[1],
            SymbolKind::Phaser,
            RecordOptions {
                end_line,
                ..Default::default()
            },
        );
        return RuleOutcome::OpensBlock;
    }
    if let Some(caps) = LABEL_RE.captures(&statement.text) {
        extractor.emit(&caps[1], SymbolKind::Label, RecordOptions::default());
        return RuleOutcome::Handled;
    }
    RuleOutcome::Skipped
}

/// Rule 8: `use constant`, `Readonly my $X => ...`, `const my $X => ...`
pub(super) fn constant(extractor: &mut PerlExtractor, statement: &Statement) -> RuleOutcome {
    if let Some(caps) = CONSTANT_RE.captures(&statement.text) {
        emit_constant(extractor, &caps[1], &caps[2]);
        return RuleOutcome::Handled;
    }
    if let Some(caps) = CONSTANT_BLOCK_RE.captures(&statement.text) {
        let body = caps.get(1).map_or("", |m| m.as_str());
        emit_constant_pairs(extractor, body);
        if !body.contains('}') {
            extractor.state.continuation = Continuation::ConstantBlock;
        }
        return RuleOutcome::Handled;
    }
    if let Some(caps) = READONLY_RE.captures(&statement.text) {
        emit_constant(extractor, &caps[1], &caps[2]);
        return RuleOutcome::Handled;
    }
    RuleOutcome::Skipped
}

/// Every `NAME => value` pair in a constant block line
pub(super) fn emit_constant_pairs(extractor: &mut PerlExtractor, text: &str) {
    for caps in CONSTANT_PAIR_RE.captures_iter(text) {
        emit_constant(extractor, &caps[1], &caps[2]);
    }
}

fn emit_constant(extractor: &mut PerlExtractor, name: &str, value: &str) {
    extractor.emit(
        name,
        SymbolKind::Constant,
        RecordOptions {
            value: Some(literal_value(value)),
            ..Default::default()
        },
    );
}

/// Rule 9: attributes and fields, each gated on the object system in use
///
/// - `field $x`: Object::Pad or `use feature 'class'`
/// - `has $x`: Object::Pad
/// - `has name` / `has [qw(a b)]`: a Moose-family import
pub(super) fn field(extractor: &mut PerlExtractor, statement: &Statement) -> RuleOutcome {
    if let Some(caps) = PAD_FIELD_RE.captures(&statement.text) {
        let enabled = match &caps[1] {
            "field" => {
                extractor.state.is_active(Framework::ObjectPad)
                    || extractor.state.is_active(Framework::FeatureClass)
            }
            _ => extractor.state.is_active(Framework::ObjectPad),
        };
        if enabled {
            emit_field(extractor, &caps[2]);
            return RuleOutcome::Handled;
        }
    }

    if !extractor.state.is_active(Framework::MooseFamily) {
        return RuleOutcome::Skipped;
    }
    if let Some(caps) = MOOSE_ATTR_LIST_RE.captures(&statement.text) {
        for name in bare_words(&caps[1]) {
            emit_field(extractor, &name);
        }
        return RuleOutcome::Handled;
    }
    if let Some(caps) = MOOSE_ATTR_RE.captures(&statement.text) {
        emit_field(extractor, &caps[1]);
        return RuleOutcome::Handled;
    }
    RuleOutcome::Skipped
}

/// A field plus its `Package::name` alias for instance-style lookups
fn emit_field(extractor: &mut PerlExtractor, name: &str) {
    extractor.emit(name, SymbolKind::Field, RecordOptions::default());

    if extractor.state.current_package.is_empty() {
        return;
    }
    let bare = name.trim_start_matches(['$', '@', '%']);
    let pathed = format!("{}::{}", extractor.state.current_package, bare);
    extractor.emit(&pathed, SymbolKind::PathedField, RecordOptions::default());
}
