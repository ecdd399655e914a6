/// Web route and hook registrations (rule 13)
///
/// Only active after a Dancer, Dancer2 or Mojolicious::Lite import (the list is
/// configurable). Routes are keyed `verb path`, hooks by their name.
use super::helpers::{Statement, ANY_ROUTE_RE, HOOK_RE, ROUTE_RE};
use super::state::Framework;
use super::{PerlExtractor, RuleOutcome};
use crate::extractors::base::{RecordOptions, SymbolKind};

pub(super) fn web_route(extractor: &mut PerlExtractor, statement: &Statement) -> RuleOutcome {
    if !extractor.state.is_active(Framework::WebFramework) {
        return RuleOutcome::Skipped;
    }

    let text = &statement.text;
    let name = if let Some(caps) = ANY_ROUTE_RE.captures(text) {
        format!("any {}", &caps[1])
    } else if let Some(caps) = ROUTE_RE.captures(text) {
        format!("{} {}", &caps[1], &caps[2])
    } else if let Some(caps) = HOOK_RE.captures(text) {
        caps[1].to_string()
    } else {
        return RuleOutcome::Skipped;
    };

    let end_line = extractor.block_end(None);
    extractor.emit(
        &name,
        SymbolKind::HttpRoute,
        RecordOptions {
            end_line,
            ..Default::default()
        },
    );
    RuleOutcome::OpensBlock
}
