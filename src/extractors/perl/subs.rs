/// Subroutine and method declarations (rules 6 and 10)
///
/// Signatures come from the sigil tokens between the name and the first `{`.
/// When a sub declares no parameters, a short look-ahead picks up the usual
/// `@_` unpacking idioms instead.
use super::helpers::{
    sigil_variables, split_statements, Statement, ANON_SUB_VAR_RE, AROUND_RE, ARGS_LIST_RE,
    GLOB_SUB_RE, INDEXED_ARG_RE, METHOD_ATTRIBUTE_RE, SHIFT_ARG_RE, SUB_DECL_RE,
    SUB_SIGNATURE_FILTER_RE,
};
use super::preprocess::QuotedSpans;
use super::state::{Continuation, Framework};
use super::{PerlExtractor, RuleOutcome};
use crate::extractors::base::{ParseMode, RecordOptions, SymbolKind};

/// Rule 6
pub(super) fn sub_declaration(extractor: &mut PerlExtractor, statement: &Statement) -> RuleOutcome {
    let Some(caps) = SUB_DECL_RE.captures(&statement.text) else {
        return RuleOutcome::Skipped;
    };
    let keyword = caps.get(1).map_or("", |m| m.as_str());
    if matches!(keyword, "func" | "fun")
        && !extractor.state.is_active(Framework::FunctionParameters)
    {
        return RuleOutcome::Skipped;
    }

    let name = caps[2].to_string();
    let rest = caps.get(3).map_or("", |m| m.as_str());
    let kind = if keyword == "method" || METHOD_ATTRIBUTE_RE.is_match(rest) {
        SymbolKind::LocalMethod
    } else {
        SymbolKind::LocalSub
    };

    let opens_block = rest.contains('{');
    let header = rest.split('{').next().unwrap_or(rest);
    let params = sigil_variables(header);
    let unterminated = !opens_block && header.contains('(') && !header.contains(')');
    let forward_declaration = statement.terminated && !opens_block;

    let end_line = extractor.block_end(Some(&*SUB_SIGNATURE_FILTER_RE));
    let Some(index) = extractor.emit(
        &name,
        kind,
        RecordOptions {
            signature: Some(params.clone()),
            end_line,
            ..Default::default()
        },
    ) else {
        return RuleOutcome::Handled;
    };

    if extractor.base.mode == ParseMode::SelfNavigation {
        extractor.emit_local_vars(&params);
    }

    if unterminated {
        extractor.state.continuation = Continuation::Signature { name, index };
    } else if params.is_empty() && !forward_declaration {
        let found = lookahead_params(extractor);
        extractor.base.append_signature(&name, index, &found);
    }
    RuleOutcome::OpensBlock
}

/// `my $cb = sub {` and `*name = sub {`, listed in outlines only
pub(super) fn outline_only_sub(
    extractor: &mut PerlExtractor,
    statement: &Statement,
) -> RuleOutcome {
    let name = ANON_SUB_VAR_RE
        .captures(&statement.text)
        .or_else(|| GLOB_SUB_RE.captures(&statement.text))
        .map(|caps| caps[1].to_string());
    let Some(name) = name else {
        return RuleOutcome::Skipped;
    };

    let end_line = extractor.block_end(None);
    extractor.emit(
        &name,
        SymbolKind::OutlineOnlySub,
        RecordOptions {
            end_line,
            ..Default::default()
        },
    );
    RuleOutcome::OpensBlock
}

/// Rule 10: `around name => sub { ... }` re-declares the method
pub(super) fn method_modifier(extractor: &mut PerlExtractor, statement: &Statement) -> RuleOutcome {
    let Some(caps) = AROUND_RE.captures(&statement.text) else {
        return RuleOutcome::Skipped;
    };
    let name = caps[1].to_string();
    let end_line = extractor.block_end(None);
    let params = lookahead_params(extractor);
    extractor.emit(
        &name,
        SymbolKind::LocalMethod,
        RecordOptions {
            signature: Some(params),
            end_line,
            ..Default::default()
        },
    );
    RuleOutcome::OpensBlock
}

/// Continue a parameter list left open on an earlier line
pub(super) fn continue_signature(
    extractor: &mut PerlExtractor,
    line: &str,
    quoted: &QuotedSpans,
    name: String,
    index: usize,
) -> Option<Vec<Statement>> {
    let (header, body) = match line.split_once('{') {
        Some((header, body)) => (header, Some(body)),
        None => (line, None),
    };

    let params = sigil_variables(header);
    extractor.base.append_signature(&name, index, &params);
    if extractor.base.mode == ParseMode::SelfNavigation {
        extractor.emit_local_vars(&params);
    }

    if body.is_none() && !header.contains(')') {
        extractor.state.continuation = Continuation::Signature { name, index };
        return None;
    }
    body.map(|body| split_statements(body, &quoted.after(header.len() + 1)))
}

/// Parameters unpacked from `@_` in the first lines of a body
///
/// Scans the rest of the declaration line, then up to the configured number of
/// following lines, stopping after a line that contains `}`.
fn lookahead_params(extractor: &PerlExtractor) -> Vec<String> {
    let start = extractor.base.line_number;
    let first = extractor.base.line_text(start);
    let body = first.split_once('{').map_or("", |(_, body)| body);

    let mut params = unpacked_params(body);
    if body.contains('}') {
        return params;
    }

    let lookahead = extractor.base.config.signature_lookahead_lines;
    for index in (start + 1..=start + lookahead).take_while(|i| *i < extractor.base.line_count()) {
        let line = extractor.base.line_text(index);
        params.extend(unpacked_params(line));
        if line.contains('}') {
            break;
        }
    }
    params
}

/// `my (...) = @_;`, `my $x = shift;` and `my $x = $_[N];` in source order
fn unpacked_params(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, Vec<String>)> = Vec::new();

    for caps in ARGS_LIST_RE.captures_iter(text) {
        if let Some(m) = caps.get(0) {
            found.push((m.start(), sigil_variables(&caps[1])));
        }
    }
    for caps in SHIFT_ARG_RE
        .captures_iter(text)
        .chain(INDEXED_ARG_RE.captures_iter(text))
    {
        if let Some(m) = caps.get(0) {
            found.push((m.start(), vec![caps[1].to_string()]));
        }
    }

    found.sort_by_key(|(position, _)| *position);
    found.into_iter().flat_map(|(_, names)| names).collect()
}

#[cfg(test)]
mod tests {
    use super::unpacked_params;

    #[test]
    fn test_unpacked_params_keep_source_order() {
        assert_eq!(
            unpacked_params("my $self = shift; my ($a, $b) = @_; my $c = $_[2];"),
            vec!["$self", "$a", "$b", "$c"]
        );
        assert!(unpacked_params("my $x = 5;").is_empty());
    }
}
