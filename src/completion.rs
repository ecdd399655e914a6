// Completion matching
//
// Prefix matching over one document's table. The prefix is rewritten the way
// the resolver rewrites references (`->` as `::`, a typed `$var` as its type)
// and the labels are turned back into what the user typed.

use serde::{Deserialize, Serialize};

use crate::extractors::base::{SymbolKind, SymbolRecord, SymbolTable};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionCandidate {
    /// Text offered to the user, spelled the way they started it
    pub label: String,
    pub kind: SymbolKind,
    /// Tier digit followed by the label
    pub sort_key: String,
    pub record: SymbolRecord,
}

/// How the user's prefix was interpreted
struct Query {
    /// Prefix in table form: `::` separators, variable replaced by its type
    normalized: String,
    /// Typed text before the last `->`, when the user used an arrow
    invocant: Option<String>,
    /// The invocant is a variable of known type (or `$self`)
    known_object: bool,
    /// `$self->` with no recorded type: every sub, method and field matches
    any_member: bool,
}

/// Completion candidates for `prefix`, best first
pub fn complete(table: &SymbolTable, prefix: &str) -> Vec<CompletionCandidate> {
    let query = interpret(table, prefix.trim());
    if query.normalized.is_empty() && query.invocant.is_none() {
        return Vec::new();
    }

    let mut candidates: Vec<CompletionCandidate> = Vec::new();
    for (key, records) in &table.elems {
        if is_punctuation_variable(key) {
            continue;
        }
        let Some(latest) = records.last() else {
            continue;
        };
        let record = table.canonical_elems.get(key).unwrap_or(latest);

        let Some(matched) = matching_name(&query, key, record) else {
            continue;
        };
        if !query.known_object && !is_visible(table, &matched) {
            continue;
        }
        let Some(label) = align_label(&query, &matched, record) else {
            continue;
        };
        if candidates.iter().any(|existing| existing.label == label) {
            continue;
        }

        let tier = tier(&label, record.bare_name());
        candidates.push(CompletionCandidate {
            sort_key: format!("{}{}", tier, label),
            label,
            kind: record.kind,
            record: record.clone(),
        });
    }

    candidates.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    candidates
}

fn interpret(table: &SymbolTable, prefix: &str) -> Query {
    let mut text = prefix.to_string();
    // `$obj-` is an arrow being typed
    if text.ends_with('-') && !text.ends_with("->") {
        text.push('>');
    }

    let invocant = text.rfind("->").map(|at| text[..at].to_string());
    let mut normalized = text.replace("->", "::");
    let mut known_object = false;
    let mut any_member = false;

    if normalized.starts_with('$') {
        if let Some((variable, rest)) = normalized.split_once("::") {
            if let Some(type_name) = table.canonical_type(variable) {
                normalized = format!("{}::{}", type_name, rest);
                known_object = true;
            } else if variable == "$self" {
                normalized = rest.to_string();
                known_object = true;
                any_member = true;
            }
        }
    }

    Query {
        normalized,
        invocant,
        known_object,
        any_member,
    }
}

/// The table-form name under which `record` matches the query, if any
fn matching_name(query: &Query, key: &str, record: &SymbolRecord) -> Option<String> {
    if query.any_member {
        let member = record.kind.is_callable() && !key.starts_with(['$', '@', '%']);
        return (member && record.bare_name().starts_with(&query.normalized))
            .then(|| key.to_string());
    }

    if key.starts_with(&query.normalized) {
        return Some(key.to_string());
    }
    // Subs and constants are stored bare; offer them under their package too
    let qualifiable = !key.contains("::")
        && !key.starts_with(['$', '@', '%', '&'])
        && (record.kind.is_callable() || record.kind == SymbolKind::Constant);
    if qualifiable && !record.package.is_empty() {
        let qualified = format!("{}::{}", record.package, key);
        if qualified.starts_with(&query.normalized) && query.normalized.contains("::") {
            return Some(qualified);
        }
    }
    None
}

/// Qualified names need their module imported or declared in this document
fn is_visible(table: &SymbolTable, name: &str) -> bool {
    let Some((module, _)) = name.rsplit_once("::") else {
        return true;
    };
    let module = module.trim_start_matches(['$', '@', '%', '&']);
    table.imported.contains_key(module)
        || table
            .records(module)
            .iter()
            .any(|record| record.kind.is_package_like())
}

/// Rebuild the label in the user's spelling; `None` rejects the candidate
fn align_label(query: &Query, matched: &str, record: &SymbolRecord) -> Option<String> {
    let Some(invocant) = &query.invocant else {
        // `Foo::method` is not how instance methods are called
        if matched.contains("::") && record.kind.is_instance_member() {
            return None;
        }
        return Some(matched.to_string());
    };

    let member = if query.any_member {
        record.bare_name()
    } else {
        let base = query
            .normalized
            .rsplit_once("::")
            .map_or("", |(base, _)| base);
        matched
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix("::"))?
    };
    // `X->a::b` and `X->CONSTANT` are not method calls
    if member.contains("::") || !record.kind.is_callable() {
        return None;
    }
    Some(format!("{}->{}", invocant, member))
}

/// 1 constructors, 2 public, 3 private, 4 all-caps
fn tier(label: &str, bare_name: &str) -> u8 {
    let bare = bare_name.trim_start_matches(['$', '@', '%', '&']);
    if label.ends_with("->new") || label.ends_with("::new") || bare == "new" {
        1
    } else if bare.starts_with('_') {
        3
    } else if bare.chars().any(|c| c.is_ascii_alphabetic())
        && !bare.chars().any(|c| c.is_ascii_lowercase())
    {
        4
    } else {
        2
    }
}

/// `$_`, `$0`, `@_` and friends
fn is_punctuation_variable(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some('$' | '@' | '%'))
        && chars.next().is_some_and(|c| !c.is_alphabetic())
        && chars.next().is_none()
}
