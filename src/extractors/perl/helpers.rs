/// Helper functions and patterns shared by the Perl rules
///
/// Provides:
/// - Compiled regexes for every declaration shape
/// - Statement splitting at top-level `;`
/// - Sigil-variable and package-name scanning
use super::preprocess::QuotedSpans;
use regex::Regex;
use std::sync::LazyLock;

// Rule 1: `my $x = Foo->new` / `my $x = new Foo`
pub(super) static KNOWN_CONSTRUCTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:my|our|local|state)\s+(\$\w+)\s*=\s*(?:([A-Za-z_][\w:]*)\s*->\s*new\b|new\s+([A-Za-z_][\w:]*))",
    )
    .unwrap()
});

// Rule 2
pub(super) static LEXICAL_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:my|our|local|state)\b\s*(.*)$").unwrap());

pub(super) static ISA_ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^our\s+@ISA\s*=\s*(?:qw\s*\S\s*|\(\s*['\x22]?)([A-Za-z_][\w:]*)").unwrap()
});

// Rule 3
pub(super) static LOOP_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([A-Za-z_]\w*)\s*:\s*)?(?:for|foreach)\s+(?:my|our|state)\s+(\$\w+)")
        .unwrap()
});

// Rule 4
pub(super) static CONDITIONAL_BINDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\}?\s*(?:if|elsif|unless|while|until)\s*\(\s*(?:my|our|state)\s+(\$\w+|\([^)]*\))",
    )
    .unwrap()
});

pub(super) static CATCH_BINDING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\}\s*)catch\s*\(\s*(\$\w+)\s*\)").unwrap());

// Rule 5
pub(super) static PACKAGE_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{?\s*(package|class|role)\s+([A-Za-z_]\w*(?:::\w+)*)(.*)$").unwrap()
});

pub(super) static CLASS_PARENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?::isa\(\s*([A-Za-z_][\w:]*)|\b(?:isa|extends)\s+([A-Za-z_][\w:]*))").unwrap()
});

/// Any package-like statement, used to find where a statement-form package ends
pub(super) static PACKAGE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{?\s*(?:package|class|role)\s+[A-Za-z_][\w:]*").unwrap());

// Rule 6
pub(super) static SUB_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:my|our)\s+)?(?:async\s+)?(sub|method|func|fun)\s+([A-Za-z_]\w*(?:::\w+)*)(.*)$")
        .unwrap()
});

/// Signature parentheses right after the sub name, removed before brace counting
pub(super) static SUB_SIGNATURE_FILTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^(){]*\([^)]*\)").unwrap());

pub(super) static METHOD_ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*method\b").unwrap());

pub(super) static ANON_SUB_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:my|our|local|state)\s+)?(\$\w+)\s*=\s*sub\b").unwrap()
});

pub(super) static GLOB_SUB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*([A-Za-z_][\w:]*)\s*=\s*sub\b").unwrap());

pub(super) static ARGS_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"my\s*\(([^)]*)\)\s*=\s*@_").unwrap());

pub(super) static SHIFT_ARG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"my\s+(\$\w+)\s*=\s*shift\b").unwrap());

pub(super) static INDEXED_ARG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"my\s+(\$\w+)\s*=\s*\$_\[\s*\d+\s*\]").unwrap());

// Rule 7
pub(super) static PHASER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(BEGIN|INIT|CHECK|UNITCHECK|END|ADJUST)\s*(?:\{|$)").unwrap()
});

pub(super) static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*:(?:\s|\{|$)").unwrap());

// Rule 8
pub(super) static CONSTANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^use\s+constant\s+([A-Za-z_]\w*)\s*(?:=>|,)\s*(.*)$").unwrap()
});

pub(super) static CONSTANT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^use\s+constant\s*\{(.*)$").unwrap());

pub(super) static READONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Readonly|const)\s+(?:my|our)\s+([\$@%]\w+)\s*=>\s*(.*)$").unwrap()
});

pub(super) static CONSTANT_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_]\w*)\s*=>\s*([^,}]+)").unwrap());

// Rule 9
pub(super) static PAD_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(field|has)\s+([\$@%]\w+)").unwrap());

pub(super) static MOOSE_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^has\s+\+?['\x22]?([A-Za-z_]\w*)").unwrap());

pub(super) static MOOSE_ATTR_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^has\s+\[([^\]]*)\]").unwrap());

// Rule 10
pub(super) static AROUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^around\s+['\x22]?([A-Za-z_]\w*)").unwrap());

// Rule 11
pub(super) static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(use|require)\s+([A-Za-z_]\w*(?:::\w+)*)(.*)$").unwrap()
});

pub(super) static EXTENDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^extends\s*\(?\s*['\x22]?([A-Za-z_][\w:]*)").unwrap());

// Rule 12
pub(super) static AUTOLOAD_ACCESSOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$self->\{\s*_(\w+)\s*\}\s*(?:\|\|=|//=|=(?:[^=~]|$))").unwrap()
});

// Rule 13
pub(super) static ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(get|post|put|patch|del|delete|options|head|any|websocket)\s*\(?\s*['\x22]([^'\x22]+)['\x22]\s*(?:=>|,)",
    )
    .unwrap()
});

pub(super) static ANY_ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^any\s*\(?\s*\[[^\]]*\]\s*(?:=>|,)\s*['\x22]([^'\x22]+)['\x22]").unwrap()
});

pub(super) static HOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^hook\s*\(?\s*['\x22]?([A-Za-z_][\w.]*)['\x22]?\s*(?:=>|,)").unwrap()
});

static SIGIL_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\$@%]\w+").unwrap());

static PACKAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_]\w*(?:::\w+)*").unwrap());

/// One `;`-delimited piece of a clean line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    pub text: String,
    /// Ended with `;` on this line
    pub terminated: bool,
}

/// Split a clean line at `;` outside parentheses and quoted regions
pub(crate) fn split_statements(line: &str, quoted: &QuotedSpans) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in line.char_indices() {
        if quoted.contains(i) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                push_statement(&mut statements, &line[start..i], true);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_statement(&mut statements, &line[start..], false);
    statements
}

fn push_statement(statements: &mut Vec<Statement>, text: &str, terminated: bool) {
    let text = text.trim();
    if !text.is_empty() {
        statements.push(Statement {
            text: text.to_string(),
            terminated,
        });
    }
}

/// Sigil variables (`$x`, `@list`, `%opts`) in order of appearance
pub(crate) fn sigil_variables(text: &str) -> Vec<String> {
    SIGIL_VAR_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|name| name != "@_" && name != "$_")
        .collect()
}

/// Text after the first `{`, if a block opens in this statement
pub(crate) fn inline_body(text: &str) -> Option<&str> {
    let (_, body) = text.split_once('{')?;
    let body = body.trim();
    (!body.is_empty()).then_some(body)
}

/// First package-looking word, skipping `qw` and `-flags`
pub(crate) fn first_package_name(text: &str) -> Option<&str> {
    PACKAGE_NAME_RE
        .find_iter(text)
        .filter(|m| m.start() == 0 || !text[..m.start()].ends_with('-'))
        .map(|m| m.as_str())
        .find(|name| *name != "qw")
}

/// Bare words in a `has [...]` list, skipping `qw`
pub(crate) fn bare_words(text: &str) -> Vec<String> {
    PACKAGE_NAME_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| *word != "qw")
        .map(str::to_string)
        .collect()
}

/// Drop a trailing `;`/`)` and surrounding whitespace from a literal value
pub(crate) fn literal_value(text: &str) -> String {
    text.trim()
        .trim_end_matches(';')
        .trim_end_matches(')')
        .trim()
        .to_string()
}
