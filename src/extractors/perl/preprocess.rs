/// Line preprocessing for the Perl extractor
///
/// Turns raw text into one clean, trimmed line per source line:
/// - comments are stripped (but `$#array` is code)
/// - POD blocks, heredoc bodies and everything after `__END__`/`__DATA__` become empty
/// - strings and quote-like operators are tracked across lines, match regexes
///   to the end of their line; in shallow mode `{`, `}` and `;` inside them are replaced by spaces
/// - `# $var isa Type` comments are collected as type annotations
use crate::extractors::base::ParseMode;
use regex::Regex;
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::LazyLock;

static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\$\w+)\s+isa\s+([A-Za-z_][\w:]*)").unwrap());

/// Words after which a `/` starts a regex rather than a division
const REGEX_PRECEDING_WORDS: &[&str] = &[
    "split", "grep", "map", "if", "unless", "and", "or", "not", "return", "when", "while",
    "until",
];

/// An inline `# $var isa Type` annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeAnnotation {
    pub line: usize,
    pub variable: String,
    pub type_name: String,
}

/// Byte ranges of a clean line that lie inside strings, quote-like operators
/// or regexes, delimiters included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QuotedSpans(Vec<Range<usize>>);

impl QuotedSpans {
    pub fn contains(&self, offset: usize) -> bool {
        self.0.iter().any(|span| span.contains(&offset))
    }

    /// Spans of the suffix that starts at byte `offset`
    pub fn after(&self, offset: usize) -> QuotedSpans {
        QuotedSpans(
            self.0
                .iter()
                .filter(|span| span.end > offset)
                .map(|span| span.start.saturating_sub(offset)..span.end - offset)
                .collect(),
        )
    }

    fn push(&mut self, span: Range<usize>) {
        if span.is_empty() {
            return;
        }
        match self.0.last_mut() {
            Some(last) if last.end == span.start => last.end = span.end,
            _ => self.0.push(span),
        }
    }

    /// Forget everything quoted from byte `offset` on
    fn truncate(&mut self, offset: usize) {
        self.0.retain(|span| span.start < offset);
        if let Some(last) = self.0.last_mut() {
            last.end = last.end.min(offset);
        }
    }
}

type CleanLine = (String, QuotedSpans, Option<String>);

#[derive(Debug, Default)]
pub(crate) struct CleanedSource {
    pub lines: Vec<String>,
    /// Quoted regions, one entry per line
    pub quoted: Vec<QuotedSpans>,
    /// Annotations in line order
    pub annotations: Vec<TypeAnnotation>,
}

/// Clean `text` for the extractor. Never fails; unterminated constructs run to
/// the end of the line (regexes) or the document (strings).
pub(crate) fn clean_code(text: &str, mode: ParseMode) -> CleanedSource {
    let mut cleaner = LineCleaner::new(mode.is_shallow());
    let mut source = CleanedSource::default();

    for (index, raw) in text.lines().enumerate() {
        let (code, quoted, comment) = cleaner.clean_line(raw);
        if let Some(caps) = comment.as_deref().and_then(|c| ANNOTATION_RE.captures(c)) {
            source.annotations.push(TypeAnnotation {
                line: index,
                variable: caps[1].to_string(),
                type_name: caps[2].to_string(),
            });
        }
        source.lines.push(code);
        source.quoted.push(quoted);
    }

    source
}

#[derive(Debug, Clone, Copy)]
struct OpenQuote {
    /// Opening bracket for nestable delimiters
    open: Option<char>,
    close: char,
    depth: usize,
    /// 2 for `s///` and `tr///`, 1 otherwise
    parts_left: u8,
    /// Between the two bracketed parts of `s{..}{..}`
    awaiting_delimiter: bool,
    single_line: bool,
}

impl OpenQuote {
    fn new(delimiter: char, parts: u8, single_line: bool) -> Self {
        let close = closing_bracket(delimiter);
        Self {
            open: close.map(|_| delimiter),
            close: close.unwrap_or(delimiter),
            depth: 0,
            parts_left: parts,
            awaiting_delimiter: false,
            single_line,
        }
    }

    fn reopen(&mut self, delimiter: char) {
        let close = closing_bracket(delimiter);
        self.open = close.map(|_| delimiter);
        self.close = close.unwrap_or(delimiter);
        self.depth = 0;
        self.awaiting_delimiter = false;
    }
}

#[derive(Debug)]
struct Heredoc {
    terminator: String,
    indented: bool,
}

struct LineCleaner {
    shallow: bool,
    quote: Option<OpenQuote>,
    heredocs: VecDeque<Heredoc>,
    in_pod: bool,
    ended: bool,
}

impl LineCleaner {
    fn new(shallow: bool) -> Self {
        Self {
            shallow,
            quote: None,
            heredocs: VecDeque::new(),
            in_pod: false,
            ended: false,
        }
    }

    /// Returns the clean code and the stripped comment text, if any
    fn clean_line(&mut self, raw: &str) -> CleanLine {
        if self.ended {
            return blank();
        }

        if let Some(heredoc) = self.heredocs.front() {
            let candidate = if heredoc.indented {
                raw.trim()
            } else {
                raw.trim_end()
            };
            if candidate == heredoc.terminator {
                self.heredocs.pop_front();
            }
            return blank();
        }

        if self.in_pod {
            if raw.starts_with("=cut") {
                self.in_pod = false;
            }
            return blank();
        }

        if self.quote.is_none() {
            if is_pod_directive(raw) {
                self.in_pod = !raw.starts_with("=cut");
                return blank();
            }
            let trimmed = raw.trim();
            if trimmed == "__END__" || trimmed == "__DATA__" {
                self.ended = true;
                return blank();
            }
        }

        self.scan(raw)
    }

    fn scan(&mut self, raw: &str) -> CleanLine {
        let chars: Vec<char> = raw.chars().collect();
        let shallow = self.shallow;
        let mut out = String::with_capacity(raw.len());
        let mut quoted = QuotedSpans::default();
        // Where an unclosed `/` opened; dropped from `quoted` if it never closes
        let mut regex_opened_at = None;
        let mut comment = None;
        let mut last = LastToken::Start;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if let Some(mut quote) = self.quote {
                let start = out.len();
                i += scan_quoted(&chars, i, &mut quote, &mut out, shallow);
                quoted.push(start..out.len());
                self.quote = (quote.parts_left > 0).then_some(quote);
                if self.quote.is_none() {
                    last = LastToken::Value;
                    regex_opened_at = None;
                }
                continue;
            }

            match c {
                '#' if i > 0 && chars[i - 1] == '$' => {
                    out.push(c);
                    i += 1;
                }
                '#' => {
                    comment = Some(chars[i + 1..].iter().collect());
                    break;
                }
                '\'' | '"' | '`' => {
                    quoted.push(out.len()..out.len() + c.len_utf8());
                    out.push(c);
                    self.quote = Some(OpenQuote::new(c, 1, false));
                    i += 1;
                }
                '/' if last.allows_regex() => {
                    regex_opened_at = Some(out.len());
                    quoted.push(out.len()..out.len() + 1);
                    out.push(c);
                    self.quote = Some(OpenQuote::new(c, 1, true));
                    i += 1;
                }
                '<' if chars.get(i + 1) == Some(&'<') => {
                    if let Some((heredoc, end)) = heredoc_marker(&chars, i) {
                        out.extend(&chars[i..end]);
                        self.heredocs.push_back(heredoc);
                        last = LastToken::Value;
                        i = end;
                    } else {
                        out.push_str("<<");
                        last = LastToken::Punct('<');
                        i += 2;
                    }
                }
                c if c.is_alphabetic() || c == '_' => {
                    let start = i;
                    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                        i += 1;
                    }
                    let word: String = chars[start..i].iter().collect();
                    out.push_str(&word);

                    let bare = start == 0
                        || !matches!(chars[start - 1], '$' | '@' | '%' | '&' | '*' | '-' | ':' | '>');
                    if let Some(parts) = quote_operator_parts(&word).filter(|_| bare) {
                        let mut j = i;
                        while j < chars.len() && chars[j].is_whitespace() {
                            j += 1;
                        }
                        if let Some(&delimiter) = chars.get(j) {
                            if is_quote_delimiter(delimiter, j > i) {
                                out.extend(&chars[i..j]);
                                let start = out.len();
                                out.push(filler(delimiter, shallow));
                                quoted.push(start..out.len());
                                self.quote = Some(OpenQuote::new(delimiter, parts, false));
                                i = j + 1;
                                continue;
                            }
                        }
                    }
                    last = if bare {
                        LastToken::Word(word)
                    } else {
                        LastToken::Value
                    };
                }
                c if c.is_whitespace() => {
                    out.push(c);
                    i += 1;
                }
                c => {
                    out.push(c);
                    last = if c.is_ascii_digit() || matches!(c, ')' | ']' | '}') {
                        LastToken::Value
                    } else {
                        LastToken::Punct(c)
                    };
                    i += 1;
                }
            }
        }

        // A `/` that never closed on its line was a division after all
        if self.quote.is_some_and(|q| q.single_line) {
            self.quote = None;
            if let Some(offset) = regex_opened_at {
                quoted.truncate(offset);
            }
        }

        let leading = out.len() - out.trim_start().len();
        (out.trim().to_string(), quoted.after(leading), comment)
    }
}

fn blank() -> CleanLine {
    (String::new(), QuotedSpans::default(), None)
}

/// Consume one character (or an escape pair) inside a quoted body.
/// Returns how many characters were consumed.
fn scan_quoted(
    chars: &[char],
    i: usize,
    quote: &mut OpenQuote,
    out: &mut String,
    shallow: bool,
) -> usize {
    let c = chars[i];

    if quote.awaiting_delimiter {
        if c.is_whitespace() {
            out.push(c);
        } else {
            quote.reopen(c);
            out.push(filler(c, shallow));
        }
        return 1;
    }

    if c == '\\' {
        out.push(c);
        if let Some(&next) = chars.get(i + 1) {
            out.push(filler(next, shallow));
            return 2;
        }
        return 1;
    }

    out.push(filler(c, shallow));
    if quote.open == Some(c) {
        quote.depth += 1;
    } else if c == quote.close {
        if quote.depth > 0 {
            quote.depth -= 1;
        } else {
            quote.parts_left -= 1;
            if quote.parts_left > 0 && quote.open.is_some() {
                quote.awaiting_delimiter = true;
            }
        }
    }
    1
}

#[derive(Debug)]
enum LastToken {
    Start,
    Word(String),
    Punct(char),
    Value,
}

impl LastToken {
    fn allows_regex(&self) -> bool {
        match self {
            LastToken::Start => true,
            LastToken::Word(word) => REGEX_PRECEDING_WORDS.contains(&word.as_str()),
            LastToken::Punct(c) => "(,=~!{;[?:&|+-*<>.^".contains(*c),
            LastToken::Value => false,
        }
    }
}

fn filler(c: char, shallow: bool) -> char {
    if shallow && matches!(c, '{' | '}' | ';') {
        ' '
    } else {
        c
    }
}

fn closing_bracket(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        _ => None,
    }
}

fn quote_operator_parts(word: &str) -> Option<u8> {
    match word {
        "q" | "qq" | "qw" | "qr" | "qx" | "m" => Some(1),
        "s" | "tr" | "y" => Some(2),
        _ => None,
    }
}

fn is_quote_delimiter(c: char, after_space: bool) -> bool {
    if c == '#' {
        return !after_space;
    }
    !(c.is_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '_' | ',' | ';' | ')' | ']' | '}' | '>' | '='))
}

fn is_pod_directive(raw: &str) -> bool {
    let mut chars = raw.chars();
    chars.next() == Some('=') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Recognize `<<"EOF"`, `<<'EOF'`, `<<EOF` and `<<~EOF` at `i`.
/// Returns the heredoc and the index just past the marker.
fn heredoc_marker(chars: &[char], i: usize) -> Option<(Heredoc, usize)> {
    let mut j = i + 2;
    let indented = chars.get(j) == Some(&'~');
    if indented {
        j += 1;
    }
    while chars.get(j) == Some(&' ') {
        j += 1;
    }

    match chars.get(j) {
        Some(&q) if q == '"' || q == '\'' => {
            let start = j + 1;
            let len = chars[start..].iter().position(|&c| c == q)?;
            let terminator: String = chars[start..start + len].iter().collect();
            if terminator.is_empty() {
                return None;
            }
            Some((Heredoc { terminator, indented }, start + len + 1))
        }
        Some(&c) if (c.is_ascii_alphabetic() || c == '_') && j == i + 2 + usize::from(indented) => {
            let start = j;
            while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let terminator: String = chars[start..j].iter().collect();
            Some((Heredoc { terminator, indented }, j))
        }
        _ => None,
    }
}
