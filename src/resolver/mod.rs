//! Symbol Resolver
//!
//! Turns a textual reference (`$obj->method`, `Foo::Bar::baz`,
//! `$self->SUPER::new`) into candidate definitions by trying an ordered
//! cascade of lookups, cheapest and most precise first:
//!
//! 1. exact name, nearest declaration at or above the reference line
//! 2. the module index
//! 3. `SUPER::` through the parent registry
//! 4. a variable's known type substituted for the variable
//! 5. constructor synonyms (`X->new` as `X::_init`, `X::BUILD`, ...)
//! 6. `->` as `::`, without a leading `main::`
//! 7. the bare method name, then the autoload registry, then a scan of
//!    every qualified name ending in the method
//! 8. a package inferred from the records it owns
//!
//! Stages 3 and 4 rewrite the reference and start over from stage 1.
//! Resolution is pure: no I/O and no mutation of the table.

pub mod module_index;
pub mod refine;

pub use module_index::ModuleIndex;
pub use refine::{refine_record, refine_records};

use crate::config::NavigatorConfig;
use crate::extractors::base::{
    NavigationTarget, Origin, SourceLocation, SymbolKind, SymbolRecord, SymbolTable,
};

/// Rewrites allowed per query; each one removes a `$var` or a `SUPER::`
const MAX_REWRITES: usize = 4;

pub struct Resolver<'a> {
    table: &'a SymbolTable,
    modules: &'a ModuleIndex,
    constructor_synonyms: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a SymbolTable, modules: &'a ModuleIndex) -> Self {
        Self {
            table,
            modules,
            constructor_synonyms: NavigatorConfig::default().constructor_synonyms,
        }
    }

    pub fn with_config(mut self, config: &NavigatorConfig) -> Self {
        self.constructor_synonyms = config.constructor_synonyms.clone();
        self
    }

    /// Candidate definitions for `symbol` as seen from `reference_line`
    ///
    /// An empty list means nothing was found. Multiple candidates only come
    /// from the last-resort method scan, in table order.
    pub fn resolve(&self, symbol: &str, reference_line: usize) -> Vec<SymbolRecord> {
        self.cascade(symbol.trim(), reference_line, 0)
    }

    fn cascade(&self, symbol: &str, line: usize, depth: usize) -> Vec<SymbolRecord> {
        if symbol.is_empty() {
            return Vec::new();
        }

        if let Some(record) = self.exact(symbol, line) {
            tracing::trace!("{} resolved by exact match", symbol);
            return vec![record];
        }

        if let Some(record) = self.modules.module_record(symbol) {
            tracing::trace!("{} resolved through the module index", symbol);
            return vec![record];
        }

        if depth < MAX_REWRITES {
            let rewritten = self
                .super_call(symbol, line)
                .or_else(|| self.typed_invocant(symbol, line));
            if let Some(rewritten) = rewritten {
                tracing::trace!("{} rewritten as {}", symbol, rewritten);
                let found = self.cascade(&rewritten, line, depth + 1);
                if !found.is_empty() {
                    return found;
                }
            }
        }

        if let Some(record) = self.constructor_synonym(symbol, line) {
            tracing::trace!("{} resolved through a constructor synonym", symbol);
            return vec![record];
        }

        let normalized = normalize(symbol);
        if normalized != symbol {
            if let Some(record) = self.exact(&normalized, line) {
                tracing::trace!("{} resolved as {}", symbol, normalized);
                return vec![record];
            }
        }

        if normalized.contains("::") && symbol.contains("->") {
            let found = self.bare_method(&normalized, line);
            if !found.is_empty() {
                tracing::trace!("{} resolved to {} method candidates", symbol, found.len());
                return found;
            }
        }

        if let Some(record) = self.package_inference(symbol) {
            tracing::trace!("{} inferred as a package", symbol);
            return vec![record];
        }

        Vec::new()
    }

    /// Stage 1, also used for every retried form
    ///
    /// A qualified `Pkg::name` with no record of its own also matches a bare
    /// `name` declared in package `Pkg`.
    fn exact(&self, name: &str, line: usize) -> Option<SymbolRecord> {
        if let Some(record) = nearest_declaration(self.table.records(name), line) {
            return Some(record.clone());
        }

        let (package, bare) = name.rsplit_once("::")?;
        if package.is_empty() || bare.is_empty() {
            return None;
        }
        let owned: Vec<&SymbolRecord> = self
            .table
            .records(bare)
            .iter()
            .filter(|record| record.package == package)
            .collect();
        nearest_declaration(owned, line).cloned()
    }

    /// Stage 3: `$x->SUPER::m` as `Parent::m`
    fn super_call(&self, symbol: &str, line: usize) -> Option<String> {
        let (invocant, method) = symbol.split_once("->SUPER::")?;
        let owner = if invocant.starts_with('$') {
            self.invocant_type(invocant, line)
                .or_else(|| self.table.package_at_line(line))
                .unwrap_or("main")
        } else {
            invocant
        };
        let parent = self.table.parents.get(owner)?;
        let parent = parent.trim().trim_matches(|c: char| c == '\'' || c == '"');
        (!parent.is_empty()).then(|| format!("{}::{}", parent, method))
    }

    /// Stage 4: `$x->m` as `Type->m`
    fn typed_invocant(&self, symbol: &str, line: usize) -> Option<String> {
        let (invocant, rest) = symbol.split_once("->")?;
        if !invocant.starts_with('$') {
            return None;
        }
        let type_name = self.invocant_type(invocant, line)?;
        Some(format!("{}->{}", type_name, rest))
    }

    /// Class of a variable at `line`; `$self` belongs to the package in scope
    fn invocant_type(&self, invocant: &str, line: usize) -> Option<&str> {
        if invocant == "$self" {
            if let Some(package) = self.table.package_at_line(line) {
                return Some(package);
            }
        }
        self.table.canonical_type(invocant)
    }

    /// Stage 5
    fn constructor_synonym(&self, symbol: &str, line: usize) -> Option<SymbolRecord> {
        let class = symbol.strip_suffix("->new")?;
        if class.is_empty() || class.starts_with('$') {
            return None;
        }
        if class == "DBI" {
            if let Some(record) = self.exact("DBI::connect", line) {
                return Some(record);
            }
        }
        self.constructor_synonyms
            .iter()
            .find_map(|hook| self.exact(&format!("{}::{}", class, hook), line))
    }

    /// Stage 7
    fn bare_method(&self, normalized: &str, line: usize) -> Vec<SymbolRecord> {
        let Some((_, method)) = normalized.rsplit_once("::") else {
            return Vec::new();
        };
        if method.is_empty() {
            return Vec::new();
        }

        if let Some(record) = self.exact(method, line) {
            return vec![record];
        }
        if let Some(record) = self.table.autoloads.get(method) {
            return vec![record.clone()];
        }

        self.table
            .iter_records()
            .filter(|record| {
                record
                    .name
                    .rsplit_once("::")
                    .is_some_and(|(_, tail)| tail == method)
            })
            .cloned()
            .collect()
    }

    /// Stage 8: the first record owned by `symbol` stands in for its package
    fn package_inference(&self, symbol: &str) -> Option<SymbolRecord> {
        let looks_like_package = symbol
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ':');
        if !looks_like_package {
            return None;
        }

        let owned = self
            .table
            .iter_records()
            .find(|record| record.package == symbol)?;
        Some(SymbolRecord {
            name: symbol.to_string(),
            kind: SymbolKind::Package,
            type_detail: String::new(),
            signature: None,
            location: SourceLocation::new(
                &owned.location.uri,
                owned.location.start_line,
                owned.location.start_line,
            ),
            package: symbol.to_string(),
            value: String::new(),
            origin: Origin::PackageInference,
        })
    }
}

/// Resolve with the default constructor synonyms
pub fn resolve(
    table: &SymbolTable,
    modules: &ModuleIndex,
    symbol: &str,
    reference_line: usize,
) -> Vec<SymbolRecord> {
    Resolver::new(table, modules).resolve(symbol, reference_line)
}

/// Editor "go to" locations for resolved records
pub fn to_navigation_targets(records: &[SymbolRecord]) -> Vec<NavigationTarget> {
    records.iter().map(NavigationTarget::from).collect()
}

/// `Foo->bar` as `Foo::bar`; top-level names are stored unqualified
fn normalize(symbol: &str) -> String {
    let colons = symbol.replace("->", "::");
    match colons.strip_prefix("main::") {
        Some(rest) => rest.to_string(),
        None => colons,
    }
}

/// The latest declaration at or above `line`, preferring a package on ties
///
/// When every declaration comes later (a call before the sub body), the
/// first one is used.
fn nearest_declaration<'r, I>(records: I, line: usize) -> Option<&'r SymbolRecord>
where
    I: IntoIterator<Item = &'r SymbolRecord>,
{
    let mut first = None;
    let mut best: Option<&SymbolRecord> = None;

    for record in records {
        first.get_or_insert(record);
        if record.line() > line {
            continue;
        }
        best = match best {
            Some(current) if current.line() > record.line() => Some(current),
            Some(current)
                if current.line() == record.line()
                    && (current.kind == SymbolKind::Package
                        || record.kind != SymbolKind::Package) =>
            {
                Some(current)
            }
            _ => Some(record),
        };
    }
    best.or(first)
}
