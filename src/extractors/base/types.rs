// Base Extractor Types for perlnav
//
// Data structures shared by the extractor, the symbol table and the resolver:
// symbol kinds, provenance, locations, records and parse modes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NavigatorError;

/// Placeholder end column for navigation ranges; columns are not tracked.
pub const WIDE_END_COLUMN: u32 = 500;

/// Symbol kinds recognized by the extractor or reported by the compiler dump
///
/// Each kind has a one-character wire code used by the compiler-output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Module,
    Package,
    Class,
    Role,
    ImportedSub,
    Inherited,
    Field,
    PathedField,
    LocalSub,
    LocalMethod,
    Method,
    LocalVar,
    Constant,
    Label,
    Phaser,
    Canonical,
    ImportedVar,
    ImportedHash,
    HttpRoute,
    OutlineOnlySub,
    AutoLoadVar,
}

impl SymbolKind {
    /// Wire code used by the compiler introspection output
    pub fn code(&self) -> &'static str {
        match self {
            SymbolKind::Module => "m",
            SymbolKind::Package => "p",
            SymbolKind::Class => "a",
            SymbolKind::Role => "b",
            SymbolKind::ImportedSub => "t",
            SymbolKind::Inherited => "i",
            SymbolKind::Field => "f",
            SymbolKind::PathedField => "d",
            SymbolKind::LocalSub => "s",
            SymbolKind::LocalMethod => "o",
            SymbolKind::Method => "x",
            SymbolKind::LocalVar => "v",
            SymbolKind::Constant => "n",
            SymbolKind::Label => "l",
            SymbolKind::Phaser => "e",
            SymbolKind::Canonical => "1",
            SymbolKind::ImportedVar => "c",
            SymbolKind::ImportedHash => "h",
            SymbolKind::HttpRoute => "g",
            SymbolKind::OutlineOnlySub => "j",
            SymbolKind::AutoLoadVar => "3",
        }
    }

    /// Convert from a wire code. `2` is a second canonical code.
    pub fn from_code(code: &str) -> Option<Self> {
        let kind = match code {
            "m" => SymbolKind::Module,
            "p" => SymbolKind::Package,
            "a" => SymbolKind::Class,
            "b" => SymbolKind::Role,
            "t" => SymbolKind::ImportedSub,
            "i" => SymbolKind::Inherited,
            "f" => SymbolKind::Field,
            "d" => SymbolKind::PathedField,
            "s" => SymbolKind::LocalSub,
            "o" => SymbolKind::LocalMethod,
            "x" => SymbolKind::Method,
            "v" => SymbolKind::LocalVar,
            "n" => SymbolKind::Constant,
            "l" => SymbolKind::Label,
            "e" => SymbolKind::Phaser,
            "1" | "2" => SymbolKind::Canonical,
            "c" => SymbolKind::ImportedVar,
            "h" => SymbolKind::ImportedHash,
            "g" => SymbolKind::HttpRoute,
            "j" => SymbolKind::OutlineOnlySub,
            "3" => SymbolKind::AutoLoadVar,
            _ => return None,
        };
        Some(kind)
    }

    /// Packages, classes and roles
    pub fn is_package_like(&self) -> bool {
        matches!(
            self,
            SymbolKind::Package | SymbolKind::Class | SymbolKind::Role
        )
    }

    /// Anything that can be invoked as a sub or method
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            SymbolKind::LocalSub
                | SymbolKind::ImportedSub
                | SymbolKind::Inherited
                | SymbolKind::LocalMethod
                | SymbolKind::Method
                | SymbolKind::Field
                | SymbolKind::PathedField
        )
    }

    /// Kinds assumed to be called on an instance rather than a class
    pub fn is_instance_member(&self) -> bool {
        matches!(
            self,
            SymbolKind::LocalMethod
                | SymbolKind::Method
                | SymbolKind::Field
                | SymbolKind::PathedField
        )
    }

    /// Subs and methods whose location and signature can be refined from source
    pub fn is_refinable(&self) -> bool {
        matches!(
            self,
            SymbolKind::LocalSub
                | SymbolKind::ImportedSub
                | SymbolKind::Inherited
                | SymbolKind::LocalMethod
                | SymbolKind::Method
        )
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SymbolKind::Module => "module",
            SymbolKind::Package => "package",
            SymbolKind::Class => "class",
            SymbolKind::Role => "role",
            SymbolKind::ImportedSub => "imported_sub",
            SymbolKind::Inherited => "inherited",
            SymbolKind::Field => "field",
            SymbolKind::PathedField => "pathed_field",
            SymbolKind::LocalSub => "local_sub",
            SymbolKind::LocalMethod => "local_method",
            SymbolKind::Method => "method",
            SymbolKind::LocalVar => "local_var",
            SymbolKind::Constant => "constant",
            SymbolKind::Label => "label",
            SymbolKind::Phaser => "phaser",
            SymbolKind::Canonical => "canonical",
            SymbolKind::ImportedVar => "imported_var",
            SymbolKind::ImportedHash => "imported_hash",
            SymbolKind::HttpRoute => "http_route",
            SymbolKind::OutlineOnlySub => "outline_only_sub",
            SymbolKind::AutoLoadVar => "auto_load_var",
        };
        write!(f, "{}", text)
    }
}

/// Which subsystem produced a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Compiler introspection dump
    SymbolTableDump,
    /// Module index lookup
    ModuleScan,
    /// Heuristic line scanner
    HeuristicParser,
    /// Synthesized from owning-package fields
    PackageInference,
}

/// Document identity plus a 0-based, inclusive line range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub uri: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceLocation {
    pub fn new(uri: &str, start_line: usize, end_line: usize) -> Self {
        Self {
            uri: uri.to_string(),
            start_line,
            end_line: end_line.max(start_line),
        }
    }
}

/// One recognized declaration occurrence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Lookup key, e.g. `$foo`, `Foo::Bar`, `Foo::Bar::baz`
    pub name: String,
    pub kind: SymbolKind,
    /// Object type when statically inferable, empty otherwise
    pub type_detail: String,
    /// Parameter names; only subs and methods carry one
    pub signature: Option<Vec<String>>,
    pub location: SourceLocation,
    /// Owning package, possibly empty
    pub package: String,
    /// Literal value when known
    pub value: String,
    pub origin: Origin,
}

impl SymbolRecord {
    pub fn line(&self) -> usize {
        self.location.start_line
    }

    /// Trailing `::` segment of the name (the name itself when unqualified)
    pub fn bare_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }
}

/// Selects the rule subset and extent precision of a parse
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Document outline: extents, lighter rule set
    Outline,
    /// Navigation within the document: full rule set, no extents
    SelfNavigation,
    /// Re-derive one symbol's signature from another file
    Refinement,
}

impl ParseMode {
    /// Outline parses neutralize string bodies so brace counting stays sane
    pub fn is_shallow(&self) -> bool {
        matches!(self, ParseMode::Outline)
    }

    pub fn needs_extents(&self) -> bool {
        matches!(self, ParseMode::Outline)
    }
}

impl FromStr for ParseMode {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outline" => Ok(ParseMode::Outline),
            "self_navigation" | "selfNavigation" => Ok(ParseMode::SelfNavigation),
            "refinement" => Ok(ParseMode::Refinement),
            other => Err(NavigatorError::InvalidParseMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMode::Outline => write!(f, "outline"),
            ParseMode::SelfNavigation => write!(f, "self_navigation"),
            ParseMode::Refinement => write!(f, "refinement"),
        }
    }
}

/// A "go to" location for editor navigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigationTarget {
    pub uri: String,
    pub line: usize,
    pub start_column: u32,
    pub end_column: u32,
}

impl From<&SymbolRecord> for NavigationTarget {
    fn from(record: &SymbolRecord) -> Self {
        Self {
            uri: record.location.uri.clone(),
            line: record.location.start_line,
            start_column: 0,
            end_column: WIDE_END_COLUMN,
        }
    }
}

/// Options for creating records - mirrors the optional parts of a record
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    pub type_detail: Option<String>,
    pub signature: Option<Vec<String>>,
    pub end_line: Option<usize>,
    pub value: Option<String>,
}
