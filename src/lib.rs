// perlnav core - heuristic Perl symbol extraction and navigation
//
// A line scanner builds a symbol table per document without a grammar, so it
// keeps working on code that is half-typed or invalid. The resolver and the
// completion matcher answer editor queries from those tables.
//
// Architecture: extractors (text -> SymbolTable), resolver (reference ->
// candidate records), completion (prefix -> candidates), cache (tables per
// open document).

pub mod cache;
pub mod completion;
pub mod config;
pub mod error;
pub mod extractors;
pub mod language;
pub mod resolver;
pub mod utils;

pub use cache::DocumentCache;
pub use completion::{complete, CompletionCandidate};
pub use config::NavigatorConfig;
pub use error::{NavigatorError, Result};
pub use extractors::{
    ExtractorManager, MergePolicy, NavigationTarget, Origin, ParseMode, SourceLocation,
    SymbolKind, SymbolRecord, SymbolTable,
};
pub use resolver::{resolve, to_navigation_targets, ModuleIndex, Resolver};
