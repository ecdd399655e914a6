// Base Extractor Types and Traits for perlnav
//
// - types.rs: records, kinds, origins, parse modes, navigation targets
// - table.rs: SymbolTable and merge policy
// - extractor.rs: BaseExtractor state shared by line-oriented extractors
// - creation_methods.rs: record factories

pub mod creation_methods;
pub mod extractor;
pub mod table;
pub mod types;

// Re-export key types for external use
pub use extractor::BaseExtractor;
pub use table::{MergePolicy, SymbolTable};
pub use types::{
    NavigationTarget, Origin, ParseMode, RecordOptions, SourceLocation, SymbolKind,
    SymbolRecord, WIDE_END_COLUMN,
};
