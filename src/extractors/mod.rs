//! perlnav Extractors Module
//!
//! This module contains the heuristic Perl extractor and the readers that turn
//! source text or compiler output into symbol tables.
//!
//! # Architecture
//!
//! The module is organized into several sub-modules:
//! - `base` - Records, kinds, symbol table and shared extractor state
//! - `perl` - The line-scanning Perl extractor
//! - `compiler_output` - Reader for the compiler's tab-separated symbol dump
//! - `manager.rs` - ExtractorManager public API

pub mod base;
pub mod compiler_output;
pub mod manager;
pub mod perl;

// Re-export the public API
pub use base::{
    MergePolicy, NavigationTarget, Origin, ParseMode, SourceLocation, SymbolKind, SymbolRecord,
    SymbolTable,
};
pub use compiler_output::parse_compiler_output;
pub use manager::ExtractorManager;
