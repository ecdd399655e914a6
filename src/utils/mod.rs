// perlnav Utilities Module
//
// Helpers shared by the manager, the compiler-output reader and refinement.

/// URI and path conversion (`file://` URIs ↔ native paths)
pub mod paths;
