// Module index - where installed and workspace modules live
//
// Built by the caller (scanning @INC or the workspace is not this crate's
// job) and consulted read-only by the resolver.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extractors::base::{Origin, SourceLocation, SymbolKind, SymbolRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModuleIndex {
    modules: IndexMap<String, SourceLocation>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module defined in the file behind `uri`, at `line`
    pub fn insert(&mut self, module: &str, uri: &str, line: usize) {
        self.modules
            .insert(module.to_string(), SourceLocation::new(uri, line, line));
    }

    pub fn get(&self, module: &str) -> Option<&SourceLocation> {
        self.modules.get(module)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// A `Module` record pointing at the indexed location
    pub fn module_record(&self, module: &str) -> Option<SymbolRecord> {
        let location = self.modules.get(module)?;
        Some(SymbolRecord {
            name: module.to_string(),
            kind: SymbolKind::Module,
            type_detail: String::new(),
            signature: None,
            location: location.clone(),
            package: module.to_string(),
            value: String::new(),
            origin: Origin::ModuleScan,
        })
    }
}

impl FromIterator<(String, SourceLocation)> for ModuleIndex {
    fn from_iter<I: IntoIterator<Item = (String, SourceLocation)>>(iter: I) -> Self {
        Self {
            modules: iter.into_iter().collect(),
        }
    }
}
