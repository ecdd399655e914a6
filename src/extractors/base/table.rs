// SymbolTable - per-document aggregate of extracted records
//
// All maps are insertion-ordered so that iteration order equals declaration
// order. A table is built wholesale by one parse and never mutated afterwards,
// except by an explicit merge performed by its owner.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{Origin, SymbolKind, SymbolRecord};

/// How `SymbolTable::merge` settles a key present in both tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// The incoming table overwrites per key; new keys append
    #[default]
    LastWriterWins,
    /// Keep an existing entry from this origin unless the incoming one is
    /// from the same origin
    PreferOrigin(Origin),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SymbolTable {
    /// Document identity (URI)
    pub uri: String,
    /// name -> records in declaration order
    pub elems: IndexMap<String, Vec<SymbolRecord>>,
    /// name -> best known typed record, last typed occurrence wins
    pub canonical_elems: IndexMap<String, SymbolRecord>,
    /// accessor name -> synthesized getter
    pub autoloads: IndexMap<String, SymbolRecord>,
    /// module name -> declaration line
    pub imported: IndexMap<String, usize>,
    /// child package -> parent package expression
    pub parents: IndexMap<String, String>,
}

impl SymbolTable {
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            ..Default::default()
        }
    }

    /// Store a record in the map its kind belongs to
    pub fn add_record(&mut self, record: SymbolRecord) {
        match record.kind {
            SymbolKind::Canonical => {
                self.canonical_elems.insert(record.name.clone(), record);
            }
            SymbolKind::AutoLoadVar => {
                self.autoloads.insert(record.name.clone(), record);
            }
            _ => {
                if !record.type_detail.is_empty()
                    || matches!(record.kind, SymbolKind::Package | SymbolKind::Class)
                {
                    self.canonical_elems
                        .insert(record.name.clone(), record.clone());
                }
                self.elems
                    .entry(record.name.clone())
                    .or_default()
                    .push(record);
            }
        }
    }

    /// Records declared under `name`, in declaration order
    pub fn records(&self, name: &str) -> &[SymbolRecord] {
        self.elems.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Statically known type of a variable, if any
    pub fn canonical_type(&self, name: &str) -> Option<&str> {
        self.canonical_elems
            .get(name)
            .map(|record| record.type_detail.as_str())
            .filter(|type_detail| !type_detail.is_empty())
    }

    /// Number of records in `elems`; the unit of cache accounting
    pub fn symbol_count(&self) -> usize {
        self.elems.values().map(Vec::len).sum()
    }

    /// Every record in `elems`, in table order
    pub fn iter_records(&self) -> impl Iterator<Item = &SymbolRecord> {
        self.elems.values().flat_map(|records| records.iter())
    }

    /// Name of the latest package/class/role declared at or before `line`
    pub fn package_at_line(&self, line: usize) -> Option<&str> {
        self.iter_records()
            .filter(|record| record.kind.is_package_like() && record.line() <= line)
            .max_by_key(|record| record.line())
            .map(|record| record.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty() && self.canonical_elems.is_empty() && self.autoloads.is_empty()
    }

    /// Fold `other` into this table
    ///
    /// Imports and parents are always last-writer-wins. Record maps follow
    /// `policy`.
    pub fn merge(&mut self, other: SymbolTable, policy: MergePolicy) {
        for (name, records) in other.elems {
            let keep_existing = match (policy, self.elems.get(&name)) {
                (MergePolicy::PreferOrigin(origin), Some(existing)) => {
                    has_origin(existing, origin) && !has_origin(&records, origin)
                }
                _ => false,
            };
            if !keep_existing {
                self.elems.insert(name, records);
            }
        }

        merge_single(&mut self.canonical_elems, other.canonical_elems, policy);
        merge_single(&mut self.autoloads, other.autoloads, policy);

        for (module, line) in other.imported {
            self.imported.insert(module, line);
        }
        for (child, parent) in other.parents {
            self.parents.insert(child, parent);
        }
    }
}

fn has_origin(records: &[SymbolRecord], origin: Origin) -> bool {
    records.iter().any(|record| record.origin == origin)
}

fn merge_single(
    target: &mut IndexMap<String, SymbolRecord>,
    incoming: IndexMap<String, SymbolRecord>,
    policy: MergePolicy,
) {
    for (name, record) in incoming {
        let keep_existing = match (policy, target.get(&name)) {
            (MergePolicy::PreferOrigin(origin), Some(existing)) => {
                existing.origin == origin && record.origin != origin
            }
            _ => false,
        };
        if !keep_existing {
            target.insert(name, record);
        }
    }
}
