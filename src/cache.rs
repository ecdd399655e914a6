// Document cache
//
// Holds the latest table for each open document. Tables are shared as `Arc`
// and replaced wholesale, never mutated. Memory is bounded by the total symbol
// count across documents; the least recently used documents go first.
//
// Re-scans are debounced: every edit issues a new generation for the document
// and a scan becomes due once the document has been quiet for the configured
// interval. A result published for an older generation is dropped.

use indexmap::IndexMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::NavigatorConfig;
use crate::extractors::base::SymbolTable;

/// blake3 hex digest of document text
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// A re-scan waiting for its quiet period to pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRescan {
    pub uri: String,
    pub generation: u64,
    pub due: Instant,
}

#[derive(Debug)]
struct CachedDocument {
    table: Arc<SymbolTable>,
    content_hash: String,
    generation: u64,
    symbols: usize,
}

#[derive(Debug)]
pub struct DocumentCache {
    /// Least recently used first
    entries: IndexMap<String, CachedDocument>,
    /// Latest generation issued per document
    issued: IndexMap<String, u64>,
    pending: IndexMap<String, PendingRescan>,
    next_generation: u64,
    total_symbols: usize,
    max_symbols: usize,
    quiet_interval: Duration,
}

impl DocumentCache {
    pub fn new(config: &NavigatorConfig) -> Self {
        Self::with_limits(config.max_cached_symbols, config.rescan_quiet_interval())
    }

    pub fn with_limits(max_symbols: usize, quiet_interval: Duration) -> Self {
        Self {
            entries: IndexMap::new(),
            issued: IndexMap::new(),
            pending: IndexMap::new(),
            next_generation: 1,
            total_symbols: 0,
            max_symbols,
            quiet_interval,
        }
    }

    /// Note an edit; supersedes any scan already pending for `uri`
    pub fn schedule_rescan(&mut self, uri: &str, now: Instant) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.issued.insert(uri.to_string(), generation);
        self.pending.insert(
            uri.to_string(),
            PendingRescan {
                uri: uri.to_string(),
                generation,
                due: now + self.quiet_interval,
            },
        );
        generation
    }

    /// Remove and return the scans whose quiet period has passed
    pub fn due_rescans(&mut self, now: Instant) -> Vec<PendingRescan> {
        let mut due = Vec::new();
        self.pending.retain(|_, scan| {
            if scan.due <= now {
                due.push(scan.clone());
                false
            } else {
                true
            }
        });
        due
    }

    /// Store the table built for `generation`
    ///
    /// Returns false, storing nothing, when a newer generation has been issued
    /// or published for the document in the meantime.
    pub fn publish(
        &mut self,
        uri: &str,
        generation: u64,
        content: &str,
        table: SymbolTable,
    ) -> bool {
        let latest_issued = self.issued.get(uri).copied().unwrap_or(0);
        let latest_stored = self.entries.get(uri).map_or(0, |entry| entry.generation);
        if generation < latest_issued || generation < latest_stored {
            tracing::debug!(
                "Dropping stale table for {} (generation {}, latest {})",
                uri,
                generation,
                latest_issued.max(latest_stored)
            );
            return false;
        }

        if let Some(old) = self.entries.shift_remove(uri) {
            self.total_symbols -= old.symbols;
        }
        let symbols = table.symbol_count();
        self.total_symbols += symbols;
        self.entries.insert(
            uri.to_string(),
            CachedDocument {
                table: Arc::new(table),
                content_hash: content_hash(content),
                generation,
                symbols,
            },
        );
        self.evict();
        true
    }

    /// The document's table, marking it most recently used
    pub fn get(&mut self, uri: &str) -> Option<Arc<SymbolTable>> {
        let entry = self.entries.shift_remove(uri)?;
        let table = Arc::clone(&entry.table);
        self.entries.insert(uri.to_string(), entry);
        Some(table)
    }

    /// Whether `content` is exactly what the cached table was built from
    pub fn is_unchanged(&self, uri: &str, content: &str) -> bool {
        self.entries
            .get(uri)
            .is_some_and(|entry| entry.content_hash == content_hash(content))
    }

    /// Forget a closed document
    pub fn remove(&mut self, uri: &str) {
        if let Some(old) = self.entries.shift_remove(uri) {
            self.total_symbols -= old.symbols;
        }
        self.pending.shift_remove(uri);
        self.issued.shift_remove(uri);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_symbols(&self) -> usize {
        self.total_symbols
    }

    /// Drop least recently used documents until under budget; the newest
    /// entry always stays
    fn evict(&mut self) {
        while self.total_symbols > self.max_symbols && self.entries.len() > 1 {
            let Some((uri, old)) = self.entries.shift_remove_index(0) else {
                break;
            };
            self.total_symbols -= old.symbols;
            tracing::debug!("Evicted {} ({} symbols)", uri, old.symbols);
        }
    }
}
