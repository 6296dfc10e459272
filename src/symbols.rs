//! Symbol identities and the per-variant symbol table.
//!
//! Symbols are totally ordered by value rank: index 0 is the most valuable
//! symbol in the variant (the jackpot filler). Weights are consumed only by
//! tier-biased generation, never by plain uniform cell draws.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a reel symbol within a variant's symbol set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SymbolId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One symbol definition: identity plus the relative weight used when a
/// forced-win tier picks its favored symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDef {
    pub id: SymbolId,
    pub weight: f64,
}

impl SymbolDef {
    pub fn new(id: impl Into<SymbolId>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// Ordered symbol set for one variant, descending by value rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: Vec<SymbolDef>,
}

impl SymbolTable {
    pub fn new(symbols: Vec<SymbolDef>) -> Self {
        Self { symbols }
    }

    /// Build a table from ids in descending value order, weighting each
    /// symbol by its rank (higher value, higher weight).
    pub fn from_ranked_ids(ids: &[&str]) -> Self {
        let count = ids.len();
        let symbols = ids
            .iter()
            .enumerate()
            .map(|(rank, id)| SymbolDef::new(*id, (count - rank) as f64))
            .collect();
        Self { symbols }
    }

    pub fn defs(&self) -> &[SymbolDef] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Ordered symbol identities, most valuable first.
    pub fn ids(&self) -> impl Iterator<Item = &SymbolId> {
        self.symbols.iter().map(|def| &def.id)
    }

    /// The highest-value symbol. Panics on an empty table, which
    /// configuration validation rejects before a table is ever used.
    pub fn top(&self) -> &SymbolId {
        &self.symbols[0].id
    }

    pub fn get(&self, index: usize) -> Option<&SymbolId> {
        self.symbols.get(index).map(|def| &def.id)
    }

    pub fn contains(&self, id: &SymbolId) -> bool {
        self.symbols.iter().any(|def| &def.id == id)
    }

    /// Generation-tier weight for a symbol, if it belongs to this table.
    pub fn weight_of(&self, id: &SymbolId) -> Option<f64> {
        self.symbols
            .iter()
            .find(|def| &def.id == id)
            .map(|def| def.weight)
    }
}
