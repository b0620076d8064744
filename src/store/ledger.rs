use std::collections::HashSet;

use crate::model::MatchId;

use super::tables::Table;

/// Append-only record of match ids already counted in the matrix.
/// Persisted as a single row, one id per field, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    order: Vec<MatchId>,
    members: HashSet<MatchId>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: Option<Table>) -> Self {
        let mut ledger = Ledger::new();
        for id in table.into_iter().flatten().flatten() {
            let id = id.trim();
            if !id.is_empty() {
                ledger.insert(id.to_string());
            }
        }
        ledger
    }

    pub fn to_table(&self) -> Table {
        if self.is_empty() {
            Vec::new()
        } else {
            vec![self.order.clone()]
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: MatchId) -> bool {
        if self.members.insert(id.clone()) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn ids(&self) -> &HashSet<MatchId> {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
