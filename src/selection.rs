//! Set of selected row identities.
//!
//! The selection is keyed by `RowId`, not by position in the current view, so
//! it survives filtering, sorting and paging.

use crate::record::RowId;
use std::collections::HashSet;

/// Tracks selected rows by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: HashSet<RowId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    /// Set membership of `id`. Returns true if the selection changed.
    pub fn set(&mut self, id: RowId, checked: bool) -> bool {
        if checked {
            self.selected.insert(id)
        } else {
            self.selected.remove(&id)
        }
    }

    /// Set membership of every id in `ids`. Returns true if anything changed.
    pub fn set_many<'a, I>(&mut self, ids: I, checked: bool) -> bool
    where
        I: IntoIterator<Item = &'a RowId>,
    {
        let mut changed = false;
        for id in ids {
            changed |= self.set(id.clone(), checked);
        }
        changed
    }

    /// True if `ids` is non-empty and every id in it is selected.
    pub fn contains_all<'a, I>(&self, ids: I) -> bool
    where
        I: IntoIterator<Item = &'a RowId>,
    {
        let mut any = false;
        for id in ids {
            if !self.selected.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Drop identities for which `keep` returns false. Returns true if any
    /// were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&RowId) -> bool,
    {
        let before = self.selected.len();
        self.selected.retain(|id| keep(id));
        self.selected.len() != before
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    /// Selected identities in sorted order.
    pub fn ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }
}
