//! # Identifier & Marker Resolution
//!
//! The id registry remembers which pages declare an identifier and which
//! pages depend on one that was not yet known when they were laid out.
//! Nothing is ever removed: patching unresolved citations is the renderer's
//! job once the whole page set exists.
//!
//! Marker retrieval walks backward through already published pages, bounded
//! by the current page, the current page sequence or the whole document.

use std::collections::HashMap;

use serde::Serialize;

use crate::area::markers::{Marker, RetrieveBoundary, RetrievePosition};
use crate::area::tree::AreaTree;
use crate::area::Page;

/// A lightweight handle on a page: where it is and what it is called.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PageRef {
    pub sequence: usize,
    pub index: usize,
    pub number: u32,
    pub label: String,
}

#[derive(Debug, Default)]
pub struct IdRegistry {
    declared: HashMap<String, Vec<PageRef>>,
    dependents: HashMap<String, Vec<PageRef>>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `id` with a page that declares it. The first page recorded
    /// stays the answer to [`resolve`](Self::resolve); later ones are kept
    /// for bookkeeping.
    pub fn record(&mut self, id: &str, page: PageRef) {
        let pages = self.declared.entry(id.to_string()).or_default();
        if !pages.contains(&page) {
            pages.push(page);
        }
    }

    /// The first page known to declare `id`. `None` only means "not yet".
    pub fn resolve(&self, id: &str) -> Option<&PageRef> {
        self.declared.get(id).and_then(|pages| pages.first())
    }

    pub fn declaring_pages(&self, id: &str) -> &[PageRef] {
        self.declared.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Note that `page` needs `id` resolved before it can be serialized.
    pub fn register_unresolved(&mut self, id: &str, page: PageRef) {
        let pages = self.dependents.entry(id.to_string()).or_default();
        if !pages.contains(&page) {
            pages.push(page);
        }
    }

    pub fn dependents(&self, id: &str) -> &[PageRef] {
        self.dependents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Referenced identifiers that no page has declared, sorted.
    pub fn pending(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .dependents
            .keys()
            .filter(|id| !self.declared.contains_key(*id))
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Look up a marker for the page currently being laid out.
///
/// `current` is the page under construction (not yet in the tree). With a
/// `Page` boundary only it is consulted; otherwise the search continues
/// backward through the published pages of the active sequence and, for
/// `Document`, through earlier sequences, nearest first.
pub fn retrieve_marker(
    tree: &AreaTree,
    current: Option<&Page>,
    class_name: &str,
    position: RetrievePosition,
    boundary: RetrieveBoundary,
) -> Option<Marker> {
    if let Some(marker) = current.and_then(|p| p.markers.get(class_name, position)) {
        return Some(marker.clone());
    }
    if boundary == RetrieveBoundary::Page {
        return None;
    }

    let active = tree.sequence_count().checked_sub(1)?;
    let last_sequence = if boundary == RetrieveBoundary::Document {
        0
    } else {
        active
    };

    for seq in (last_sequence..=active).rev() {
        for page in tree.pages(seq).iter().rev() {
            if let Some(marker) = page.markers.get(class_name, position) {
                return Some(marker.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_ref(index: usize) -> PageRef {
        PageRef {
            sequence: 0,
            index,
            number: index as u32 + 1,
            label: (index + 1).to_string(),
        }
    }

    #[test]
    fn resolve_before_record_is_none() {
        let registry = IdRegistry::new();
        assert!(registry.resolve("intro").is_none());
        assert!(registry.declaring_pages("intro").is_empty());
    }

    #[test]
    fn first_writer_wins() {
        let mut registry = IdRegistry::new();
        registry.record("intro", page_ref(2));
        registry.record("intro", page_ref(0));
        registry.record("intro", page_ref(5));
        registry.record("intro", page_ref(2));

        assert_eq!(registry.resolve("intro"), Some(&page_ref(2)));
        assert_eq!(registry.declaring_pages("intro").len(), 3);
    }

    #[test]
    fn unresolved_entries_are_kept() {
        let mut registry = IdRegistry::new();
        registry.register_unresolved("later", page_ref(0));
        registry.register_unresolved("later", page_ref(1));
        registry.register_unresolved("never", page_ref(1));
        assert_eq!(registry.pending(), vec!["later", "never"]);

        registry.record("later", page_ref(3));
        assert_eq!(registry.pending(), vec!["never"]);
        // Declaring does not drop the dependency bookkeeping.
        assert_eq!(registry.dependents("later").len(), 2);
    }
}
