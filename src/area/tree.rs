//! The area tree: every finished page of the document, grouped by page
//! sequence, plus the identifier registry.
//!
//! Pages are appended once fully laid out (static content included) and are
//! shared as `Arc<Page>` from then on. An optional [`PageSink`] receives each
//! page as it is published, which lets a renderer on another thread drain
//! pages while layout continues.

use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::resolve::IdRegistry;

use super::Page;

/// Receives finished pages in publication order.
pub trait PageSink {
    fn accept(&mut self, page: Arc<Page>);
}

impl PageSink for Sender<Arc<Page>> {
    fn accept(&mut self, page: Arc<Page>) {
        let number = page.number;
        if self.send(page).is_err() {
            log::warn!("Page consumer disconnected; page {number} was not queued");
        }
    }
}

impl PageSink for Vec<Arc<Page>> {
    fn accept(&mut self, page: Arc<Page>) {
        self.push(page);
    }
}

/// Create a FIFO queue for streaming pages to a consumer thread.
pub fn page_queue() -> (Sender<Arc<Page>>, crossbeam_channel::Receiver<Arc<Page>>) {
    crossbeam_channel::unbounded()
}

#[derive(Default)]
pub struct AreaTree {
    sequences: Vec<Vec<Arc<Page>>>,
    ids: IdRegistry,
    sink: Option<Box<dyn PageSink>>,
}

impl AreaTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish pages to `sink` as well as keeping them in the tree.
    pub fn with_sink(sink: Box<dyn PageSink>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::default()
        }
    }

    /// Open a new page sequence and return its index.
    pub fn start_sequence(&mut self) -> usize {
        self.sequences.push(Vec::new());
        self.sequences.len() - 1
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    pub fn pages(&self, sequence: usize) -> &[Arc<Page>] {
        self.sequences
            .get(sequence)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn page_count(&self, sequence: usize) -> usize {
        self.pages(sequence).len()
    }

    pub fn total_pages(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    /// Append a finished page to the current sequence and publish it.
    pub fn add_page(&mut self, page: Page) -> Arc<Page> {
        if self.sequences.is_empty() {
            self.start_sequence();
        }
        let page = Arc::new(page);
        if let Some(pages) = self.sequences.last_mut() {
            pages.push(Arc::clone(&page));
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.accept(Arc::clone(&page));
        }
        page
    }

    pub fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    pub fn ids_mut(&mut self) -> &mut IdRegistry {
        &mut self.ids
    }

    /// Report references that never found their target. They stay
    /// registered for the renderer.
    pub fn finish_document(&mut self) {
        for id in self.ids.pending() {
            log::warn!("Unresolved id reference '{id}' on {} page(s)", self.ids.dependents(id).len());
        }
        // Dropping the sink closes a channel so the consumer can stop.
        self.sink = None;
    }

    /// All pages in document order.
    pub fn into_pages(self) -> Vec<Arc<Page>> {
        self.sequences.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::builder::{build_page, PageSlot};
    use crate::master::PageMasterTemplate;
    use crate::model::PageSize;

    fn page(sequence: usize, index: usize) -> Page {
        let template = PageMasterTemplate::new("plain", PageSize::A5);
        build_page(
            &template,
            PageSlot {
                sequence,
                index,
                number: index as u32 + 1,
                label: (index + 1).to_string(),
                blank: false,
            },
        )
    }

    #[test]
    fn pages_are_grouped_by_sequence() {
        let mut tree = AreaTree::new();
        tree.start_sequence();
        tree.add_page(page(0, 0));
        tree.add_page(page(0, 1));
        tree.start_sequence();
        tree.add_page(page(1, 0));

        assert_eq!(tree.sequence_count(), 2);
        assert_eq!(tree.page_count(0), 2);
        assert_eq!(tree.page_count(1), 1);
        assert_eq!(tree.total_pages(), 3);
        assert!(tree.pages(7).is_empty());
        assert_eq!(tree.into_pages().len(), 3);
    }

    #[test]
    fn channel_sink_receives_pages_in_order() {
        let (tx, rx) = page_queue();
        let mut tree = AreaTree::with_sink(Box::new(tx));
        tree.start_sequence();
        for i in 0..3 {
            tree.add_page(page(0, i));
        }
        tree.finish_document();

        let numbers: Vec<u32> = rx.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
