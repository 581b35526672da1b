//! # Folio
//!
//! A paginating layout engine.
//!
//! Folio takes measured block content and flows it into pages built from
//! page masters: rectangular templates with a body region (optionally in
//! several columns) and up to four side regions for running headers,
//! footers and margin notes. Every page is selected, built and filled one
//! at a time, and published as soon as it is complete.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]      — Masters, page sequences, measured blocks
//!       ↓
//!   [master]     — Which page master applies to the next page
//!       ↓
//!   [area]       — Page geometry: viewports, reference areas, CTMs
//!       ↓
//!   [layout]     — Break protocol, page/span/column assembly
//!       ↓
//!   [resolve]    — Ids, page citations, markers
//!       ↓
//!   AreaTree     — Finished pages, optionally streamed to a consumer
//! ```

pub mod area;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod master;
pub mod model;
pub mod numbering;
pub mod resolve;

use std::sync::Arc;

use area::tree::AreaTree;
use area::Page;
use error::Result;
use layout::{LayoutInfo, Paginator, SequenceSummary};
use model::Document;

/// Paginate a document and return its pages in document order.
///
/// This is the primary entry point.
pub fn paginate(document: &Document) -> Result<Vec<Arc<Page>>> {
    Paginator::new().paginate(document)
}

/// Paginate a document into an existing area tree, for instance one that
/// streams pages to a consumer thread.
pub fn paginate_into(document: &Document, tree: &mut AreaTree) -> Result<Vec<SequenceSummary>> {
    Paginator::new().paginate_into(document, tree)
}

/// Paginate a document described as JSON and summarize the result.
pub fn paginate_json(json: &str) -> Result<LayoutInfo> {
    let document: Document = serde_json::from_str(json)?;
    let pages = paginate(&document)?;
    Ok(LayoutInfo::from_pages(&pages))
}
