//! # Pagination Engine
//!
//! Turns page sequences into pages.
//!
//! Content never sees a page directly. A content-layout step is asked for
//! its next break given the space left in the current column, and the
//! break is then materialized through the same step into the page
//! assembly, which opens pages, spans and columns as content arrives:
//!
//! 1. Ask the active step for the next break that fits the column
//! 2. Let the step place the areas up to that break
//! 3. If the step reported the column full, move to the next column, or
//!    finish the page when there is none
//! 4. Finishing a page lays out its static regions and publishes it
//!
//! Forced breaks travel on the areas themselves and are honored by the
//! assembly right before the area is placed, using a [`PaginationPolicy`]
//! to decide on blank and new pages.

pub mod assembly;
pub mod block_flow;
pub mod context;
pub mod page_break;
pub mod policy;
pub mod sequence;
pub mod static_content;
pub mod step;

use std::sync::Arc;

use serde::Serialize;

use crate::area::tree::AreaTree;
use crate::area::{AreaClass, BlockArea, Page, RegionContent};
use crate::error::Result;
use crate::master::RegionClass;
use crate::model::Document;

pub use assembly::{AssemblyState, PageAssembly};
pub use block_flow::{Block, BlockContent, BlockFlow};
pub use context::LayoutContext;
pub use policy::{PageState, PaginationPolicy, ParityBreaks, SimpleBreaks};
pub use sequence::{layout_sequence, PageSequence, PageSequenceLayout, SequenceSummary};
pub use static_content::StaticContent;
pub use step::{AreaTarget, BreakPosition, LayoutStep, LeafPosition};

/// Lays out every page sequence of a document in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator;

impl Paginator {
    pub fn new() -> Self {
        Self
    }

    /// Paginate `document` into a fresh area tree and return all pages in
    /// document order.
    pub fn paginate(&self, document: &Document) -> Result<Vec<Arc<Page>>> {
        let mut tree = AreaTree::new();
        self.paginate_into(document, &mut tree)?;
        Ok(tree.into_pages())
    }

    /// Paginate `document` into `tree`. Page numbering continues from one
    /// sequence to the next unless a sequence sets its own start.
    pub fn paginate_into(
        &self,
        document: &Document,
        tree: &mut AreaTree,
    ) -> Result<Vec<SequenceSummary>> {
        let result = self.layout_sequences(document, tree);
        // Close the sink on failure too, so a draining consumer stops.
        tree.finish_document();
        result
    }

    fn layout_sequences(
        &self,
        document: &Document,
        tree: &mut AreaTree,
    ) -> Result<Vec<SequenceSummary>> {
        let masters = document.master_map();
        let mut next_page_number = 1;
        let mut summaries = Vec::with_capacity(document.sequences.len());

        for spec in &document.sequences {
            let sequence = spec.build(&masters)?;
            let summary = layout_sequence(tree, sequence, next_page_number)?;
            next_page_number = summary.next_page_number;
            summaries.push(summary);
        }
        Ok(summaries)
    }
}

// ── Serializable layout metadata (for debugging and tooling) ───────

/// Complete layout metadata for all pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub pages: Vec<PageInfo>,
    /// Ids referenced somewhere but declared nowhere.
    pub unresolved: Vec<String>,
}

/// Layout metadata for a single page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub sequence: usize,
    pub index: usize,
    pub number: u32,
    pub label: String,
    pub blank: bool,
    pub master: String,
    pub width: f64,
    pub height: f64,
    pub regions: Vec<RegionInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
}

/// One region viewport and what was laid out in it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    pub class: RegionClass,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub clip: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<SpanInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub before_floats: Vec<AreaInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footnotes: Vec<AreaInfo>,
    /// Static content of a side region.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub areas: Vec<AreaInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanInfo {
    pub column_count: u32,
    /// Areas of each started column.
    pub columns: Vec<Vec<AreaInfo>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaInfo {
    pub class: AreaClass,
    pub bpd: f64,
    pub text: String,
}

impl LayoutInfo {
    /// Extract serializable layout metadata from laid-out pages.
    pub fn from_pages(pages: &[Arc<Page>]) -> Self {
        let declared: std::collections::HashSet<&str> = pages
            .iter()
            .flat_map(|p| p.ids.iter().map(String::as_str))
            .collect();
        let mut unresolved: Vec<String> = pages
            .iter()
            .flat_map(|p| p.unresolved.iter())
            .filter(|id| !declared.contains(id.as_str()))
            .cloned()
            .collect();
        unresolved.sort();
        unresolved.dedup();

        LayoutInfo {
            pages: pages.iter().map(|page| Self::page_info(page)).collect(),
            unresolved,
        }
    }

    fn page_info(page: &Page) -> PageInfo {
        let regions = page
            .regions
            .iter()
            .map(|(class, viewport)| {
                let mut info = RegionInfo {
                    class: *class,
                    name: viewport.region.name.clone(),
                    x: viewport.view_area.x,
                    y: viewport.view_area.y,
                    width: viewport.view_area.width,
                    height: viewport.view_area.height,
                    clip: viewport.clip,
                    spans: Vec::new(),
                    before_floats: Vec::new(),
                    footnotes: Vec::new(),
                    areas: Vec::new(),
                };
                match &viewport.region.content {
                    RegionContent::Body(body) => {
                        info.spans = body
                            .spans()
                            .iter()
                            .map(|span| SpanInfo {
                                column_count: span.column_count,
                                columns: span
                                    .flows
                                    .iter()
                                    .map(|flow| Self::areas(&flow.areas))
                                    .collect(),
                            })
                            .collect();
                        if let Some(floats) = &body.before_float {
                            info.before_floats = Self::areas(&floats.areas);
                        }
                        if let Some(footnotes) = &body.footnote {
                            info.footnotes = Self::areas(&footnotes.areas);
                        }
                    }
                    RegionContent::Static(areas) => info.areas = Self::areas(areas),
                }
                info
            })
            .collect();

        PageInfo {
            sequence: page.sequence,
            index: page.index,
            number: page.number,
            label: page.label.clone(),
            blank: page.blank,
            master: page.master.clone(),
            width: page.view_area.width,
            height: page.view_area.height,
            regions,
            ids: page.ids.clone(),
        }
    }

    fn areas(areas: &[BlockArea]) -> Vec<AreaInfo> {
        areas
            .iter()
            .map(|area| AreaInfo {
                class: area.class,
                bpd: area.bpd,
                text: area.content.text().to_string(),
            })
            .collect()
    }
}
