//! # Area Model
//!
//! The abstract page structure the engine produces and the renderer
//! consumes:
//!
//! ```text
//! Page
//!  └─ RegionViewport (one per region class in the master)
//!      └─ RegionReference
//!          ├─ BodyRegion
//!          │   ├─ BeforeFloat?   (lazily created)
//!          │   ├─ MainReference?
//!          │   │   └─ Span*      (reading order)
//!          │   │       └─ Flow*  (one per column)
//!          │   │           └─ BlockArea*
//!          │   └─ Footnote?      (lazily created)
//!          └─ static BlockArea*  (before/after/start/end)
//! ```
//!
//! Ownership is strictly top-down. Once a page is published it is wrapped in
//! an `Arc` and never mutated again.

pub mod builder;
pub mod markers;
pub mod tree;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::geometry::{Ctm, Rect};
use crate::master::RegionClass;
use crate::model::{Color, Edges};
use crate::resolve::PageRef;

use markers::PageMarkers;

/// Which container an area belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AreaClass {
    /// Normal flow: goes into the current column.
    #[default]
    Normal,
    /// Floats to the top of the body region.
    BeforeFloat,
    /// Collected at the bottom of the body region.
    Footnote,
}

/// A forced break requested before an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForcedBreak {
    #[default]
    Auto,
    Column,
    Page,
    OddPage,
    EvenPage,
}

/// Whether an area spans all columns of the body or flows in one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpanKind {
    #[default]
    None,
    All,
}

/// Content carried by a placed area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AreaContent {
    Text(String),
    /// Stamped with the label of the page the area lands on.
    PageNumber(String),
    /// A reference to the page declaring `ref_id`. `label` stays `None` until
    /// the renderer resolves it.
    PageCitation {
        ref_id: String,
        label: Option<String>,
    },
}

impl AreaContent {
    /// A plain-text rendering, `?` standing in for unresolved citations.
    pub fn text(&self) -> &str {
        match self {
            AreaContent::Text(s) | AreaContent::PageNumber(s) => s,
            AreaContent::PageCitation { label, .. } => label.as_deref().unwrap_or("?"),
        }
    }
}

/// A block-level area produced by a content-layout step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockArea {
    pub class: AreaClass,
    /// Block-progression extent.
    pub bpd: f64,
    /// Inline extent, set from the container on placement.
    pub ipd: f64,
    pub break_before: ForcedBreak,
    pub span: SpanKind,
    pub id: Option<String>,
    pub content: AreaContent,
}

impl BlockArea {
    pub fn new(bpd: f64, content: AreaContent) -> Self {
        Self {
            class: AreaClass::Normal,
            bpd,
            ipd: 0.0,
            break_before: ForcedBreak::Auto,
            span: SpanKind::None,
            id: None,
            content,
        }
    }

    pub fn text(bpd: f64, text: impl Into<String>) -> Self {
        Self::new(bpd, AreaContent::Text(text.into()))
    }

    pub fn with_class(mut self, class: AreaClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_break(mut self, brk: ForcedBreak) -> Self {
        self.break_before = brk;
        self
    }

    pub fn with_span(mut self, span: SpanKind) -> Self {
        self.span = span;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub(crate) fn stamp_page_number(&mut self, label: &str) {
        if let AreaContent::PageNumber(slot) = &mut self.content {
            *slot = label.to_string();
        }
    }
}

/// One column's content container.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Flow {
    pub ipd: f64,
    /// Block extent available to the column.
    pub max_bpd: f64,
    pub used_bpd: f64,
    pub areas: Vec<BlockArea>,
    /// Set when the content step reported the column full.
    pub full: bool,
}

impl Flow {
    pub fn new(ipd: f64, max_bpd: f64) -> Self {
        Self {
            ipd,
            max_bpd,
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> f64 {
        (self.max_bpd - self.used_bpd).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn add(&mut self, mut area: BlockArea) {
        area.ipd = self.ipd;
        self.used_bpd += area.bpd;
        self.areas.push(area);
    }
}

/// A group of equal-width columns.
#[derive(Debug, Clone, Serialize)]
pub struct Span {
    pub ipd: f64,
    pub column_count: u32,
    pub column_gap: f64,
    /// Block extent available to every column of the span.
    pub max_bpd: f64,
    pub flows: Vec<Flow>,
}

impl Span {
    pub fn new(ipd: f64, column_count: u32, column_gap: f64, max_bpd: f64) -> Self {
        Self {
            ipd,
            column_count: column_count.max(1),
            column_gap,
            max_bpd,
            flows: Vec::new(),
        }
    }

    /// Inline extent of one column.
    pub fn column_ipd(&self) -> f64 {
        let n = self.column_count as f64;
        ((self.ipd - self.column_gap * (n - 1.0)) / n).max(0.0)
    }

    /// Start the next column and return its index.
    pub fn add_flow(&mut self) -> usize {
        self.flows.push(Flow::new(self.column_ipd(), self.max_bpd));
        self.flows.len() - 1
    }

    pub fn has_unstarted_columns(&self) -> bool {
        (self.flows.len() as u32) < self.column_count
    }

    /// Block extent taken by the span: its tallest column.
    pub fn height(&self) -> f64 {
        self.flows.iter().map(|f| f.used_bpd).fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.flows.iter().all(Flow::is_empty)
    }
}

/// Main reference area of a body region.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MainReference {
    pub spans: Vec<Span>,
}

impl MainReference {
    pub fn used_bpd(&self) -> f64 {
        self.spans.iter().map(Span::height).sum()
    }
}

/// Floats placed at the top of the body region.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BeforeFloat {
    pub areas: Vec<BlockArea>,
}

impl BeforeFloat {
    pub fn bpd(&self) -> f64 {
        self.areas.iter().map(|a| a.bpd).sum()
    }
}

/// Footnotes collected at the bottom of the body region.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Footnote {
    pub areas: Vec<BlockArea>,
}

impl Footnote {
    pub fn bpd(&self) -> f64 {
        self.areas.iter().map(|a| a.bpd).sum()
    }
}

/// The body region's reference area.
#[derive(Debug, Clone, Serialize)]
pub struct BodyRegion {
    pub column_count: u32,
    pub column_gap: f64,
    pub main: Option<MainReference>,
    pub before_float: Option<BeforeFloat>,
    pub footnote: Option<Footnote>,
}

impl BodyRegion {
    pub fn new(column_count: u32, column_gap: f64) -> Self {
        Self {
            column_count,
            column_gap,
            main: None,
            before_float: None,
            footnote: None,
        }
    }

    /// Create the main reference area. A body has at most one; calling this
    /// again keeps the existing one.
    pub fn ensure_main_reference(&mut self) -> &mut MainReference {
        self.main.get_or_insert_with(MainReference::default)
    }

    pub fn ensure_before_float(&mut self) -> &mut BeforeFloat {
        self.before_float.get_or_insert_with(BeforeFloat::default)
    }

    pub fn ensure_footnote(&mut self) -> &mut Footnote {
        self.footnote.get_or_insert_with(Footnote::default)
    }

    pub fn spans(&self) -> &[Span] {
        self.main.as_ref().map(|m| m.spans.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.spans().iter().all(Span::is_empty)
            && self.before_float.as_ref().map_or(true, |b| b.areas.is_empty())
            && self.footnote.as_ref().map_or(true, |f| f.areas.is_empty())
    }
}

/// What a region reference area contains.
#[derive(Debug, Clone, Serialize)]
pub enum RegionContent {
    Body(BodyRegion),
    Static(Vec<BlockArea>),
}

/// The content container of a region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionReference {
    pub class: RegionClass,
    pub name: String,
    /// Maps the region's (inline, block) coordinates onto the page.
    pub ctm: Ctm,
    pub ipd: f64,
    pub bpd: f64,
    pub content: RegionContent,
}

/// Border, padding and background drawn by a region viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RegionTraits {
    pub border: Edges,
    pub padding: Edges,
    pub background: Option<Color>,
}

impl RegionTraits {
    pub fn before(&self) -> f64 {
        self.border.top + self.padding.top
    }

    pub fn after(&self) -> f64 {
        self.border.bottom + self.padding.bottom
    }

    pub fn start(&self) -> f64 {
        self.border.left + self.padding.left
    }

    pub fn end(&self) -> f64 {
        self.border.right + self.padding.right
    }
}

/// An absolutely positioned window onto a region reference.
#[derive(Debug, Clone, Serialize)]
pub struct RegionViewport {
    /// Absolute page coordinates.
    pub view_area: Rect,
    pub traits: RegionTraits,
    pub clip: bool,
    pub region: RegionReference,
}

impl RegionViewport {
    /// Inline extent available to content, inside border and padding.
    pub fn content_ipd(&self) -> f64 {
        (self.region.ipd - self.traits.start() - self.traits.end()).max(0.0)
    }

    /// Block extent available to content, inside border and padding.
    pub fn content_bpd(&self) -> f64 {
        (self.region.bpd - self.traits.before() - self.traits.after()).max(0.0)
    }
}

/// One physical page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Index of the page sequence this page belongs to.
    pub sequence: usize,
    /// Position of the page within its sequence.
    pub index: usize,
    pub number: u32,
    pub label: String,
    pub blank: bool,
    pub master: String,
    pub view_area: Rect,
    pub regions: BTreeMap<RegionClass, RegionViewport>,
    #[serde(skip)]
    pub markers: PageMarkers,
    /// Identifiers declared by content on this page.
    pub ids: Vec<String>,
    /// Identifiers this page references but that were unknown when placed.
    pub unresolved: BTreeSet<String>,
}

impl Page {
    pub fn page_ref(&self) -> PageRef {
        PageRef {
            sequence: self.sequence,
            index: self.index,
            number: self.number,
            label: self.label.clone(),
        }
    }

    pub fn viewport(&self, class: RegionClass) -> Option<&RegionViewport> {
        self.regions.get(&class)
    }

    pub fn body(&self) -> Option<&BodyRegion> {
        match &self.regions.get(&RegionClass::Body)?.region.content {
            RegionContent::Body(body) => Some(body),
            RegionContent::Static(_) => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut BodyRegion> {
        match &mut self.regions.get_mut(&RegionClass::Body)?.region.content {
            RegionContent::Body(body) => Some(body),
            RegionContent::Static(_) => None,
        }
    }

    /// Static areas laid out into a side region.
    pub fn static_areas(&self, class: RegionClass) -> &[BlockArea] {
        match self.regions.get(&class).map(|v| &v.region.content) {
            Some(RegionContent::Static(areas)) => areas,
            _ => &[],
        }
    }

    /// Normal-flow areas in reading order: span by span, column by column.
    pub fn flow_areas(&self) -> impl Iterator<Item = &BlockArea> {
        self.body()
            .into_iter()
            .flat_map(|b| b.spans())
            .flat_map(|s| s.flows.iter())
            .flat_map(|f| f.areas.iter())
    }

    /// True when no content has been placed in the body.
    pub fn is_empty(&self) -> bool {
        self.body().map_or(true, BodyRegion::is_empty)
    }
}
