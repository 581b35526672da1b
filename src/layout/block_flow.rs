//! # Block Flow
//!
//! A content-layout step over a list of pre-measured blocks. This is what
//! the document model feeds into the body and into static regions.
//!
//! Blocks are atomic: a block either fits in the current column or moves
//! to the next one. A block that does not fit even in an empty column is
//! placed anyway and overflows, so layout always makes progress.

use serde::{Deserialize, Serialize};

use crate::area::markers::{Marker, RetrieveBoundary, RetrievePosition};
use crate::area::{AreaClass, AreaContent, BlockArea, ForcedBreak, SpanKind};
use crate::error::Result;

use super::context::LayoutContext;
use super::page_break::{decide_break, BreakDecision};
use super::static_content::StaticContent;
use super::step::{AreaTarget, LayoutStep, LeafPosition};

/// A measured block of content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Block-progression extent in points.
    pub extent: f64,

    #[serde(default)]
    pub break_before: ForcedBreak,

    #[serde(default)]
    pub span: SpanKind,

    #[serde(default)]
    pub class: AreaClass,

    /// Identifier declared by this block, for page citations.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub markers: Vec<Marker>,

    #[serde(default)]
    pub content: BlockContent,
}

/// What a block shows once placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockContent {
    Text {
        #[serde(default)]
        text: String,
    },
    /// The label of the page the block lands on.
    PageNumber,
    /// The label of the page declaring `ref_id`.
    PageCitation {
        #[serde(rename = "refId")]
        ref_id: String,
    },
    /// The text of a marker retrieved at placement time.
    RetrieveMarker {
        #[serde(rename = "className")]
        class_name: String,
        #[serde(default)]
        position: RetrievePosition,
        #[serde(default)]
        boundary: RetrieveBoundary,
    },
}

impl Default for BlockContent {
    fn default() -> Self {
        BlockContent::Text {
            text: String::new(),
        }
    }
}

impl Block {
    pub fn new(extent: f64, content: BlockContent) -> Self {
        Self {
            extent,
            content,
            ..Default::default()
        }
    }

    pub fn text(extent: f64, text: impl Into<String>) -> Self {
        Self::new(extent, BlockContent::Text { text: text.into() })
    }

    pub fn page_number(extent: f64) -> Self {
        Self::new(extent, BlockContent::PageNumber)
    }

    pub fn citation(extent: f64, ref_id: impl Into<String>) -> Self {
        Self::new(
            extent,
            BlockContent::PageCitation {
                ref_id: ref_id.into(),
            },
        )
    }

    pub fn retrieve_marker(
        extent: f64,
        class_name: impl Into<String>,
        position: RetrievePosition,
        boundary: RetrieveBoundary,
    ) -> Self {
        Self::new(
            extent,
            BlockContent::RetrieveMarker {
                class_name: class_name.into(),
                position,
                boundary,
            },
        )
    }

    pub fn with_break(mut self, brk: ForcedBreak) -> Self {
        self.break_before = brk;
        self
    }

    pub fn with_span(mut self, span: SpanKind) -> Self {
        self.span = span;
        self
    }

    pub fn with_class(mut self, class: AreaClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Extent the block takes in the normal flow.
    fn flow_extent(&self) -> f64 {
        match self.class {
            AreaClass::Normal => self.extent,
            AreaClass::BeforeFloat | AreaClass::Footnote => 0.0,
        }
    }

    /// Build the area for this block. Returns the id of a citation that
    /// could not be resolved yet, to be registered once the area is placed.
    fn to_area(&self, target: &dyn AreaTarget) -> (BlockArea, Option<String>) {
        let mut unresolved = None;
        let content = match &self.content {
            BlockContent::Text { text } => AreaContent::Text(text.clone()),
            BlockContent::PageNumber => AreaContent::PageNumber(String::new()),
            BlockContent::PageCitation { ref_id } => {
                let label = target.resolve_id(ref_id).map(|page| page.label);
                if label.is_none() {
                    unresolved = Some(ref_id.clone());
                }
                AreaContent::PageCitation {
                    ref_id: ref_id.clone(),
                    label,
                }
            }
            BlockContent::RetrieveMarker {
                class_name,
                position,
                boundary,
            } => AreaContent::Text(
                target
                    .retrieve_marker(class_name, *position, *boundary)
                    .map(|m| m.text)
                    .unwrap_or_default(),
            ),
        };

        let mut area = BlockArea::new(self.extent, content)
            .with_class(self.class)
            .with_break(self.break_before)
            .with_span(self.span);
        area.id = self.id.clone();
        (area, unresolved)
    }
}

/// A break handed out by [`BlockFlow::next_break`]: blocks
/// `start..end`, and whether the column is full after them.
#[derive(Debug, Clone, Copy)]
struct PendingBreak {
    start: usize,
    end: usize,
    fills: bool,
}

/// Layout step over a list of blocks.
#[derive(Debug, Clone)]
pub struct BlockFlow {
    blocks: Vec<Block>,
    cursor: usize,
    breaks: Vec<PendingBreak>,
    last_span: Option<SpanKind>,
}

impl BlockFlow {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            cursor: 0,
            breaks: Vec::new(),
            last_span: None,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// A block the current context does not describe: it forces a break,
    /// or it changes the span kind. Such a block is handed out on its own
    /// so the next request sees the column it actually lands in. Whether it
    /// fits is checked on placement, once its span exists.
    fn starts_fresh(&self, block: &Block) -> bool {
        block.break_before != ForcedBreak::Auto
            || (block.class == AreaClass::Normal
                && self.last_span.is_some_and(|span| span != block.span))
    }

    /// End of the run that starts at `start`: stops before the next block
    /// that starts fresh.
    fn run_end(&self, start: usize) -> usize {
        let span = self.blocks[start].span;
        let mut end = start + 1;
        while let Some(block) = self.blocks.get(end) {
            let changes_span = block.class == AreaClass::Normal && block.span != span;
            if block.break_before != ForcedBreak::Auto || changes_span {
                break;
            }
            end += 1;
        }
        end
    }

    fn push_break(&mut self, start: usize, end: usize, fills: bool) -> LeafPosition {
        self.breaks.push(PendingBreak { start, end, fills });
        LeafPosition(self.breaks.len() - 1)
    }
}

impl LayoutStep for BlockFlow {
    fn is_finished(&self) -> bool {
        self.cursor >= self.blocks.len()
    }

    fn next_break(&mut self, context: &LayoutContext) -> Option<LeafPosition> {
        if self.is_finished() {
            return None;
        }
        let start = self.cursor;

        // Static regions take everything at once.
        if context.is_static {
            return Some(self.push_break(start, self.blocks.len(), false));
        }

        if self.starts_fresh(&self.blocks[start]) {
            return Some(self.push_break(start, start + 1, false));
        }

        let end = self.run_end(start);
        let extents: Vec<f64> = self.blocks[start..end]
            .iter()
            .map(Block::flow_extent)
            .collect();

        let leaf = match decide_break(context.available_bpd(), &extents, context.starts_flow) {
            BreakDecision::Place => self.push_break(start, end, false),
            BreakDecision::Split {
                items_on_current_flow,
            } => self.push_break(start, start + items_on_current_flow, true),
            BreakDecision::MoveToNextFlow => self.push_break(start, start, true),
            BreakDecision::Overflow => {
                log::warn!(
                    "Block of {}pt does not fit the {}pt of an empty column; it will overflow",
                    extents[0],
                    context.available_bpd()
                );
                self.push_break(start, start + 1, true)
            }
        };
        Some(leaf)
    }

    fn add_areas(&mut self, position: LeafPosition, target: &mut dyn AreaTarget) -> Result<()> {
        let Some(pending) = self.breaks.get(position.0).copied() else {
            log::warn!("Unknown break position {}", position.0);
            return Ok(());
        };
        if pending.start != self.cursor {
            log::warn!("Stale break position {}; ignored", position.0);
            return Ok(());
        }

        for block in &self.blocks[pending.start..pending.end] {
            let (area, unresolved) = block.to_area(&*target);
            target.add_child(area)?;

            if let Some(id) = &block.id {
                target.add_id(id);
            }
            if let Some(ref_id) = unresolved {
                target.add_unresolved(&ref_id);
            }
            if !block.markers.is_empty() {
                target.add_markers(&block.markers, true, true);
                target.add_markers(&block.markers, false, true);
            }
            if block.class == AreaClass::Normal {
                self.last_span = Some(block.span);
            }
        }

        self.cursor = pending.end;
        if pending.fills {
            target.finish_flow();
        }
        Ok(())
    }
}

impl StaticContent for Vec<Block> {
    fn layout_step(&self) -> Box<dyn LayoutStep> {
        Box::new(BlockFlow::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::PageRef;

    /// Collects what a step places, standing in for the page assembly.
    #[derive(Default)]
    struct Recorder {
        areas: Vec<BlockArea>,
        ids: Vec<String>,
        unresolved: Vec<String>,
        markers: Vec<(String, bool, bool)>,
        full_flows: usize,
        known: Vec<(String, PageRef)>,
    }

    impl AreaTarget for Recorder {
        fn add_child(&mut self, area: BlockArea) -> Result<()> {
            self.areas.push(area);
            Ok(())
        }

        fn finish_flow(&mut self) {
            self.full_flows += 1;
        }

        fn add_id(&mut self, id: &str) {
            self.ids.push(id.to_string());
        }

        fn add_unresolved(&mut self, id: &str) {
            self.unresolved.push(id.to_string());
        }

        fn add_markers(&mut self, markers: &[Marker], starting: bool, boundary: bool) {
            for m in markers {
                self.markers.push((m.class_name.clone(), starting, boundary));
            }
        }

        fn retrieve_marker(
            &self,
            class_name: &str,
            _position: RetrievePosition,
            _boundary: RetrieveBoundary,
        ) -> Option<Marker> {
            (class_name == "chapter").then(|| Marker::new("chapter", "Intro"))
        }

        fn resolve_id(&self, id: &str) -> Option<PageRef> {
            self.known
                .iter()
                .find(|(known, _)| known == id)
                .map(|(_, page)| page.clone())
        }
    }

    fn ctx(remaining: f64, starts_flow: bool) -> LayoutContext {
        LayoutContext::for_flow(remaining, 400.0, starts_flow)
    }

    fn texts(recorder: &Recorder) -> Vec<&str> {
        recorder.areas.iter().map(|a| a.content.text()).collect()
    }

    #[test]
    fn fitting_run_is_one_break() {
        let mut flow = BlockFlow::new(vec![Block::text(100.0, "a"), Block::text(100.0, "b")]);
        let mut rec = Recorder::default();

        let pos = flow.next_break(&ctx(300.0, true)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();

        assert!(flow.is_finished());
        assert_eq!(texts(&rec), vec!["a", "b"]);
        assert_eq!(rec.full_flows, 0);
        assert!(flow.next_break(&ctx(100.0, false)).is_none());
    }

    #[test]
    fn overfull_run_splits_and_fills() {
        let blocks = (0..5).map(|i| Block::text(100.0, i.to_string())).collect();
        let mut flow = BlockFlow::new(blocks);
        let mut rec = Recorder::default();

        let pos = flow.next_break(&ctx(250.0, true)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();
        assert_eq!(texts(&rec), vec!["0", "1"]);
        assert_eq!(rec.full_flows, 1);
        assert!(!flow.is_finished());
    }

    #[test]
    fn nothing_fits_moves_on_without_areas() {
        let mut flow = BlockFlow::new(vec![Block::text(100.0, "a")]);
        let mut rec = Recorder::default();

        let pos = flow.next_break(&ctx(50.0, false)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();
        assert!(rec.areas.is_empty());
        assert_eq!(rec.full_flows, 1);
        assert!(!flow.is_finished());
    }

    #[test]
    fn oversized_block_overflows_empty_column() {
        let mut flow = BlockFlow::new(vec![Block::text(500.0, "big"), Block::text(10.0, "next")]);
        let mut rec = Recorder::default();

        let pos = flow.next_break(&ctx(300.0, true)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();
        assert_eq!(texts(&rec), vec!["big"]);
        assert_eq!(rec.full_flows, 1);
    }

    #[test]
    fn forced_break_block_is_handed_out_alone() {
        let mut flow = BlockFlow::new(vec![
            Block::text(10.0, "a"),
            Block::text(10.0, "b").with_break(ForcedBreak::Page),
            Block::text(10.0, "c"),
        ]);
        let mut rec = Recorder::default();

        let pos = flow.next_break(&ctx(300.0, true)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();
        assert_eq!(texts(&rec), vec!["a"]);

        let pos = flow.next_break(&ctx(290.0, false)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();
        assert_eq!(texts(&rec), vec!["a", "b"]);
        assert_eq!(rec.areas[1].break_before, ForcedBreak::Page);
    }

    #[test]
    fn positions_are_consumed_once() {
        let mut flow = BlockFlow::new(vec![Block::text(10.0, "a"), Block::text(10.0, "b").with_break(ForcedBreak::Page)]);
        let mut rec = Recorder::default();

        let pos = flow.next_break(&ctx(300.0, true)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();
        flow.add_areas(LeafPosition(0), &mut rec).unwrap();
        assert_eq!(texts(&rec), vec!["a"]);
    }

    #[test]
    fn footnotes_take_no_flow_space() {
        let mut flow = BlockFlow::new(vec![
            Block::text(100.0, "a"),
            Block::text(80.0, "note").with_class(AreaClass::Footnote),
            Block::text(100.0, "b"),
        ]);
        let mut rec = Recorder::default();

        let pos = flow.next_break(&ctx(200.0, true)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();
        assert!(flow.is_finished());
        assert_eq!(rec.areas[1].class, AreaClass::Footnote);
    }

    #[test]
    fn ids_markers_and_references() {
        let mut flow = BlockFlow::new(vec![
            Block::text(10.0, "Chapter 1")
                .with_id("ch1")
                .with_marker(Marker::new("chapter", "Chapter 1")),
            Block::citation(10.0, "ch1"),
            Block::citation(10.0, "ch9"),
            Block::retrieve_marker(
                10.0,
                "chapter",
                RetrievePosition::FirstStartingWithinPage,
                RetrieveBoundary::Page,
            ),
        ]);
        let mut rec = Recorder::default();
        rec.known.push((
            "ch1".into(),
            PageRef {
                sequence: 0,
                index: 0,
                number: 1,
                label: "1".into(),
            },
        ));

        let pos = flow.next_break(&ctx(300.0, true)).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();

        assert_eq!(rec.ids, vec!["ch1"]);
        assert_eq!(rec.unresolved, vec!["ch9"]);
        assert_eq!(
            rec.markers,
            vec![("chapter".to_string(), true, true), ("chapter".to_string(), false, true)]
        );
        assert_eq!(texts(&rec), vec!["Chapter 1", "1", "?", "Intro"]);
    }

    #[test]
    fn static_context_takes_everything() {
        let mut flow = BlockFlow::new(vec![
            Block::page_number(12.0),
            Block::text(500.0, "tall").with_break(ForcedBreak::Page),
        ]);
        let mut rec = Recorder::default();
        let ctx = LayoutContext::for_static(792.0, 500.0);

        let pos = flow.next_break(&ctx).unwrap();
        flow.add_areas(pos, &mut rec).unwrap();
        assert!(flow.is_finished());
        assert_eq!(rec.areas.len(), 2);
    }

    #[test]
    fn blocks_deserialize_from_json() {
        let blocks: Vec<Block> = serde_json::from_str(
            r#"[
                { "extent": 20, "content": { "type": "Text", "text": "Hello" } },
                { "extent": 12, "breakBefore": "Page", "content": { "type": "PageNumber" } },
                { "extent": 12, "content": { "type": "PageCitation", "refId": "intro" } },
                { "extent": 12, "class": "Footnote" }
            ]"#,
        )
        .unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1].break_before, ForcedBreak::Page);
        assert!(matches!(blocks[1].content, BlockContent::PageNumber));
        assert!(matches!(&blocks[2].content, BlockContent::PageCitation { ref_id } if ref_id == "intro"));
        assert_eq!(blocks[3].class, AreaClass::Footnote);
    }
}
