//! # Page / Span / Flow Assembly
//!
//! Owns the cursors of the page under construction: the current page, its
//! body's active span, and the active flow (column) within that span.
//!
//! ```text
//! NoPage ─place─▶ BodyAbsent ─▶ SpanAbsent ─▶ FlowReady
//!    ▲                                          │
//!    └──────────────── finish_page ◀────────────┘
//! ```
//!
//! Pages, main references, spans and flows are all created on demand, the
//! first time content needs them. A page leaves the assembly only through
//! [`PageAssembly::finish_page`], which lays out the static regions and
//! then publishes the page to the area tree.

use std::collections::HashMap;

use crate::area::builder::{build_page, PageSlot};
use crate::area::markers::{Marker, RetrieveBoundary, RetrievePosition};
use crate::area::tree::AreaTree;
use crate::area::{
    AreaClass, BeforeFloat, BlockArea, Flow, Footnote, ForcedBreak, Page, Span, SpanKind,
};
use crate::error::{LayoutError, Result};
use crate::master::{PageMasterSelector, RegionClass};
use crate::numbering::PageNumberFormatter;
use crate::resolve::{self, PageRef};

use super::context::LayoutContext;
use super::policy::{PageState, PaginationPolicy};
use super::static_content::{layout_static_region, StaticContent};
use super::step::AreaTarget;

/// Where the assembly stands with respect to the page under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    /// No page is open.
    NoPage,
    /// A page is open but its body has no main reference yet (or the page
    /// has no body at all).
    BodyAbsent,
    /// The main reference exists but no column is active.
    SpanAbsent,
    /// A column is active and accepts content.
    FlowReady,
}

/// Slack allowed when comparing an area against the room left in a column.
const FIT_TOLERANCE: f64 = 1e-6;

pub struct PageAssembly<'t> {
    tree: &'t mut AreaTree,
    sequence: usize,
    selector: PageMasterSelector,
    numbering: Box<dyn PageNumberFormatter>,
    policy: Box<dyn PaginationPolicy>,
    static_content: HashMap<String, Box<dyn StaticContent>>,

    /// Number of the current page, or of the next one when none is open.
    page_number: u32,
    label: String,
    is_first_page: bool,
    pages_finished: usize,

    current: Option<Page>,
    /// Index of the active flow in the last span of the current page.
    cur_flow: Option<usize>,
}

impl<'t> PageAssembly<'t> {
    pub fn new(
        tree: &'t mut AreaTree,
        selector: PageMasterSelector,
        numbering: Box<dyn PageNumberFormatter>,
        policy: Box<dyn PaginationPolicy>,
        static_content: HashMap<String, Box<dyn StaticContent>>,
        first_page_number: u32,
    ) -> Self {
        let sequence = tree.start_sequence();
        let label = numbering.format(first_page_number);
        Self {
            tree,
            sequence,
            selector,
            numbering,
            policy,
            static_content,
            page_number: first_page_number,
            label,
            is_first_page: true,
            pages_finished: 0,
            current: None,
            cur_flow: None,
        }
    }

    pub fn state(&self) -> AssemblyState {
        let Some(page) = &self.current else {
            return AssemblyState::NoPage;
        };
        match page.body().and_then(|b| b.main.as_ref()) {
            None => AssemblyState::BodyAbsent,
            Some(_) if self.cur_flow.is_none() => AssemblyState::SpanAbsent,
            Some(_) => AssemblyState::FlowReady,
        }
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current.as_ref()
    }

    /// Number of the current page, or of the next page to be opened.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Formatted label matching [`page_number`](Self::page_number).
    pub fn page_label(&self) -> &str {
        &self.label
    }

    pub fn pages_finished(&self) -> usize {
        self.pages_finished
    }

    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn tree(&self) -> &AreaTree {
        &*self.tree
    }

    /// Constraints for the next break request: the active column's
    /// remaining extent and width. Opens a page, span and flow if needed.
    pub fn context(&mut self) -> Result<LayoutContext> {
        self.ensure_flow(None)?;
        let flow = self
            .current
            .as_ref()
            .zip(self.cur_flow)
            .and_then(|(page, idx)| flow_ref(page, idx));
        Ok(match flow {
            Some(flow) => LayoutContext::for_flow(flow.remaining(), flow.ipd, flow.is_empty()),
            None => LayoutContext::for_flow(0.0, 0.0, true),
        })
    }

    /// Place an area according to its class.
    pub fn place(&mut self, area: BlockArea) -> Result<()> {
        match area.class {
            AreaClass::Normal => self.place_normal(area),
            AreaClass::BeforeFloat | AreaClass::Footnote => self.place_out_of_flow(area),
        }
    }

    /// After a break has been materialized: close the column if the step
    /// reported it full, and the page if that was its last column.
    pub fn complete_if_full(&mut self) -> Result<()> {
        let (full, more_columns) = match (&self.current, self.cur_flow) {
            (Some(page), Some(idx)) => {
                let span = page.body().and_then(|b| b.spans().last());
                let full = span
                    .and_then(|s| s.flows.get(idx))
                    .is_some_and(|f| f.full);
                (full, span.is_some_and(Span::has_unstarted_columns))
            }
            _ => (false, false),
        };
        if !full {
            return Ok(());
        }
        if more_columns {
            log::trace!("page {}: column full, moving to the next", self.page_number);
            self.cur_flow = None;
            Ok(())
        } else {
            self.finish_page()
        }
    }

    /// Finish the last page. An open page that never received content is
    /// dropped instead of published.
    pub fn flush(&mut self) -> Result<()> {
        if self
            .current
            .as_ref()
            .is_some_and(|p| p.is_empty() && !p.blank)
        {
            if let Some(page) = self.current.take() {
                log::debug!("Dropping empty trailing page {}", page.number);
            }
            self.cur_flow = None;
            return Ok(());
        }
        self.finish_page()
    }

    /// Lay out static content into the side regions, publish the page, and
    /// move the page counter on.
    pub fn finish_page(&mut self) -> Result<()> {
        let Some(mut page) = self.current.take() else {
            return Ok(());
        };
        self.cur_flow = None;

        for class in RegionClass::SIDES {
            layout_static_region(&mut page, class, &self.static_content, self.tree)?;
        }

        log::debug!(
            "Finished page {} ('{}', master '{}'{})",
            page.number,
            page.label,
            page.master,
            if page.blank { ", blank" } else { "" }
        );
        self.tree.add_page(page);
        self.pages_finished += 1;
        self.page_number += 1;
        self.label = self.numbering.format(self.page_number);
        Ok(())
    }

    /// Honor a forced break before the next normal-flow area.
    pub fn handle_break(&mut self, brk: ForcedBreak) -> Result<()> {
        let brk = match brk {
            ForcedBreak::Auto => return Ok(()),
            ForcedBreak::Column => {
                if self.advance_column() {
                    return Ok(());
                }
                ForcedBreak::Page
            }
            other => other,
        };

        if self.policy.need_blank_page(brk, &self.page_state()) {
            if self.current.as_ref().is_some_and(|p| p.is_empty() && !p.blank) {
                self.reopen_as_blank()?;
            } else {
                self.make_new_page(true)?;
            }
        }
        if self.policy.need_new_page(brk, &self.page_state()) {
            self.make_new_page(false)?;
        }
        Ok(())
    }

    pub fn page_state(&self) -> PageState {
        match &self.current {
            Some(page) => PageState {
                number: page.number,
                is_empty: page.is_empty(),
                is_blank: page.blank,
            },
            None => PageState {
                number: self.page_number,
                is_empty: true,
                is_blank: false,
            },
        }
    }

    fn place_normal(&mut self, mut area: BlockArea) -> Result<()> {
        if area.break_before != ForcedBreak::Auto && self.current.is_some() {
            self.handle_break(area.break_before)?;
        }
        self.ensure_flow(Some(area.span))?;
        if self.needs_fresh_page(area.bpd) {
            log::debug!(
                "Area of {}pt does not fit below the content of page {}; starting a new page",
                area.bpd,
                self.page_number
            );
            self.drop_trailing_empty_span();
            self.finish_page()?;
            self.ensure_flow(Some(area.span))?;
        }
        area.stamp_page_number(&self.label);

        let flow = match (self.current.as_mut(), self.cur_flow) {
            (Some(page), Some(idx)) => flow_mut(page, idx),
            _ => None,
        };
        match flow {
            Some(flow) => {
                if area.bpd > flow.remaining() && !flow.is_empty() {
                    log::debug!(
                        "Area of {}pt overflows a column with {}pt left",
                        area.bpd,
                        flow.remaining()
                    );
                }
                flow.add(area);
            }
            None => log::error!("No active column on page {}; area dropped", self.page_number),
        }
        Ok(())
    }

    /// True when an area of `bpd` does not fit the active column and the
    /// column is not at the top of the body, so a new page would hold more.
    fn needs_fresh_page(&self, bpd: f64) -> bool {
        let Some(spans) = self.current.as_ref().and_then(|p| p.body()).map(|b| b.spans()) else {
            return false;
        };
        let Some((last, earlier)) = spans.split_last() else {
            return false;
        };
        let Some(flow) = self.cur_flow.and_then(|idx| last.flows.get(idx)) else {
            return false;
        };
        let at_top = flow.is_empty() && earlier.iter().all(Span::is_empty);
        bpd > flow.remaining() + FIT_TOLERANCE && !at_top
    }

    /// Remove a span that was opened for an area which then moved on to
    /// the next page.
    fn drop_trailing_empty_span(&mut self) {
        let main = self
            .current
            .as_mut()
            .and_then(|p| p.body_mut())
            .and_then(|b| b.main.as_mut());
        if let Some(main) = main {
            if main.spans.len() > 1 && main.spans.last().is_some_and(Span::is_empty) {
                main.spans.pop();
                self.cur_flow = None;
            }
        }
    }

    fn place_out_of_flow(&mut self, mut area: BlockArea) -> Result<()> {
        let mut page = self.take_or_open_page()?;
        area.stamp_page_number(&self.label);
        if let Some(viewport) = page.viewport(RegionClass::Body) {
            area.ipd = viewport.content_ipd();
        }
        let master = page.master.clone();
        let result = match page.body_mut() {
            Some(body) => {
                match area.class {
                    AreaClass::BeforeFloat => body.ensure_before_float().areas.push(area),
                    _ => body.ensure_footnote().areas.push(area),
                }
                Ok(())
            }
            None => Err(LayoutError::MissingBody { master }),
        };
        self.current = Some(page);
        result
    }

    /// Move to the next column of the current span. Returns false when the
    /// span has no column left. An empty active column already satisfies a
    /// column break.
    fn advance_column(&mut self) -> bool {
        let Some(span) = self
            .current
            .as_mut()
            .and_then(|p| p.body_mut())
            .and_then(|b| b.main.as_mut())
            .and_then(|m| m.spans.last_mut())
        else {
            return false;
        };
        if let Some(flow) = self.cur_flow.and_then(|idx| span.flows.get(idx)) {
            if flow.is_empty() {
                return true;
            }
        }
        if span.has_unstarted_columns() {
            self.cur_flow = Some(span.add_flow());
            return true;
        }
        false
    }

    /// Make sure a flow is ready for content. `span` asks for a specific
    /// span kind; `None` keeps whatever span is active.
    fn ensure_flow(&mut self, span: Option<SpanKind>) -> Result<()> {
        let mut page = self.take_or_open_page()?;
        let result = self.prepare_flow(&mut page, span);
        self.current = Some(page);
        result
    }

    fn prepare_flow(&mut self, page: &mut Page, kind: Option<SpanKind>) -> Result<()> {
        let (ipd, bpd) = match page.viewport(RegionClass::Body) {
            Some(viewport) => (viewport.content_ipd(), viewport.content_bpd()),
            None => {
                return Err(LayoutError::MissingBody {
                    master: page.master.clone(),
                })
            }
        };
        let number = page.number;
        let master = page.master.clone();
        let body = page
            .body_mut()
            .ok_or(LayoutError::MissingBody { master })?;

        let body_columns = body.column_count;
        let gap = body.column_gap;
        let reserved = body.before_float.as_ref().map_or(0.0, BeforeFloat::bpd)
            + body.footnote.as_ref().map_or(0.0, Footnote::bpd);
        let wanted = kind.map(|k| match k {
            SpanKind::All => 1,
            SpanKind::None => body_columns,
        });

        let main = body.ensure_main_reference();
        let need_span = match (main.spans.last(), wanted) {
            (None, _) => true,
            (Some(span), Some(columns)) => span.column_count != columns,
            (Some(_), None) => false,
        };

        if need_span {
            let columns = wanted.unwrap_or(body_columns);
            if main.spans.last().is_some_and(Span::is_empty) {
                main.spans.pop();
            } else if let Some(last) = main.spans.last_mut() {
                if last.column_count > 1 {
                    self.policy.balance_span(last);
                }
            }
            let available = (bpd - main.used_bpd() - reserved).max(0.0);
            log::trace!(
                "page {number}: new span of {columns} column(s), {available}pt available"
            );
            main.spans.push(Span::new(ipd, columns, gap, available));
            self.cur_flow = None;
        }

        if self.cur_flow.is_none() {
            if let Some(span) = main.spans.last_mut() {
                self.cur_flow = Some(if span.has_unstarted_columns() {
                    span.add_flow()
                } else {
                    // Every column has been started; keep filling the last.
                    span.flows.len() - 1
                });
            }
        }
        Ok(())
    }

    /// Take the current page out of the assembly, opening a new one if
    /// none is open. Callers put it back when done.
    fn take_or_open_page(&mut self) -> Result<Page> {
        match self.current.take() {
            Some(page) => Ok(page),
            None => self.new_page(false),
        }
    }

    fn make_new_page(&mut self, blank: bool) -> Result<()> {
        self.finish_page()?;
        let page = self.new_page(blank)?;
        self.current = Some(page);
        Ok(())
    }

    /// Replace the open, still empty page by a blank page with the same
    /// number. Its master is selected again with the blank condition set.
    fn reopen_as_blank(&mut self) -> Result<()> {
        if let Some(page) = self.current.take() {
            log::debug!("Page {} stays empty; making it a blank page", page.number);
        }
        self.is_first_page = self.pages_finished == 0;
        let page = self.new_page(true)?;
        self.current = Some(page);
        Ok(())
    }

    fn new_page(&mut self, blank: bool) -> Result<Page> {
        let template = self
            .selector
            .select(self.page_number, self.is_first_page, blank)?;
        self.is_first_page = false;
        self.cur_flow = None;

        log::debug!(
            "Opening page {} ('{}') with master '{}'",
            self.page_number,
            self.label,
            template.name
        );
        Ok(build_page(
            &template,
            PageSlot {
                sequence: self.sequence,
                index: self.tree.page_count(self.sequence),
                number: self.page_number,
                label: self.label.clone(),
                blank,
            },
        ))
    }
}

fn flow_ref(page: &Page, idx: usize) -> Option<&Flow> {
    page.body()?.spans().last()?.flows.get(idx)
}

fn flow_mut(page: &mut Page, idx: usize) -> Option<&mut Flow> {
    page.body_mut()?
        .main
        .as_mut()?
        .spans
        .last_mut()?
        .flows
        .get_mut(idx)
}

impl AreaTarget for PageAssembly<'_> {
    fn add_child(&mut self, area: BlockArea) -> Result<()> {
        self.place(area)
    }

    fn finish_flow(&mut self) {
        if let (Some(page), Some(idx)) = (self.current.as_mut(), self.cur_flow) {
            if let Some(flow) = flow_mut(page, idx) {
                flow.full = true;
            }
        }
    }

    fn add_id(&mut self, id: &str) {
        let Some(page) = self.current.as_mut() else {
            log::warn!("Id '{id}' declared while no page is open");
            return;
        };
        page.ids.push(id.to_string());
        self.tree.ids_mut().record(id, page.page_ref());
    }

    fn add_unresolved(&mut self, id: &str) {
        let Some(page) = self.current.as_mut() else {
            log::warn!("Reference to '{id}' made while no page is open");
            return;
        };
        page.unresolved.insert(id.to_string());
        self.tree.ids_mut().register_unresolved(id, page.page_ref());
    }

    fn add_markers(&mut self, markers: &[Marker], starting: bool, boundary: bool) {
        if let Some(page) = self.current.as_mut() {
            page.markers.add(markers, starting, boundary);
        }
    }

    fn retrieve_marker(
        &self,
        class_name: &str,
        position: RetrievePosition,
        boundary: RetrieveBoundary,
    ) -> Option<Marker> {
        resolve::retrieve_marker(
            &*self.tree,
            self.current.as_ref(),
            class_name,
            position,
            boundary,
        )
    }

    fn resolve_id(&self, id: &str) -> Option<PageRef> {
        self.tree.ids().resolve(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaContent;
    use crate::layout::policy::{ParityBreaks, SimpleBreaks};
    use crate::master::{MasterSource, PageMasterTemplate, RegionSpec};
    use crate::model::{Edges, PageSize};
    use crate::numbering::NumberFormat;
    use std::sync::Arc;

    /// 100pt wide, 300pt of body.
    fn small_master(columns: u32) -> Arc<PageMasterTemplate> {
        Arc::new(
            PageMasterTemplate::new(
                "small",
                PageSize::Custom {
                    width: 120.0,
                    height: 320.0,
                },
            )
            .with_margin(Edges::uniform(10.0))
            .with_region(RegionClass::Body, RegionSpec::body().with_columns(columns, 10.0)),
        )
    }

    fn assembly(tree: &mut AreaTree, columns: u32, policy: Box<dyn PaginationPolicy>) -> PageAssembly<'_> {
        PageAssembly::new(
            tree,
            PageMasterSelector::new(MasterSource::Single(small_master(columns)), "xsl-region-body"),
            Box::new(NumberFormat::default()),
            policy,
            HashMap::new(),
            1,
        )
    }

    #[test]
    fn cursors_are_created_on_demand() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 1, Box::new(SimpleBreaks));
        assert_eq!(asm.state(), AssemblyState::NoPage);

        asm.place(BlockArea::text(50.0, "a")).unwrap();
        assert_eq!(asm.state(), AssemblyState::FlowReady);

        let page = asm.current_page().unwrap();
        let body = page.body().unwrap();
        assert_eq!(body.spans().len(), 1);
        assert_eq!(body.spans()[0].flows.len(), 1);
        assert_eq!(body.spans()[0].flows[0].ipd, 100.0);
        assert_eq!(body.spans()[0].flows[0].remaining(), 250.0);
    }

    #[test]
    fn context_reports_remaining_space() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 2, Box::new(SimpleBreaks));
        let ctx = asm.context().unwrap();
        assert!(ctx.starts_flow);
        assert_eq!(ctx.available_bpd(), 300.0);
        assert_eq!(ctx.ref_ipd, 45.0);

        asm.place(BlockArea::text(120.0, "a")).unwrap();
        let ctx = asm.context().unwrap();
        assert!(!ctx.starts_flow);
        assert_eq!(ctx.available_bpd(), 180.0);
    }

    #[test]
    fn page_break_starts_a_new_page_only_after_content() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 1, Box::new(SimpleBreaks));
        asm.context().unwrap();
        // Leading break on an empty page is absorbed.
        asm.place(BlockArea::text(10.0, "a").with_break(ForcedBreak::Page))
            .unwrap();
        assert_eq!(asm.pages_finished(), 0);

        asm.place(BlockArea::text(10.0, "b").with_break(ForcedBreak::Page))
            .unwrap();
        assert_eq!(asm.pages_finished(), 1);
        assert_eq!(asm.current_page().unwrap().number, 2);
    }

    #[test]
    fn column_break_moves_to_next_column_then_page() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 2, Box::new(SimpleBreaks));
        asm.place(BlockArea::text(10.0, "a")).unwrap();
        asm.place(BlockArea::text(10.0, "b").with_break(ForcedBreak::Column))
            .unwrap();
        {
            let span = &asm.current_page().unwrap().body().unwrap().spans()[0];
            assert_eq!(span.flows.len(), 2);
            assert_eq!(span.flows[1].areas[0].content.text(), "b");
        }

        asm.place(BlockArea::text(10.0, "c").with_break(ForcedBreak::Column))
            .unwrap();
        assert_eq!(asm.pages_finished(), 1);
        assert_eq!(asm.current_page().unwrap().number, 2);
    }

    #[test]
    fn full_last_column_finishes_the_page() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 2, Box::new(SimpleBreaks));
        asm.place(BlockArea::text(300.0, "a")).unwrap();
        asm.finish_flow();
        asm.complete_if_full().unwrap();
        assert_eq!(asm.state(), AssemblyState::SpanAbsent);
        assert_eq!(asm.pages_finished(), 0);

        asm.place(BlockArea::text(300.0, "b")).unwrap();
        asm.finish_flow();
        asm.complete_if_full().unwrap();
        assert_eq!(asm.state(), AssemblyState::NoPage);
        assert_eq!(asm.pages_finished(), 1);
        assert_eq!(asm.page_label(), "2");
    }

    #[test]
    fn spanning_content_gets_its_own_span() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 2, Box::new(SimpleBreaks));
        asm.context().unwrap();
        asm.place(BlockArea::text(40.0, "title").with_span(SpanKind::All))
            .unwrap();
        asm.place(BlockArea::text(20.0, "body")).unwrap();

        let body = asm.current_page().unwrap().body().unwrap();
        // The empty span opened for the context was replaced.
        assert_eq!(body.spans().len(), 2);
        assert_eq!(body.spans()[0].column_count, 1);
        assert_eq!(body.spans()[0].flows[0].ipd, 100.0);
        assert_eq!(body.spans()[1].column_count, 2);
        assert_eq!(body.spans()[1].max_bpd, 260.0);
    }

    #[test]
    fn floats_and_footnotes_are_created_once() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 1, Box::new(SimpleBreaks));
        asm.place(BlockArea::text(10.0, "fn1").with_class(AreaClass::Footnote))
            .unwrap();
        asm.place(BlockArea::text(10.0, "fn2").with_class(AreaClass::Footnote))
            .unwrap();
        asm.place(BlockArea::text(10.0, "fig").with_class(AreaClass::BeforeFloat))
            .unwrap();

        // No normal content yet: only the page exists.
        assert_eq!(asm.state(), AssemblyState::BodyAbsent);
        let body = asm.current_page().unwrap().body().unwrap();
        assert_eq!(body.footnote.as_ref().unwrap().areas.len(), 2);
        assert_eq!(body.before_float.as_ref().unwrap().areas.len(), 1);
        assert!(body.main.is_none());
    }

    #[test]
    fn parity_policy_inserts_blank_pages() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 1, Box::new(ParityBreaks));
        asm.place(BlockArea::text(10.0, "one")).unwrap();
        asm.place(BlockArea::text(10.0, "three").with_break(ForcedBreak::OddPage))
            .unwrap();
        assert_eq!(asm.current_page().unwrap().number, 3);
        asm.flush().unwrap();
        drop(asm);

        let pages = tree.into_pages();
        let blanks: Vec<bool> = pages.iter().map(|p| p.blank).collect();
        assert_eq!(blanks, vec![false, true, false]);
    }

    #[test]
    fn empty_page_of_wrong_parity_is_turned_blank() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 1, Box::new(ParityBreaks));
        asm.context().unwrap();
        asm.place(BlockArea::text(10.0, "two").with_break(ForcedBreak::EvenPage))
            .unwrap();
        assert_eq!(asm.current_page().unwrap().number, 2);
        asm.flush().unwrap();
        drop(asm);

        let pages = tree.into_pages();
        let summary: Vec<(u32, bool, bool)> =
            pages.iter().map(|p| (p.number, p.blank, p.is_empty())).collect();
        assert_eq!(summary, vec![(1, true, true), (2, false, false)]);
    }

    #[test]
    fn span_change_that_does_not_fit_starts_a_new_page() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 2, Box::new(SimpleBreaks));
        asm.place(BlockArea::text(280.0, "columns")).unwrap();
        let number = BlockArea::new(50.0, AreaContent::PageNumber(String::new()));
        asm.place(number.with_span(SpanKind::All)).unwrap();
        assert_eq!(asm.pages_finished(), 1);

        let page = asm.current_page().unwrap();
        assert_eq!(page.number, 2);
        let spans = page.body().unwrap().spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].column_count, 1);
        // Numbered with the page it finally landed on.
        assert_eq!(spans[0].flows[0].areas[0].content.text(), "2");
    }

    #[test]
    fn oversized_area_at_top_of_page_stays() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 1, Box::new(SimpleBreaks));
        asm.place(BlockArea::text(400.0, "huge")).unwrap();
        assert_eq!(asm.pages_finished(), 0);
        assert_eq!(asm.current_page().unwrap().number, 1);
    }

    #[test]
    fn flush_drops_an_untouched_page() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 1, Box::new(SimpleBreaks));
        asm.context().unwrap();
        asm.flush().unwrap();
        assert_eq!(asm.pages_finished(), 0);
        assert_eq!(asm.state(), AssemblyState::NoPage);
    }

    #[test]
    fn ids_are_recorded_against_the_current_page() {
        let mut tree = AreaTree::new();
        let mut asm = assembly(&mut tree, 1, Box::new(SimpleBreaks));
        asm.place(BlockArea::text(10.0, "a")).unwrap();
        asm.add_id("intro");
        asm.add_unresolved("appendix");
        assert_eq!(asm.resolve_id("intro").unwrap().number, 1);
        assert!(asm.resolve_id("appendix").is_none());
        assert!(asm.current_page().unwrap().unresolved.contains("appendix"));
    }
}
