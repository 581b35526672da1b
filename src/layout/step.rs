//! The contract between the paginator and the content-layout steps that feed
//! it.
//!
//! A step is asked for its next feasible break given the space left in the
//! current column, and the break is immediately materialized through the
//! same step into an [`AreaTarget`]. The target is the page assembly for
//! the main flow, or a side region while static content is laid out.

use crate::area::markers::{Marker, RetrieveBoundary, RetrievePosition};
use crate::area::BlockArea;
use crate::error::Result;
use crate::resolve::PageRef;

use super::context::LayoutContext;

/// A step's own break point. Only the step that produced it knows what the
/// index means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafPosition(pub usize);

/// A break handed out by the sequence: the producing step plus its leaf
/// position. Not `Clone`, so it is consumed exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct BreakPosition {
    step: usize,
    leaf: LeafPosition,
}

impl BreakPosition {
    pub(crate) fn new(step: usize, leaf: LeafPosition) -> Self {
        Self { step, leaf }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub(crate) fn into_leaf(self) -> LeafPosition {
        self.leaf
    }
}

/// A content-layout step: something that can be cut into page-sized pieces.
pub trait LayoutStep {
    /// No more content will come from this step.
    fn is_finished(&self) -> bool;

    /// Choose the next break given the available space. `None` means the
    /// step has nothing more to contribute.
    fn next_break(&mut self, context: &LayoutContext) -> Option<LeafPosition>;

    /// Place the content up to `position` into `target`.
    fn add_areas(&mut self, position: LeafPosition, target: &mut dyn AreaTarget) -> Result<()>;
}

/// Where a step's areas go while they are materialized.
pub trait AreaTarget {
    /// Place an area. Normal-flow areas honor their forced break first.
    fn add_child(&mut self, area: BlockArea) -> Result<()>;

    /// The step stopped because the current column is full.
    fn finish_flow(&mut self);

    /// Content on the current page declares `id`.
    fn add_id(&mut self, id: &str);

    /// Content on the current page refers to `id`, whose page is unknown.
    fn add_unresolved(&mut self, id: &str);

    /// Markers of an area on the current page. See
    /// [`PageMarkers::add`](crate::area::markers::PageMarkers::add).
    fn add_markers(&mut self, markers: &[Marker], starting: bool, boundary: bool);

    fn retrieve_marker(
        &self,
        class_name: &str,
        position: RetrievePosition,
        boundary: RetrieveBoundary,
    ) -> Option<Marker>;

    fn resolve_id(&self, id: &str) -> Option<PageRef>;
}
