//! # Page Sequence Layout
//!
//! Drives one page sequence: repeatedly asks the active content step for
//! its next break, materializes it into the page assembly, and closes pages
//! as they fill.
//!
//! ```text
//! loop {
//!     skip finished steps            (none left: done, no page opened)
//!     context = assembly.context()   (opens page / span / flow on demand)
//!     step.next_break(context)       (None: move to the next step)
//!     step.add_areas(break, assembly)
//!     assembly.complete_if_full()
//! }
//! assembly.flush()
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::area::tree::AreaTree;
use crate::error::Result;
use crate::master::{MasterSource, PageMasterSelector};
use crate::numbering::{NumberFormat, PageNumberFormatter};

use super::assembly::PageAssembly;
use super::policy::{PaginationPolicy, SimpleBreaks};
use super::static_content::StaticContent;
use super::step::{BreakPosition, LayoutStep};

/// Everything needed to lay out one page sequence.
pub struct PageSequence {
    flow_name: String,
    masters: MasterSource,
    initial_page_number: Option<u32>,
    numbering: Box<dyn PageNumberFormatter>,
    policy: Box<dyn PaginationPolicy>,
    static_content: HashMap<String, Box<dyn StaticContent>>,
    steps: Vec<Box<dyn LayoutStep>>,
}

impl PageSequence {
    /// A sequence whose main flow maps to the region named `flow_name`.
    pub fn new(flow_name: impl Into<String>, masters: MasterSource) -> Self {
        Self {
            flow_name: flow_name.into(),
            masters,
            initial_page_number: None,
            numbering: Box::new(NumberFormat::default()),
            policy: Box::new(SimpleBreaks),
            static_content: HashMap::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_numbering(mut self, numbering: impl PageNumberFormatter + 'static) -> Self {
        self.numbering = Box::new(numbering);
        self
    }

    pub fn with_policy(mut self, policy: Box<dyn PaginationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Append a content step to the main flow.
    pub fn with_step(mut self, step: Box<dyn LayoutStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Start numbering at `number` instead of continuing the previous
    /// sequence.
    pub fn starting_at(mut self, number: u32) -> Self {
        self.initial_page_number = Some(number);
        self
    }

    /// Bind static content to the region named `region`.
    pub fn with_static_content(
        mut self,
        region: impl Into<String>,
        content: impl StaticContent + 'static,
    ) -> Self {
        self.static_content.insert(region.into(), Box::new(content));
        self
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }
}

/// What laying out a sequence produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSummary {
    pub sequence: usize,
    pub pages: usize,
    pub first_page_number: u32,
    /// `None` when the sequence produced no page.
    pub last_page_number: Option<u32>,
    /// Where the next sequence continues numbering.
    pub next_page_number: u32,
}

/// A page sequence being laid out into an area tree.
pub struct PageSequenceLayout<'t> {
    assembly: PageAssembly<'t>,
    steps: Vec<Box<dyn LayoutStep>>,
    current_step: usize,
    first_page_number: u32,
    finished: bool,
}

impl<'t> PageSequenceLayout<'t> {
    /// Start a new sequence in `tree`. `next_page_number` is where the
    /// previous sequence left off.
    pub fn new(tree: &'t mut AreaTree, sequence: PageSequence, next_page_number: u32) -> Self {
        let PageSequence {
            flow_name,
            masters,
            initial_page_number,
            numbering,
            policy,
            static_content,
            steps,
        } = sequence;

        let first_page_number = initial_page_number.unwrap_or(next_page_number);
        let selector = PageMasterSelector::new(masters, flow_name);
        let assembly = PageAssembly::new(
            tree,
            selector,
            numbering,
            policy,
            static_content,
            first_page_number,
        );
        log::debug!(
            "Starting page sequence {} at page {}",
            assembly.sequence(),
            first_page_number
        );

        Self {
            assembly,
            steps,
            current_step: 0,
            first_page_number,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn assembly(&self) -> &PageAssembly<'t> {
        &self.assembly
    }

    /// One round of the layout loop. Returns `false` once every step is
    /// finished.
    pub fn advance(&mut self) -> Result<bool> {
        while self
            .steps
            .get(self.current_step)
            .is_some_and(|step| step.is_finished())
        {
            self.current_step += 1;
        }
        if self.current_step >= self.steps.len() {
            self.finished = true;
            return Ok(false);
        }

        let context = self.assembly.context()?;
        let index = self.current_step;
        match self.steps[index].next_break(&context) {
            Some(leaf) => {
                self.add_areas(BreakPosition::new(index, leaf))?;
                self.assembly.complete_if_full()?;
            }
            None => {
                log::trace!("Step {index} has nothing more to place");
                self.current_step += 1;
            }
        }
        Ok(true)
    }

    fn add_areas(&mut self, position: BreakPosition) -> Result<()> {
        let index = position.step();
        self.steps[index].add_areas(position.into_leaf(), &mut self.assembly)
    }

    /// Run the loop to completion and finish the last page.
    pub fn run(mut self) -> Result<SequenceSummary> {
        while self.advance()? {}
        self.assembly.flush()?;

        let pages = self.assembly.pages_finished();
        let next_page_number = self.assembly.page_number();
        let summary = SequenceSummary {
            sequence: self.assembly.sequence(),
            pages,
            first_page_number: self.first_page_number,
            last_page_number: (pages > 0).then(|| next_page_number - 1),
            next_page_number,
        };
        log::info!(
            "Page sequence {} laid out into {} page(s)",
            summary.sequence,
            summary.pages
        );
        Ok(summary)
    }
}

/// Lay out `sequence` into `tree`, continuing numbering at
/// `next_page_number` unless the sequence sets its own start.
pub fn layout_sequence(
    tree: &mut AreaTree,
    sequence: PageSequence,
    next_page_number: u32,
) -> Result<SequenceSummary> {
    PageSequenceLayout::new(tree, sequence, next_page_number).run()
}
