//! # Page Masters
//!
//! A page master is an immutable description of one page layout variant:
//! page size, margins, and the regions drawn on the page. The selector picks
//! the master for each new page, either the single master of a sequence or
//! whatever a [`MasterSequencing`] policy hands back for the page's parity,
//! position and blankness.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::geometry::WritingMode;
use crate::model::{Color, Edges, PageSize};

/// Named slots of a page master. Ordered so that iteration visits the
/// regions in the order static content is laid out after the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionClass {
    Body,
    Before,
    After,
    Start,
    End,
}

impl RegionClass {
    /// The side regions that receive static content when a page finishes.
    pub const SIDES: [RegionClass; 4] = [
        RegionClass::Before,
        RegionClass::After,
        RegionClass::Start,
        RegionClass::End,
    ];

    /// The conventional region name for this class.
    pub fn default_name(&self) -> &'static str {
        match self {
            RegionClass::Body => "xsl-region-body",
            RegionClass::Before => "xsl-region-before",
            RegionClass::After => "xsl-region-after",
            RegionClass::Start => "xsl-region-start",
            RegionClass::End => "xsl-region-end",
        }
    }
}

/// What a region does with content that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Overflow {
    #[default]
    Auto,
    Visible,
    Hidden,
    Scroll,
}

/// Resolved geometry and traits of one region in a page master.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSpec {
    /// Region name; static content and the main flow bind to it.
    pub name: String,
    /// Body only: inset from the page reference area.
    #[serde(default)]
    pub margin: Edges,
    /// Side regions only: thickness of the band along its page edge.
    #[serde(default)]
    pub extent: f64,
    #[serde(default = "default_one")]
    pub column_count: u32,
    #[serde(default)]
    pub column_gap: f64,
    #[serde(default)]
    pub overflow: Overflow,
    #[serde(default)]
    pub border: Edges,
    #[serde(default)]
    pub padding: Edges,
    #[serde(default)]
    pub background: Option<Color>,
    /// Overrides the page's writing mode for this region.
    #[serde(default)]
    pub writing_mode: Option<WritingMode>,
    /// Overrides the page's reference orientation for this region.
    #[serde(default)]
    pub reference_orientation: Option<i32>,
}

fn default_one() -> u32 {
    1
}

impl RegionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            margin: Edges::default(),
            extent: 0.0,
            column_count: 1,
            column_gap: 0.0,
            overflow: Overflow::Auto,
            border: Edges::default(),
            padding: Edges::default(),
            background: None,
            writing_mode: None,
            reference_orientation: None,
        }
    }

    /// A body region named `xsl-region-body`.
    pub fn body() -> Self {
        Self::new(RegionClass::Body.default_name())
    }

    /// A side region with its conventional name and the given extent.
    pub fn side(class: RegionClass, extent: f64) -> Self {
        Self {
            extent,
            ..Self::new(class.default_name())
        }
    }

    pub fn with_columns(mut self, count: u32, gap: f64) -> Self {
        self.column_count = count;
        self.column_gap = gap;
        self
    }

    pub fn with_margin(mut self, margin: Edges) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }
}

/// An immutable page layout variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMasterTemplate {
    pub name: String,
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub margin: Edges,
    #[serde(default)]
    pub writing_mode: WritingMode,
    #[serde(default)]
    pub reference_orientation: i32,
    /// Defaults to a lone body region.
    #[serde(default = "default_regions")]
    pub regions: BTreeMap<RegionClass, RegionSpec>,
}

fn default_regions() -> BTreeMap<RegionClass, RegionSpec> {
    BTreeMap::from([(RegionClass::Body, RegionSpec::body())])
}

impl PageMasterTemplate {
    /// A master with the given size and a default body region.
    pub fn new(name: impl Into<String>, size: PageSize) -> Self {
        Self {
            name: name.into(),
            size,
            margin: Edges::default(),
            writing_mode: WritingMode::LrTb,
            reference_orientation: 0,
            regions: default_regions(),
        }
    }

    pub fn with_margin(mut self, margin: Edges) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_region(mut self, class: RegionClass, spec: RegionSpec) -> Self {
        self.regions.insert(class, spec);
        self
    }

    pub fn without_region(mut self, class: RegionClass) -> Self {
        self.regions.remove(&class);
        self
    }

    pub fn region(&self, class: RegionClass) -> Option<&RegionSpec> {
        self.regions.get(&class)
    }

    pub fn body(&self) -> Option<&RegionSpec> {
        self.region(RegionClass::Body)
    }

    /// Page width and height in points.
    pub fn dimensions(&self) -> (f64, f64) {
        self.size.dimensions()
    }
}

/// Chooses the master for the next page of a sequence.
///
/// Implementations may be stateful (a repeatable master reference counts how
/// often it has been used, for instance).
pub trait MasterSequencing {
    fn next_template(
        &mut self,
        is_odd_page: bool,
        is_first_page: bool,
        want_blank: bool,
    ) -> Option<Arc<PageMasterTemplate>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OddOrEven {
    #[default]
    Any,
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PagePosition {
    #[default]
    Any,
    First,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlankOrNot {
    #[default]
    Any,
    Blank,
    NotBlank,
}

/// One alternative of a [`RepeatableAlternatives`] sequence.
#[derive(Debug, Clone)]
pub struct ConditionalMaster {
    pub master: Arc<PageMasterTemplate>,
    pub odd_or_even: OddOrEven,
    pub page_position: PagePosition,
    pub blank_or_not: BlankOrNot,
}

impl ConditionalMaster {
    pub fn new(master: Arc<PageMasterTemplate>) -> Self {
        Self {
            master,
            odd_or_even: OddOrEven::Any,
            page_position: PagePosition::Any,
            blank_or_not: BlankOrNot::Any,
        }
    }

    fn matches(&self, is_odd: bool, is_first: bool, is_blank: bool) -> bool {
        let parity = match self.odd_or_even {
            OddOrEven::Any => true,
            OddOrEven::Odd => is_odd,
            OddOrEven::Even => !is_odd,
        };
        let position = match self.page_position {
            PagePosition::Any => true,
            PagePosition::First => is_first,
            PagePosition::Rest => !is_first,
        };
        let blank = match self.blank_or_not {
            BlankOrNot::Any => true,
            BlankOrNot::Blank => is_blank,
            BlankOrNot::NotBlank => !is_blank,
        };
        parity && position && blank
    }
}

/// First matching alternative wins; the list repeats indefinitely.
#[derive(Debug, Clone, Default)]
pub struct RepeatableAlternatives {
    pub alternatives: Vec<ConditionalMaster>,
}

impl RepeatableAlternatives {
    pub fn new(alternatives: Vec<ConditionalMaster>) -> Self {
        Self { alternatives }
    }
}

impl MasterSequencing for RepeatableAlternatives {
    fn next_template(
        &mut self,
        is_odd_page: bool,
        is_first_page: bool,
        want_blank: bool,
    ) -> Option<Arc<PageMasterTemplate>> {
        self.alternatives
            .iter()
            .find(|alt| alt.matches(is_odd_page, is_first_page, want_blank))
            .map(|alt| Arc::clone(&alt.master))
    }
}

/// Where a sequence's page masters come from.
pub enum MasterSource {
    /// Every page uses the same master.
    Single(Arc<PageMasterTemplate>),
    /// A sequencing policy decides per page.
    Sequence(Box<dyn MasterSequencing>),
}

/// Picks and validates the master for each new page.
pub struct PageMasterSelector {
    source: MasterSource,
    flow_name: String,
}

impl PageMasterSelector {
    pub fn new(source: MasterSource, flow_name: impl Into<String>) -> Self {
        Self {
            source,
            flow_name: flow_name.into(),
        }
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    /// Select the master for page `page_number`.
    ///
    /// Fails when the chosen master's body region is named differently from
    /// the content flow. A master without any body region is accepted here;
    /// the page builder reports it.
    pub fn select(
        &mut self,
        page_number: u32,
        is_first_page: bool,
        want_blank: bool,
    ) -> Result<Arc<PageMasterTemplate>> {
        let template = match &mut self.source {
            MasterSource::Single(template) => Arc::clone(template),
            MasterSource::Sequence(policy) => {
                let is_odd = page_number % 2 == 1;
                policy
                    .next_template(is_odd, is_first_page, want_blank)
                    .ok_or(LayoutError::NoMatchingMaster { page_number })?
            }
        };

        if let Some(body) = template.body() {
            if body.name != self.flow_name {
                return Err(LayoutError::Configuration {
                    flow: self.flow_name.clone(),
                    region: body.name.clone(),
                    master: template.name.clone(),
                });
            }
        }

        log::trace!(
            "page {page_number}: master '{}' (first={is_first_page}, blank={want_blank})",
            template.name
        );
        Ok(template)
    }
}
