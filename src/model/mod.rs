//! # Document Model
//!
//! The input representation for the pagination engine when it is driven
//! from data instead of code. A document lists page masters and one or more
//! page sequences; each sequence names its masters, its content flow, its
//! static content, and the blocks that flow into the body.
//!
//! Everything here is resolved geometry: extents are plain points, produced
//! by whatever measured the content upstream.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::layout::block_flow::{Block, BlockFlow};
use crate::layout::policy::{PaginationPolicy, ParityBreaks, SimpleBreaks};
use crate::layout::sequence::PageSequence;
use crate::master::{
    BlankOrNot, ConditionalMaster, MasterSource, OddOrEven, PageMasterTemplate, PagePosition,
    RepeatableAlternatives,
};
use crate::numbering::NumberFormat;

/// A complete document ready for pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Page masters available to the sequences, looked up by name.
    pub masters: Vec<PageMasterTemplate>,

    /// Page sequences, laid out in order. Page numbering continues from one
    /// sequence to the next unless a sequence sets its own start.
    pub sequences: Vec<SequenceSpec>,
}

impl Document {
    pub(crate) fn master_map(&self) -> HashMap<String, Arc<PageMasterTemplate>> {
        self.masters
            .iter()
            .map(|m| (m.name.clone(), Arc::new(m.clone())))
            .collect()
    }
}

/// Data description of one page sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSpec {
    /// Name of the single master every page uses. Ignored when
    /// `master_sequence` is set.
    #[serde(default)]
    pub master_reference: Option<String>,

    /// Conditional masters, first match wins.
    #[serde(default)]
    pub master_sequence: Option<Vec<AlternativeSpec>>,

    /// Name of the region the main flow maps to.
    #[serde(default = "default_flow_name")]
    pub flow_name: String,

    /// First page number. Defaults to continuing the previous sequence.
    #[serde(default)]
    pub initial_page_number: Option<u32>,

    /// Page number format token ("1", "001", "i", "I", "a", "A").
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default)]
    pub grouping_separator: Option<char>,

    #[serde(default)]
    pub grouping_size: usize,

    /// How forced odd/even page breaks are honored.
    #[serde(default)]
    pub break_policy: BreakPolicyKind,

    /// Static content keyed by region name.
    #[serde(default)]
    pub static_content: BTreeMap<String, Vec<Block>>,

    /// Blocks of the main flow.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

fn default_flow_name() -> String {
    "xsl-region-body".to_string()
}

fn default_format() -> String {
    "1".to_string()
}

/// One conditional master reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeSpec {
    pub master_reference: String,
    #[serde(default)]
    pub odd_or_even: OddOrEven,
    #[serde(default)]
    pub page_position: PagePosition,
    #[serde(default)]
    pub blank_or_not: BlankOrNot,
}

/// Built-in forced-break policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BreakPolicyKind {
    /// Any page-kind break just starts a new page.
    #[default]
    Simple,
    /// Odd/even page breaks insert blank pages to reach the right parity.
    Parity,
}

impl BreakPolicyKind {
    pub fn policy(&self) -> Box<dyn PaginationPolicy> {
        match self {
            BreakPolicyKind::Simple => Box::new(SimpleBreaks),
            BreakPolicyKind::Parity => Box::new(ParityBreaks),
        }
    }
}

impl SequenceSpec {
    /// Turn the description into a runnable page sequence.
    pub fn build(&self, masters: &HashMap<String, Arc<PageMasterTemplate>>) -> Result<PageSequence> {
        let lookup = |name: &str| {
            masters
                .get(name)
                .cloned()
                .ok_or_else(|| LayoutError::UnknownMaster(name.to_string()))
        };

        let source = match (&self.master_sequence, &self.master_reference) {
            (Some(alternatives), _) => {
                let alternatives = alternatives
                    .iter()
                    .map(|alt| {
                        Ok(ConditionalMaster {
                            master: lookup(&alt.master_reference)?,
                            odd_or_even: alt.odd_or_even,
                            page_position: alt.page_position,
                            blank_or_not: alt.blank_or_not,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                MasterSource::Sequence(Box::new(RepeatableAlternatives::new(alternatives)))
            }
            (None, Some(name)) => MasterSource::Single(lookup(name)?),
            (None, None) => return Err(LayoutError::UnknownMaster(String::new())),
        };

        let mut format = NumberFormat::parse(&self.format);
        if let Some(separator) = self.grouping_separator {
            format = format.with_grouping(separator, self.grouping_size);
        }

        let mut sequence = PageSequence::new(self.flow_name.clone(), source)
            .with_numbering(format)
            .with_policy(self.break_policy.policy())
            .with_step(Box::new(BlockFlow::new(self.blocks.clone())));
        if let Some(start) = self.initial_page_number {
            sequence = sequence.starting_at(start);
        }
        for (region, blocks) in &self.static_content {
            sequence = sequence.with_static_content(region.clone(), blocks.clone());
        }
        Ok(sequence)
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins, borders and
/// padding. In a reference area, top/bottom are before/after and
/// left/right are start/end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// An RGBA color, components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "default_alpha")]
    pub a: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_defaults() {
        let spec: SequenceSpec =
            serde_json::from_str(r#"{ "masterReference": "A4" }"#).unwrap();
        assert_eq!(spec.flow_name, "xsl-region-body");
        assert_eq!(spec.format, "1");
        assert_eq!(spec.break_policy, BreakPolicyKind::Simple);
        assert!(spec.blocks.is_empty());
    }

    #[test]
    fn unknown_master_is_reported() {
        let spec: SequenceSpec =
            serde_json::from_str(r#"{ "masterReference": "missing" }"#).unwrap();
        let err = spec.build(&HashMap::new()).err().unwrap();
        assert!(matches!(err, LayoutError::UnknownMaster(name) if name == "missing"));
    }

    #[test]
    fn custom_page_size() {
        let size: PageSize =
            serde_json::from_str(r#"{ "Custom": { "width": 300, "height": 400 } }"#).unwrap();
        assert_eq!(size.dimensions(), (300.0, 400.0));
    }
}
