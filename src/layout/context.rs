use crate::geometry::MinOptMax;

/// Per-request constraints handed to a content-layout step. Rebuilt for
/// every break request; never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    /// Block extent still available in the target container.
    pub stack_limit: MinOptMax,
    /// Inline extent of the target container.
    pub ref_ipd: f64,
    /// The target container holds no content yet.
    pub starts_flow: bool,
    /// Laying out static content into a side region.
    pub is_static: bool,
}

impl LayoutContext {
    pub fn new(stack_limit: MinOptMax, ref_ipd: f64) -> Self {
        Self {
            stack_limit,
            ref_ipd,
            starts_flow: false,
            is_static: false,
        }
    }

    /// Context for a column of the body region.
    pub fn for_flow(remaining_bpd: f64, ipd: f64, starts_flow: bool) -> Self {
        Self {
            starts_flow,
            ..Self::new(MinOptMax::fixed(remaining_bpd), ipd)
        }
    }

    /// Context for a side region's static content.
    pub fn for_static(page_height: f64, region_ipd: f64) -> Self {
        Self {
            starts_flow: true,
            is_static: true,
            ..Self::new(MinOptMax::fixed(page_height), region_ipd)
        }
    }

    pub fn available_bpd(&self) -> f64 {
        self.stack_limit.opt
    }
}
