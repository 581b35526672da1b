//! Builds an empty page from a page master.
//!
//! The page reference area is the media rectangle minus the page margins.
//! Its transform, derived from the master's writing mode and reference
//! orientation, maps each region's relative rectangle onto the page; each
//! region then gets its own transform for its contents.

use std::collections::BTreeMap;

use crate::geometry::{Ctm, Rect, RelDims};
use crate::master::{Overflow, PageMasterTemplate, RegionClass, RegionSpec};

use super::markers::PageMarkers;
use super::{
    BodyRegion, Page, RegionContent, RegionReference, RegionTraits, RegionViewport,
};

/// Where a new page sits in its sequence and what it is called.
#[derive(Debug, Clone)]
pub struct PageSlot {
    pub sequence: usize,
    pub index: usize,
    pub number: u32,
    pub label: String,
    pub blank: bool,
}

/// Create a page with one viewport per region of `template`.
///
/// A template without a body region still yields a page; the problem is
/// logged and nothing can be placed into a body afterwards.
pub fn build_page(template: &PageMasterTemplate, slot: PageSlot) -> Page {
    let (page_w, page_h) = template.dimensions();
    let view_area = Rect::new(0.0, 0.0, page_w, page_h);
    let page_ref_rect = view_area.inset(&template.margin);

    let (page_ctm, reldims) = Ctm::for_reference_area(
        template.reference_orientation,
        template.writing_mode,
        &page_ref_rect,
    );

    let mut regions = BTreeMap::new();
    for (&class, spec) in &template.regions {
        let viewport = make_region_viewport(template, class, spec, &page_ctm, reldims);
        regions.insert(class, viewport);
    }

    if !regions.contains_key(&RegionClass::Body) {
        log::error!("page-master '{}' has no region-body", template.name);
    }

    Page {
        sequence: slot.sequence,
        index: slot.index,
        number: slot.number,
        label: slot.label,
        blank: slot.blank,
        master: template.name.clone(),
        view_area,
        regions,
        markers: PageMarkers::default(),
        ids: Vec::new(),
        unresolved: Default::default(),
    }
}

/// The region's rectangle in the page reference area's (inline, block)
/// coordinates.
fn relative_region_rect(class: RegionClass, spec: &RegionSpec, dims: RelDims) -> Rect {
    let area = Rect::new(0.0, 0.0, dims.ipd, dims.bpd);
    let extent = spec.extent.max(0.0);
    match class {
        RegionClass::Body => area.inset(&spec.margin),
        RegionClass::Before => Rect::new(0.0, 0.0, dims.ipd, extent.min(dims.bpd)),
        RegionClass::After => {
            let extent = extent.min(dims.bpd);
            Rect::new(0.0, dims.bpd - extent, dims.ipd, extent)
        }
        RegionClass::Start => Rect::new(0.0, 0.0, extent.min(dims.ipd), dims.bpd),
        RegionClass::End => {
            let extent = extent.min(dims.ipd);
            Rect::new(dims.ipd - extent, 0.0, extent, dims.bpd)
        }
    }
}

fn make_region_viewport(
    template: &PageMasterTemplate,
    class: RegionClass,
    spec: &RegionSpec,
    page_ctm: &Ctm,
    reldims: RelDims,
) -> RegionViewport {
    let relative = relative_region_rect(class, spec, reldims);
    let view_area = page_ctm.transform_rect(&relative);

    let orientation = spec
        .reference_orientation
        .unwrap_or(template.reference_orientation);
    let writing_mode = spec.writing_mode.unwrap_or(template.writing_mode);
    let (ctm, dims) = Ctm::for_reference_area(orientation, writing_mode, &view_area);

    let content = match class {
        RegionClass::Body => RegionContent::Body(make_body_region(template, spec)),
        _ => RegionContent::Static(Vec::new()),
    };

    RegionViewport {
        view_area,
        traits: RegionTraits {
            border: spec.border,
            padding: spec.padding,
            background: spec.background,
        },
        clip: matches!(spec.overflow, Overflow::Hidden | Overflow::Scroll),
        region: RegionReference {
            class,
            name: spec.name.clone(),
            ctm,
            ipd: dims.ipd,
            bpd: dims.bpd,
            content,
        },
    }
}

fn make_body_region(template: &PageMasterTemplate, spec: &RegionSpec) -> BodyRegion {
    let mut column_count = spec.column_count.max(1);
    if column_count > 1 && spec.overflow == Overflow::Scroll {
        log::warn!(
            "Setting 'column-count' to 1 because 'overflow' is set to 'scroll' (page-master '{}')",
            template.name
        );
        column_count = 1;
    }
    BodyRegion::new(column_count, spec.column_gap.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::WritingMode;
    use crate::model::{Edges, PageSize};

    fn slot() -> PageSlot {
        PageSlot {
            sequence: 0,
            index: 0,
            number: 1,
            label: "1".into(),
            blank: false,
        }
    }

    fn letter() -> PageMasterTemplate {
        PageMasterTemplate::new("letter", PageSize::Letter)
            .with_margin(Edges::uniform(36.0))
            .with_region(
                RegionClass::Body,
                RegionSpec::body().with_margin(Edges::symmetric(50.0, 0.0)),
            )
            .with_region(RegionClass::Before, RegionSpec::side(RegionClass::Before, 40.0))
            .with_region(RegionClass::After, RegionSpec::side(RegionClass::After, 30.0))
            .with_region(RegionClass::Start, RegionSpec::side(RegionClass::Start, 20.0))
            .with_region(RegionClass::End, RegionSpec::side(RegionClass::End, 25.0))
    }

    #[test]
    fn regions_are_positioned_inside_the_margins() {
        let page = build_page(&letter(), slot());
        assert_eq!(page.regions.len(), 5);

        let body = page.viewport(RegionClass::Body).unwrap();
        assert_eq!(body.view_area, Rect::new(36.0, 86.0, 540.0, 620.0));

        let before = page.viewport(RegionClass::Before).unwrap();
        assert_eq!(before.view_area, Rect::new(36.0, 36.0, 540.0, 40.0));

        let after = page.viewport(RegionClass::After).unwrap();
        assert_eq!(after.view_area, Rect::new(36.0, 726.0, 540.0, 30.0));

        let start = page.viewport(RegionClass::Start).unwrap();
        assert_eq!(start.view_area.width, 20.0);

        let end = page.viewport(RegionClass::End).unwrap();
        assert_eq!(end.view_area.x, 551.0);
        assert_eq!(end.region.ipd, 25.0);
    }

    #[test]
    fn body_carries_columns() {
        let template = letter().with_region(
            RegionClass::Body,
            RegionSpec::body().with_columns(3, 12.0),
        );
        let page = build_page(&template, slot());
        let body = page.body().unwrap();
        assert_eq!(body.column_count, 3);
        assert_eq!(body.column_gap, 12.0);
        assert!(body.main.is_none());
    }

    #[test]
    fn scrolling_body_is_forced_to_one_column() {
        let template = letter().with_region(
            RegionClass::Body,
            RegionSpec::body()
                .with_columns(2, 10.0)
                .with_overflow(Overflow::Scroll),
        );
        let page = build_page(&template, slot());
        assert_eq!(page.body().unwrap().column_count, 1);
        assert!(page.viewport(RegionClass::Body).unwrap().clip);
    }

    #[test]
    fn missing_body_still_builds_a_page() {
        let template = letter().without_region(RegionClass::Body);
        let page = build_page(&template, slot());
        assert!(page.body().is_none());
        assert!(page.is_empty());
        assert_eq!(page.regions.len(), 4);
    }

    #[test]
    fn vertical_writing_swaps_region_dimensions() {
        let mut template = PageMasterTemplate::new("tall", PageSize::Custom {
            width: 400.0,
            height: 600.0,
        });
        template.writing_mode = WritingMode::TbRl;
        let page = build_page(&template, slot());
        let body = page.viewport(RegionClass::Body).unwrap();
        assert_eq!(body.view_area, Rect::new(0.0, 0.0, 400.0, 600.0));
        assert_eq!(body.region.ipd, 600.0);
        assert_eq!(body.region.bpd, 400.0);
    }
}
