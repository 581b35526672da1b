//! Static content: the before/after/start/end regions of a page, laid out
//! once per page just before the page is published.
//!
//! Static content sees the finished body of its own page, so page numbers
//! and retrieved markers reflect what actually landed there.

use std::collections::HashMap;

use crate::area::markers::{Marker, RetrieveBoundary, RetrievePosition};
use crate::area::tree::AreaTree;
use crate::area::{BlockArea, Page, RegionContent};
use crate::error::Result;
use crate::master::RegionClass;
use crate::resolve::{self, PageRef};

use super::context::LayoutContext;
use super::step::{AreaTarget, LayoutStep};

/// Content repeated on every page of a sequence. Produces a fresh step for
/// each page, since a step is consumed as it is laid out.
pub trait StaticContent {
    fn layout_step(&self) -> Box<dyn LayoutStep>;
}

/// Lay out the static content bound to the region of `class`, if the page
/// has that region and content is bound to its name.
pub fn layout_static_region(
    page: &mut Page,
    class: RegionClass,
    contents: &HashMap<String, Box<dyn StaticContent>>,
    tree: &mut AreaTree,
) -> Result<()> {
    let Some(viewport) = page.viewport(class) else {
        return Ok(());
    };
    let Some(content) = contents.get(&viewport.region.name) else {
        return Ok(());
    };
    let context = LayoutContext::for_static(page.view_area.height, viewport.content_ipd());

    let mut step = content.layout_step();
    let mut target = StaticRegionTarget { page, class, tree };
    while !step.is_finished() {
        let Some(position) = step.next_break(&context) else {
            log::error!(
                "Static content for {:?} stopped before finishing on page {}",
                class,
                target.page.number
            );
            break;
        };
        step.add_areas(position, &mut target)?;
    }
    Ok(())
}

/// Receives areas for one side region of a page being finished.
struct StaticRegionTarget<'a> {
    page: &'a mut Page,
    class: RegionClass,
    tree: &'a mut AreaTree,
}

impl AreaTarget for StaticRegionTarget<'_> {
    fn add_child(&mut self, mut area: BlockArea) -> Result<()> {
        area.stamp_page_number(&self.page.label);
        let Some(viewport) = self.page.regions.get_mut(&self.class) else {
            return Ok(());
        };
        area.ipd = viewport.content_ipd();
        match &mut viewport.region.content {
            RegionContent::Static(areas) => areas.push(area),
            RegionContent::Body(_) => {
                log::warn!("Static content cannot be placed into the body region")
            }
        }
        Ok(())
    }

    fn finish_flow(&mut self) {}

    fn add_id(&mut self, id: &str) {
        self.page.ids.push(id.to_string());
        self.tree.ids_mut().record(id, self.page.page_ref());
    }

    fn add_unresolved(&mut self, id: &str) {
        self.page.unresolved.insert(id.to_string());
        self.tree.ids_mut().register_unresolved(id, self.page.page_ref());
    }

    // Markers in static content are not collected.
    fn add_markers(&mut self, _markers: &[Marker], _starting: bool, _boundary: bool) {}

    fn retrieve_marker(
        &self,
        class_name: &str,
        position: RetrievePosition,
        boundary: RetrieveBoundary,
    ) -> Option<Marker> {
        resolve::retrieve_marker(&*self.tree, Some(&*self.page), class_name, position, boundary)
    }

    fn resolve_id(&self, id: &str) -> Option<PageRef> {
        self.tree.ids().resolve(id).cloned()
    }
}
