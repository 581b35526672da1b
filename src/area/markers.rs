//! Markers attached to pages.
//!
//! Each page keeps four tables so that a retrieval can ask for the first or
//! last marker of a class, counting or ignoring content carried over from
//! the previous page.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named snapshot of content that static regions can retrieve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub class_name: String,
    pub text: String,
    #[serde(default)]
    pub bpd: f64,
}

impl Marker {
    pub fn new(class_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            text: text.into(),
            bpd: 0.0,
        }
    }
}

/// Which marker of a page to pick when several share a class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetrievePosition {
    /// First marker whose area starts on the page.
    #[default]
    FirstStartingWithinPage,
    /// First marker on the page, including areas continued from before.
    FirstIncludingCarryover,
    /// Last marker whose area starts on the page.
    LastStartingWithinPage,
    /// Last marker whose area ends on the page.
    LastEndingWithinPage,
}

/// How far back a retrieval may look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetrieveBoundary {
    /// Only the current page.
    Page,
    /// Earlier pages of the current page sequence.
    #[default]
    PageSequence,
    /// Earlier pages of the whole document.
    Document,
}

#[derive(Debug, Clone, Default)]
pub struct PageMarkers {
    first_start: HashMap<String, Marker>,
    first_any: HashMap<String, Marker>,
    last_start: HashMap<String, Marker>,
    last_end: HashMap<String, Marker>,
}

impl PageMarkers {
    /// Record markers of an area placed on this page.
    ///
    /// `starting` is true when the call reports the start of the area and
    /// false for its end. `boundary` is true when the start (or end) really
    /// is on this page rather than carried over from (or continued onto)
    /// another page.
    pub fn add(&mut self, markers: &[Marker], starting: bool, boundary: bool) {
        for marker in markers {
            let name = &marker.class_name;
            match (starting, boundary) {
                (true, true) => {
                    self.first_start
                        .entry(name.clone())
                        .or_insert_with(|| marker.clone());
                    self.first_any
                        .entry(name.clone())
                        .or_insert_with(|| marker.clone());
                    self.last_start.insert(name.clone(), marker.clone());
                }
                (true, false) => {
                    self.first_any
                        .entry(name.clone())
                        .or_insert_with(|| marker.clone());
                }
                (false, true) => {
                    self.last_end.insert(name.clone(), marker.clone());
                }
                (false, false) => {}
            }
        }
    }

    pub fn get(&self, class_name: &str, position: RetrievePosition) -> Option<&Marker> {
        match position {
            RetrievePosition::FirstStartingWithinPage => self
                .first_start
                .get(class_name)
                .or_else(|| self.first_any.get(class_name)),
            RetrievePosition::FirstIncludingCarryover => self.first_any.get(class_name),
            RetrievePosition::LastStartingWithinPage => self
                .last_start
                .get(class_name)
                .or_else(|| self.last_end.get(class_name)),
            RetrievePosition::LastEndingWithinPage => self.last_end.get(class_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_any.is_empty() && self.last_end.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(markers: &mut PageMarkers, marker: Marker) {
        let list = [marker];
        markers.add(&list, true, true);
        markers.add(&list, false, true);
    }

    #[test]
    fn first_and_last_of_the_same_class() {
        let mut markers = PageMarkers::default();
        place(&mut markers, Marker::new("chapter", "One"));
        place(&mut markers, Marker::new("chapter", "Two"));

        let first = markers.get("chapter", RetrievePosition::FirstStartingWithinPage);
        let last = markers.get("chapter", RetrievePosition::LastEndingWithinPage);
        assert_eq!(first.unwrap().text, "One");
        assert_eq!(last.unwrap().text, "Two");
        assert_eq!(
            markers
                .get("chapter", RetrievePosition::LastStartingWithinPage)
                .unwrap()
                .text,
            "Two"
        );
    }

    #[test]
    fn carryover_counts_only_for_first_including_carryover() {
        let mut markers = PageMarkers::default();
        markers.add(&[Marker::new("section", "continued")], true, false);
        place(&mut markers, Marker::new("section", "fresh"));

        assert_eq!(
            markers
                .get("section", RetrievePosition::FirstIncludingCarryover)
                .unwrap()
                .text,
            "continued"
        );
        assert_eq!(
            markers
                .get("section", RetrievePosition::FirstStartingWithinPage)
                .unwrap()
                .text,
            "fresh"
        );
    }

    #[test]
    fn unknown_class_is_a_miss() {
        let markers = PageMarkers::default();
        assert!(markers.is_empty());
        assert!(markers
            .get("nothing", RetrievePosition::FirstIncludingCarryover)
            .is_none());
    }
}
