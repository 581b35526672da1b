//! Forced page break policies.
//!
//! When content asks for a page, odd-page or even-page break, the assembly
//! first asks whether a blank page must be inserted to reach the requested
//! parity, then whether a new page is needed at all. Both questions are
//! answered by a [`PaginationPolicy`] so that the handedness rules can be
//! swapped and tested on their own.

use crate::area::{ForcedBreak, Span};

/// What a policy gets to see about the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub number: u32,
    /// Nothing has been placed in the body yet.
    pub is_empty: bool,
    pub is_blank: bool,
}

impl PageState {
    pub fn is_odd(&self) -> bool {
        self.number % 2 == 1
    }
}

pub trait PaginationPolicy {
    /// Insert a blank page before honoring `brk`?
    fn need_blank_page(&self, brk: ForcedBreak, page: &PageState) -> bool;

    /// Start a new page to honor `brk`? Asked after any blank page has been
    /// inserted, with the state of whatever page is current by then.
    fn need_new_page(&self, brk: ForcedBreak, page: &PageState) -> bool;

    /// Called on a multi-column span before a new span is started below it.
    fn balance_span(&self, _span: &mut Span) {}
}

/// Every page-kind break starts a new page unless the current page is still
/// empty. Parity is ignored and no blank pages are inserted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleBreaks;

impl PaginationPolicy for SimpleBreaks {
    fn need_blank_page(&self, _brk: ForcedBreak, _page: &PageState) -> bool {
        false
    }

    fn need_new_page(&self, _brk: ForcedBreak, page: &PageState) -> bool {
        !page.is_empty
    }
}

/// Odd/even page breaks land on a page of the requested parity, inserting a
/// blank page when the next page would have the wrong one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityBreaks;

impl PaginationPolicy for ParityBreaks {
    fn need_blank_page(&self, brk: ForcedBreak, page: &PageState) -> bool {
        if brk == ForcedBreak::Page || page.is_blank {
            return false;
        }
        // An empty page of the wrong parity is itself the padding page.
        if page.is_empty {
            return if page.is_odd() {
                brk == ForcedBreak::EvenPage
            } else {
                brk == ForcedBreak::OddPage
            };
        }
        // The next page has the opposite parity of this one.
        if page.is_odd() {
            brk == ForcedBreak::OddPage
        } else {
            brk == ForcedBreak::EvenPage
        }
    }

    fn need_new_page(&self, brk: ForcedBreak, page: &PageState) -> bool {
        if !page.is_empty {
            return true;
        }
        match brk {
            ForcedBreak::Page => false,
            _ if page.is_odd() => brk == ForcedBreak::EvenPage,
            _ => brk == ForcedBreak::OddPage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(number: u32, is_empty: bool) -> PageState {
        PageState {
            number,
            is_empty,
            is_blank: false,
        }
    }

    #[test]
    fn simple_breaks_only_care_about_content() {
        let policy = SimpleBreaks;
        for brk in [ForcedBreak::Page, ForcedBreak::OddPage, ForcedBreak::EvenPage] {
            assert!(!policy.need_blank_page(brk, &state(1, false)));
            assert!(policy.need_new_page(brk, &state(1, false)));
            assert!(!policy.need_new_page(brk, &state(2, true)));
        }
    }

    #[test]
    fn odd_break_from_odd_page_needs_a_blank() {
        let policy = ParityBreaks;
        assert!(policy.need_blank_page(ForcedBreak::OddPage, &state(3, false)));
        assert!(!policy.need_blank_page(ForcedBreak::EvenPage, &state(3, false)));
        assert!(policy.need_blank_page(ForcedBreak::EvenPage, &state(4, false)));
        assert!(!policy.need_blank_page(ForcedBreak::Page, &state(4, false)));
    }

    #[test]
    fn empty_page_of_right_parity_is_reused() {
        let policy = ParityBreaks;
        assert!(!policy.need_new_page(ForcedBreak::OddPage, &state(5, true)));
        assert!(policy.need_new_page(ForcedBreak::EvenPage, &state(5, true)));
        assert!(!policy.need_new_page(ForcedBreak::EvenPage, &state(6, true)));
        assert!(!policy.need_new_page(ForcedBreak::Page, &state(6, true)));
    }

    #[test]
    fn empty_page_of_wrong_parity_becomes_the_blank() {
        let policy = ParityBreaks;
        assert!(policy.need_blank_page(ForcedBreak::OddPage, &state(2, true)));
        assert!(policy.need_blank_page(ForcedBreak::EvenPage, &state(3, true)));
        assert!(!policy.need_blank_page(ForcedBreak::OddPage, &state(3, true)));
        assert!(!policy.need_blank_page(ForcedBreak::Page, &state(2, true)));
        let blank = PageState {
            number: 2,
            is_empty: true,
            is_blank: true,
        };
        assert!(!policy.need_blank_page(ForcedBreak::OddPage, &blank));
    }

    #[test]
    fn blank_then_new_page_reaches_requested_parity() {
        let policy = ParityBreaks;
        // On page 1 with content, ask for an odd page.
        assert!(policy.need_blank_page(ForcedBreak::OddPage, &state(1, false)));
        // The blank page 2 is empty and even, so a new page 3 follows.
        let blank = PageState {
            number: 2,
            is_empty: true,
            is_blank: true,
        };
        assert!(policy.need_new_page(ForcedBreak::OddPage, &blank));
    }
}
