//! # Column Break Decisions
//!
//! Given the space left in the current column and the extents of the next
//! atomic pieces of content, decide how many of them go into this column.

/// What to do with a run of content at the current position.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Everything fits; the column stays open.
    Place,
    /// Only the first items fit; the column is full after them.
    Split {
        items_on_current_flow: usize,
    },
    /// Nothing fits here but the column already has content: close it.
    MoveToNextFlow,
    /// Nothing fits even in an empty column: place the first item anyway
    /// so layout keeps moving, and close the column.
    Overflow,
}

/// Decide how a run of items with the given block extents breaks.
pub fn decide_break(remaining: f64, extents: &[f64], flow_is_empty: bool) -> BreakDecision {
    let total: f64 = extents.iter().sum();

    // Easy case: everything fits
    if total <= remaining {
        return BreakDecision::Place;
    }

    // Find how many items fit
    let mut running = 0.0;
    let mut fit_count = 0;
    for &h in extents {
        if running + h > remaining {
            break;
        }
        running += h;
        fit_count += 1;
    }

    if fit_count > 0 {
        return BreakDecision::Split {
            items_on_current_flow: fit_count,
        };
    }

    if flow_is_empty {
        BreakDecision::Overflow
    } else {
        BreakDecision::MoveToNextFlow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_fits() {
        let decision = decide_break(100.0, &[20.0, 30.0, 40.0], false);
        assert_eq!(decision, BreakDecision::Place);
    }

    #[test]
    fn exact_fit_still_places() {
        let decision = decide_break(90.0, &[20.0, 30.0, 40.0], false);
        assert_eq!(decision, BreakDecision::Place);
    }

    #[test]
    fn split_at_right_point() {
        let decision = decide_break(55.0, &[20.0, 30.0, 40.0], true);
        assert_eq!(
            decision,
            BreakDecision::Split {
                items_on_current_flow: 2,
            }
        );
    }

    #[test]
    fn nothing_fits_in_a_used_column() {
        let decision = decide_break(15.0, &[20.0, 30.0], false);
        assert_eq!(decision, BreakDecision::MoveToNextFlow);
    }

    #[test]
    fn oversized_item_overflows_an_empty_column() {
        let decision = decide_break(15.0, &[20.0, 30.0], true);
        assert_eq!(decision, BreakDecision::Overflow);
    }

    #[test]
    fn empty_run_places() {
        assert_eq!(decide_break(0.0, &[], false), BreakDecision::Place);
    }
}
