//! # Page Break Decisions
//!
//! What to do when a block does not fit above the bottom margin. The
//! default keeps the long-standing behaviour of the document: blocks are
//! placed regardless and may run off the page. The alternative moves or
//! splits content onto a continuation page.

/// How the composer reacts to a block that crosses the bottom margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Place the block anyway and log a warning.
    #[default]
    Overflow,
    /// Start a continuation page.
    NewPage,
}

/// Decision for one block.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// The block fits on the current page.
    Place,
    /// The block does not fit but is placed anyway.
    Overflow,
    /// Move the entire block to the next page.
    MoveToNextPage,
    /// Split the block: place some items here, continue on the next page.
    Split {
        /// How many items fit on the current page.
        items_on_current_page: usize,
    },
}

/// Given the remaining space on a page and the heights of a block's
/// indivisible items, decide how to break.
///
/// `fresh_page` marks a page with nothing placed on it yet. Moving content
/// off a fresh page gains nothing, so there at least one item is placed.
pub fn decide_break(
    policy: OverflowPolicy,
    remaining_height: f64,
    item_heights: &[f64],
    is_breakable: bool,
    fresh_page: bool,
) -> BreakDecision {
    let total: f64 = item_heights.iter().sum();

    if total <= remaining_height {
        return BreakDecision::Place;
    }

    if policy == OverflowPolicy::Overflow {
        return BreakDecision::Overflow;
    }

    if !is_breakable || item_heights.len() <= 1 {
        return if fresh_page {
            BreakDecision::Overflow
        } else {
            BreakDecision::MoveToNextPage
        };
    }

    let mut running = 0.0;
    let mut fit_count = 0;
    for &h in item_heights {
        if running + h > remaining_height {
            break;
        }
        running += h;
        fit_count += 1;
    }

    if fit_count == 0 {
        if fresh_page {
            return BreakDecision::Split {
                items_on_current_page: 1,
            };
        }
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::Split {
        items_on_current_page: fit_count,
    }
}
