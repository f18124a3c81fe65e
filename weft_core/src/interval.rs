// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change intervals between two drawable orders.
//!
//! A change interval names two *anchor* drawables present, and adjacent in
//! the same relative order, in both the previous and the current drawable
//! list. Everything strictly between the anchors may differ. A missing anchor
//! stands for the list boundary on that side.
//!
//! Anchors are chosen as a longest increasing subsequence of previous
//! positions, so the retained drawables stay put and the intervals cover as
//! little as possible.

use alloc::vec::Vec;

use crate::drawable::DrawableId;
use crate::handle::INVALID;

/// A span between two anchors within which the drawable order changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChangeInterval {
    /// The unchanged drawable immediately before the span, or `None` for the
    /// start of the list.
    pub before: Option<DrawableId>,
    /// The unchanged drawable immediately after the span, or `None` for the
    /// end of the list.
    pub after: Option<DrawableId>,
}

impl ChangeInterval {
    /// An interval covering both whole lists.
    pub const WHOLE: Self = Self {
        before: None,
        after: None,
    };

    /// Creates an interval between two anchors.
    #[must_use]
    pub const fn new(before: Option<DrawableId>, after: Option<DrawableId>) -> Self {
        Self { before, after }
    }
}

/// Computes the changed spans between two orders.
///
/// `old_positions[i]` is the previous-list position of the drawable now at
/// position `i`, or `INVALID` if it was not listed. `old_len` is the length
/// of the previous list. Returns `(before, after)` pairs of current-list
/// positions; `None` marks a list boundary.
pub(crate) fn diff_positions(old_len: u32, old_positions: &[u32]) -> Vec<(Option<u32>, Option<u32>)> {
    let anchors = longest_increasing(old_positions);
    let new_len = old_positions.len() as i64;

    let mut spans = Vec::new();
    let mut prev_new = -1_i64;
    let mut prev_old = -1_i64;
    let mut prev_anchor = None;
    let ends = anchors
        .iter()
        .map(|&pos| (i64::from(pos), i64::from(old_positions[pos as usize]), Some(pos)))
        .chain(core::iter::once((new_len, i64::from(old_len), None)));
    for (new_pos, old_pos, anchor) in ends {
        if new_pos - prev_new > 1 || old_pos - prev_old > 1 {
            spans.push((prev_anchor, anchor));
        }
        prev_new = new_pos;
        prev_old = old_pos;
        prev_anchor = anchor;
    }
    spans
}

/// Returns the current-list positions of a longest strictly increasing
/// subsequence of the valid entries of `values`.
fn longest_increasing(values: &[u32]) -> Vec<u32> {
    // `tails[k]` is the position ending the best run of length `k + 1`.
    let mut tails: Vec<usize> = Vec::new();
    let mut links = alloc::vec![usize::MAX; values.len()];
    for (pos, &value) in values.iter().enumerate() {
        if value == INVALID {
            continue;
        }
        let k = tails.partition_point(|&t| values[t] < value);
        if k > 0 {
            links[pos] = tails[k - 1];
        }
        if k == tails.len() {
            tails.push(pos);
        } else {
            tails[k] = pos;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied().unwrap_or(usize::MAX);
    while cursor != usize::MAX {
        run.push(cursor as u32);
        cursor = links[cursor];
    }
    run.reverse();
    run
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    const X: u32 = INVALID;

    #[test]
    fn identical_orders_have_no_intervals() {
        assert!(diff_positions(3, &[0, 1, 2]).is_empty());
        assert!(diff_positions(0, &[]).is_empty());
    }

    #[test]
    fn replacement_in_the_middle() {
        // [a b c] -> [a b' c]
        assert_eq!(diff_positions(3, &[0, X, 2]), vec![(Some(0), Some(2))]);
    }

    #[test]
    fn removal_uses_adjacent_anchors() {
        // [a b c] -> [a c]
        assert_eq!(diff_positions(3, &[0, 2]), vec![(Some(0), Some(1))]);
    }

    #[test]
    fn boundary_changes() {
        // [a b] -> [z a b]
        assert_eq!(diff_positions(2, &[X, 0, 1]), vec![(None, Some(1))]);
        // [a b] -> [a b z]
        assert_eq!(diff_positions(2, &[0, 1, X]), vec![(Some(1), None)]);
        // [a b] -> []
        assert_eq!(diff_positions(2, &[]), vec![(None, None)]);
        // [] -> [z]
        assert_eq!(diff_positions(0, &[X]), vec![(None, None)]);
    }

    #[test]
    fn swap_keeps_the_longest_stable_run() {
        // [a b c d] -> [a c b d]: one of b/c stays, the other moves.
        let spans = diff_positions(4, &[0, 2, 1, 3]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].0, Some(0));
        assert_eq!(spans[1].1, Some(3));
    }

    #[test]
    fn lis_picks_increasing_positions() {
        assert_eq!(longest_increasing(&[3, 0, 1, X, 2]), vec![1, 2, 4]);
        assert!(longest_increasing(&[X, X]).is_empty());
    }
}
