// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounds helpers on top of [`kurbo::Rect`].
//!
//! Aggregate bounds start from [`NOTHING`], an inverted rectangle that acts as
//! the identity for [`Rect::union`]. Transforming it would produce NaNs, so
//! [`transform_bounds`] passes it through untouched.

use kurbo::{Affine, Rect};

/// The empty bounds: `union(NOTHING, r) == r` for every well-formed `r`.
pub const NOTHING: Rect = Rect::new(
    f64::INFINITY,
    f64::INFINITY,
    f64::NEG_INFINITY,
    f64::NEG_INFINITY,
);

/// Returns `true` if `rect` is [`NOTHING`] (or any other inverted rectangle
/// produced by unioning only empty bounds).
#[inline]
#[must_use]
pub fn is_nothing(rect: Rect) -> bool {
    rect.x0 > rect.x1 || rect.y0 > rect.y1
}

/// Returns `true` if `rect` may be stored as a node's self bounds: either
/// [`NOTHING`] or a finite rectangle with non-negative width and height.
#[must_use]
pub fn is_well_formed(rect: Rect) -> bool {
    if rect == NOTHING {
        return true;
    }
    rect.x0.is_finite()
        && rect.y0.is_finite()
        && rect.x1.is_finite()
        && rect.y1.is_finite()
        && rect.x1 >= rect.x0
        && rect.y1 >= rect.y0
}

/// Unions two bounds, treating [`NOTHING`] as the identity.
#[inline]
#[must_use]
pub fn union(a: Rect, b: Rect) -> Rect {
    if is_nothing(a) {
        b
    } else if is_nothing(b) {
        a
    } else {
        a.union(b)
    }
}

/// Maps local bounds into the parent frame as an axis-aligned bounding box.
#[inline]
#[must_use]
pub fn transform_bounds(transform: Affine, rect: Rect) -> Rect {
    if is_nothing(rect) {
        NOTHING
    } else {
        transform.transform_rect_bbox(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_is_union_identity() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(union(NOTHING, r), r);
        assert_eq!(union(r, NOTHING), r);
        assert!(is_nothing(union(NOTHING, NOTHING)));
    }

    #[test]
    fn transform_passes_nothing_through() {
        let xf = Affine::translate((10.0, 0.0));
        assert!(is_nothing(transform_bounds(xf, NOTHING)));
        assert_eq!(
            transform_bounds(xf, Rect::new(0.0, 0.0, 5.0, 5.0)),
            Rect::new(10.0, 0.0, 15.0, 5.0)
        );
    }

    #[test]
    fn negative_area_is_malformed() {
        assert!(!is_well_formed(Rect::new(5.0, 0.0, 0.0, 5.0)));
        assert!(!is_well_formed(Rect::new(0.0, 0.0, f64::NAN, 5.0)));
        assert!(is_well_formed(Rect::new(0.0, 0.0, 0.0, 0.0)));
        assert!(is_well_formed(NOTHING));
    }
}
