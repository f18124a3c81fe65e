// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer tags and the gap rule.

use core::fmt;

/// The backend family a drawable paints with.
///
/// Drawables with the same renderer can share a [block](crate::block), and
/// therefore one physical render target, unless the renderer is
/// [isolated](Self::is_isolated).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Renderer {
    /// Immediate-mode 2D canvas.
    Canvas,
    /// Retained SVG group.
    Svg,
    /// A standalone DOM element. Always gets a block of its own.
    Dom,
    /// GPU-backed canvas.
    WebGl,
}

impl Renderer {
    /// Number of renderer tags, for per-renderer tables.
    pub const COUNT: usize = 4;

    /// All renderer tags in declaration order.
    pub const ALL: [Self; Self::COUNT] = [Self::Canvas, Self::Svg, Self::Dom, Self::WebGl];

    /// Returns a dense index in `0..COUNT`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Canvas => 0,
            Self::Svg => 1,
            Self::Dom => 2,
            Self::WebGl => 3,
        }
    }

    /// Whether drawables with this renderer can never share a block.
    #[inline]
    #[must_use]
    pub const fn is_isolated(self) -> bool {
        matches!(self, Self::Dom)
    }

    /// Returns `true` if a block boundary is forced between two adjacent
    /// drawables painted with `a` and then `b`.
    #[inline]
    #[must_use]
    pub fn needs_gap(a: Self, b: Self) -> bool {
        a != b || a.is_isolated() || b.is_isolated()
    }

    /// A short lowercase name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Svg => "svg",
            Self::Dom => "dom",
            Self::WebGl => "webgl",
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_rule() {
        assert!(!Renderer::needs_gap(Renderer::Canvas, Renderer::Canvas));
        assert!(!Renderer::needs_gap(Renderer::Svg, Renderer::Svg));
        assert!(Renderer::needs_gap(Renderer::Canvas, Renderer::Svg));
        assert!(Renderer::needs_gap(Renderer::Dom, Renderer::Dom));
        assert!(Renderer::needs_gap(Renderer::WebGl, Renderer::Dom));
    }

    #[test]
    fn indices_are_dense() {
        for (i, r) in Renderer::ALL.iter().enumerate() {
            assert_eq!(r.index(), i);
        }
    }
}
