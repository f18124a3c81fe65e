// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Weft owns the scene, invalidation, instance tree, and block stitching.
//! Everything that touches a real render target is supplied by a *backend*:
//!
//! - **Paint drawables**: one per visible instance with a renderer, created by
//!   [`Backend::create_paint`]. The core marks them dirty and disposes them;
//!   what "paint" means is up to the backend.
//! - **Surfaces**: one per [block](crate::block), created by
//!   [`Backend::create_surface`]. A surface is told its stacking position,
//!   the range of drawables it covers, and when to repaint.
//! - **Window state**: size and cursor, pushed at the end of each update.
//!
//! Hit testing is a separate seam ([`HitTest`](crate::hit::HitTest)) because
//! it reads the scene rather than the render targets.
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_frame(display: &mut Display<MyBackend>) {
//!     // Mutate: transforms, bounds, topology, paint requests.
//!     display.scene_mut().set_transform(node, animated(now));
//!
//!     // Update: validate, sync, stitch, repaint, cursor, resize.
//!     display.update_display();
//!
//!     // Inspect what happened, if needed.
//!     let changes = display.last_changes();
//! }
//! ```

use core::fmt;

use kurbo::Size;

use crate::block::BlockId;
use crate::display::RenderChanges;
use crate::drawable::DrawableId;
use crate::node::NodeId;
use crate::renderer::Renderer;

/// A named pointer cursor.
///
/// Names follow the CSS `cursor` keywords; backends map them to whatever the
/// platform offers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor(&'static str);

impl Cursor {
    /// The platform default arrow.
    pub const DEFAULT: Self = Self("default");
    /// A pointing hand, for links and buttons.
    pub const POINTER: Self = Self("pointer");
    /// An I-beam, for editable text.
    pub const TEXT: Self = Self("text");
    /// Four-way arrows, for draggable content.
    pub const MOVE: Self = Self("move");
    /// Busy indicator.
    pub const WAIT: Self = Self("wait");
    /// A crosshair.
    pub const CROSSHAIR: Self = Self("crosshair");
    /// An open hand.
    pub const GRAB: Self = Self("grab");
    /// No cursor at all.
    pub const NONE: Self = Self("none");

    /// Creates a cursor from a CSS cursor keyword.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the cursor keyword.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({})", self.0)
    }
}

/// The backend-side state behind one drawable.
pub trait PaintDrawable {
    /// The renderer this paint was created for. Must never change.
    fn renderer(&self) -> Renderer;

    /// The node's content changed and must be redrawn before the next
    /// surface repaint.
    fn mark_dirty(&mut self);

    /// Releases backend resources. Called exactly once, when the drawable is
    /// retired; the value is dropped afterwards.
    fn dispose(&mut self);
}

/// A physical render target backing one block.
pub trait Surface {
    /// Sets the stacking position. `0` is the bottom-most block.
    fn set_z_index(&mut self, index: u32) {
        _ = index;
    }

    /// Sets the range of drawables, in paint order, that this surface draws.
    fn set_extent(&mut self, first: DrawableId, last: DrawableId) {
        _ = (first, last);
    }

    /// Redraws the surface from its drawables.
    fn repaint(&mut self) {}

    /// Releases backend resources. Called exactly once, when the block is
    /// disposed.
    fn dispose(&mut self);
}

/// Creates paint drawables and surfaces, and receives window-level updates.
///
/// One backend serves one [`Display`](crate::display::Display).
pub trait Backend {
    /// Per-drawable backend state.
    type Paint: PaintDrawable;
    /// Per-block render target.
    type Surface: Surface;

    /// Creates the paint state for `node` under `renderer`.
    ///
    /// The returned value's [`PaintDrawable::renderer`] must equal
    /// `renderer`.
    fn create_paint(&mut self, renderer: Renderer, node: NodeId) -> Self::Paint;

    /// Creates a render target for a newly allocated block.
    fn create_surface(&mut self, renderer: Renderer, block: BlockId) -> Self::Surface;

    /// The display's size changed.
    fn resize(&mut self, size: Size) {
        _ = size;
    }

    /// The cursor under the pointer changed.
    fn set_cursor(&mut self, cursor: Cursor) {
        _ = cursor;
    }

    /// Called once at the end of every update with what it did.
    fn present(&mut self, changes: &RenderChanges) {
        _ = changes;
    }
}
