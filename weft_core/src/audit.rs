// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural checks on the block partition.
//!
//! [`Backbone::audit`] walks the whole drawable order and verifies that the
//! blocks form a valid partition of it. It is linear in the number of
//! drawables, so displays only run it when
//! [`DisplayConfig::audit`](crate::display::DisplayConfig::audit) is set.

use alloc::collections::BTreeSet;

use crate::backbone::Backbone;
use crate::block::BlockId;
use crate::drawable::DrawableId;
use crate::handle::INVALID;
use crate::renderer::Renderer;

/// A violated partition invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// The linked list disagrees with the order.
    #[error("drawable links are broken at position {position}")]
    BrokenLinks {
        /// Position in the current order.
        position: usize,
    },
    /// A listed drawable has no block.
    #[error("{drawable:?} is listed but has no block")]
    Unassigned {
        /// The drawable.
        drawable: DrawableId,
    },
    /// A drawable points at a block that is dead or unused.
    #[error("{drawable:?} belongs to {block:?}, which is not in use")]
    DeadBlock {
        /// The drawable.
        drawable: DrawableId,
        /// Its block.
        block: BlockId,
    },
    /// A drawable's renderer differs from its block's.
    #[error("{drawable:?} ({found:?}) sits in a {expected:?} block")]
    RendererMismatch {
        /// The drawable.
        drawable: DrawableId,
        /// The block's renderer.
        expected: Renderer,
        /// The drawable's renderer.
        found: Renderer,
    },
    /// A block's members are not contiguous.
    #[error("{block:?} is split: it resumes at {drawable:?}")]
    Fragmented {
        /// The block.
        block: BlockId,
        /// Where it reappears.
        drawable: DrawableId,
    },
    /// A recorded extent does not match the actual run.
    #[error("{block:?} records the wrong first or last drawable")]
    WrongExtent {
        /// The block.
        block: BlockId,
    },
    /// Two neighbouring blocks could have been one.
    #[error("{left:?} and {right:?} are adjacent {renderer:?} blocks without a gap")]
    NotMaximal {
        /// The earlier block.
        left: BlockId,
        /// The later block.
        right: BlockId,
        /// Their shared renderer.
        renderer: Renderer,
    },
    /// A drawable is in a block but isolated renderers require it alone.
    #[error("{block:?} holds more than one isolated drawable")]
    SharedIsolated {
        /// The block.
        block: BlockId,
    },
    /// The recorded block order differs from the partition.
    #[error("block order disagrees with the partition at index {index}")]
    BlockOrder {
        /// First differing index.
        index: usize,
    },
    /// A block is in use but holds no drawables.
    #[error("{block:?} is in use but empty")]
    EmptyBlock {
        /// The block.
        block: BlockId,
    },
}

impl<P, S> Backbone<P, S> {
    /// Verifies that the blocks partition the drawable order into maximal
    /// same-renderer runs, and that all bookkeeping agrees.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn audit(&self) -> Result<(), AuditError> {
        let mut seen = BTreeSet::new();
        let mut segments = 0_usize;
        let mut current = INVALID;
        let mut prev = INVALID;

        for (position, &d) in self.order.iter().enumerate() {
            let slot = self.drawables.slot(d);
            let drawable = self.drawables.id_at(d);
            if slot.prev != prev || slot.index as usize != position || !slot.flags.used {
                return Err(AuditError::BrokenLinks { position });
            }
            if prev != INVALID && self.drawables.slot(prev).next != d {
                return Err(AuditError::BrokenLinks { position });
            }

            let block = slot.block;
            if block == INVALID {
                return Err(AuditError::Unassigned { drawable });
            }
            let extent = self.blocks.slot(block);
            let block_id = self.blocks.id_at(block);
            if !extent.live || !extent.used {
                return Err(AuditError::DeadBlock {
                    drawable,
                    block: block_id,
                });
            }
            if extent.renderer != slot.renderer {
                return Err(AuditError::RendererMismatch {
                    drawable,
                    expected: extent.renderer,
                    found: slot.renderer,
                });
            }

            if block != current {
                // A new segment starts here.
                if !seen.insert(block) {
                    return Err(AuditError::Fragmented {
                        block: block_id,
                        drawable,
                    });
                }
                if extent.first != d {
                    return Err(AuditError::WrongExtent { block: block_id });
                }
                if current != INVALID {
                    if self.blocks.slot(current).last != prev {
                        return Err(AuditError::WrongExtent {
                            block: self.blocks.id_at(current),
                        });
                    }
                    let left = self.drawables.renderer_at(prev);
                    if !Renderer::needs_gap(left, slot.renderer) {
                        return Err(AuditError::NotMaximal {
                            left: self.blocks.id_at(current),
                            right: block_id,
                            renderer: left,
                        });
                    }
                }
                if self.block_order.get(segments) != Some(&block) {
                    return Err(AuditError::BlockOrder { index: segments });
                }
                if extent.index as usize != segments {
                    return Err(AuditError::BlockOrder { index: segments });
                }
                segments += 1;
                current = block;
            } else if slot.renderer.is_isolated() {
                return Err(AuditError::SharedIsolated { block: block_id });
            }
            prev = d;
        }

        if self.last != prev {
            return Err(AuditError::BrokenLinks {
                position: self.order.len(),
            });
        }
        if current != INVALID && self.blocks.slot(current).last != prev {
            return Err(AuditError::WrongExtent {
                block: self.blocks.id_at(current),
            });
        }
        if self.block_order.len() != segments {
            return Err(AuditError::BlockOrder { index: segments });
        }
        for block in self.blocks.live_indices() {
            if !seen.contains(&block) {
                return Err(AuditError::EmptyBlock {
                    block: self.blocks.id_at(block),
                });
            }
        }
        Ok(())
    }
}
