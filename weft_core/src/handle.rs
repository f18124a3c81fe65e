// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational handles shared by every arena in the crate.
//!
//! A handle pairs a slot index with the slot's generation at the time the
//! handle was issued. Releasing a slot bumps its generation, so a handle that
//! outlives its slot fails validation instead of aliasing the next occupant.

/// Sentinel value indicating "no slot" in raw index and link fields.
pub const INVALID: u32 = u32::MAX;

macro_rules! generational_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            /// Slot index into the owning arena.
            pub(crate) idx: u32,
            /// Must match the arena's generation for this slot.
            pub(crate) generation: u32,
        }

        impl $name {
            #[inline]
            pub(crate) const fn new(idx: u32, generation: u32) -> Self {
                Self { idx, generation }
            }

            /// Returns the raw slot index (for diagnostics only).
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.idx
            }

            /// Returns the generation counter.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.generation
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}@gen{})"),
                    self.idx, self.generation
                )
            }
        }
    };
}

pub(crate) use generational_handle;
