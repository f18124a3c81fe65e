// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display configuration.

use kurbo::Size;

use crate::backend::Cursor;
use crate::node::DEFAULT_MAX_VALIDATION_PASSES;

/// Tunables for a [`Display`](super::Display).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayConfig {
    /// Cursor shown when the pointer is outside every node, or over nodes
    /// that request none.
    pub fallback_cursor: Cursor,
    /// Cap on bounds-validation passes per validated root. Applied to the
    /// scene when the display is created.
    pub max_validation_passes: u32,
    /// Cap on transform-notification rounds per update. A watcher that keeps
    /// changing transforms trips this.
    pub max_transform_passes: u32,
    /// Run [`Backbone::audit`](crate::Backbone::audit) after every repaint
    /// and panic on failure.
    ///
    /// The audit runs once per update, right after stitching. Earlier steps
    /// acquire and retire drawables, but the drawable order and the block
    /// partition only change while stitching, and later steps only read them.
    pub audit: bool,
    /// Size reported to the backend on the first update.
    pub initial_size: Size,
}

impl DisplayConfig {
    /// Default configuration: audits in debug builds only.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fallback_cursor: Cursor::DEFAULT,
            max_validation_passes: DEFAULT_MAX_VALIDATION_PASSES,
            max_transform_passes: 16,
            audit: cfg!(debug_assertions),
            initial_size: Size::ZERO,
        }
    }

    /// Configuration for tests and fuzzing: always audits, tight caps.
    #[must_use]
    pub const fn validated() -> Self {
        Self {
            fallback_cursor: Cursor::DEFAULT,
            max_validation_passes: 16,
            max_transform_passes: 4,
            audit: true,
            initial_size: Size::ZERO,
        }
    }

    /// Configuration for shipping builds: never audits, generous caps.
    #[must_use]
    pub const fn release() -> Self {
        Self {
            fallback_cursor: Cursor::DEFAULT,
            max_validation_passes: 256,
            max_transform_passes: 64,
            audit: false,
            initial_size: Size::ZERO,
        }
    }

    /// Returns this configuration with a different fallback cursor.
    #[must_use]
    pub const fn with_fallback_cursor(mut self, cursor: Cursor) -> Self {
        self.fallback_cursor = cursor;
        self
    }

    /// Returns this configuration with a different initial size.
    #[must_use]
    pub const fn with_initial_size(mut self, size: Size) -> Self {
        self.initial_size = size;
        self
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_in_auditing() {
        assert!(DisplayConfig::validated().audit);
        assert!(!DisplayConfig::release().audit);
        assert_eq!(DisplayConfig::new().audit, cfg!(debug_assertions));
    }

    #[test]
    fn builders_override_fields() {
        let config = DisplayConfig::release()
            .with_fallback_cursor(Cursor::WAIT)
            .with_initial_size(Size::new(640.0, 480.0));
        assert_eq!(config.fallback_cursor, Cursor::WAIT);
        assert_eq!(config.initial_size, Size::new(640.0, 480.0));
        assert_eq!(config.max_transform_passes, 64);
    }
}
