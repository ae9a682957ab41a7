// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Measurement strategies, one per platform capability tier.
//
// A strategy turns raw `WindowHost` reads into `BarMeasurements`. Failed
// reads are logged and replaced by the default for that read so a
// measurement always completes.

use sysbars_core::measure::{BarMeasurements, STATUS_BAR_HEIGHT_DIMEN};
use sysbars_core::types::{CapabilityTier, Orientation, Rect};
use tracing::warn;

use crate::traits::WindowHost;

/// Produces bar measurements for one capability tier.
pub trait InsetStrategy: Send + Sync {
    fn tier(&self) -> CapabilityTier;

    /// Measure the bars. Must run on the UI thread.
    fn measure(&self, window: &dyn WindowHost) -> BarMeasurements;
}

/// Typed `WindowInsets` queries (API 30+).
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowInsetsStrategy;

impl InsetStrategy for WindowInsetsStrategy {
    fn tier(&self) -> CapabilityTier {
        CapabilityTier::WindowInsets
    }

    fn measure(&self, window: &dyn WindowHost) -> BarMeasurements {
        let snapshot = window.root_window_insets().unwrap_or_else(|e| {
            warn!(error = %e, "root window insets unreadable");
            None
        });
        BarMeasurements::from_window_insets(snapshot)
    }
}

/// Visible display frame plus the `status_bar_height` resource.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisibleFrameStrategy;

impl InsetStrategy for VisibleFrameStrategy {
    fn tier(&self) -> CapabilityTier {
        CapabilityTier::VisibleFrame
    }

    fn measure(&self, window: &dyn WindowHost) -> BarMeasurements {
        let frame = window.visible_display_frame().unwrap_or_else(|e| {
            warn!(error = %e, "visible display frame unreadable");
            Rect::default()
        });
        let window_height = window.window_height().unwrap_or_else(|e| {
            warn!(error = %e, "window height unreadable");
            0
        });
        let status_bar_dimen = window
            .dimension_pixel_size(STATUS_BAR_HEIGHT_DIMEN)
            .unwrap_or_else(|e| {
                warn!(error = %e, "status bar dimension unreadable");
                None
            });
        BarMeasurements::from_visible_frame(frame, window_height, status_bar_dimen)
    }
}

/// Strategy implementing the given tier.
pub fn strategy_for(tier: CapabilityTier) -> Box<dyn InsetStrategy> {
    match tier {
        CapabilityTier::WindowInsets => Box::new(WindowInsetsStrategy),
        CapabilityTier::VisibleFrame => Box::new(VisibleFrameStrategy),
    }
}

/// Current display orientation; unreadable rotation counts as 0 degrees.
pub fn read_orientation(window: &dyn WindowHost) -> Orientation {
    match window.display_rotation() {
        Ok(rotation) => Orientation::from_surface_rotation(rotation),
        Err(e) => {
            warn!(error = %e, "display rotation unreadable");
            Orientation::default()
        }
    }
}
