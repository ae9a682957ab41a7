// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bar measurement rules for both capability tiers.
//
// These functions are pure: the bridge reads raw platform values on the UI
// thread and hands them here, so every rule is testable without a device.

use crate::types::{NavBarSide, Rect, WindowInsetsSnapshot};

/// Name of the Android dimension resource holding the status bar height.
pub const STATUS_BAR_HEIGHT_DIMEN: &str = "status_bar_height";

/// Clamp a signed platform value into the non-negative pixel domain.
pub fn clamp_px(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Tier-independent bar measurements, all in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarMeasurements {
    pub status_bar: u32,
    pub navigation_bar: u32,
    pub nav_bar_left: u32,
    pub nav_bar_right: u32,
    pub nav_bar_side: NavBarSide,
}

impl BarMeasurements {
    /// Result used when the platform has no inset object to offer.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Typed-insets tier.
    ///
    /// `None` means the root window insets were unavailable, which is a
    /// defined all-zero result rather than a failure.
    pub fn from_window_insets(snapshot: Option<WindowInsetsSnapshot>) -> Self {
        let Some(snapshot) = snapshot else {
            return Self::empty();
        };
        let WindowInsetsSnapshot {
            system_bars,
            navigation_bars,
        } = snapshot;

        let left = clamp_px(navigation_bars.left);
        let right = clamp_px(navigation_bars.right);
        let bottom = clamp_px(navigation_bars.bottom);

        Self {
            status_bar: clamp_px(system_bars.top),
            navigation_bar: bottom,
            nav_bar_left: left,
            nav_bar_right: right,
            nav_bar_side: NavBarSide::from_edges(left, right, bottom),
        }
    }

    /// Visible-frame tier for platforms without typed insets.
    ///
    /// The status bar starts as the frame's top offset; a positive
    /// `status_bar_height` dimension replaces it. The navigation bar is the
    /// space between the frame bottom and the bottom of the window.
    pub fn from_visible_frame(
        visible_frame: Rect,
        window_height: i32,
        status_bar_dimen: Option<i32>,
    ) -> Self {
        let status_bar = match status_bar_dimen {
            Some(px) if px > 0 => clamp_px(px),
            _ => clamp_px(visible_frame.top),
        };
        let navigation_bar = clamp_px(window_height.saturating_sub(visible_frame.bottom));

        Self {
            status_bar,
            navigation_bar,
            nav_bar_left: 0,
            nav_bar_right: 0,
            nav_bar_side: NavBarSide::Bottom,
        }
    }
}
