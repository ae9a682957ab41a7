// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the system bars bridge.

use serde::{Deserialize, Serialize};

use crate::config::ReportProfile;
use crate::error::Result;
use crate::measure::BarMeasurements;

/// First Android API level (R) exposing typed `WindowInsets.Type` queries.
pub const TYPED_INSETS_MIN_SDK: u32 = 30;

/// Inset margins as reported by the platform, in device pixels.
///
/// Values are kept signed because that is what the platform hands back;
/// clamping happens when they are folded into a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// A window-relative rectangle, e.g. the visible display frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Snapshot of the two inset groups read from the root window insets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowInsetsSnapshot {
    /// Combined status + navigation + caption bars.
    pub system_bars: Insets,
    /// Navigation bars only.
    pub navigation_bars: Insets,
}

/// Which platform code path measures the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityTier {
    /// Typed `WindowInsets` queries (API 30+).
    WindowInsets,
    /// Visible display frame plus the `status_bar_height` dimension.
    VisibleFrame,
}

impl CapabilityTier {
    /// Pick the tier supported by the given Android API level.
    pub fn for_sdk(sdk_int: u32) -> Self {
        if sdk_int >= TYPED_INSETS_MIN_SDK {
            Self::WindowInsets
        } else {
            Self::VisibleFrame
        }
    }
}

/// Screen edge currently occupied by the navigation bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavBarSide {
    Left,
    Right,
    #[default]
    Bottom,
}

impl NavBarSide {
    /// Resolve the side from per-edge thickness.
    ///
    /// Precedence is left, then right, then bottom; with no positive edge
    /// the bar is reported at the bottom.
    pub fn from_edges(left: u32, right: u32, bottom: u32) -> Self {
        if left > 0 {
            Self::Left
        } else if right > 0 {
            Self::Right
        } else if bottom > 0 {
            Self::Bottom
        } else {
            Self::default()
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for NavBarSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display rotation in quarter turns, serialized as degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Map a raw `Surface.ROTATION_*` constant (0..=3).
    ///
    /// Unrecognised values leave the orientation at 0 degrees.
    pub fn from_surface_rotation(rotation: i32) -> Self {
        match rotation {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            other => {
                tracing::debug!(rotation = other, "unrecognised display rotation");
                Self::Deg0
            }
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl From<Orientation> for u16 {
    fn from(orientation: Orientation) -> Self {
        orientation.degrees()
    }
}

impl TryFrom<u16> for Orientation {
    type Error = String;

    fn try_from(degrees: u16) -> std::result::Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(format!("{other} is not a quarter-turn rotation")),
        }
    }
}

/// Result object returned by `getHeights`.
///
/// Produced fresh for every call. The optional fields are only filled in by
/// the extended profile and are omitted from the serialized object otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsetReport {
    pub status_bar: u32,
    pub navigation_bar: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_bar_left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_bar_right: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_bar_side: Option<NavBarSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl InsetReport {
    /// Package tier measurements for the given profile.
    ///
    /// `orientation` is ignored by the basic profile.
    pub fn assemble(
        measurements: BarMeasurements,
        orientation: Option<Orientation>,
        profile: ReportProfile,
    ) -> Self {
        match profile {
            ReportProfile::Basic => Self {
                status_bar: measurements.status_bar,
                navigation_bar: measurements.navigation_bar,
                ..Self::default()
            },
            ReportProfile::Extended => Self {
                status_bar: measurements.status_bar,
                navigation_bar: measurements.navigation_bar,
                nav_bar_left: Some(measurements.nav_bar_left),
                nav_bar_right: Some(measurements.nav_bar_right),
                nav_bar_side: Some(measurements.nav_bar_side),
                orientation: Some(orientation.unwrap_or_default()),
            },
        }
    }

    /// Flat key/value object handed back through the call handle.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
