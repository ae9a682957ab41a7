// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the window and its UI thread.

use sysbars_core::error::Result;
use sysbars_core::types::{Rect, WindowInsetsSnapshot};

/// Read-only access to the host window's layout and display state.
///
/// Apart from [`WindowHost::sdk_level`], every method must be called on the
/// thread that owns the window. Callers get there through a [`UiDispatcher`].
pub trait WindowHost: Send + Sync {
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;

    /// Platform API level, used once to pick the measurement tier.
    fn sdk_level(&self) -> Result<u32>;

    /// Raw `Surface.ROTATION_*` constant of the default display.
    fn display_rotation(&self) -> Result<i32>;

    /// System-bar and navigation-bar insets of the root window.
    /// Returns Ok(None) when the window has no insets attached yet.
    fn root_window_insets(&self) -> Result<Option<WindowInsetsSnapshot>>;

    /// Visible display frame of the decor view.
    fn visible_display_frame(&self) -> Result<Rect>;

    /// Total height of the decor view.
    fn window_height(&self) -> Result<i32>;

    /// Pixel size of a platform `dimen` resource.
    /// Returns Ok(None) if the resource does not exist.
    fn dimension_pixel_size(&self, name: &str) -> Result<Option<i32>>;
}

/// Unit of work run on the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Submits tasks to the single execution context allowed to read window state.
pub trait UiDispatcher: Send + Sync {
    /// Queue a task. Returns once the task is queued, not once it has run.
    fn dispatch(&self, task: UiTask) -> Result<()>;
}
