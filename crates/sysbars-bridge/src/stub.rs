// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub window for desktop/CI builds where no Android window exists.
//
// The stub serves a `SimulatedDisplay`. The default one is a desktop with no
// system bars, so `getHeights` resolves with zeros. Tests swap in other
// displays and inspect which threads touched the window.

use std::sync::Mutex;
use std::thread::{self, ThreadId};

use sysbars_core::error::{Result, SysBarsError};
use sysbars_core::types::{Insets, Rect, WindowInsetsSnapshot};

/// Display state served by [`StubWindow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedDisplay {
    pub sdk_level: u32,
    /// Raw `Surface.ROTATION_*` value.
    pub rotation: i32,
    pub window_insets: Option<WindowInsetsSnapshot>,
    pub visible_frame: Rect,
    pub window_height: i32,
    pub status_bar_dimen: Option<i32>,
    /// Make every window read fail, the API level included.
    pub reads_fail: bool,
}

impl Default for SimulatedDisplay {
    fn default() -> Self {
        Self {
            sdk_level: 34,
            rotation: 0,
            window_insets: None,
            visible_frame: Rect::default(),
            window_height: 0,
            status_bar_dimen: None,
            reads_fail: false,
        }
    }
}

impl SimulatedDisplay {
    /// Portrait phone with a 63px status bar and a 48px gesture bar.
    pub fn pixel_portrait() -> Self {
        Self {
            window_insets: Some(WindowInsetsSnapshot {
                system_bars: Insets::new(0, 63, 0, 48),
                navigation_bars: Insets::new(0, 0, 0, 48),
            }),
            visible_frame: Rect::new(0, 63, 1080, 2352),
            window_height: 2400,
            ..Self::default()
        }
    }

    /// Pre-API-30 phone, 1080x1920 with three-button navigation.
    pub fn legacy_phone() -> Self {
        Self {
            sdk_level: 28,
            visible_frame: Rect::new(0, 24, 1080, 1864),
            window_height: 1920,
            ..Self::default()
        }
    }
}

/// In-process stand-in for the Android window.
#[derive(Debug, Default)]
pub struct StubWindow {
    display: Mutex<SimulatedDisplay>,
    readers: Mutex<Vec<ThreadId>>,
    rotation_reads: Mutex<usize>,
}

impl StubWindow {
    pub fn new(display: SimulatedDisplay) -> Self {
        Self {
            display: Mutex::new(display),
            ..Self::default()
        }
    }

    /// Replace the served display, e.g. to simulate a rotation.
    pub fn set_display(&self, display: SimulatedDisplay) {
        *self.display.lock().expect("display lock poisoned") = display;
    }

    /// Threads that performed UI-bound reads, in order.
    pub fn reader_threads(&self) -> Vec<ThreadId> {
        self.readers.lock().expect("readers lock poisoned").clone()
    }

    pub fn rotation_reads(&self) -> usize {
        *self.rotation_reads.lock().expect("rotation lock poisoned")
    }

    /// Record the calling thread and hand out the display if reads succeed.
    fn read(&self, what: &str) -> Result<SimulatedDisplay> {
        self.readers
            .lock()
            .expect("readers lock poisoned")
            .push(thread::current().id());
        let display = self.display.lock().expect("display lock poisoned").clone();
        if display.reads_fail {
            tracing::warn!(what, "simulated window read failure");
            return Err(SysBarsError::PlatformUnavailable);
        }
        Ok(display)
    }
}

impl crate::traits::WindowHost for StubWindow {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn sdk_level(&self) -> Result<u32> {
        // Not UI-bound, so the calling thread is not recorded.
        let display = self.display.lock().expect("display lock poisoned");
        if display.reads_fail {
            tracing::warn!("simulated API level read failure");
            return Err(SysBarsError::PlatformUnavailable);
        }
        Ok(display.sdk_level)
    }

    fn display_rotation(&self) -> Result<i32> {
        *self.rotation_reads.lock().expect("rotation lock poisoned") += 1;
        Ok(self.read("rotation")?.rotation)
    }

    fn root_window_insets(&self) -> Result<Option<WindowInsetsSnapshot>> {
        Ok(self.read("root window insets")?.window_insets)
    }

    fn visible_display_frame(&self) -> Result<Rect> {
        Ok(self.read("visible display frame")?.visible_frame)
    }

    fn window_height(&self) -> Result<i32> {
        Ok(self.read("window height")?.window_height)
    }

    fn dimension_pixel_size(&self, name: &str) -> Result<Option<i32>> {
        let display = self.read("dimension")?;
        Ok(match name {
            sysbars_core::measure::STATUS_BAR_HEIGHT_DIMEN => display.status_bar_dimen,
            _ => None,
        })
    }
}
