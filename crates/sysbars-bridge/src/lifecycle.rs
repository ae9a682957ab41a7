// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide slot for the loaded plugin.
//
// Platform callbacks such as `onConfigurationChanged` arrive without a plugin
// handle; they reach whichever instance is currently loaded through here.

use std::sync::{Mutex, PoisonError};

use crate::plugin::SystemBarsPlugin;

/// Holds at most one loaded plugin.
pub(crate) struct PluginSlot {
    active: Mutex<Option<SystemBarsPlugin>>,
}

impl PluginSlot {
    pub(crate) const fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    /// Make `plugin` the receiver of platform callbacks, replacing any other.
    pub(crate) fn register(&self, plugin: &SystemBarsPlugin) {
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(plugin.clone());
        if previous.is_some_and(|p| !p.same_instance(plugin)) {
            tracing::debug!("previously loaded plugin replaced");
        }
    }

    /// Clear the slot if it still holds `plugin` (or a clone of it).
    ///
    /// Returns false when another instance has been loaded since, which is
    /// then left in place.
    pub(crate) fn unregister(&self, plugin: &SystemBarsPlugin) -> bool {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref().is_some_and(|p| p.same_instance(plugin)) {
            active.take();
            true
        } else {
            false
        }
    }

    pub(crate) fn active(&self) -> Option<SystemBarsPlugin> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

static LOADED: PluginSlot = PluginSlot::new();

/// The slot `load`/`unload` operate on.
pub(crate) fn loaded() -> &'static PluginSlot {
    &LOADED
}
