// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// System bars: native platform bridge.
//
// Defines the window/UI-thread seams, the tier strategies, the inset reporter
// and the `SystemBars` plugin surface, and picks the platform implementation
// at build time: JNI on Android, a simulated window everywhere else.

pub mod events;
mod lifecycle;
pub mod plugin;
pub mod reporter;
pub mod strategy;
pub mod traits;
pub mod ui_thread;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use std::sync::Arc;

use sysbars_core::config::ReporterConfig;
use sysbars_core::error::Result;

pub use events::{CONFIGURATION_CHANGED, EventHub, ListenerHandle};
pub use plugin::{GET_HEIGHTS, PLUGIN_NAME, PendingCall, PluginCall, SystemBarsPlugin};
pub use reporter::InsetReporter;
pub use traits::{UiDispatcher, WindowHost};

/// Window implementation for the target operating system.
pub fn platform_window() -> Arc<dyn WindowHost> {
    #[cfg(target_os = "android")]
    {
        // Android: decor view, display and resources through `jni`.
        Arc::new(android::AndroidWindow::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no system bars, every measurement resolves to zero.
        Arc::new(stub::StubWindow::default())
    }
}

/// Dispatcher for the thread that owns the window.
pub fn platform_dispatcher(config: &ReporterConfig) -> Result<Arc<dyn UiDispatcher>> {
    #[cfg(target_os = "android")]
    {
        let _ = config;
        Ok(Arc::new(android::AndroidUiDispatcher::new()))
    }
    #[cfg(not(target_os = "android"))]
    {
        Ok(Arc::new(ui_thread::DedicatedUiThread::spawn(
            &config.ui_thread_name,
        )?))
    }
}

/// Build the `SystemBars` plugin for the current platform.
pub fn platform_plugin(config: ReporterConfig) -> Result<SystemBarsPlugin> {
    let window = platform_window();
    let dispatcher = platform_dispatcher(&config)?;
    let reporter = InsetReporter::new(window, dispatcher, config.profile);
    Ok(SystemBarsPlugin::new(reporter, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn desktop_plugin_resolves_zeros() {
        let plugin = platform_plugin(ReporterConfig::default()).expect("plugin");
        let (call, pending) = PluginCall::new(GET_HEIGHTS);
        plugin.handle(call).await;

        let value = pending.outcome().await.expect("resolved");
        assert_eq!(value["statusBar"], 0);
        assert_eq!(value["navigationBar"], 0);
        assert_eq!(value["navBarSide"], "bottom");
        assert_eq!(value["orientation"], 0);
    }
}
