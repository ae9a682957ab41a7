// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-facing plugin surface.
//
// The host shell hands us a `PluginCall` per method invocation and awaits the
// matching `PendingCall`. Notifications flow the other way through the
// plugin's `EventHub`.

use serde_json::Value;
use sysbars_core::config::ReporterConfig;
use sysbars_core::error::{Result, SysBarsError};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::events::{CONFIGURATION_CHANGED, EventHub, ListenerHandle};
use crate::reporter::InsetReporter;

/// Name the plugin is registered under in the host shell.
pub const PLUGIN_NAME: &str = "SystemBars";

/// The one callable method.
pub const GET_HEIGHTS: &str = "getHeights";

/// A single method invocation from the host, resolved or rejected once.
pub struct PluginCall {
    method: String,
    responder: oneshot::Sender<Result<Value>>,
}

/// Host side of a [`PluginCall`].
pub struct PendingCall {
    receiver: oneshot::Receiver<Result<Value>>,
}

impl PluginCall {
    pub fn new(method: impl Into<String>) -> (Self, PendingCall) {
        let (responder, receiver) = oneshot::channel();
        (
            Self {
                method: method.into(),
                responder,
            },
            PendingCall { receiver },
        )
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn resolve(self, data: Value) {
        if self.responder.send(Ok(data)).is_err() {
            debug!(method = %self.method, "caller went away before resolve");
        }
    }

    pub fn reject(self, err: SysBarsError) {
        if self.responder.send(Err(err)).is_err() {
            debug!(method = %self.method, "caller went away before reject");
        }
    }
}

impl PendingCall {
    /// Wait for the plugin to resolve or reject the call.
    ///
    /// A call dropped without an answer yields [`SysBarsError::CallDropped`].
    pub async fn outcome(self) -> Result<Value> {
        self.receiver.await.map_err(|_| SysBarsError::CallDropped)?
    }
}

/// The `SystemBars` plugin: `getHeights` plus `configurationChanged`.
#[derive(Clone)]
pub struct SystemBarsPlugin {
    reporter: InsetReporter,
    events: EventHub,
    config: ReporterConfig,
}

impl SystemBarsPlugin {
    pub fn new(reporter: InsetReporter, config: ReporterConfig) -> Self {
        Self {
            reporter,
            events: EventHub::new(),
            config,
        }
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn reporter(&self) -> &InsetReporter {
        &self.reporter
    }

    /// Whether `other` is this plugin or a clone of it.
    pub fn same_instance(&self, other: &SystemBarsPlugin) -> bool {
        self.events.same_hub(&other.events)
    }

    /// Hook the plugin into the platform's lifecycle callbacks.
    pub fn load(&self) {
        crate::lifecycle::loaded().register(self);
        info!(plugin = PLUGIN_NAME, tier = ?self.reporter.tier(), "plugin loaded");
    }

    /// Detach from lifecycle callbacks and drop every listener.
    ///
    /// A plugin loaded after this one keeps receiving callbacks.
    pub fn unload(&self) {
        if !crate::lifecycle::loaded().unregister(self) {
            debug!("plugin was not the loaded instance");
        }
        self.events.remove_all_listeners();
        info!(plugin = PLUGIN_NAME, "plugin unloaded");
    }

    /// Dispatch a host call by method name.
    pub async fn handle(&self, call: PluginCall) {
        match call.method() {
            GET_HEIGHTS => self.get_heights(call).await,
            other => {
                warn!(method = other, "unknown plugin method");
                let method = other.to_owned();
                call.reject(SysBarsError::UnknownMethod(method));
            }
        }
    }

    /// Resolve `call` with the current inset report.
    pub async fn get_heights(&self, call: PluginCall) {
        match self.reporter.get_heights().await.and_then(|r| r.to_json()) {
            Ok(report) => call.resolve(report),
            Err(e) => {
                error!(error = %e, "getHeights could not run");
                call.reject(e);
            }
        }
    }

    /// Platform configuration-change hook.
    ///
    /// Re-broadcasts `configurationChanged` with no payload. Returns the
    /// number of listeners notified.
    pub fn handle_on_configuration_changed(&self) -> usize {
        if !self.config.configuration_events {
            debug!("configuration change ignored, events disabled");
            return 0;
        }
        self.events.notify_listeners(CONFIGURATION_CHANGED, None)
    }

    pub fn add_listener<F>(&self, event: &str, listener: F) -> ListenerHandle
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        self.events.add_listener(event, listener)
    }

    pub fn remove_listener(&self, handle: &ListenerHandle) -> bool {
        self.events.remove_listener(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use sysbars_core::config::ReportProfile;

    use crate::stub::{SimulatedDisplay, StubWindow};
    use crate::ui_thread::DedicatedUiThread;

    fn plugin(display: SimulatedDisplay, config: ReporterConfig) -> SystemBarsPlugin {
        let window = Arc::new(StubWindow::new(display));
        let ui = Arc::new(DedicatedUiThread::spawn("test-ui").expect("spawn"));
        let reporter = InsetReporter::new(window, ui, config.profile);
        SystemBarsPlugin::new(reporter, config)
    }

    async fn call(plugin: &SystemBarsPlugin, method: &str) -> Result<Value> {
        let (call, pending) = PluginCall::new(method);
        plugin.handle(call).await;
        pending.outcome().await
    }

    #[tokio::test]
    async fn get_heights_resolves_with_report() {
        let p = plugin(SimulatedDisplay::legacy_phone(), ReporterConfig::default());

        let value = call(&p, GET_HEIGHTS).await.expect("resolved");
        assert_eq!(
            value,
            serde_json::json!({
                "statusBar": 24,
                "navigationBar": 56,
                "navBarLeft": 0,
                "navBarRight": 0,
                "navBarSide": "bottom",
                "orientation": 0,
            })
        );
    }

    #[tokio::test]
    async fn basic_profile_resolves_two_keys() {
        let config = ReporterConfig {
            profile: ReportProfile::Basic,
            ..ReporterConfig::default()
        };
        let p = plugin(SimulatedDisplay::pixel_portrait(), config);

        let value = call(&p, GET_HEIGHTS).await.expect("resolved");
        assert_eq!(value, serde_json::json!({"statusBar": 63, "navigationBar": 48}));
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let p = plugin(SimulatedDisplay::default(), ReporterConfig::default());

        let result = call(&p, "setColor").await;
        assert!(matches!(result, Err(SysBarsError::UnknownMethod(m)) if m == "setColor"));
    }

    #[tokio::test]
    async fn configuration_change_notifies_once_without_payload() {
        let p = plugin(SimulatedDisplay::pixel_portrait(), ReporterConfig::default());
        p.load();
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&payloads);
        p.add_listener(CONFIGURATION_CHANGED, move |payload| {
            seen.lock().unwrap().push(payload.cloned());
        });

        let before = call(&p, GET_HEIGHTS).await.expect("resolved");
        assert_eq!(p.handle_on_configuration_changed(), 1);
        assert_eq!(*payloads.lock().unwrap(), vec![None]);

        // The notification carries no data and changes nothing measured.
        let after = call(&p, GET_HEIGHTS).await.expect("resolved");
        assert_eq!(before, after);
        p.unload();
    }

    #[tokio::test]
    async fn disabled_events_notify_nobody() {
        let config = ReporterConfig {
            configuration_events: false,
            ..ReporterConfig::default()
        };
        let p = plugin(SimulatedDisplay::default(), config);
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        p.add_listener(CONFIGURATION_CHANGED, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(p.handle_on_configuration_changed(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unload_drops_listeners() {
        let p = plugin(SimulatedDisplay::default(), ReporterConfig::default());
        p.load();
        let handle = p.add_listener(CONFIGURATION_CHANGED, |_| {});
        p.unload();

        assert_eq!(p.handle_on_configuration_changed(), 0);
        assert!(!p.remove_listener(&handle));
    }

    #[tokio::test]
    async fn unavailable_platform_still_resolves() {
        let display = SimulatedDisplay {
            reads_fail: true,
            ..SimulatedDisplay::pixel_portrait()
        };
        let p = plugin(display, ReporterConfig::default());

        let value = call(&p, GET_HEIGHTS).await.expect("resolved");
        assert_eq!(value["statusBar"], 0);
        assert_eq!(value["navigationBar"], 0);
        assert_eq!(value["navBarSide"], "bottom");
        assert_eq!(value["orientation"], 0);
    }

    #[tokio::test]
    async fn clones_are_the_same_instance() {
        let p = plugin(SimulatedDisplay::default(), ReporterConfig::default());
        let other = plugin(SimulatedDisplay::default(), ReporterConfig::default());

        assert!(p.same_instance(&p.clone()));
        assert!(!p.same_instance(&other));
    }

    #[tokio::test]
    async fn dropped_call_reports_an_error() {
        let (call, pending) = PluginCall::new(GET_HEIGHTS);
        drop(call);
        assert!(matches!(pending.outcome().await, Err(SysBarsError::CallDropped)));
    }
}
