// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inset reporter: the `getHeights` operation.
//
// Each call submits one measurement task to the UI dispatcher and awaits the
// packaged report. Nothing is cached between calls.

use std::sync::Arc;

use sysbars_core::config::ReportProfile;
use sysbars_core::error::Result;
use sysbars_core::types::{CapabilityTier, InsetReport};
use tracing::{debug, info, warn};

use crate::strategy::{InsetStrategy, read_orientation, strategy_for};
use crate::traits::{UiDispatcher, WindowHost};
use crate::ui_thread::run_on_ui;

/// Measures status and navigation bars on demand.
///
/// Cheap to clone; clones share the window, dispatcher and strategy.
#[derive(Clone)]
pub struct InsetReporter {
    window: Arc<dyn WindowHost>,
    dispatcher: Arc<dyn UiDispatcher>,
    strategy: Arc<dyn InsetStrategy>,
    profile: ReportProfile,
}

impl InsetReporter {
    /// Create a reporter, picking the strategy from the window's API level.
    ///
    /// An unreadable API level selects the visible-frame tier, which every
    /// Android version supports.
    pub fn new(
        window: Arc<dyn WindowHost>,
        dispatcher: Arc<dyn UiDispatcher>,
        profile: ReportProfile,
    ) -> Self {
        let tier = match window.sdk_level() {
            Ok(sdk_level) => {
                let tier = CapabilityTier::for_sdk(sdk_level);
                info!(
                    platform = window.platform_name(),
                    sdk_level,
                    ?tier,
                    ?profile,
                    "inset reporter ready"
                );
                tier
            }
            Err(e) => {
                warn!(
                    platform = window.platform_name(),
                    error = %e,
                    ?profile,
                    "API level unavailable, using visible-frame measurement"
                );
                CapabilityTier::VisibleFrame
            }
        };
        Self::with_strategy(window, dispatcher, Arc::from(strategy_for(tier)), profile)
    }

    /// Create a reporter with an explicit strategy.
    pub fn with_strategy(
        window: Arc<dyn WindowHost>,
        dispatcher: Arc<dyn UiDispatcher>,
        strategy: Arc<dyn InsetStrategy>,
        profile: ReportProfile,
    ) -> Self {
        Self {
            window,
            dispatcher,
            strategy,
            profile,
        }
    }

    pub fn tier(&self) -> CapabilityTier {
        self.strategy.tier()
    }

    pub fn profile(&self) -> ReportProfile {
        self.profile
    }

    /// Measure the bars on the UI thread and return a fresh report.
    ///
    /// Only fails if the UI thread cannot run the task; every measurement
    /// path has a default.
    pub async fn get_heights(&self) -> Result<InsetReport> {
        let window = Arc::clone(&self.window);
        let strategy = Arc::clone(&self.strategy);
        let profile = self.profile;

        run_on_ui(self.dispatcher.as_ref(), move || {
            measure_report(window.as_ref(), strategy.as_ref(), profile)
        })
        .await
    }
}

/// Build a report from the current window state. Must run on the UI thread.
pub fn measure_report(
    window: &dyn WindowHost,
    strategy: &dyn InsetStrategy,
    profile: ReportProfile,
) -> InsetReport {
    let measurements = strategy.measure(window);
    let orientation = profile
        .reports_orientation()
        .then(|| read_orientation(window));
    let report = InsetReport::assemble(measurements, orientation, profile);

    debug!(
        tier = ?strategy.tier(),
        status_bar = report.status_bar,
        navigation_bar = report.navigation_bar,
        side = ?report.nav_bar_side,
        orientation = ?report.orientation,
        "measured system bars"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{SimulatedDisplay, StubWindow};
    use crate::ui_thread::DedicatedUiThread;
    use sysbars_core::types::{Insets, NavBarSide, Orientation, WindowInsetsSnapshot};

    fn reporter(
        display: SimulatedDisplay,
        profile: ReportProfile,
    ) -> (InsetReporter, Arc<StubWindow>, Arc<DedicatedUiThread>) {
        let window = Arc::new(StubWindow::new(display));
        let ui = Arc::new(DedicatedUiThread::spawn("test-ui").expect("spawn"));
        let reporter = InsetReporter::new(window.clone(), ui.clone(), profile);
        (reporter, window, ui)
    }

    #[tokio::test]
    async fn legacy_end_to_end() {
        let (reporter, _window, _ui) = reporter(
            SimulatedDisplay {
                rotation: 1,
                ..SimulatedDisplay::legacy_phone()
            },
            ReportProfile::Extended,
        );
        assert_eq!(reporter.tier(), CapabilityTier::VisibleFrame);

        let report = reporter.get_heights().await.expect("report");
        assert_eq!(report.orientation, Some(Orientation::Deg90));
        assert_eq!(report.status_bar, 24);
        assert_eq!(report.navigation_bar, 56);
        assert_eq!(report.nav_bar_left, Some(0));
        assert_eq!(report.nav_bar_right, Some(0));
        assert_eq!(report.nav_bar_side, Some(NavBarSide::Bottom));
    }

    #[tokio::test]
    async fn modern_tier_without_insets_reports_zeros() {
        let (reporter, _window, _ui) =
            reporter(SimulatedDisplay::default(), ReportProfile::Extended);
        assert_eq!(reporter.tier(), CapabilityTier::WindowInsets);

        let report = reporter.get_heights().await.expect("report");
        assert_eq!(report.status_bar, 0);
        assert_eq!(report.navigation_bar, 0);
        assert_eq!(report.nav_bar_left, Some(0));
        assert_eq!(report.nav_bar_right, Some(0));
        assert_eq!(report.nav_bar_side, Some(NavBarSide::Bottom));
    }

    #[tokio::test]
    async fn basic_profile_without_insets() {
        let (reporter, window, _ui) = reporter(SimulatedDisplay::default(), ReportProfile::Basic);

        let report = reporter.get_heights().await.expect("report");
        assert_eq!(
            report.to_json().expect("json"),
            serde_json::json!({"statusBar": 0, "navigationBar": 0})
        );
        // Basic profile never looks at the display rotation.
        assert_eq!(window.rotation_reads(), 0);
    }

    #[tokio::test]
    async fn landscape_left_navigation() {
        let (reporter, _window, _ui) = reporter(
            SimulatedDisplay {
                rotation: 3,
                window_insets: Some(WindowInsetsSnapshot {
                    system_bars: Insets::new(126, 63, 0, 0),
                    navigation_bars: Insets::new(126, 0, 0, 0),
                }),
                ..SimulatedDisplay::default()
            },
            ReportProfile::Extended,
        );

        let report = reporter.get_heights().await.expect("report");
        assert_eq!(report.status_bar, 63);
        assert_eq!(report.navigation_bar, 0);
        assert_eq!(report.nav_bar_left, Some(126));
        assert_eq!(report.nav_bar_side, Some(NavBarSide::Left));
        assert_eq!(report.orientation, Some(Orientation::Deg270));
    }

    #[tokio::test]
    async fn window_is_only_read_on_the_ui_thread() {
        let (reporter, window, ui) = reporter(
            SimulatedDisplay::pixel_portrait(),
            ReportProfile::Extended,
        );

        for _ in 0..3 {
            reporter.get_heights().await.expect("report");
        }

        let readers = window.reader_threads();
        assert!(!readers.is_empty());
        assert!(readers.iter().all(|id| *id == ui.thread_id()));
    }

    #[tokio::test]
    async fn each_call_reads_fresh_state() {
        let (reporter, window, _ui) = reporter(
            SimulatedDisplay::pixel_portrait(),
            ReportProfile::Extended,
        );
        let portrait = reporter.get_heights().await.expect("report");
        assert_eq!(portrait.orientation, Some(Orientation::Deg0));

        window.set_display(SimulatedDisplay {
            rotation: 1,
            window_insets: Some(WindowInsetsSnapshot {
                system_bars: Insets::new(0, 63, 126, 0),
                navigation_bars: Insets::new(0, 0, 126, 0),
            }),
            ..SimulatedDisplay::pixel_portrait()
        });
        let landscape = reporter.get_heights().await.expect("report");
        assert_eq!(landscape.orientation, Some(Orientation::Deg90));
        assert_eq!(landscape.nav_bar_side, Some(NavBarSide::Right));
        assert_ne!(portrait, landscape);
    }

    #[tokio::test]
    async fn unreadable_api_level_falls_back_to_visible_frame() {
        let (reporter, _window, _ui) = reporter(
            SimulatedDisplay {
                reads_fail: true,
                ..SimulatedDisplay::default()
            },
            ReportProfile::Extended,
        );
        assert_eq!(reporter.tier(), CapabilityTier::VisibleFrame);

        // Every read fails, yet the call still resolves with defaults.
        let report = reporter.get_heights().await.expect("report");
        assert_eq!(report.status_bar, 0);
        assert_eq!(report.navigation_bar, 0);
        assert_eq!(report.nav_bar_side, Some(NavBarSide::Bottom));
        assert_eq!(report.orientation, Some(Orientation::Deg0));
    }

    #[tokio::test]
    async fn stopped_ui_thread_is_an_error() {
        let (reporter, _window, ui) = reporter(SimulatedDisplay::default(), ReportProfile::Basic);
        ui.shutdown();

        assert!(reporter.get_heights().await.is_err());
    }
}
