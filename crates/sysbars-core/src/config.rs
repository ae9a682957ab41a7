// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reporter configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SysBarsError};

/// Which field set `getHeights` reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportProfile {
    /// `statusBar` and `navigationBar` only.
    Basic,
    /// Adds navigation bar edges, its side and the display orientation.
    #[default]
    Extended,
}

impl ReportProfile {
    /// Whether the display rotation is read at all.
    pub fn reports_orientation(&self) -> bool {
        matches!(self, Self::Extended)
    }
}

/// Settings for the inset reporter and its plugin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Field set returned by `getHeights`.
    pub profile: ReportProfile,
    /// Re-broadcast platform configuration changes as `configurationChanged`.
    pub configuration_events: bool,
    /// Name of the dedicated UI thread on platforms without a native one.
    pub ui_thread_name: String,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            profile: ReportProfile::Extended,
            configuration_events: true,
            ui_thread_name: "sysbars-ui".into(),
        }
    }
}

impl ReporterConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        tracing::info!(path = %path.display(), profile = ?config.profile, "config loaded");
        Ok(config)
    }

    /// Persist configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.ui_thread_name.trim().is_empty() {
            return Err(SysBarsError::Config("ui_thread_name must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_report_everything() {
        let config = ReporterConfig::default();
        assert_eq!(config.profile, ReportProfile::Extended);
        assert!(config.profile.reports_orientation());
        assert!(config.configuration_events);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ReporterConfig::load(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, ReporterConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sysbars.json");
        let config = ReporterConfig {
            profile: ReportProfile::Basic,
            configuration_events: false,
            ui_thread_name: "window-owner".into(),
        };
        config.save(&path).expect("save");

        assert_eq!(ReporterConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sysbars.json");
        std::fs::write(&path, r#"{"profile": "basic"}"#).expect("write");

        let config = ReporterConfig::load(&path).expect("load");
        assert_eq!(config.profile, ReportProfile::Basic);
        assert!(config.configuration_events);
        assert_eq!(config.ui_thread_name, "sysbars-ui");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sysbars.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            ReporterConfig::load(&path),
            Err(SysBarsError::Serialization(_))
        ));

        std::fs::write(&path, r#"{"ui_thread_name": "  "}"#).expect("write");
        assert!(matches!(ReporterConfig::load(&path), Err(SysBarsError::Config(_))));
    }
}
