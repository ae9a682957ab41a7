// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// System bars: core types, measurement rules and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod measure;
pub mod types;

pub use config::{ReportProfile, ReporterConfig};
pub use error::SysBarsError;
pub use measure::BarMeasurements;
pub use types::*;
