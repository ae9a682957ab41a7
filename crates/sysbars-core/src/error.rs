// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the system bars bridge.
//
// Degraded measurements are never errors: a missing inset object or an
// unresolvable resource yields a default value. Only infrastructure failures
// surface here.

use thiserror::Error;

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum SysBarsError {
    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- UI dispatch --
    #[error("UI thread is not accepting tasks")]
    UiThreadUnavailable,

    #[error("UI task was dropped before it produced a result")]
    UiTaskDropped,

    // -- Host call surface --
    #[error("unknown plugin method: {0}")]
    UnknownMethod(String),

    #[error("plugin call was dropped before it was resolved")]
    CallDropped,

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SysBarsError>;
