// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vision engine readiness — bounded polling before detection may run.

use std::time::Duration;

use pagewerk_core::config::EngineConfig;
use pagewerk_core::error::{Result, ScanError};
use tracing::{debug, info, warn};

/// A backend that must report ready before detection runs on it.
pub trait VisionEngine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Whether the engine can accept work right now.
    fn is_ready(&self) -> bool;
}

/// The in-process `imageproc` backend. Always ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEngine;

impl VisionEngine for LocalEngine {
    fn name(&self) -> &str {
        "imageproc"
    }

    fn is_ready(&self) -> bool {
        true
    }
}

/// Polls an engine at a fixed interval up to a fixed number of attempts.
#[derive(Debug, Clone)]
pub struct EngineGate {
    poll_interval: Duration,
    max_attempts: u32,
}

impl Default for EngineGate {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl EngineGate {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Worst-case time spent waiting before giving up.
    pub fn ceiling(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }

    /// Wait until `engine` reports ready.
    ///
    /// Checks up to `max_attempts` times, sleeping `poll_interval` between
    /// checks, and fails with [`ScanError::EngineUnavailable`] if the engine
    /// never becomes ready.
    pub async fn wait_ready(&self, engine: &dyn VisionEngine) -> Result<()> {
        for attempt in 1..=self.max_attempts {
            if engine.is_ready() {
                if attempt > 1 {
                    info!(engine = engine.name(), attempt, "Vision engine ready");
                }
                return Ok(());
            }
            debug!(engine = engine.name(), attempt, "Vision engine not ready yet");
            if attempt < self.max_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        warn!(
            engine = engine.name(),
            attempts = self.max_attempts,
            ceiling_ms = self.ceiling().as_millis() as u64,
            "Vision engine unavailable"
        );
        Err(ScanError::EngineUnavailable {
            attempts: self.max_attempts,
        })
    }
}
