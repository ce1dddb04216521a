use tracing::warn;

use crate::config::TelemetryConfig;

/// Elapsed-time ticker for the sensor read/publish cycle.
///
/// A late check simply fires late and restarts the period from that
/// moment; missed periods are never replayed.
#[derive(Debug, Clone)]
pub struct TelemetryScheduler {
    interval_ms: u64,
    last_tick_ms: u64,
    gas_alert: GasAlert,
}

impl TelemetryScheduler {
    pub fn new(config: &TelemetryConfig) -> Self {
        let mut config = config.clone();
        config.sanitize();
        Self {
            interval_ms: config.interval_ms,
            last_tick_ms: 0,
            gas_alert: GasAlert::new(config.gas_alert_threshold),
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_tick_ms) >= self.interval_ms
    }

    /// Returns true and starts a new period when a tick is due.
    pub fn poll_due(&mut self, now_ms: u64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        self.last_tick_ms = now_ms;
        true
    }

    pub fn gas_alert(&mut self) -> &mut GasAlert {
        &mut self.gas_alert
    }
}

/// Latched high-gas warning: reported once when the level reaches the
/// threshold, re-armed once it falls back below.
#[derive(Debug, Clone)]
pub struct GasAlert {
    threshold: u16,
    active: bool,
}

impl GasAlert {
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true only on the reading that raises the alert.
    pub fn observe(&mut self, gas_level: u16) -> bool {
        if gas_level >= self.threshold {
            if self.active {
                return false;
            }
            self.active = true;
            warn!(
                "gas level {gas_level} reached alert threshold {}",
                self.threshold
            );
            true
        } else {
            self.active = false;
            false
        }
    }
}
