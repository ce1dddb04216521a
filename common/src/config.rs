use serde::{Deserialize, Serialize};

use crate::types::Credentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermostatConfig {
    pub fan_on_above_c: f32,
    pub fan_off_below_c: f32,
    /// Drop remote fan on/off commands while the thermostat owns the fan.
    pub ignore_fan_commands_in_auto: bool,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            fan_on_above_c: 30.0,
            fan_off_below_c: 29.0,
            ignore_fan_commands_in_auto: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub interval_ms: u64,
    pub gas_alert_threshold: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            gas_alert_threshold: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub client_id: String,
    pub broker_host: String,
    pub broker_port: u16,
    pub username: String,
    pub password: String,
    pub retry_backoff_ms: u64,
    pub connect_timeout_ms: u64,
    pub keep_alive_secs: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            client_id: "esp32-smart-home".to_string(),
            broker_host: "127.0.0.1".to_string(),
            broker_port: 1883,
            username: String::new(),
            password: String::new(),
            retry_backoff_ms: 2_000,
            connect_timeout_ms: 5_000,
            keep_alive_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub thermostat: ThermostatConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub link: LinkConfig,
}

impl DeviceConfig {
    pub fn sanitize(&mut self) {
        self.thermostat.sanitize();
        self.telemetry.sanitize();
        self.link.sanitize();
    }
}

impl ThermostatConfig {
    pub fn sanitize(&mut self) {
        let thresholds_usable = self.fan_on_above_c.is_finite()
            && self.fan_off_below_c.is_finite()
            && self.fan_off_below_c < self.fan_on_above_c;
        if !thresholds_usable {
            let defaults = Self::default();
            self.fan_on_above_c = defaults.fan_on_above_c;
            self.fan_off_below_c = defaults.fan_off_below_c;
        }
    }
}

impl TelemetryConfig {
    pub fn sanitize(&mut self) {
        if self.interval_ms == 0 {
            self.interval_ms = Self::default().interval_ms;
        }
    }
}

impl LinkConfig {
    pub fn sanitize(&mut self) {
        if self.client_id.trim().is_empty() {
            self.client_id = Self::default().client_id;
        }
        if self.broker_port == 0 {
            self.broker_port = 1883;
        }
        self.retry_backoff_ms = self.retry_backoff_ms.clamp(100, 300_000);
        self.connect_timeout_ms = self.connect_timeout_ms.clamp(500, 60_000);
        self.keep_alive_secs = self.keep_alive_secs.clamp(5, 3_600);
    }

    pub fn credentials(&self) -> Option<Credentials> {
        if self.username.is_empty() {
            None
        } else {
            Some(Credentials {
                username: self.username.clone(),
                password: self.password.clone(),
            })
        }
    }
}
