use serde::{Deserialize, Serialize};

use crate::error::SensorReadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FanMode {
    #[default]
    Manual,
    Auto,
}

impl FanMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Auto => "AUTO",
        }
    }

    /// Wire flag used in the init snapshot: the dashboard reads `0` as auto
    /// and `1` as manual.
    pub fn as_flag(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Manual => 1,
        }
    }
}

/// One reading from the climate and gas sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub humidity: f32,
    pub temperature: f32,
    pub gas_level: u16,
}

impl SensorSample {
    pub fn has_valid_climate(&self) -> bool {
        self.humidity.is_finite() && self.temperature.is_finite()
    }

    /// Temperature to feed the thermostat, if the climate half of the
    /// sample can be trusted.
    pub fn checked_temperature(&self) -> Result<f32, SensorReadError> {
        if self.has_valid_climate() {
            Ok(self.temperature)
        } else {
            Err(SensorReadError::InvalidClimate {
                humidity: self.humidity,
                temperature: self.temperature,
            })
        }
    }

    /// Telemetry payload, `"<humidity> <temperature>"` with two decimals.
    pub fn climate_payload(&self) -> String {
        format!("{:.2} {:.2}", self.humidity, self.temperature)
    }

    pub fn gas_payload(&self) -> String {
        self.gas_level.to_string()
    }
}

/// Fixed-order view of the device state, as sent on the init topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub lamp_color: Rgb,
    pub fan_mode: FanMode,
    pub fan_on: bool,
    pub lamp_on: bool,
}

impl Snapshot {
    /// `"r g b fan_mode fan_on lamp_on"`, each a single unsigned byte.
    pub fn to_payload(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.lamp_color.red,
            self.lamp_color.green,
            self.lamp_color.blue,
            self.fan_mode.as_flag(),
            u8::from(self.fan_on),
            u8::from(self.lamp_on),
        )
    }
}

/// Side effect requested by the core. Executed in order by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAction {
    SetLamp(Rgb),
    SetFan(bool),
    Publish {
        topic: &'static str,
        payload: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
