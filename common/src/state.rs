use crate::types::{FanMode, Rgb, Snapshot};

/// Actuator configuration of the device. Mutators never fail; callers
/// validate their input first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    lamp_color: Rgb,
    lamp_on: bool,
    fan_mode: FanMode,
    fan_on: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            lamp_color: Rgb::WHITE,
            lamp_on: false,
            fan_mode: FanMode::Manual,
            fan_on: false,
        }
    }
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lamp_color(&self) -> Rgb {
        self.lamp_color
    }

    pub fn is_lamp_on(&self) -> bool {
        self.lamp_on
    }

    pub fn fan_mode(&self) -> FanMode {
        self.fan_mode
    }

    pub fn is_fan_on(&self) -> bool {
        self.fan_on
    }

    /// Color the lamp should show given its power state.
    pub fn lamp_output(&self) -> Rgb {
        if self.lamp_on {
            self.lamp_color
        } else {
            Rgb::BLACK
        }
    }

    pub fn set_lamp_color(&mut self, color: Rgb) {
        self.lamp_color = color;
    }

    pub fn set_lamp_on(&mut self, on: bool) {
        self.lamp_on = on;
    }

    pub fn set_fan_mode(&mut self, mode: FanMode) {
        self.fan_mode = mode;
    }

    pub fn set_fan_on(&mut self, on: bool) {
        self.fan_on = on;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lamp_color: self.lamp_color,
            fan_mode: self.fan_mode,
            fan_on: self.fan_on,
            lamp_on: self.lamp_on,
        }
    }
}
