use tracing::info;

use smarthome_common::{ActuatorDriver, Rgb};

/// Host actuators: there is no PWM or relay pin, so each write is logged and
/// the last driven level kept for inspection.
#[derive(Debug, Default)]
pub struct LoggingActuators {
    lamp: Option<Rgb>,
    fan: Option<bool>,
    writes: u64,
}

impl LoggingActuators {
    pub fn lamp(&self) -> Option<Rgb> {
        self.lamp
    }

    pub fn fan(&self) -> Option<bool> {
        self.fan
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl ActuatorDriver for LoggingActuators {
    fn set_lamp(&mut self, color: Rgb) {
        self.writes += 1;
        self.lamp = Some(color);
        info!(
            "lamp output r={} g={} b={}",
            color.red, color.green, color.blue
        );
    }

    fn set_fan(&mut self, on: bool) {
        self.writes += 1;
        self.fan = Some(on);
        info!("fan relay {}", if on { "on" } else { "off" });
    }
}
