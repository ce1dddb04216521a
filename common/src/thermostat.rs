use tracing::{info, warn};

use crate::{
    config::ThermostatConfig,
    state::DeviceState,
    topics::TOPIC_FAN_STATE,
    types::{DeviceAction, FanMode},
};

/// Hysteresis controller for the fan. Only acts while the fan is in
/// [`FanMode::Auto`]; in manual mode remote commands are the sole authority.
#[derive(Debug, Clone)]
pub struct FanThermostat {
    pub config: ThermostatConfig,
    last_temperature_c: Option<f32>,
}

impl FanThermostat {
    pub fn new(mut config: ThermostatConfig) -> Self {
        config.sanitize();
        Self {
            config,
            last_temperature_c: None,
        }
    }

    pub fn last_temperature_c(&self) -> Option<f32> {
        self.last_temperature_c
    }

    /// Feeds one temperature sample. Returns the fan write and the state
    /// publication when, and only when, the fan changes state.
    pub fn update(&mut self, state: &mut DeviceState, temperature_c: f32) -> Vec<DeviceAction> {
        let mut actions = Vec::new();

        if !temperature_c.is_finite() {
            warn!("thermostat ignoring invalid temperature sample");
            return actions;
        }
        self.last_temperature_c = Some(temperature_c);

        if state.fan_mode() != FanMode::Auto {
            return actions;
        }

        if !state.is_fan_on() {
            if temperature_c > self.config.fan_on_above_c {
                self.turn_fan(state, true, temperature_c, &mut actions);
            }
        } else if temperature_c < self.config.fan_off_below_c {
            self.turn_fan(state, false, temperature_c, &mut actions);
        }

        actions
    }

    fn turn_fan(
        &self,
        state: &mut DeviceState,
        on: bool,
        temperature_c: f32,
        actions: &mut Vec<DeviceAction>,
    ) {
        if state.is_fan_on() == on {
            return;
        }

        info!(
            "thermostat switching fan {} at {temperature_c:.2}C",
            if on { "on" } else { "off" }
        );
        state.set_fan_on(on);
        actions.push(DeviceAction::SetFan(on));
        actions.push(DeviceAction::Publish {
            topic: TOPIC_FAN_STATE,
            payload: if on { "on" } else { "off" }.to_string(),
        });
    }
}
