//! Remote command protocol.
//!
//! Lamp commands are a small token grammar (`switch on|off`,
//! `color <r> <g> <b>`) and are strictly validated. The fan topics keep the
//! firmware's historical catch-all policy: exactly `"on"` / `"auto"` is the
//! positive case and every other payload, empty included, is the negative
//! one.

use tracing::info;

use crate::{
    config::ThermostatConfig,
    error::ParseError,
    state::DeviceState,
    topics::{TOPIC_FAN_MODE, TOPIC_FAN_STATE, TOPIC_LAMP},
    types::{DeviceAction, FanMode, Rgb},
};

/// Larger payloads are dropped before tokenizing.
pub const MAX_PAYLOAD_BYTES: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    LampPower(bool),
    LampColor(Rgb),
    FanPower(bool),
    FanMode(FanMode),
}

impl Command {
    /// Decodes one inbound message. Topics that carry no command (telemetry
    /// echo, gas, init) yield `Ok(None)`.
    pub fn parse(topic: &str, payload: &str) -> Result<Option<Self>, ParseError> {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(ParseError::PayloadTooLarge(payload.len()));
        }

        let command = match topic {
            TOPIC_LAMP => parse_lamp(payload)?,
            TOPIC_FAN_STATE => Self::FanPower(payload == "on"),
            TOPIC_FAN_MODE => Self::FanMode(if payload == "auto" {
                FanMode::Auto
            } else {
                FanMode::Manual
            }),
            _ => return Ok(None),
        };

        Ok(Some(command))
    }

    /// Applies the command to `state` and returns the actuator writes it
    /// requires.
    pub fn apply(self, state: &mut DeviceState, config: &ThermostatConfig) -> Vec<DeviceAction> {
        match self {
            Self::LampPower(on) => {
                state.set_lamp_on(on);
                vec![DeviceAction::SetLamp(state.lamp_output())]
            }
            // Drives the lamp even while it is logically off.
            Self::LampColor(color) => {
                state.set_lamp_color(color);
                vec![DeviceAction::SetLamp(color)]
            }
            Self::FanPower(on) => {
                if config.ignore_fan_commands_in_auto && state.fan_mode() == FanMode::Auto {
                    info!("fan command ignored while thermostat is in AUTO mode");
                    return Vec::new();
                }
                state.set_fan_on(on);
                vec![DeviceAction::SetFan(on)]
            }
            Self::FanMode(mode) => {
                state.set_fan_mode(mode);
                Vec::new()
            }
        }
    }
}

fn parse_lamp(payload: &str) -> Result<Command, ParseError> {
    let mut tokens = payload.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Err(ParseError::Empty);
    };

    match keyword {
        "switch" => match tokens.next() {
            Some("on") => Ok(Command::LampPower(true)),
            Some("off") => Ok(Command::LampPower(false)),
            Some(other) => Err(ParseError::InvalidSwitch(other.to_string())),
            None => Err(ParseError::MissingArgument("switch state")),
        },
        "color" => {
            let red = parse_channel(tokens.next(), "red")?;
            let green = parse_channel(tokens.next(), "green")?;
            let blue = parse_channel(tokens.next(), "blue")?;
            Ok(Command::LampColor(Rgb::new(red, green, blue)))
        }
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_channel(token: Option<&str>, channel: &'static str) -> Result<u8, ParseError> {
    let token = token.ok_or(ParseError::MissingArgument(channel))?;
    let value = token
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidChannel {
            channel,
            value: token.to_string(),
        })?;
    Ok(value.clamp(0, u8::MAX as i64) as u8)
}
