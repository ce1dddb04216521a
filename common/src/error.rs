//! Error kinds surfaced by the device core.
//!
//! None of these are fatal: the control loop logs them and moves on.

use thiserror::Error;

/// A command payload that could not be decoded. The command is discarded
/// and device state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command payload")]
    Empty,
    #[error("unknown lamp command `{0}`")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid switch state `{0}`, expected `on` or `off`")]
    InvalidSwitch(String),
    #[error("invalid {channel} channel value `{value}`")]
    InvalidChannel {
        channel: &'static str,
        value: String,
    },
    #[error("payload too large ({0} bytes)")]
    PayloadTooLarge(usize),
}

/// A sensor sample that cannot be trusted for publication or control.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SensorReadError {
    #[error("invalid climate reading (humidity={humidity}, temperature={temperature})")]
    InvalidClimate { humidity: f32, temperature: f32 },
}

/// Failure of a single publish/subscribe operation on the link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("link not connected")]
    NotConnected,
    #[error("transport client error: {0}")]
    Client(String),
}

/// Failure to bring the messaging link up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("broker connection failed: {0}")]
    Refused(String),
    #[error("no connection acknowledgement within {0} ms")]
    Timeout(u64),
    #[error("subscribe after connect failed")]
    Subscribe(#[source] TransportError),
}
