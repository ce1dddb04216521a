//! Boundaries between the device core and the outside world.
//!
//! The core only talks to the link, the sensors and the actuators through
//! these traits; adapters for real hardware or a host broker live in the
//! controller binary, and tests substitute recording mocks.

use crate::{
    error::{ConnectError, TransportError},
    types::{Credentials, InboundMessage, Rgb},
};

/// Publish/subscribe link.
pub trait Transport {
    /// Opens a fresh session. May block, but must return within a bounded
    /// time. Subscriptions from any previous session are gone afterwards.
    fn connect(
        &mut self,
        client_id: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), ConnectError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Fire-and-forget; success means the message was handed to the client.
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;

    /// Next pending inbound message, without blocking.
    fn poll(&mut self) -> Option<InboundMessage>;

    fn is_connected(&self) -> bool;
}

pub trait SensorDriver {
    /// `(humidity, temperature_c)`; NaN components on read failure.
    fn read_temperature_humidity(&mut self) -> (f32, f32);

    fn read_gas_level(&mut self) -> u16;
}

/// Actuator writes have no acknowledgement.
pub trait ActuatorDriver {
    fn set_lamp(&mut self, color: Rgb);

    fn set_fan(&mut self, on: bool);
}
