//! Recording port doubles for driving `DeviceController` without a broker
//! or hardware.

#![allow(dead_code)]

use std::collections::VecDeque;

use smarthome_common::{
    ActuatorDriver, ConnectError, Credentials, InboundMessage, Rgb, SensorDriver, Transport,
    TransportError,
};

// ── Transport ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum LinkCall {
    Connect(String),
    Subscribe(String),
    Publish { topic: String, payload: String },
    Delivered { topic: String, payload: String },
}

#[derive(Default)]
pub struct MockTransport {
    pub calls: Vec<LinkCall>,
    pub inbound: VecDeque<InboundMessage>,
    pub connect_failures: u32,
    pub connected: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_inbound(&mut self, topic: &str, payload: &str) {
        self.inbound.push_back(InboundMessage::new(topic, payload));
    }

    pub fn drop_link(&mut self) {
        self.connected = false;
    }

    pub fn published(&self, topic: &str) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                LinkCall::Publish { topic: t, payload } if t == topic => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn connect_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, LinkCall::Connect(_)))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Transport for MockTransport {
    fn connect(
        &mut self,
        client_id: &str,
        _credentials: Option<&Credentials>,
    ) -> Result<(), ConnectError> {
        self.calls.push(LinkCall::Connect(client_id.to_string()));
        if self.connect_failures > 0 {
            self.connect_failures -= 1;
            self.connected = false;
            return Err(ConnectError::Refused("server unavailable".to_string()));
        }
        self.connected = true;
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.calls.push(LinkCall::Subscribe(topic.to_string()));
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.calls.push(LinkCall::Publish {
            topic: topic.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        if !self.connected {
            return None;
        }
        let message = self.inbound.pop_front()?;
        self.calls.push(LinkCall::Delivered {
            topic: message.topic.clone(),
            payload: message.payload.clone(),
        });
        Some(message)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ── Sensor ────────────────────────────────────────────────────

pub struct MockSensor {
    pub climate: VecDeque<(f32, f32)>,
    pub fallback_climate: (f32, f32),
    pub gas_level: u16,
    pub reads: usize,
}

impl MockSensor {
    pub fn new() -> Self {
        Self {
            climate: VecDeque::new(),
            fallback_climate: (45.0, 22.0),
            gas_level: 400,
            reads: 0,
        }
    }

    pub fn with_temperatures(temperatures: &[f32]) -> Self {
        let mut sensor = Self::new();
        sensor.climate = temperatures.iter().map(|temp| (50.0, *temp)).collect();
        sensor
    }
}

impl SensorDriver for MockSensor {
    fn read_temperature_humidity(&mut self) -> (f32, f32) {
        self.reads += 1;
        self.climate.pop_front().unwrap_or(self.fallback_climate)
    }

    fn read_gas_level(&mut self) -> u16 {
        self.gas_level
    }
}

// ── Actuators ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Lamp(Rgb),
    Fan(bool),
}

#[derive(Default)]
pub struct MockActuators {
    pub calls: Vec<ActuatorCall>,
}

impl MockActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_lamp(&self) -> Option<Rgb> {
        self.calls.iter().rev().find_map(|call| match call {
            ActuatorCall::Lamp(color) => Some(*color),
            ActuatorCall::Fan(_) => None,
        })
    }

    pub fn fan_writes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ActuatorCall::Fan(on) => Some(*on),
                ActuatorCall::Lamp(_) => None,
            })
            .collect()
    }
}

impl ActuatorDriver for MockActuators {
    fn set_lamp(&mut self, color: Rgb) {
        self.calls.push(ActuatorCall::Lamp(color));
    }

    fn set_fan(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Fan(on));
    }
}
