//! The device context: owns the state and every component, and runs one
//! cooperative scheduling pass per [`DeviceController::run_once`] call.
//!
//! Everything here runs on a single thread. Command dispatch, thermostat
//! evaluation and snapshot publication each complete before the next one
//! starts, so `DeviceState` needs no locking as long as the controller is
//! only driven from one loop.

use tracing::{debug, info, warn};

use crate::{
    command::Command,
    config::DeviceConfig,
    error::ParseError,
    ports::{ActuatorDriver, SensorDriver, Transport},
    state::DeviceState,
    supervisor::{ConnectivitySupervisor, LinkEvent, LinkState},
    telemetry::TelemetryScheduler,
    thermostat::FanThermostat,
    topics::{TOPIC_GAS, TOPIC_INIT, TOPIC_TELEMETRY},
    types::{DeviceAction, InboundMessage, SensorSample},
};

/// Upper bound on inbound messages handled in one pass, so a flood of
/// commands cannot starve telemetry.
pub const MAX_MESSAGES_PER_PASS: usize = 32;

pub struct DeviceController<T, S, A> {
    state: DeviceState,
    thermostat: FanThermostat,
    telemetry: TelemetryScheduler,
    supervisor: ConnectivitySupervisor,
    transport: T,
    sensor: S,
    actuators: A,
}

impl<T, S, A> DeviceController<T, S, A>
where
    T: Transport,
    S: SensorDriver,
    A: ActuatorDriver,
{
    pub fn new(mut config: DeviceConfig, transport: T, sensor: S, actuators: A) -> Self {
        config.sanitize();
        Self {
            state: DeviceState::new(),
            thermostat: FanThermostat::new(config.thermostat),
            telemetry: TelemetryScheduler::new(&config.telemetry),
            supervisor: ConnectivitySupervisor::new(&config.link),
            transport,
            sensor,
            actuators,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn link_state(&self) -> LinkState {
        self.supervisor.state()
    }

    pub fn thermostat(&self) -> &FanThermostat {
        &self.thermostat
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    /// Drives every actuator to match the current state. Used once at boot.
    pub fn sync_outputs(&mut self) {
        self.actuators.set_lamp(self.state.lamp_output());
        self.actuators.set_fan(self.state.is_fan_on());
    }

    pub fn run_once(&mut self, now_ms: u64) {
        if let Some(LinkEvent::Established) = self.supervisor.step(now_ms, &mut self.transport) {
            self.publish_snapshot();
        }

        if self.supervisor.is_connected() {
            self.pump_messages();
        }

        if self.telemetry.poll_due(now_ms) {
            self.telemetry_tick();
        }
    }

    /// Decodes and applies one inbound message. Messages on topics that
    /// carry no command are accepted and ignored.
    pub fn handle_message(&mut self, message: &InboundMessage) -> Result<(), ParseError> {
        let Some(command) = Command::parse(&message.topic, &message.payload)? else {
            debug!("ignoring message on {}", message.topic);
            return Ok(());
        };

        info!("applying {command:?} from {}", message.topic);
        let actions = command.apply(&mut self.state, &self.thermostat.config);
        self.execute(actions);
        Ok(())
    }

    pub fn publish_snapshot(&mut self) {
        let payload = self.state.snapshot().to_payload();
        info!("publishing state snapshot `{payload}`");
        self.publish(TOPIC_INIT, &payload);
    }

    fn pump_messages(&mut self) {
        for _ in 0..MAX_MESSAGES_PER_PASS {
            let Some(message) = self.transport.poll() else {
                break;
            };
            if let Err(err) = self.handle_message(&message) {
                warn!(
                    "dropping command on {} (`{}`): {err}",
                    message.topic, message.payload
                );
            }
        }
    }

    fn telemetry_tick(&mut self) {
        let (humidity, temperature) = self.sensor.read_temperature_humidity();
        let gas_level = self.sensor.read_gas_level();
        let sample = SensorSample {
            humidity,
            temperature,
            gas_level,
        };

        match sample.checked_temperature() {
            Ok(temperature) => {
                let payload = sample.climate_payload();
                debug!("telemetry `{payload}`");
                self.publish(TOPIC_TELEMETRY, &payload);
                let actions = self.thermostat.update(&mut self.state, temperature);
                self.execute(actions);
            }
            Err(err) => warn!("skipping climate telemetry: {err}"),
        }

        self.publish(TOPIC_GAS, &sample.gas_payload());
        self.telemetry.gas_alert().observe(sample.gas_level);
    }

    fn execute(&mut self, actions: Vec<DeviceAction>) {
        for action in actions {
            match action {
                DeviceAction::SetLamp(color) => self.actuators.set_lamp(color),
                DeviceAction::SetFan(on) => self.actuators.set_fan(on),
                DeviceAction::Publish { topic, payload } => self.publish(topic, &payload),
            }
        }
    }

    fn publish(&mut self, topic: &str, payload: &str) {
        if let Err(err) = self.transport.publish(topic, payload) {
            warn!("publish to {topic} failed: {err}");
        }
    }
}
