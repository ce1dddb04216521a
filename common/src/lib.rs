pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod ports;
pub mod state;
pub mod supervisor;
pub mod telemetry;
pub mod thermostat;
pub mod topics;
pub mod types;

pub use command::Command;
pub use config::{DeviceConfig, LinkConfig, TelemetryConfig, ThermostatConfig};
pub use device::DeviceController;
pub use error::{ConnectError, ParseError, SensorReadError, TransportError};
pub use ports::{ActuatorDriver, SensorDriver, Transport};
pub use state::DeviceState;
pub use supervisor::{ConnectivitySupervisor, LinkEvent, LinkState};
pub use telemetry::{GasAlert, TelemetryScheduler};
pub use thermostat::FanThermostat;
pub use topics::*;
pub use types::{Credentials, DeviceAction, FanMode, InboundMessage, Rgb, SensorSample, Snapshot};
