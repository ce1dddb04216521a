use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, OnceLock,
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use tokio::runtime::Handle;
use tracing::{info, warn};

use smarthome_common::{DeviceConfig, DeviceController};

use crate::{actuators::LoggingActuators, mqtt::MqttTransport, sensor::SimulatedSensor};

const LOOP_IDLE: Duration = Duration::from_millis(10);

type HostController = DeviceController<MqttTransport, SimulatedSensor, LoggingActuators>;

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = config_path();
    let mut config = load_config(&path).await.unwrap_or_else(|err| {
        warn!("failed to load device config from {}: {err:#}", path.display());
        DeviceConfig::default()
    });
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.sanitize();

    info!(
        "device {} using broker {}:{}",
        config.link.client_id, config.link.broker_host, config.link.broker_port
    );

    let transport = MqttTransport::new(Handle::current(), &config.link);
    let controller = DeviceController::new(
        config,
        transport,
        SimulatedSensor::new(),
        LoggingActuators::default(),
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let control_loop = spawn_control_loop(controller, shutdown.clone())?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested");
    shutdown.store(true, Ordering::Relaxed);

    let controller = tokio::task::spawn_blocking(move || control_loop.join())
        .await
        .context("failed to join control loop")?
        .map_err(|_| anyhow::anyhow!("control loop panicked"))?;
    info!(
        "control loop stopped after {} actuator writes",
        controller.actuators().writes()
    );
    Ok(())
}

fn spawn_control_loop(
    mut controller: HostController,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<thread::JoinHandle<HostController>> {
    thread::Builder::new()
        .name("control-loop".to_string())
        .spawn(move || {
            controller.sync_outputs();
            while !shutdown.load(Ordering::Relaxed) {
                controller.run_once(monotonic_ms());
                thread::sleep(LOOP_IDLE);
            }
            let actuators = controller.actuators();
            info!(
                "final outputs lamp={:?} fan={:?}",
                actuators.lamp(),
                actuators.fan()
            );
            controller
        })
        .context("failed to spawn control loop thread")
}

fn config_path() -> PathBuf {
    std::env::var("SMARTHOME_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./.smarthome/device.json"))
}

async fn load_config(path: &Path) -> anyhow::Result<DeviceConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => serde_json::from_slice::<DeviceConfig>(&raw)
            .with_context(|| format!("invalid device config in {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(DeviceConfig::default()),
        Err(err) => Err(err.into()),
    }
}

/// Environment wins over the config file for broker settings. An unparsable
/// `MQTT_PORT` is ignored.
fn apply_env_overrides(config: &mut DeviceConfig, var: impl Fn(&str) -> Option<String>) {
    let link = &mut config.link;
    if let Some(host) = var("MQTT_HOST") {
        link.broker_host = host;
    }
    if let Some(port) = var("MQTT_PORT").and_then(|value| value.parse::<u16>().ok()) {
        link.broker_port = port;
    }
    if let Some(user) = var("MQTT_USER") {
        link.username = user;
    }
    if let Some(pass) = var("MQTT_PASS") {
        link.password = pass;
    }
    if let Some(client_id) = var("MQTT_CLIENT_ID") {
        link.client_id = client_id;
    }
}

fn monotonic_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START
        .get_or_init(Instant::now)
        .elapsed()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
