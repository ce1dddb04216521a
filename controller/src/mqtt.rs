use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    time::{Duration, Instant},
};

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, Incoming, MqttOptions, QoS};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{info, warn};

use smarthome_common::{
    ConnectError, Credentials, InboundMessage, LinkConfig, Transport, TransportError,
};

const REQUEST_CAPACITY: usize = 64;

enum LinkSignal {
    Up,
    Message(InboundMessage),
    Down(String),
}

struct Session {
    client: AsyncClient,
    signals: Receiver<LinkSignal>,
    task: JoinHandle<()>,
}

/// rumqttc-backed link. Each `connect` opens a fresh clean session whose
/// event loop runs as a tokio task; the control thread only sees it through
/// a channel and never blocks outside `connect`.
pub struct MqttTransport {
    runtime: Handle,
    broker_host: String,
    broker_port: u16,
    keep_alive: Duration,
    connect_timeout: Duration,
    session: Option<Session>,
    connected: bool,
}

impl MqttTransport {
    pub fn new(runtime: Handle, link: &LinkConfig) -> Self {
        Self {
            runtime,
            broker_host: link.broker_host.clone(),
            broker_port: link.broker_port,
            keep_alive: Duration::from_secs(link.keep_alive_secs),
            connect_timeout: Duration::from_millis(link.connect_timeout_ms),
            session: None,
            connected: false,
        }
    }

    fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.task.abort();
        }
        self.connected = false;
    }

    fn client(&self) -> Result<&AsyncClient, TransportError> {
        match &self.session {
            Some(session) if self.connected => Ok(&session.client),
            _ => Err(TransportError::NotConnected),
        }
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        self.close_session();
    }
}

impl Transport for MqttTransport {
    fn connect(
        &mut self,
        client_id: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), ConnectError> {
        self.close_session();

        let mut options = MqttOptions::new(client_id, self.broker_host.clone(), self.broker_port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);
        if let Some(credentials) = credentials {
            options.set_credentials(credentials.username.clone(), credentials.password.clone());
        }

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let (signal_tx, signals) = mpsc::channel();
        let task = self.runtime.spawn(drive_event_loop(eventloop, signal_tx));

        let deadline = Instant::now() + self.connect_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match signals.recv_timeout(remaining) {
                Ok(LinkSignal::Up) => break,
                Ok(LinkSignal::Message(_)) => continue,
                Ok(LinkSignal::Down(reason)) => {
                    task.abort();
                    return Err(ConnectError::Refused(reason));
                }
                Err(RecvTimeoutError::Timeout) => {
                    task.abort();
                    return Err(ConnectError::Timeout(
                        self.connect_timeout.as_millis().try_into().unwrap_or(u64::MAX),
                    ));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ConnectError::Refused("event loop stopped".to_string()));
                }
            }
        }

        info!(
            "mqtt session open on {}:{}",
            self.broker_host, self.broker_port
        );
        self.session = Some(Session {
            client,
            signals,
            task,
        });
        self.connected = true;
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.client()?
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(|err| TransportError::Client(err.to_string()))
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.client()?
            .try_publish(topic, QoS::AtMostOnce, false, payload.to_string())
            .map_err(|err| TransportError::Client(err.to_string()))
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        let session = self.session.as_ref()?;
        loop {
            match session.signals.try_recv() {
                Ok(LinkSignal::Message(message)) => return Some(message),
                Ok(LinkSignal::Up) => continue,
                Ok(LinkSignal::Down(reason)) => {
                    warn!("mqtt link down: {reason}");
                    self.connected = false;
                    return None;
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.connected = false;
                    return None;
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

async fn drive_event_loop(mut eventloop: EventLoop, signals: Sender<LinkSignal>) {
    loop {
        let signal = match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                if ack.code == ConnectReturnCode::Success {
                    LinkSignal::Up
                } else {
                    LinkSignal::Down(format!("connection refused: {:?}", ack.code))
                }
            }
            Ok(Event::Incoming(Incoming::Publish(message))) => {
                match String::from_utf8(message.payload.to_vec()) {
                    Ok(payload) => LinkSignal::Message(InboundMessage::new(message.topic, payload)),
                    Err(_) => {
                        warn!("dropping non utf8 mqtt payload on topic {}", message.topic);
                        continue;
                    }
                }
            }
            Ok(Event::Incoming(Incoming::Disconnect)) => {
                LinkSignal::Down("broker closed the session".to_string())
            }
            Ok(_) => continue,
            Err(err) => LinkSignal::Down(err.to_string()),
        };

        let link_down = matches!(signal, LinkSignal::Down(_));
        if signals.send(signal).is_err() || link_down {
            break;
        }
    }
}
