use tracing::{info, warn};

use crate::{
    config::LinkConfig,
    error::ConnectError,
    ports::Transport,
    topics::SUBSCRIBED_TOPICS,
    types::Credentials,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

impl LinkState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Session is up and every topic is subscribed; state must be replayed.
    Established,
    Lost,
}

/// Keeps the messaging link up. Retries are deadline based: a failed
/// attempt schedules the next one `retry_backoff_ms` later and `step`
/// returns immediately until then.
#[derive(Debug, Clone)]
pub struct ConnectivitySupervisor {
    client_id: String,
    credentials: Option<Credentials>,
    retry_backoff_ms: u64,
    state: LinkState,
    next_attempt_ms: Option<u64>,
    failed_attempts: u32,
}

impl ConnectivitySupervisor {
    pub fn new(config: &LinkConfig) -> Self {
        let mut config = config.clone();
        config.sanitize();
        Self {
            credentials: config.credentials(),
            client_id: config.client_id,
            retry_backoff_ms: config.retry_backoff_ms,
            state: LinkState::Disconnected,
            next_attempt_ms: None,
            failed_attempts: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn next_attempt_ms(&self) -> Option<u64> {
        self.next_attempt_ms
    }

    pub fn step<T: Transport>(&mut self, now_ms: u64, transport: &mut T) -> Option<LinkEvent> {
        if self.state == LinkState::Connected {
            if transport.is_connected() {
                return None;
            }
            warn!("mqtt link lost, reconnecting");
            self.state = LinkState::Disconnected;
            self.next_attempt_ms = None;
            return Some(LinkEvent::Lost);
        }

        if let Some(deadline) = self.next_attempt_ms {
            if now_ms < deadline {
                return None;
            }
        }

        self.state = LinkState::Connecting;
        info!("client {} connecting to mqtt broker", self.client_id);

        match self.establish(transport) {
            Ok(()) => {
                info!(
                    "connected to mqtt broker after {} failed attempt(s)",
                    self.failed_attempts
                );
                self.state = LinkState::Connected;
                self.next_attempt_ms = None;
                self.failed_attempts = 0;
                Some(LinkEvent::Established)
            }
            Err(err) => {
                self.failed_attempts = self.failed_attempts.saturating_add(1);
                self.next_attempt_ms = Some(now_ms.saturating_add(self.retry_backoff_ms));
                warn!(
                    "mqtt connect attempt {} failed: {err}; retrying in {} ms",
                    self.failed_attempts, self.retry_backoff_ms
                );
                None
            }
        }
    }

    fn establish<T: Transport>(&self, transport: &mut T) -> Result<(), ConnectError> {
        transport.connect(&self.client_id, self.credentials.as_ref())?;
        for topic in SUBSCRIBED_TOPICS {
            transport.subscribe(topic).map_err(ConnectError::Subscribe)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{error::TransportError, types::InboundMessage};

    #[derive(Default)]
    struct ScriptedTransport {
        connect_results: VecDeque<Result<(), ConnectError>>,
        fail_subscribe: bool,
        connected: bool,
        connects: Vec<(String, Option<Credentials>)>,
        subscriptions: Vec<String>,
    }

    impl Transport for ScriptedTransport {
        fn connect(
            &mut self,
            client_id: &str,
            credentials: Option<&Credentials>,
        ) -> Result<(), ConnectError> {
            self.connects
                .push((client_id.to_string(), credentials.cloned()));
            let result = self.connect_results.pop_front().unwrap_or(Ok(()));
            self.connected = result.is_ok();
            result
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
            if self.fail_subscribe {
                return Err(TransportError::Client("subscription rejected".to_string()));
            }
            self.subscriptions.push(topic.to_string());
            Ok(())
        }

        fn publish(&mut self, _topic: &str, _payload: &str) -> Result<(), TransportError> {
            Ok(())
        }

        fn poll(&mut self) -> Option<InboundMessage> {
            None
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn refused() -> Result<(), ConnectError> {
        Err(ConnectError::Refused("not authorized".to_string()))
    }

    #[test]
    fn connects_and_subscribes_on_first_step() {
        let mut supervisor = ConnectivitySupervisor::new(&LinkConfig {
            username: "home".to_string(),
            password: "secret".to_string(),
            ..LinkConfig::default()
        });
        let mut transport = ScriptedTransport::default();

        assert_eq!(supervisor.state(), LinkState::Disconnected);
        assert_eq!(
            supervisor.step(0, &mut transport),
            Some(LinkEvent::Established)
        );
        assert_eq!(supervisor.state(), LinkState::Connected);
        assert_eq!(transport.subscriptions, SUBSCRIBED_TOPICS.to_vec());
        assert_eq!(
            transport.connects,
            vec![(
                "esp32-smart-home".to_string(),
                Some(Credentials {
                    username: "home".to_string(),
                    password: "secret".to_string(),
                })
            )]
        );

        assert_eq!(supervisor.step(10, &mut transport), None);
        assert_eq!(transport.connects.len(), 1);
    }

    #[test]
    fn failed_connect_waits_for_backoff() {
        let mut supervisor = ConnectivitySupervisor::new(&LinkConfig::default());
        let mut transport = ScriptedTransport {
            connect_results: VecDeque::from([refused(), refused()]),
            ..ScriptedTransport::default()
        };

        assert_eq!(supervisor.step(1_000, &mut transport), None);
        assert_eq!(supervisor.state(), LinkState::Connecting);
        assert_eq!(supervisor.next_attempt_ms(), Some(3_000));

        assert_eq!(supervisor.step(2_999, &mut transport), None);
        assert_eq!(transport.connects.len(), 1);

        assert_eq!(supervisor.step(3_000, &mut transport), None);
        assert_eq!(transport.connects.len(), 2);
        assert_eq!(supervisor.failed_attempts(), 2);

        assert_eq!(
            supervisor.step(5_000, &mut transport),
            Some(LinkEvent::Established)
        );
        assert_eq!(supervisor.failed_attempts(), 0);
    }

    #[test]
    fn subscribe_failure_counts_as_failed_connect() {
        let mut supervisor = ConnectivitySupervisor::new(&LinkConfig::default());
        let mut transport = ScriptedTransport {
            fail_subscribe: true,
            ..ScriptedTransport::default()
        };

        assert_eq!(supervisor.step(0, &mut transport), None);
        assert_eq!(supervisor.state(), LinkState::Connecting);
        assert_eq!(supervisor.next_attempt_ms(), Some(2_000));
    }

    #[test]
    fn loss_triggers_immediate_reconnect_and_resubscribe() {
        let mut supervisor = ConnectivitySupervisor::new(&LinkConfig::default());
        let mut transport = ScriptedTransport::default();
        supervisor.step(0, &mut transport);

        transport.connected = false;
        assert_eq!(supervisor.step(50, &mut transport), Some(LinkEvent::Lost));
        assert_eq!(supervisor.state(), LinkState::Disconnected);

        assert_eq!(
            supervisor.step(60, &mut transport),
            Some(LinkEvent::Established)
        );
        assert_eq!(transport.connects.len(), 2);
        assert_eq!(transport.subscriptions.len(), 2 * SUBSCRIBED_TOPICS.len());
    }
}
