pub const TOPIC_LAMP: &str = "smart-home/led";
pub const TOPIC_TELEMETRY: &str = "smart-home/dht-data";
pub const TOPIC_GAS: &str = "smart-home/gas";
pub const TOPIC_INIT: &str = "smart-home/init";

pub const TOPIC_FAN_WILDCARD: &str = "smart-home/fan/#";
pub const TOPIC_FAN_MODE: &str = "smart-home/fan/mode";
pub const TOPIC_FAN_STATE: &str = "smart-home/fan/state";

/// Subscriptions replayed on every (re)connect, in order.
pub const SUBSCRIBED_TOPICS: [&str; 5] = [
    TOPIC_LAMP,
    TOPIC_TELEMETRY,
    TOPIC_FAN_WILDCARD,
    TOPIC_GAS,
    TOPIC_INIT,
];
