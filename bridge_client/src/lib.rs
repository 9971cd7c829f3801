pub mod bridge_config;
pub mod errors;
pub mod forwarder;
pub mod types;
pub mod utils;

pub use bridge_config::BridgeConfig;
pub use forwarder::{Forwarder, HttpForwarder};
