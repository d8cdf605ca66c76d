pub mod base_types;
pub mod config;
pub mod json_serialisation;
pub mod network;

pub use config::Config;
pub use network::demand::Demand;
pub use network::Network;
