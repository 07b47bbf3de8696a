pub mod configuration;
pub mod internet;
pub mod ping;
pub mod session;
pub mod statistics;
