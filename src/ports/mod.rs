//! Port traits (interfaces) for the hexagonal architecture.

pub mod config_port;
pub mod data_port;
pub mod report_port;
