//! Port traits: the core's view of its collaborators.

pub mod audit_port;
pub mod config_port;
pub mod data_port;
