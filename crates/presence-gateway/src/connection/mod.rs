//! Connection management
//!
//! Tracks PBX connections, their login and PbxInfo state, and the order in
//! which they identified themselves.

mod connection;
mod manager;

pub use connection::{Connection, ConnectionState, Outbound};
pub use manager::ConnectionManager;
