//! # presence-gateway
//!
//! WebSocket app service the PBX connects to. Authenticates PBX connections,
//! records their PbxInfo, drives the user table replication and carries the
//! presence commands produced by the pipeline.

pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::run;
