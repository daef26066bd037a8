//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories for development and tests
//! - **ml**: reqwest client for the remote risk model
//! - **probe**: TCP reachability check for the risk model
//! - **realtime**: per-doctor alert fan-out for WebSocket sessions
//! - **security**: password hashing and bearer-token signing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod ml;
pub mod persistence;
pub mod probe;
pub mod realtime;
pub mod security;
