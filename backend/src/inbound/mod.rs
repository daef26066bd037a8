//! Inbound adapters that translate external requests into driving-port
//! calls while keeping framework details at the edge.
//!
//! REST handlers live under [`http`]; the alert push channel lives under
//! [`ws`].

pub mod http;
pub mod ws;
