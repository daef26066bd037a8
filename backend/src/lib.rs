//! Backend library modules.
//!
//! Hexagonal layout: [`domain`] holds types, services, and ports;
//! [`inbound`] adapts HTTP and WebSocket traffic onto driving ports;
//! [`outbound`] implements driven ports against Postgres, the ML service,
//! and in-process channels.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
