// Library surface so integration tests and examples can reach the ipc layer,
// the property pipeline and the service.
pub mod config;
pub mod ipc;
pub mod mcp;
pub mod observability;
pub mod props;
pub mod schema;
