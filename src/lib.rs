// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod flow;
pub mod gateway;
pub mod money;
pub mod request;
pub mod store;
