// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod app;
pub mod compare;
pub mod config;
pub mod finder;
pub mod format;
pub mod lineup;
pub mod player;
pub mod scenario;
pub mod store;
