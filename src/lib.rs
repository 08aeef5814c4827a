//! Auto insurance fraud dashboard: loads a claims CSV, computes summary
//! cards and eight charts, and serves them as a single HTML page.
pub mod aggregate;
pub mod charts;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod page;
pub mod server;
pub mod summary;
pub mod types;
pub mod util;
