pub mod error;
pub mod logs;
pub mod metrics;
pub mod server;
