// Infrastructure layer (shared components)
pub mod infrastructure;

pub use infrastructure::auth;
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;

// Live-sync core
pub mod live;
pub mod records;
pub mod request;
pub mod router;
pub mod view;

// Application layer
pub mod catalog;
pub mod console;
pub mod notice;

// Supporting modules
pub mod telemetry;

#[cfg(test)]
mod testing;
