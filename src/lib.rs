pub mod error;
pub mod config;
pub mod types;
pub mod utils;
pub mod observability;
pub mod throttle;
pub mod exchange;
pub mod funding;
pub mod pipeline;
pub mod ranking;
pub mod api;
