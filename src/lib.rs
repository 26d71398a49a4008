pub mod aggregate;
pub mod api_fetch;
pub mod commands;
pub mod config;
pub mod demo_store;
pub mod error;
pub mod glance;
pub mod http_client;
pub mod labels;
pub mod lookup_cache;
pub mod names;
pub mod season_data;

pub use error::{Result, StatsError};
