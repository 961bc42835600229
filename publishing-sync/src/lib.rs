pub mod asset_manager;
pub mod cli;
pub mod http;
pub mod load_config;
pub mod publishing_api;
pub mod services;
pub mod taxonomy_api;

pub use cli::{run, Cli, Commands};
