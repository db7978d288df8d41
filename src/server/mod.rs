mod account_routes;
pub mod config;
mod entertainment_routes;
mod http_layers;
pub mod metrics;
mod response;
pub mod server;
pub mod state;
mod statistics_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use response::ApiResponse;
#[allow(unused_imports)] // Used by main.rs
pub use server::{make_app, run_server};
