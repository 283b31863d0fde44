pub mod auth;
pub mod backend;
pub mod config;
pub mod environment;
pub mod errors;
pub mod panel;
pub mod redline;
pub mod routes;
pub mod state;
