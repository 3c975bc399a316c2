pub mod app;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod middleware;
pub mod routes;
pub mod handlers;
