pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod csv_io;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod link;
pub mod middleware;
pub mod models;
pub mod store;
pub mod verify;
