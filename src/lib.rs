pub mod config;
pub mod handlers;
pub mod identity;
pub mod mapping;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
