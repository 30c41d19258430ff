pub mod accounts;
pub mod admin;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod mail;
pub mod response;
pub mod state;
pub mod store;
pub mod swaps;
