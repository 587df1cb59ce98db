pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod security;
pub mod server;

