// src/lib.rs
pub mod config;
pub mod inspect;
pub mod probe;
pub mod server;
pub mod transport;
