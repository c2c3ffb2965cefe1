// src/inspect/mod.rs
mod address;
mod inspector;

pub use address::{ProxyAddress, ValidationError};
pub use inspector::{ProxyInfo, ProxyInspector};
