//! Loopback HTTP server that receives authorization redirects

pub mod server;

pub use server::CallbackServer;
