//! HTTP transport to the identity provider

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
