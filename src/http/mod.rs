//! HTTP client module
//!
//! Thin wrapper over `reqwest` used by the sync engine and the connection check.
//!
//! # Features
//!
//! - **Base URL joining**: relative paths are resolved against the configured base
//! - **Default headers**: credentials are attached to every request
//! - **Status classification**: non-2xx responses become `Error::HttpStatus`
//!
//! Retry and backoff are left to the caller; one request is issued per call.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
