//! REST API client module for the trimIQ backend.
//!
//! This module provides the `ApiClient` for the account, authentication
//! and video processing endpoints.
//!
//! Authenticated endpoints take the session credential as a bearer token.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
