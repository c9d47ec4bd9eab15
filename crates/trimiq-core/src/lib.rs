//! trimiq-core - shared library for the trimIQ client.
//!
//! This crate holds everything that does not depend on a particular UI:
//!
//! - `auth`: Session credential storage behind the `TokenStore` trait
//! - `api`: HTTP client for the trimIQ backend
//! - `page`: Page routing, the access gate and the `PageController`
//! - `editor`: Editor element contract, bindings and collaborator hooks
//! - `view`: Balance view-model and display formatting
//! - `models`: Wire types shared with the backend
//! - `config`: Client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod editor;
pub mod models;
pub mod page;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use auth::TokenStore;
pub use config::Config;
pub use page::{LoadOutcome, Page, PageController};
