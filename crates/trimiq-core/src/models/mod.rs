//! Data models for trimIQ entities.
//!
//! - `Balance`: Account balance snapshot from `/api/balance`
//! - Auth types: `LoginResponse`, `RegisterRequest`, `RegisterResponse`
//! - Video types: `ProcessVideoRequest`, `ProcessVideoResponse`, `Resolution`
//! - `PaymentMode`: How the user pays for a render

pub mod account;
pub mod video;

pub use account::{Balance, LoginResponse, RegisterRequest, RegisterResponse};
pub use video::{PaymentMode, ProcessVideoRequest, ProcessVideoResponse, Resolution};
