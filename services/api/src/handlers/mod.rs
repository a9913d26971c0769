use axum::extract::FromRequest;

use crate::error::ApiError;

pub mod auth;
pub mod client;
pub mod contact;
pub mod health;
pub mod secure;
pub mod user;

/// `Json` body extractor whose rejections render as `VALIDATION` errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
