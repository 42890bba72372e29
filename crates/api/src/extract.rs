//! Request extractors whose rejections go through [`AppError`].
//!
//! Axum's own `Json` and `Path` reject with plain-text bodies; these wrappers
//! route the same failures into the JSON error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body. Rejects malformed, mistyped or non-JSON bodies with a
/// 400 envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Typed path segments. A segment that does not parse is a 400 envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
