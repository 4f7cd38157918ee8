use std::any::Any;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
pub struct ListEnvelope<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn ok(data: Vec<T>) -> Self {
        Self { success: true, count: data.len(), data }
    }
}

#[derive(Serialize)]
pub struct ItemEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ItemEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

pub fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("Internal Server Error");
    tracing::error!(panic = %message, "handler panicked");
    failure(StatusCode::INTERNAL_SERVER_ERROR, message)
}
