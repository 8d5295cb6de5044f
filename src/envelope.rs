//! Success envelopes: `{ success: true, data?, count?, message? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// A successful handler outcome: status code plus envelope
#[derive(Debug)]
pub struct Reply<T: Serialize> {
    pub status: StatusCode,
    pub body: Envelope<T>,
}

impl<T: Serialize> Reply<T> {
    /// 200 with a payload
    pub fn ok(data: T) -> Self {
        Self::with(StatusCode::OK, None, Some(data))
    }

    /// 201 with a message and the created payload
    pub fn created(message: &str, data: T) -> Self {
        Self::with(StatusCode::CREATED, Some(message), Some(data))
    }

    /// 200 with a message and a payload
    pub fn ok_with_message(message: &str, data: T) -> Self {
        Self::with(StatusCode::OK, Some(message), Some(data))
    }

    /// 200 with only a message
    pub fn message(message: &str) -> Self {
        Self::with(StatusCode::OK, Some(message), None)
    }

    fn with(status: StatusCode, message: Option<&str>, data: Option<T>) -> Self {
        Self {
            status,
            body: Envelope {
                success: true,
                count: None,
                message: message.map(str::to_string),
                data,
            },
        }
    }
}

impl<T: Serialize> Reply<Vec<T>> {
    /// 200 with a list payload and its length
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        let mut reply = Self::ok(items);
        reply.body.count = Some(count);
        reply
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
