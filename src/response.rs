use axum::{http::StatusCode, Json};
use serde::Serialize;

/// `{ success, message?, ...payload }` body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Empty payload for responses that only carry a message.
#[derive(Debug, Serialize)]
pub struct Empty {}

pub type Reply<T> = (StatusCode, Json<Envelope<T>>);

pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Reply<T> {
    reply(StatusCode::OK, Some(message.into()), data)
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Reply<T> {
    reply(StatusCode::CREATED, Some(message.into()), data)
}

pub fn data<T: Serialize>(data: T) -> Reply<T> {
    reply(StatusCode::OK, None, data)
}

pub fn message(message: impl Into<String>) -> Reply<Empty> {
    reply(StatusCode::OK, Some(message.into()), Empty {})
}

fn reply<T: Serialize>(status: StatusCode, message: Option<String>, data: T) -> Reply<T> {
    (
        status,
        Json(Envelope {
            success: true,
            message,
            data,
        }),
    )
}
