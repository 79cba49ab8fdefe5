// src/error.rs
use log::error;
use serde_json::json;
use std::convert::Infallible;
use std::fmt;
use warp::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{InvalidQuery, MethodNotAllowed, Reject};
use warp::{Rejection, Reply};

#[derive(Debug)]
pub struct CustomError {
    pub message: String,
}

impl fmt::Display for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CustomError {}

impl Reject for CustomError {}

#[derive(Debug)]
pub struct WalletNotFound;

impl Reject for WalletNotFound {}

#[derive(Debug)]
pub struct WalletUpdateFailed;

impl Reject for WalletUpdateFailed {}

// Maps rejections onto the API's status codes; bodies stay a short detail
// message.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, detail) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<WalletNotFound>().is_some() {
        (StatusCode::NOT_FOUND, "Wallet not found".to_string())
    } else if err.find::<WalletUpdateFailed>().is_some() {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update wallet".to_string(),
        )
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    } else if err.find::<InvalidQuery>().is_some() {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid query parameters".to_string(),
        )
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else if let Some(e) = err.find::<CustomError>() {
        error!("Request failed: {}", e.message);
        (StatusCode::INTERNAL_SERVER_ERROR, e.message.clone())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    let body = warp::reply::json(&json!({ "detail": detail }));
    Ok(warp::reply::with_status(body, code))
}
