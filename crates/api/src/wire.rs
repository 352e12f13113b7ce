//! Key-case adapters at the HTTP boundary.
//!
//! Bodies on the wire use `snake_case` keys while handlers and models work
//! with `camelCase`. [`WireJson`] decodes request bodies and [`Wire`] encodes
//! responses; nothing past these two types sees wire keys.

use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use smp_core::case;

use crate::error::AppError;

/// JSON request body whose keys are rewritten into internal form before
/// deserializing into `T`.
#[derive(Debug, Clone)]
pub struct WireJson<T>(pub T);

impl<S, T> FromRequest<S> for WireJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        let parsed = serde_json::from_value(case::decode(value))
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;
        Ok(WireJson(parsed))
    }
}

/// JSON response whose keys are rewritten into wire form after serializing.
#[derive(Debug, Clone)]
pub struct Wire<T>(pub T);

impl<T: Serialize> IntoResponse for Wire<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.0) {
            Ok(value) => Json(case::encode(value)).into_response(),
            Err(e) => AppError::InternalError(format!("Failed to serialize response: {e}"))
                .into_response(),
        }
    }
}
