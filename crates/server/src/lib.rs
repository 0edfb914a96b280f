//! Voiceline Server
//!
//! HTTP surface for the voice agent: a webhook endpoint that answers a
//! call over the machine's audio path, plus health and metrics routes.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_request};
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Another request already holds the audio path
    #[error("a call is already in progress")]
    Busy,

    /// The conversation loop failed mid-call
    #[error("call error: {0}")]
    Call(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<voiceline_agent::AgentError> for ServerError {
    fn from(err: voiceline_agent::AgentError) -> Self {
        ServerError::Call(err.to_string())
    }
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Busy => axum::http::StatusCode::CONFLICT,
            ServerError::Call(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        let status = axum::http::StatusCode::from(self);
        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        }
        let body = axum::Json(serde_json::json!({
            "status": "error",
            "message": message,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(StatusCode::from(ServerError::Busy), StatusCode::CONFLICT);
        assert_eq!(
            StatusCode::from(ServerError::Call("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StatusCode::from(ServerError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
