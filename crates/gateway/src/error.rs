use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cutify_core::Error;
use cutify_core::error::{ImageError, ProviderError};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A domain error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(Error::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Provider(ProviderError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            Error::Provider(_)
            | Error::InvalidModelOutput { .. }
            | Error::Image(ImageError::NoImage(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError(Error::not_found("scene", 3)).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("nope").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(ProviderError::Network("down".into()).into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(ImageError::NoImage("refused".into()).into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(ProviderError::RateLimited { retry_after_secs: 5 }.into()).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError(Error::Internal("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
