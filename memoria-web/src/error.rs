//! Maps a core [`Status`] onto an HTTP response (spec §4.12.4): one
//! `From<Status> for ApiError` so every handler can just use `?` and
//! never hand-write a status code.

use axum::response::{IntoResponse, Response};
use axum::Json;
use memoria_core::Status;
use serde::Serialize;

pub struct ApiError(Status);

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl From<Status> for ApiError {
    fn from(status: Status) -> Self {
        Self(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.http_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.0.code.to_string(),
                message: self.0.message,
            },
        };
        (code, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use memoria_core::StatusCode as CoreCode;

    #[test]
    fn not_found_maps_to_404() {
        let err: ApiError = Status::not_found("missing").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn permission_denied_maps_to_403() {
        let err: ApiError = Status::permission_denied("nope").into();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn already_exists_maps_to_409() {
        let err: ApiError = Status::already_exists("dup").into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn core_http_code_matches_axum_code() {
        let status = Status::new(CoreCode::Unavailable, "down");
        assert_eq!(status.http_code().as_u16(), 503);
    }
}
