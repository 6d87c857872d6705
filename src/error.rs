use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid path")]
    InvalidPath,

    #[error("not found")]
    NotFound,

    #[error("delete failed: {0}")]
    DeleteFailed(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidPath => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::InvalidPath.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DeleteFailed(Error::new(ErrorKind::PermissionDenied, "denied")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn io_not_found_maps_to_404() {
        let err = AppError::Io(Error::new(ErrorKind::NotFound, "gone"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::Io(Error::new(ErrorKind::PermissionDenied, "denied"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
