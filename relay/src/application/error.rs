use actix_web::{http::StatusCode, HttpResponse, ResponseError};

/// Body of every error response: `{"success": false, "status": .., "message": ..}`.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub status: u16,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
#[error("Can't find {path} on the server.")]
pub struct NotFound {
    path: String,
}

impl NotFound {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self { path: path.into() }
    }
}

impl ResponseError for NotFound {
    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            success: false,
            status: status.as_u16(),
            message: self.to_string(),
        })
    }
}
