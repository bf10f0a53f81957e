use actix_web::{http::StatusCode, HttpRequest, ResponseError};
use thiserror::Error;

use crate::logic::LogicError;

pub mod datasets;
pub mod health_check;
pub mod users;

/// Header carrying the name of the calling user.
///
/// The API key authenticates the client application; this header identifies
/// which catalog user the call is made on behalf of.
pub const USER_HEADER: &str = "x-catalog-user";

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] LogicError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            LogicError::NotFound(_) => StatusCode::NOT_FOUND,
            LogicError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            LogicError::Validation(_) => StatusCode::BAD_REQUEST,
            LogicError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn extract_user(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}
