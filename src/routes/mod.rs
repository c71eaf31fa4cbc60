mod functions;
mod health_check;
mod send_email;
mod simulations;
mod stock;
mod users;

pub use functions::*;
pub use health_check::*;
pub use send_email::*;
pub use simulations::*;
pub use stock::*;
pub use users::*;

use crate::notifier::NotifyError;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::Request;

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Json<ErrorBody> {
        Json(ErrorBody {
            error: error.into(),
        })
    }
}

#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl From<NotifyError> for ApiError {
    fn from(error: NotifyError) -> Self {
        ApiError::UnexpectedError(error.into())
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = match self {
            ApiError::ValidationError(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::UnexpectedError(_) => Status::InternalServerError,
        };
        if status == Status::InternalServerError {
            tracing::error!("ApiError: {:?}", self);
        } else {
            tracing::warn!("ApiError: {:?}", self);
        }
        (status, ErrorBody::new(self.to_string())).respond_to(request)
    }
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
