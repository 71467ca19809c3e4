use crate::api::v1::handler::ApiResponse;
use crate::application_port::GraphError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, code, message) = if let Some(err) = err.find::<ApiRejection>() {
        (err.code.status(), err.code, err.message.clone())
    } else if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ApiErrorCode::NotFound,
            "no such route".to_string(),
        )
    } else if let Some(err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            ApiErrorCode::BadRequest,
            err.to_string(),
        )
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (
            StatusCode::BAD_REQUEST,
            ApiErrorCode::BadRequest,
            "invalid or missing query parameter".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::BadRequest,
            "method not allowed".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorCode::InternalError,
            format!("unhandled error: {:?}", err),
        )
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code, message));
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("bad request")]
    BadRequest,
    #[error("internal error")]
    InternalError,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A typed rejection carrying the client-facing condition and message.
#[derive(Debug)]
pub struct ApiRejection {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiRejection {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiRejection {
            code: ApiErrorCode::BadRequest,
            message: message.into(),
        }
    }

    /// Store failures are logged server-side and replaced with an opaque
    /// message on the wire.
    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        warn!("internal error: {}", error);
        ApiRejection {
            code: ApiErrorCode::InternalError,
            message: "internal error".to_string(),
        }
    }
}

impl reject::Reject for ApiRejection {}

impl From<GraphError> for ApiRejection {
    fn from(error: GraphError) -> Self {
        let code = match error {
            GraphError::UserNotFound | GraphError::FriendNotFound => ApiErrorCode::NotFound,
            GraphError::UsernameTaken
            | GraphError::SelfLink
            | GraphError::AlreadyFriends
            | GraphError::NotFriends
            | GraphError::HasFriends => ApiErrorCode::Conflict,
            GraphError::EmptyUsername => ApiErrorCode::BadRequest,
            GraphError::Store(_) => return ApiRejection::internal(error),
        };
        ApiRejection {
            code,
            message: error.to_string(),
        }
    }
}
