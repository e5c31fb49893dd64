//! HTTP error mapping.
//!
//! # Invariants
//! - Every failure answers `{ "error": "<message>" }`.
//! - Storage details are logged, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};
use votebox_core::db::DbError;
use votebox_core::{RepoError, ResetError, VoteError};

#[derive(Debug)]
pub enum ApiError {
    /// Body is not valid JSON.
    MalformedPayload,
    Vote(VoteError),
    Reset(ResetError),
    /// Persistence or runtime failure outside the vote/reset taxonomy.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedPayload => StatusCode::BAD_REQUEST,
            Self::Vote(err) => match err {
                VoteError::InvalidIdentity(_) | VoteError::InvalidEntryId => {
                    StatusCode::BAD_REQUEST
                }
                VoteError::DuplicateVote(_) => StatusCode::FORBIDDEN,
                VoteError::EntryNotFound(_) => StatusCode::NOT_FOUND,
                VoteError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Reset(err) => match err {
                ResetError::Unauthorized => StatusCode::FORBIDDEN,
                ResetError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedPayload => write!(f, "request body must be a JSON object"),
            Self::Vote(err) => write!(f, "{err}"),
            Self::Reset(err) => write!(f, "{err}"),
            Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Vote(err) => Some(err),
            Self::Reset(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(value: VoteError) -> Self {
        Self::Vote(value)
    }
}

impl From<ResetError> for ApiError {
    fn from(value: ResetError) -> Self {
        Self::Reset(value)
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("event=http_request module=server status=error error={self}");
            "internal storage error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
