use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use openidconnect::{core::CoreErrorResponseType, StandardErrorResponse};
use thiserror::Error;

use crate::tparams::UnknownTestCase;

/// Errors that abort a login attempt. These are user-visible: the route
/// handlers turn them into a flashed message and a redirect to `/`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no subject found in the identity token")]
    MissingSubject,

    #[error(transparent)]
    UnknownTestCase(#[from] UnknownTestCase),

    #[error("csrf token invalid")]
    CsrfTokenInvalid,

    #[error("authentication response received without a pending login session")]
    RedirectedWithoutSession,

    #[error("authentication response missing the `{0}` parameter")]
    MissingResponseParameter(&'static str),

    #[error("id token missing")]
    IdTokenMissing,

    #[error("access token hash invalid")]
    AccessTokenHashInvalid,

    #[error("identity provider returned an error: {0}")]
    Provider(String),

    #[error("claims verification: {0:?}")]
    ClaimsVerification(#[from] openidconnect::ClaimsVerificationError),

    #[error("signing: {0:?}")]
    Signing(#[from] openidconnect::SigningError),

    #[error("request token: {0:?}")]
    RequestToken(
        #[from]
        openidconnect::RequestTokenError<
            openidconnect::reqwest::Error<reqwest::Error>,
            StandardErrorResponse<CoreErrorResponseType>,
        >,
    ),

    #[error("url parsing: {0:?}")]
    UrlParsing(#[from] openidconnect::url::ParseError),

    #[error("discovery: {0:?}")]
    Discovery(#[from] openidconnect::DiscoveryError<openidconnect::reqwest::Error<reqwest::Error>>),

    #[error("session error: {0:?}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Infrastructure failures the user can do nothing about.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("session error: {0:?}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = self.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}
