use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    error::{AppError, AuthError},
    flash,
    oidc::{OidcClient, LOGIN_SESSION_KEY},
    registry::{complete_login, UserProfile, UserRegistry},
    tparams, views,
};

/// Session key holding the `sub` of the signed-in user. Only the subject is
/// serialized; the record itself is resolved through the registry on every
/// request.
pub const USER_SESSION_KEY: &str = "oidc-probe.user";

#[derive(Clone)]
pub struct AppState {
    pub oidc: OidcClient,
    pub registry: Arc<dyn UserRegistry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/account", get(account))
        .route("/login", get(login))
        .route("/auth/openid/return", post(oidc_return))
        .route("/logout", get(logout))
        // static routes take precedence, so this only catches test-case ids
        .route("/:id", get(test_case))
        .with_state(state)
}

async fn index(session: Session, State(state): State<AppState>) -> Result<Response, AppError> {
    let user = current_user(&session, state.registry.as_ref()).await?;
    let message = flash::take(&session).await?;
    Ok(Html(views::index(user.as_ref(), message.as_deref())).into_response())
}

async fn account(session: Session, State(state): State<AppState>) -> Result<Response, AppError> {
    match current_user(&session, state.registry.as_ref()).await? {
        Some(user) => Ok(Html(views::account(&user)).into_response()),
        None => Ok(Redirect::to("/login").into_response()),
    }
}

async fn login(session: Session, State(state): State<AppState>) -> Result<Response, AppError> {
    start_login(&session, &state.oidc, &[]).await
}

/// Authentication response of the identity provider, delivered via
/// `response_mode=form_post`. Either `code`/`state` or `error` is present.
#[derive(Debug, Deserialize)]
struct AuthReturn {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn oidc_return(
    session: Session,
    State(state): State<AppState>,
    Form(response): Form<AuthReturn>,
) -> Result<Response, AppError> {
    match finish_login(&session, &state, response).await {
        Ok(user) => {
            tracing::info!(sub = %user.sub, "received a successful return from the identity provider");
        }
        Err(err) => {
            tracing::warn!(error = %err, "login failed");
            flash::set(&session, err.to_string()).await?;
        }
    }
    Ok(Redirect::to("/").into_response())
}

async fn logout(session: Session) -> Result<Response, AppError> {
    session.flush().await?;
    Ok(Redirect::to("/").into_response())
}

/// Re-initiate the login with an error-injection descriptor for the test
/// identity provider attached to the authorization request.
async fn test_case(
    Path(id): Path<String>,
    session: Session,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    session.remove::<String>(USER_SESSION_KEY).await?;

    match tparams::encode(&id) {
        Ok(token) => {
            tracing::info!(case = %id, "starting error-injection test case");
            start_login(&session, &state.oidc, &[(tparams::TPARAMS_QUERY_KEY, token)]).await
        }
        Err(err) => {
            let err = AuthError::from(err);
            tracing::warn!(error = %err, "rejecting test case request");
            flash::set(&session, err.to_string()).await?;
            Ok(Redirect::to("/").into_response())
        }
    }
}

async fn start_login(
    session: &Session,
    oidc: &OidcClient,
    extra_params: &[(&str, String)],
) -> Result<Response, AppError> {
    let (auth_url, login_session) = oidc.authorize_redirect(extra_params);
    session.insert(LOGIN_SESSION_KEY, login_session).await?;
    Ok(Redirect::to(auth_url.as_str()).into_response())
}

async fn finish_login(
    session: &Session,
    state: &AppState,
    response: AuthReturn,
) -> Result<UserProfile, AuthError> {
    if let Some(error) = response.error {
        let detail = response.error_description.unwrap_or_default();
        return Err(AuthError::Provider(if detail.is_empty() {
            error
        } else {
            format!("{error}: {detail}")
        }));
    }
    let code = response
        .code
        .ok_or(AuthError::MissingResponseParameter("code"))?;
    let auth_state = response
        .state
        .ok_or(AuthError::MissingResponseParameter("state"))?;

    let login_session = session
        .remove(LOGIN_SESSION_KEY)
        .await?
        .ok_or(AuthError::RedirectedWithoutSession)?;

    let claims = state.oidc.exchange(&login_session, code, &auth_state).await?;
    let user = complete_login(state.registry.as_ref(), &claims).await?;

    session.insert(USER_SESSION_KEY, user.sub.clone()).await?;
    Ok(user)
}

async fn current_user(
    session: &Session,
    registry: &dyn UserRegistry,
) -> Result<Option<UserProfile>, AppError> {
    let Some(sub) = session.get::<String>(USER_SESSION_KEY).await? else {
        return Ok(None);
    };
    Ok(registry.find_by_subject(&sub).await)
}
