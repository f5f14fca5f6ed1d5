//! Authentication endpoints and the current-user helper.
//!
//! ```text
//! POST /api/v1/auth/register {"inviteCode":"…","email":"…","displayName":"…","password":"…"}
//! POST /api/v1/auth/login {"email":"…","password":"…"}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::auth::{CredentialsValidationError, LoginCredentials};
use crate::domain::ports::UserPersistenceError;
use crate::domain::registration::RegistrationRequest;
use crate::domain::user::{Role, User};
use crate::domain::Error;
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub invite_code: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Resolve the session's user, or fail with 401.
///
/// A session pointing at a deleted account is cleared so the stale cookie
/// stops producing confusing 401s with a valid-looking session.
pub async fn current_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let user_id = session.require_user_id()?;
    let user = state
        .users
        .find_by_id(&user_id)
        .await
        .map_err(map_user_lookup_error)?;
    match user {
        Some(user) if user.is_active() => Ok(user),
        Some(_) => Err(Error::forbidden("account is suspended")),
        None => {
            session.clear();
            Err(Error::unauthorized("login required"))
        }
    }
}

/// Require a staff (agent or admin) caller.
pub fn require_staff(user: &User) -> ApiResult<()> {
    if user.role.is_staff() {
        Ok(())
    } else {
        Err(Error::forbidden("staff access required"))
    }
}

/// Require an admin caller.
pub fn require_admin(user: &User) -> ApiResult<()> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(Error::forbidden("admin access required"))
    }
}

fn map_user_lookup_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail => Error::internal("unexpected duplicate email"),
    }
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    match err {
        CredentialsValidationError::InvalidEmail => {
            Error::invalid_request("email address is not valid")
                .with_details(json!({ "field": "email" }))
        }
        CredentialsValidationError::EmptyPassword => {
            Error::invalid_request("password must not be empty")
                .with_details(json!({ "field": "password" }))
        }
        CredentialsValidationError::PasswordTooShort { min } => {
            Error::invalid_request(format!("password must be at least {min} characters"))
                .with_details(json!({ "field": "password", "min": min }))
        }
    }
}

/// Redeem an invite code and create an account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and session established", body = User),
        (status = 400, description = "Invalid input or dead invite"),
        (status = 404, description = "Unknown invite code"),
        (status = 409, description = "Duplicate email or exhausted invite"),
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let user = state
        .registration
        .register(RegistrationRequest {
            invite_code: payload.invite_code,
            email: payload.email,
            display_name: payload.display_name,
            password: payload.password,
        })
        .await?;
    session.persist_user(&user.id)?;
    Ok(envelope::created(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account suspended"),
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_credentials_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user.id)?;
    Ok(envelope::ok(user))
}

/// Clear the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(envelope::ok(json!({ "loggedOut": true })))
}
