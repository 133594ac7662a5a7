use crate::{
    auth::{AuthError, CurrentUser, LoginForm, PasswordChange, RegisterRequest, TokenResponse},
    error::AppError,
    models::{NewUser, UserUpdate},
    state::AppState,
    store::StoreError,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Hashes the password and stores the account. Duplicate emails are rejected
/// with `400 Bad Request`.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let register_data = register_data.into_inner();

    if state
        .store
        .find_user_by_email(&register_data.email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let hashed_password = state.credentials.hash(&register_data.password)?;

    let user = state
        .store
        .create_user(NewUser {
            name: register_data.name,
            email: register_data.email,
            hashed_password,
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration.
            StoreError::Conflict(_) => AppError::BadRequest("Email already registered".into()),
            other => other.into(),
        })?;

    log::info!("Registered user {}", user.id);
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Accepts a form-encoded `username` (the email) and `password` and returns a
/// bearer token valid for the configured access-token lifetime.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let user = state
        .store
        .find_user_by_email(&form.username)
        .await
        .map_err(AuthError::Store)?;

    // Unknown emails still pay for a full bcrypt comparison.
    let verified = state.credentials.verify_stored(
        &form.password,
        user.as_ref().map(|user| user.hashed_password.as_str()),
    );
    let user = match user {
        Some(user) if verified => user,
        _ => {
            log::debug!("Rejected login attempt");
            return Err(AuthError::BadCredentials.into());
        }
    };

    let token = state
        .tokens
        .issue(&user.email, Some(state.tokens.access_token_ttl()))?;

    log::info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

/// Returns the identity resolved from the bearer token.
pub async fn me(current_user: CurrentUser) -> impl Responder {
    HttpResponse::Ok().json(current_user.into_inner())
}

/// Replaces the caller's password after checking the old one.
pub async fn change_password(
    state: web::Data<AppState>,
    current_user: CurrentUser,
    passwords: web::Json<PasswordChange>,
) -> Result<impl Responder, AppError> {
    let user = current_user.into_inner();

    if !state
        .credentials
        .verify(&passwords.old_password, &user.hashed_password)
    {
        return Err(AppError::BadRequest("Incorrect old password".into()));
    }

    let new_hash = state.credentials.hash(&passwords.new_password)?;
    if !state.store.update_credential_hash(user.id, &new_hash).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    log::info!("User {} changed password", user.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed" })))
}

#[get("")]
pub async fn list_users(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let users = state.store.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    match state.store.find_user_by_id(user_id.into_inner()).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    user_data: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;

    let updated = state
        .store
        .update_user(user_id.into_inner(), user_data.into_inner())
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AppError::BadRequest("Email already registered".into()),
            other => other.into(),
        })?;

    match updated {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    if !state.store.delete_user(user_id.into_inner()).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}
