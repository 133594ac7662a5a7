#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{http::header, test};
use serde_json::json;
use taskforge_auth::{
    auth::{CredentialManager, TokenConfig, TokenResponse, TokenService},
    models::User,
    state::AppState,
    store::{MemoryStore, Store},
};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Application state over a fresh in-memory store. Uses the cheapest bcrypt
/// cost so the suites stay fast.
pub fn test_state() -> AppState {
    test_state_with_cost(4)
}

pub fn test_state_with_cost(bcrypt_cost: u32) -> AppState {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    AppState::new(
        store,
        TokenService::new(TokenConfig::new(TEST_SECRET)),
        CredentialManager::new(bcrypt_cost),
    )
}

/// Builds the full application the way `main` does.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(actix_web::middleware::Logger::default())
                .service(taskforge_auth::routes::health::health)
                .configure(taskforge_auth::routes::config),
        )
    };
}

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i32,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn register(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, String> {
    let req = test::TestRequest::post()
        .uri("/users/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if status != actix_web::http::StatusCode::CREATED {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    serde_json::from_slice(&body).map_err(|e| format!("Failed to parse user: {}", e))
}

pub async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Result<TokenResponse, String> {
    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_form([("username", email), ("password", password)])
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    serde_json::from_slice(&body).map_err(|e| format!("Failed to parse token response: {}", e))
}

pub async fn register_and_login_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let user = register(app, name, email, password).await?;
    let token = login(app, email, password).await?;
    Ok(TestUser {
        id: user.id,
        token: token.access_token,
    })
}
