use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::errors::AuthError;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves the caller's identity before the wrapped service runs.
///
/// Wrap only the scopes or resources that require a logged-in user. On
/// success the resolved [`User`](crate::models::User) is placed in the
/// request extensions for [`CurrentUser`](crate::auth::extractors::CurrentUser);
/// on any failure the middleware answers with a generic 401 itself and the
/// inner service is never called.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let state = match req.app_data::<web::Data<AppState>>().cloned() {
                Some(state) => state,
                None => {
                    log::error!("Application state missing on {}", req.path());
                    let err = AppError::InternalServerError("Application state missing".into());
                    return Ok(req.error_response(err).map_into_right_body());
                }
            };

            let token = match bearer_token(&req) {
                Some(token) => token,
                None => {
                    log::debug!("No bearer token on {} {}", req.method(), req.path());
                    return Ok(reject(req, AuthError::Invalid));
                }
            };

            let user = match state.identity.resolve(&token).await {
                Ok(user) => user,
                Err(err) => {
                    log::debug!(
                        "Authentication failed on {} {}: {}",
                        req.method(),
                        req.path(),
                        err
                    );
                    return Ok(reject(req, err));
                }
            };

            req.extensions_mut().insert(user);
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Ends the request with the response for `err`.
fn reject<B>(req: ServiceRequest, err: AuthError) -> ServiceResponse<EitherBody<B>> {
    req.error_response(AppError::from(err)).map_into_right_body()
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
