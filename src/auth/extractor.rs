//! Request extractor for the authenticated user

use crate::models::User;
use crate::server::state::AppState;
use crate::utils::error::AppError;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

/// The user behind the request's bearer token
///
/// Extraction fails with 401 when the header is missing, the token does not
/// verify, or its subject no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl Deref for AuthUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Box::pin(async move {
            let state = state.ok_or_else(|| AppError::internal("Application state missing"))?;
            let user = state.auth.authenticate_header(header.as_deref()).await?;
            Ok(AuthUser(user))
        })
    }
}
