//! Account endpoints
//!
//! Registration and login are public; everything else resolves the caller
//! through [`crate::auth::AuthUser`].

mod login;
mod models;
mod password;
mod register;
mod user;

pub use login::login;
pub use models::AuthResponse;
pub use password::change_password;
pub use register::register;
pub use user::{get_current_user, onboarding, update_profile};

use actix_web::web;

/// Configure authentication routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(get_current_user))
            .route("/profile", web::put().to(update_profile))
            .route("/onboarding", web::post().to(onboarding))
            .route("/change-password", web::post().to(change_password)),
    );
}
