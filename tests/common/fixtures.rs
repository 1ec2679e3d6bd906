//! Test fixtures and request builders

use actix_web::http::header;
use actix_web::test::TestRequest;
use serde_json::Value;
use taskhub::config::Config;
use taskhub::models::User;
use taskhub::server::state::AppState;
use taskhub::storage::{StorageLayer, Store};
use taskhub::utils::crypto::hash_password;
use tempfile::TempDir;
use uuid::Uuid;

/// Password every seeded user gets
pub const PASSWORD: &str = "password123";

/// Application state over the memory store with a throwaway upload directory
pub struct TestContext {
    pub state: AppState,
    _uploads: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().expect("Failed to create upload dir");
        let mut config = Config::default();
        config.app.storage.database.url = "memory://".to_string();
        config.app.uploads.directory = uploads.path().to_string_lossy().into_owned();

        let storage = StorageLayer::new(&config)
            .await
            .expect("Failed to create storage layer");
        Self {
            state: AppState::new(config, storage),
            _uploads: uploads,
        }
    }

    pub fn store(&self) -> &Store {
        self.state.store()
    }

    /// Insert a user directly and sign a token for them
    pub async fn user(&self, name: &str, email: &str) -> Session {
        let hash = hash_password(PASSWORD).expect("Failed to hash password");
        let user = User::new(name.to_string(), email.to_string(), hash);
        self.store().insert(&user).await.expect("Failed to insert user");
        let token = self.state.auth.issue_token(&user).expect("Failed to issue token");
        Session {
            id: user.id,
            token,
        }
    }
}

/// A signed-in user
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub token: String,
}

impl Session {
    fn authorize(&self, req: TestRequest) -> TestRequest {
        req.insert_header((header::AUTHORIZATION, format!("Bearer {}", self.token)))
    }
}

pub fn get(uri: &str, session: &Session) -> TestRequest {
    session.authorize(TestRequest::get().uri(uri))
}

pub fn post(uri: &str, session: &Session, body: Value) -> TestRequest {
    session.authorize(TestRequest::post().uri(uri).set_json(body))
}

pub fn put(uri: &str, session: &Session, body: Value) -> TestRequest {
    session.authorize(TestRequest::put().uri(uri).set_json(body))
}

pub fn delete(uri: &str, session: &Session) -> TestRequest {
    session.authorize(TestRequest::delete().uri(uri))
}
