//! Common test utilities for TaskHub
//!
//! ```rust,ignore
//! use crate::common::{TestContext, fixtures};
//! use crate::{call, test_app};
//!
//! #[actix_web::test]
//! async fn my_test() {
//!     let ctx = TestContext::new().await;
//!     let app = test_app!(ctx);
//!     let alice = ctx.user("Alice", "alice@example.com").await;
//!     let (status, body) = call!(app, fixtures::get("/api/workspaces", &alice));
//! }
//! ```

pub mod fixtures;

pub use fixtures::{Session, TestContext};

/// Build the full actix application around a [`TestContext`]
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(taskhub::server::server::HttpServer::create_app(
            actix_web::web::Data::new($ctx.state.clone()),
        ))
        .await
    };
}

/// Send a `TestRequest` and return `(status, json body)`
#[macro_export]
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = actix_web::test::read_body(resp).await;
        let body: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };
        (status, body)
    }};
}

/// Id of a JSON document
pub fn id_of(value: &serde_json::Value) -> uuid::Uuid {
    value["_id"]
        .as_str()
        .and_then(|s| uuid::Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("no _id in {}", value))
}
