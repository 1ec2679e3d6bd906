//! HTTP round trips through the full application

/// Create a workspace and a project in it as `$owner`, yielding their ids
macro_rules! seed_project {
    ($app:expr, $owner:expr) => {{
        let (status, body) = $crate::call!(
            $app,
            $crate::common::fixtures::post(
                "/api/workspaces",
                $owner,
                serde_json::json!({ "name": "Acme" })
            )
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED, "{}", body);
        let workspace = $crate::common::id_of(&body["data"]);

        let (status, body) = $crate::call!(
            $app,
            $crate::common::fixtures::post(
                &format!("/api/projects/workspace/{}", workspace),
                $owner,
                serde_json::json!({ "name": "Launch" })
            )
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED, "{}", body);
        (workspace, $crate::common::id_of(&body["data"]))
    }};
}

pub mod auth_tests;
pub mod comment_tests;
pub mod config_tests;
pub mod project_tests;
pub mod server_tests;
pub mod storage_tests;
pub mod task_tests;
pub mod upload_tests;
pub mod user_tests;
pub mod workspace_tests;
