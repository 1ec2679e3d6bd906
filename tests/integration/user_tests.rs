//! User directory, inbox and activity feed

use crate::common::fixtures::{self, TestContext};
use crate::common::id_of;
use crate::{call, test_app};
use actix_web::http::StatusCode;
use serde_json::json;

#[actix_web::test]
async fn test_search_and_public_profile() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice Smith", "alice@example.com").await;
    ctx.user("Bob Smith", "bob@example.com").await;
    ctx.user("Carol Jones", "carol@example.com").await;

    let (status, body) = call!(app, fixtures::get("/api/users/search?q=smith", &alice));
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice Smith", "Bob Smith"]);

    // Too short to search
    let (_, body) = call!(app, fixtures::get("/api/users/search?q=s", &alice));
    assert_eq!(body["data"], json!([]));

    let (status, body) = call!(app, fixtures::get(&format!("/api/users/{}", alice.id), &alice));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"].get("passwordHash").is_none());

    let (status, _) = call!(
        app,
        fixtures::get(&format!("/api/users/{}", uuid::Uuid::new_v4()), &alice)
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_inbox_read_state() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    call!(
        app,
        fixtures::post(
            &format!("/api/projects/{}/members", project),
            &alice,
            json!({ "userId": bob.id })
        )
    );
    for title in ["One", "Two"] {
        call!(
            app,
            fixtures::post(
                &format!("/api/tasks/project/{}", project),
                &alice,
                json!({ "title": title, "assignee": bob.id })
            )
        );
    }

    let (_, body) = call!(app, fixtures::get("/api/users/notifications", &bob));
    assert_eq!(body["data"]["unreadCount"], 3);
    let first = id_of(&body["data"]["notifications"][0]);

    let (status, body) = call!(
        app,
        fixtures::put(&format!("/api/users/notifications/{}/read", first), &bob, json!({}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["read"], true);

    // Nobody else can touch Bob's notifications
    let (status, _) = call!(
        app,
        fixtures::put(&format!("/api/users/notifications/{}/read", first), &alice, json!({}))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call!(app, fixtures::get("/api/users/notifications?read=false", &bob));
    assert_eq!(body["data"]["notifications"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["unreadCount"], 2);

    let (status, body) = call!(
        app,
        fixtures::put("/api/users/notifications/read-all", &bob, json!({}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All notifications marked as read");
    let (_, body) = call!(app, fixtures::get("/api/users/notifications?limit=1", &bob));
    assert_eq!(body["data"]["unreadCount"], 0);
    assert_eq!(body["data"]["notifications"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_activity_feed_is_scoped_to_membership() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;
    let (workspace, project) = seed_project!(app, &alice);
    call!(
        app,
        fixtures::post(
            &format!("/api/tasks/project/{}", project),
            &alice,
            json!({ "title": "Kickoff" })
        )
    );

    let (status, body) = call!(app, fixtures::get("/api/users/activity", &alice));
    assert_eq!(status, StatusCode::OK);
    let feed = body["data"].as_array().unwrap();
    assert_eq!(feed.len(), 3);
    assert_eq!(feed[0]["action"], "task_created");
    assert_eq!(feed[0]["user"]["name"], "Alice");

    let (_, body) = call!(
        app,
        fixtures::get(&format!("/api/users/activity?projectId={}&limit=10", project), &alice)
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = call!(app, fixtures::get("/api/users/activity", &bob));
    assert_eq!(body["data"], json!([]));

    let (status, _) = call!(
        app,
        fixtures::get(&format!("/api/users/activity?workspaceId={}", workspace), &bob)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}
