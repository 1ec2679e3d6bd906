//! Comments, mentions and reactions

use crate::common::fixtures::{self, TestContext};
use crate::common::id_of;
use crate::{call, test_app};
use actix_web::http::StatusCode;
use serde_json::json;

#[actix_web::test]
async fn test_comment_notifies_followers_and_mentions() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;
    let carol = ctx.user("Carol", "carol@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    call!(
        app,
        fixtures::post(
            &format!("/api/projects/{}/members", project),
            &alice,
            json!({ "userId": bob.id })
        )
    );

    let (_, body) = call!(
        app,
        fixtures::post(
            &format!("/api/tasks/project/{}", project),
            &alice,
            json!({ "title": "Review" })
        )
    );
    let task = id_of(&body["data"]);
    let comments = format!("/api/tasks/{}/comments", task);

    let (status, body) = call!(
        app,
        fixtures::post(
            &comments,
            &bob,
            json!({ "content": " Looks good ", "mentions": [carol.id, carol.id] })
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"], "Looks good");
    assert_eq!(body["data"]["author"]["name"], "Bob");
    assert_eq!(body["data"]["mentions"].as_array().unwrap().len(), 1);

    // Alice follows the task she created; Carol was mentioned
    let (_, body) = call!(app, fixtures::get("/api/users/notifications", &alice));
    assert_eq!(body["data"]["notifications"][0]["type"], "comment_added");
    assert_eq!(body["data"]["notifications"][0]["sender"]["name"], "Bob");
    let (_, body) = call!(app, fixtures::get("/api/users/notifications", &carol));
    assert_eq!(body["data"]["unreadCount"], 1);
    assert_eq!(body["data"]["notifications"][0]["type"], "comment_mention");
    // The author is not told about their own comment
    let (_, body) = call!(app, fixtures::get("/api/users/notifications", &bob));
    assert!(
        body["data"]["notifications"]
            .as_array()
            .unwrap()
            .iter()
            .all(|n| n["type"] != "comment_added")
    );

    let (_, body) = call!(app, fixtures::get(&format!("/api/tasks/{}", task), &alice));
    assert_eq!(body["data"]["commentCount"], 1);

    let (status, body) = call!(app, fixtures::get(&comments, &alice));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_only_author_edits_and_deletes() {
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
    let (_, body) = call!(
        app,
        fixtures::post(
            &format!("/api/tasks/project/{}", project),
            &alice,
            json!({ "title": "Review" })
        )
    );
    let task = id_of(&body["data"]);

    let (_, body) = call!(
        app,
        fixtures::post(
            &format!("/api/tasks/{}/comments", task),
            &alice,
            json!({ "content": "First draft" })
        )
    );
    let comment = format!("/api/tasks/comments/{}", id_of(&body["data"]));

    let (status, _) = call!(app, fixtures::put(&comment, &bob, json!({ "content": "Hijack" })));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        fixtures::put(&comment, &alice, json!({ "content": "Second draft" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "Second draft");
    assert_eq!(body["data"]["edited"], true);

    let (status, _) = call!(app, fixtures::delete(&comment, &bob));
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = call!(app, fixtures::delete(&comment, &alice));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment deleted successfully");

    let (_, body) = call!(app, fixtures::get(&format!("/api/tasks/{}", task), &alice));
    assert_eq!(body["data"]["commentCount"], 0);
}

#[actix_web::test]
async fn test_reactions_are_unique_per_user_and_emoji() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    let (_, body) = call!(
        app,
        fixtures::post(
            &format!("/api/tasks/project/{}", project),
            &alice,
            json!({ "title": "Review" })
        )
    );
    let (_, body) = call!(
        app,
        fixtures::post(
            &format!("/api/tasks/{}/comments", id_of(&body["data"])),
            &alice,
            json!({ "content": "Done!" })
        )
    );
    let reactions = format!("/api/tasks/comments/{}/reactions", id_of(&body["data"]));

    let (status, body) = call!(app, fixtures::post(&reactions, &alice, json!({ "emoji": "🎉" })));
    assert_eq!(status, StatusCode::OK);
    let reaction = id_of(&body["data"]["reactions"][0]);

    let (status, _) = call!(app, fixtures::post(&reactions, &alice, json!({ "emoji": "🎉" })));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Any viewer of a public project may react
    let (status, body) = call!(app, fixtures::post(&reactions, &bob, json!({ "emoji": "🎉" })));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reactions"].as_array().unwrap().len(), 2);

    let (status, _) = call!(
        app,
        fixtures::delete(&format!("{}/{}", reactions, reaction), &bob)
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call!(
        app,
        fixtures::delete(&format!("{}/{}", reactions, reaction), &alice)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reactions"].as_array().unwrap().len(), 1);
}
