//! Workspace membership, invitations and teams

use crate::common::fixtures::{self, TestContext};
use crate::common::id_of;
use crate::{call, test_app};
use actix_web::http::StatusCode;
use serde_json::json;

#[actix_web::test]
async fn test_create_and_list_workspaces() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;

    let (status, body) = call!(
        app,
        fixtures::post(
            "/api/workspaces",
            &alice,
            json!({ "name": "  Acme  ", "description": "Rockets" })
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    let workspace = &body["data"];
    assert_eq!(workspace["name"], "Acme");
    assert_eq!(workspace["owner"]["name"], "Alice");
    assert_eq!(workspace["members"][0]["role"], "owner");
    assert_eq!(workspace["members"][0]["user"]["email"], "alice@example.com");
    let id = id_of(workspace);

    let (_, body) = call!(app, fixtures::get("/api/workspaces", &alice));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = call!(app, fixtures::get("/api/workspaces", &bob));
    assert_eq!(body["data"], json!([]));

    let (status, body) = call!(app, fixtures::get(&format!("/api/workspaces/{}", id), &bob));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[actix_web::test]
async fn test_member_management_rules() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;
    ctx.user("Carol", "carol@example.com").await;

    let (_, body) = call!(
        app,
        fixtures::post("/api/workspaces", &alice, json!({ "name": "Acme" }))
    );
    let id = id_of(&body["data"]);
    let members = format!("/api/workspaces/{}/members", id);

    let (status, body) = call!(
        app,
        fixtures::post(&members, &alice, json!({ "email": "BOB@example.com" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["members"][1]["role"], "member");

    let (status, _) = call!(
        app,
        fixtures::post(&members, &alice, json!({ "email": "bob@example.com" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call!(
        app,
        fixtures::post(&members, &alice, json!({ "email": "ghost@example.com" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A plain member cannot invite
    let (status, _) = call!(
        app,
        fixtures::post(&members, &bob, json!({ "email": "carol@example.com" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call!(
        app,
        fixtures::put(
            &format!("{}/{}", members, bob.id),
            &alice,
            json!({ "role": "owner" })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call!(
        app,
        fixtures::put(
            &format!("{}/{}", members, bob.id),
            &alice,
            json!({ "role": "admin" })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["members"][1]["role"], "admin");

    // Nobody removes the owner
    let (status, _) = call!(
        app,
        fixtures::delete(&format!("{}/{}", members, alice.id), &bob)
    );
    assert!(status.is_client_error());

    let (_, body) = call!(app, fixtures::get("/api/workspaces", &bob));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_bulk_invite_reports_each_email() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    ctx.user("Bob", "bob@example.com").await;

    let (_, body) = call!(
        app,
        fixtures::post("/api/workspaces", &alice, json!({ "name": "Acme" }))
    );
    let id = id_of(&body["data"]);

    let (status, body) = call!(
        app,
        fixtures::post(
            &format!("/api/workspaces/{}/invite", id),
            &alice,
            json!({ "emails": ["alice@example.com", "bob@example.com", "new@example.com"] })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sent invitations to 2 teammates");
    let statuses: Vec<&str> = body["data"]["invitations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["already_member", "added", "invited"]);
    assert_eq!(
        body["data"]["workspace"]["pendingInvitations"][0]["email"],
        "new@example.com"
    );

    let (status, _) = call!(
        app,
        fixtures::post(
            &format!("/api/workspaces/{}/invite", id),
            &alice,
            json!({ "emails": [] })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_teams_inside_a_workspace() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let outsider = ctx.user("Oscar", "oscar@example.com").await;

    let (_, body) = call!(
        app,
        fixtures::post("/api/workspaces", &alice, json!({ "name": "Acme" }))
    );
    let id = id_of(&body["data"]);

    let (status, body) = call!(
        app,
        fixtures::post(
            &format!("/api/workspaces/{}/teams", id),
            &alice,
            json!({ "name": "Design" })
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    let team = id_of(&body["data"]);
    assert_eq!(body["data"]["members"][0]["role"], "lead");

    let (_, body) = call!(
        app,
        fixtures::get(&format!("/api/workspaces/{}/teams", id), &alice)
    );
    assert_eq!(body["data"][0]["name"], "Design");

    // Team members have to belong to the workspace first
    let (status, _) = call!(
        app,
        fixtures::post(
            &format!("/api/teams/{}/members", team),
            &alice,
            json!({ "userId": outsider.id })
        )
    );
    assert!(status.is_client_error());

    let (status, body) = call!(app, fixtures::delete(&format!("/api/teams/{}", team), &alice));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Team deleted successfully");
}

#[actix_web::test]
async fn test_only_owner_deletes_workspace() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;

    let (_, body) = call!(
        app,
        fixtures::post("/api/workspaces", &alice, json!({ "name": "Acme" }))
    );
    let id = id_of(&body["data"]);
    call!(
        app,
        fixtures::post(
            &format!("/api/workspaces/{}/members", id),
            &alice,
            json!({ "email": "bob@example.com", "role": "admin" })
        )
    );

    let (status, _) = call!(app, fixtures::delete(&format!("/api/workspaces/{}", id), &bob));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(app, fixtures::delete(&format!("/api/workspaces/{}", id), &alice));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Workspace deleted successfully");

    let (status, _) = call!(app, fixtures::get(&format!("/api/workspaces/{}", id), &alice));
    assert_eq!(status, StatusCode::NOT_FOUND);
}
