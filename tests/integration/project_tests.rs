//! Projects, sections, membership and automations

use crate::common::fixtures::{self, TestContext};
use crate::common::id_of;
use crate::{call, test_app};
use actix_web::http::StatusCode;
use serde_json::json;

#[actix_web::test]
async fn test_new_project_has_default_sections() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let (workspace, project) = seed_project!(app, &alice);

    let (status, body) = call!(app, fixtures::get(&format!("/api/projects/{}", project), &alice));
    assert_eq!(status, StatusCode::OK);
    let sections: Vec<&str> = body["data"]["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(sections, vec!["To Do", "In Progress", "Done"]);
    assert_eq!(body["data"]["members"][0]["role"], "owner");
    assert_eq!(body["data"]["taskCount"], 0);

    let (_, body) = call!(
        app,
        fixtures::get(&format!("/api/workspaces/{}", workspace), &alice)
    );
    assert_eq!(body["data"]["projects"][0]["name"], "Launch");

    let (_, body) = call!(
        app,
        fixtures::get(&format!("/api/projects?workspace={}", workspace), &alice)
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_project_requires_workspace_membership() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let mallory = ctx.user("Mallory", "mallory@example.com").await;
    let (workspace, _) = seed_project!(app, &alice);

    let (status, _) = call!(
        app,
        fixtures::post(
            &format!("/api/projects/workspace/{}", workspace),
            &mallory,
            json!({ "name": "Sneaky" })
        )
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        fixtures::post("/api/projects", &alice, json!({ "name": "No workspace" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Workspace not found");
}

#[actix_web::test]
async fn test_viewers_cannot_edit_and_only_owner_deletes() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let victor = ctx.user("Victor", "victor@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    let uri = format!("/api/projects/{}", project);

    let (status, body) = call!(
        app,
        fixtures::post(
            &format!("{}/members", uri),
            &alice,
            json!({ "userId": victor.id, "role": "viewer" })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["members"][1]["role"], "viewer");

    let (status, _) = call!(app, fixtures::put(&uri, &victor, json!({ "name": "Renamed" })));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(app, fixtures::put(&uri, &alice, json!({ "name": "Renamed" })));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");

    let (status, _) = call!(app, fixtures::delete(&uri, &victor));
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = call!(app, fixtures::delete(&uri, &alice));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");
}

#[actix_web::test]
async fn test_deleting_section_unfiles_its_tasks() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let (_, project) = seed_project!(app, &alice);

    let (status, body) = call!(
        app,
        fixtures::post(
            &format!("/api/projects/{}/sections", project),
            &alice,
            json!({ "name": "Review" })
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    let review = id_of(&body["data"]["sections"][3]);
    assert_eq!(body["data"]["sections"][3]["order"], 3);

    let (_, body) = call!(
        app,
        fixtures::post(
            &format!("/api/tasks/project/{}", project),
            &alice,
            json!({ "title": "Check copy", "section": review })
        )
    );
    let task = id_of(&body["data"]);
    assert_eq!(body["data"]["section"], review.to_string());

    let (status, body) = call!(
        app,
        fixtures::delete(&format!("/api/projects/{}/sections/{}", project, review), &alice)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sections"].as_array().unwrap().len(), 3);

    let (_, body) = call!(app, fixtures::get(&format!("/api/tasks/{}", task), &alice));
    assert!(body["data"]["section"].is_null());
}

#[actix_web::test]
async fn test_automation_runs_on_task_creation() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let (_, project) = seed_project!(app, &alice);

    let (status, body) = call!(
        app,
        fixtures::post(
            &format!("/api/projects/{}/automations", project),
            &alice,
            json!({
                "name": "Urgent bugs",
                "trigger": { "type": "task_created", "conditions": { "tag": "bug" } },
                "actions": [
                    { "type": "set_priority", "value": "urgent" },
                    { "type": "add_tag", "value": "triage" }
                ]
            })
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    let automation = id_of(&body["data"]);

    let tasks = format!("/api/tasks/project/{}", project);
    let (_, body) = call!(
        app,
        fixtures::post(&tasks, &alice, json!({ "title": "Crash on save", "tags": ["bug"] }))
    );
    assert_eq!(body["data"]["priority"], "urgent");
    assert_eq!(body["data"]["tags"], json!(["bug", "triage"]));

    let (_, body) = call!(
        app,
        fixtures::post(&tasks, &alice, json!({ "title": "Write docs" }))
    );
    assert_eq!(body["data"]["priority"], "medium");

    let (_, body) = call!(
        app,
        fixtures::get(&format!("/api/projects/{}/automations", project), &alice)
    );
    assert_eq!(body["data"][0]["executionCount"], 1);

    let (status, body) = call!(
        app,
        fixtures::put(
            &format!("/api/automations/{}", automation),
            &alice,
            json!({ "active": false })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], false);

    let (_, body) = call!(
        app,
        fixtures::post(&tasks, &alice, json!({ "title": "Another bug", "tags": ["bug"] }))
    );
    assert_eq!(body["data"]["priority"], "medium");
}
