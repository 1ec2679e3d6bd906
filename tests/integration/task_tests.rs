//! Task lifecycle, personal buckets and search

use crate::common::fixtures::{self, TestContext};
use crate::common::id_of;
use crate::{call, test_app};
use actix_web::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

#[actix_web::test]
async fn test_task_counts_follow_status_changes() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    let project_uri = format!("/api/projects/{}", project);

    let (status, body) = call!(
        app,
        fixtures::post(
            &format!("/api/tasks/project/{}", project),
            &alice,
            json!({ "title": "  Ship it  ", "priority": "high" })
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    let task = &body["data"];
    assert_eq!(task["title"], "Ship it");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["creator"]["name"], "Alice");
    assert_eq!(task["followers"][0]["name"], "Alice");
    let task_uri = format!("/api/tasks/{}", id_of(task));

    let (_, body) = call!(app, fixtures::get(&project_uri, &alice));
    assert_eq!(body["data"]["taskCount"], 1);
    assert_eq!(body["data"]["completedTaskCount"], 0);

    let (status, body) = call!(
        app,
        fixtures::put(&task_uri, &alice, json!({ "status": "completed" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["completedAt"].is_string());
    let (_, body) = call!(app, fixtures::get(&project_uri, &alice));
    assert_eq!(body["data"]["completedTaskCount"], 1);

    // Completing is still logged as an update, carrying the changes
    let (_, body) = call!(
        app,
        fixtures::get(&format!("/api/users/activity?projectId={}", project), &alice)
    );
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert!(actions.contains(&"task_updated"), "{:?}", actions);
    assert!(!actions.contains(&"task_completed"), "{:?}", actions);

    // Reopening clears the completion
    let (_, body) = call!(
        app,
        fixtures::put(&task_uri, &alice, json!({ "status": "in_progress" }))
    );
    assert!(body["data"]["completedAt"].is_null());
    let (_, body) = call!(app, fixtures::get(&project_uri, &alice));
    assert_eq!(body["data"]["completedTaskCount"], 0);

    let (status, body) = call!(app, fixtures::delete(&task_uri, &alice));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");
    let (_, body) = call!(app, fixtures::get(&project_uri, &alice));
    assert_eq!(body["data"]["taskCount"], 0);

    let (status, _) = call!(app, fixtures::get(&task_uri, &alice));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_task_validation_and_access() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let mallory = ctx.user("Mallory", "mallory@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    let tasks = format!("/api/tasks/project/{}", project);

    let (status, _) = call!(app, fixtures::post(&tasks, &alice, json!({ "title": "   " })));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let due = Utc::now();
    let (status, _) = call!(
        app,
        fixtures::post(
            &tasks,
            &alice,
            json!({ "title": "Backwards", "startDate": due, "dueDate": due - Duration::days(2) })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Not a project member, even though the project is public
    let (status, _) = call!(app, fixtures::post(&tasks, &mallory, json!({ "title": "Hi" })));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(app, fixtures::get("/api/tasks", &alice));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Project ID is required");

    let (status, body) = call!(app, fixtures::get("/api/tasks/not-a-uuid", &alice));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid resource id");
}

#[actix_web::test]
async fn test_list_filters_by_tags_and_status() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    let tasks = format!("/api/tasks/project/{}", project);

    for (title, tags, status) in [
        ("One", json!(["ui"]), "todo"),
        ("Two", json!(["api"]), "blocked"),
        ("Three", json!(["ui", "api"]), "todo"),
    ] {
        let (status, _) = call!(
            app,
            fixtures::post(&tasks, &alice, json!({ "title": title, "tags": tags, "status": status }))
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = call!(app, fixtures::get(&format!("{}?tags=ui", tasks), &alice));
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    let (_, body) = call!(app, fixtures::get(&format!("{}?status=blocked", tasks), &alice));
    assert_eq!(body["data"][0]["title"], "Two");
    let (_, body) = call!(
        app,
        fixtures::get(&format!("/api/tasks?project={}&tags=api,ui", project), &alice)
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    // Creation order
    assert_eq!(body["data"][0]["title"], "One");
}

#[actix_web::test]
async fn test_assignment_notifies_and_fills_my_tasks() {
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
    let tasks = format!("/api/tasks/project/{}", project);

    let (_, body) = call!(
        app,
        fixtures::post(
            &tasks,
            &alice,
            json!({ "title": "Due soon", "assignee": bob.id, "dueDate": Utc::now() + Duration::days(3) })
        )
    );
    assert_eq!(body["data"]["assignee"]["_id"], bob.id.to_string());
    let (_, body) = call!(
        app,
        fixtures::post(&tasks, &alice, json!({ "title": "Someday", "assignee": bob.id }))
    );
    let someday = id_of(&body["data"]);
    call!(
        app,
        fixtures::put(
            &format!("/api/tasks/{}", someday),
            &bob,
            json!({ "status": "completed" })
        )
    );

    let (status, body) = call!(app, fixtures::get("/api/tasks/my-tasks", &bob));
    assert_eq!(status, StatusCode::OK);
    let buckets = &body["data"];
    assert_eq!(buckets["recentlyAssigned"].as_array().unwrap().len(), 2);
    assert_eq!(buckets["doNextWeek"][0]["title"], "Due soon");
    assert_eq!(buckets["doNextWeek"][0]["project"]["name"], "Launch");
    assert_eq!(buckets["completed"][0]["title"], "Someday");
    assert_eq!(buckets["doToday"], json!([]));

    let (_, body) = call!(app, fixtures::get("/api/tasks/my-tasks", &alice));
    assert_eq!(body["data"]["recentlyAssigned"], json!([]));

    let (_, body) = call!(app, fixtures::get("/api/users/notifications", &bob));
    assert_eq!(body["data"]["unreadCount"], 2);
    assert_eq!(body["data"]["notifications"][0]["type"], "task_assigned");
}

#[actix_web::test]
async fn test_search_only_sees_visible_projects() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    let tasks = format!("/api/tasks/project/{}", project);

    call!(
        app,
        fixtures::post(&tasks, &alice, json!({ "title": "Fix login bug" }))
    );
    call!(
        app,
        fixtures::post(
            &tasks,
            &alice,
            json!({ "title": "Polish", "description": "The LOGIN screen needs love" })
        )
    );
    call!(
        app,
        fixtures::post(&tasks, &alice, json!({ "title": "Unrelated" }))
    );

    let (status, body) = call!(app, fixtures::get("/api/tasks/search?q=login", &alice));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["project"]["name"], "Launch");

    call!(
        app,
        fixtures::put(
            &format!("/api/projects/{}", project),
            &alice,
            json!({ "privacy": "private" })
        )
    );
    let (_, body) = call!(app, fixtures::get("/api/tasks/search?q=login", &bob));
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn test_subtasks_followers_and_dependencies() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let alice = ctx.user("Alice", "alice@example.com").await;
    let bob = ctx.user("Bob", "bob@example.com").await;
    let (_, project) = seed_project!(app, &alice);
    let tasks = format!("/api/tasks/project/{}", project);

    let (_, body) = call!(app, fixtures::post(&tasks, &alice, json!({ "title": "Build" })));
    let build = id_of(&body["data"]);
    let (_, body) = call!(app, fixtures::post(&tasks, &alice, json!({ "title": "Design" })));
    let design = id_of(&body["data"]);
    let build_uri = format!("/api/tasks/{}", build);

    let (status, body) = call!(
        app,
        fixtures::post(
            &format!("{}/subtasks", build_uri),
            &alice,
            json!({ "title": "Wire up" })
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    let subtask = id_of(&body["data"]["subtasks"][0]);
    let (_, body) = call!(
        app,
        fixtures::put(
            &format!("{}/subtasks/{}", build_uri, subtask),
            &alice,
            json!({ "completed": true })
        )
    );
    assert_eq!(body["data"]["subtasks"][0]["completed"], true);
    assert_eq!(body["data"]["subtasks"][0]["completedBy"]["name"], "Alice");

    for _ in 0..2 {
        let (status, body) = call!(
            app,
            fixtures::post(
                &format!("{}/followers", build_uri),
                &alice,
                json!({ "userId": bob.id })
            )
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["followers"].as_array().unwrap().len(), 2);
    }

    let (status, _) = call!(
        app,
        fixtures::post(
            &format!("{}/dependencies", build_uri),
            &alice,
            json!({ "taskId": build, "type": "blockedBy" })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call!(
        app,
        fixtures::post(
            &format!("{}/dependencies", build_uri),
            &alice,
            json!({ "taskId": design, "type": "blockedBy" })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dependencies"]["blockedBy"][0]["title"], "Design");

    let (_, body) = call!(app, fixtures::get(&format!("/api/tasks/{}", design), &alice));
    assert_eq!(body["data"]["dependencies"]["blocking"][0]["title"], "Build");

    // Deleting the blocker clears the link on the other side
    call!(app, fixtures::delete(&format!("/api/tasks/{}", design), &alice));
    let (_, body) = call!(app, fixtures::get(&build_uri, &alice));
    assert_eq!(body["data"]["dependencies"]["blockedBy"], json!([]));
}
