//! Document backends behind the typed store

use taskhub::models::{Task, TaskStatus, Workspace};
use taskhub::storage::Store;
use uuid::Uuid;

async fn exercise(store: &Store) {
    let owner = Uuid::new_v4();
    let workspace = Workspace::new("Acme".into(), "Rockets".into(), owner);
    store.insert(&workspace).await.unwrap();

    let mut todo = Task::new("Draft".into(), workspace.id, owner);
    let mut done = Task::new("Publish".into(), workspace.id, owner);
    done.set_status(TaskStatus::Completed);
    store.insert(&todo).await.unwrap();
    store.insert(&done).await.unwrap();

    let loaded: Workspace = store.require(workspace.id, "missing").await.unwrap();
    assert_eq!(loaded.name, "Acme");
    assert!(loaded.is_member(owner));

    let completed: Vec<Task> = store.find(|t: &Task| t.is_completed()).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title, "Publish");

    let before = todo.updated_at;
    todo.title = "Draft v2".into();
    store.save(&mut todo).await.unwrap();
    let reloaded: Task = store.require(todo.id, "missing").await.unwrap();
    assert_eq!(reloaded.title, "Draft v2");
    assert!(reloaded.updated_at >= before);

    assert!(store.delete::<Task>(done.id).await.unwrap());
    assert!(!store.delete::<Task>(done.id).await.unwrap());
    assert!(store.get::<Task>(done.id).await.unwrap().is_none());

    // Saving something that was never inserted is a 404
    let mut ghost = Task::new("Ghost".into(), workspace.id, owner);
    assert!(store.save(&mut ghost).await.is_err());

    // Collections are separate namespaces
    assert!(store.get::<Workspace>(todo.id).await.unwrap().is_none());
    store.health_check().await.unwrap();
}

#[tokio::test]
async fn test_memory_backend() {
    exercise(&Store::memory()).await;
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_backend_persists_across_connections() {
    use std::sync::Arc;
    use taskhub::config::DatabaseConfig;
    use taskhub::storage::database::SeaOrmBackend;

    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("taskhub.db").display()),
        ..DatabaseConfig::default()
    };

    let store = Store::new(Arc::new(SeaOrmBackend::new(&config).await.unwrap()));
    exercise(&store).await;

    // A second backend runs the migrations again and sees the same rows
    let reopened = Store::new(Arc::new(SeaOrmBackend::new(&config).await.unwrap()));
    let tasks: Vec<Task> = reopened.all().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Draft v2");
}
