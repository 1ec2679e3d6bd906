//! Activity log

use super::ServiceContext;
use crate::auth::access;
use crate::models::{ActivityLog, Project, User, Workspace};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Feed filters accepted by `GET /api/users/activity`
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub workspace: Option<Uuid>,
    pub project: Option<Uuid>,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct ActivityService {
    ctx: ServiceContext,
}

impl ActivityService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store an entry and broadcast it to its workspace and project rooms
    pub async fn log(&self, entry: ActivityLog) -> Result<ActivityLog> {
        self.ctx.store.insert(&entry).await?;
        if let Some(workspace) = entry.workspace {
            self.ctx.events.emit_to_workspace(workspace, "activity", &entry);
        }
        if let Some(project) = entry.project {
            self.ctx.events.emit_to_project(project, "activity", &entry);
        }
        Ok(entry)
    }

    /// Newest-first feed
    ///
    /// A workspace filter requires membership and a project filter requires
    /// visibility. With neither, the feed covers the caller's own workspaces.
    pub async fn feed(&self, user: &User, filter: ActivityFilter) -> Result<Vec<ActivityLog>> {
        if let Some(workspace_id) = filter.workspace {
            let workspace: Workspace = self
                .ctx
                .store
                .require(workspace_id, "Workspace not found")
                .await?;
            access::require_workspace_member(&workspace, user.id)?;
        }
        if let Some(project_id) = filter.project {
            let project: Project = self
                .ctx
                .store
                .require(project_id, "Project not found")
                .await?;
            access::require_project_view(&project, user.id)?;
        }

        let scope = user.workspaces.clone();
        let unscoped = filter.workspace.is_none() && filter.project.is_none();
        let mut entries: Vec<ActivityLog> = self
            .ctx
            .store
            .find(|a: &ActivityLog| {
                if filter.workspace.is_some() && a.workspace != filter.workspace {
                    return false;
                }
                if filter.project.is_some() && a.project != filter.project {
                    return false;
                }
                if unscoped {
                    return a.user == user.id
                        || a.workspace.is_some_and(|w| scope.contains(&w));
                }
                true
            })
            .await?;

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(filter.limit);
        Ok(entries)
    }

    /// Drop entries created before `cutoff`
    pub async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.ctx
            .store
            .delete_where(|a: &ActivityLog| a.created_at < cutoff)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityAction;
    use crate::realtime::{EventHub, Room};
    use crate::storage::Store;
    use crate::utils::error::AppError;

    #[tokio::test]
    async fn test_log_broadcasts_to_rooms() {
        let events = EventHub::new();
        let service = ActivityService::new(ServiceContext::new(Store::memory(), events.clone()));
        let mut rx = events.subscribe();
        let ws = Uuid::new_v4();
        let project = Uuid::new_v4();

        service
            .log(
                ActivityLog::new(Uuid::new_v4(), ActivityAction::TaskCreated, "Created".into())
                    .workspace(ws)
                    .project(project),
            )
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().room, Room::Workspace(ws));
        assert_eq!(rx.recv().await.unwrap().room, Room::Project(project));
    }

    #[tokio::test]
    async fn test_feed_requires_workspace_membership() {
        let store = Store::memory();
        let service = ActivityService::new(ServiceContext::new(store.clone(), EventHub::new()));
        let owner = User::new("Owner".into(), "o@x.io".into(), "h".into());
        let outsider = User::new("Out".into(), "x@x.io".into(), "h".into());
        let ws = Workspace::new("Acme".into(), String::new(), owner.id);
        store.insert(&ws).await.unwrap();

        let filter = ActivityFilter {
            workspace: Some(ws.id),
            limit: 50,
            ..Default::default()
        };
        let err = service.feed(&outsider, filter.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(service.feed(&owner, filter).await.unwrap().is_empty());
    }
}
