//! Domain services
//!
//! Each service is a thin handle over a shared [`ServiceContext`] (the
//! document store plus the realtime hub) and is constructed on demand from the
//! application state. Handlers stay limited to extraction and response shaping.

pub mod activity;
pub mod auth;
pub mod automations;
pub mod comments;
pub mod maintenance;
pub mod notifications;
pub mod populate;
pub mod projects;
pub mod tasks;
pub mod teams;
pub mod users;
pub mod workspaces;

pub use activity::ActivityService;
pub use auth::AccountService;
pub use automations::AutomationService;
pub use comments::CommentService;
pub use maintenance::Maintenance;
pub use notifications::Notifier;
pub use populate::Populator;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use teams::TeamService;
pub use users::UserService;
pub use workspaces::WorkspaceService;

use crate::realtime::EventHub;
use crate::storage::Store;
use crate::utils::error::Result;
use tracing::warn;

/// Everything a service needs: persistence and broadcast
#[derive(Debug, Clone)]
pub struct ServiceContext {
    pub store: Store,
    pub events: EventHub,
}

impl ServiceContext {
    pub fn new(store: Store, events: EventHub) -> Self {
        Self { store, events }
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.clone())
    }

    pub fn activity(&self) -> ActivityService {
        ActivityService::new(self.clone())
    }

    pub fn automations(&self) -> AutomationService {
        AutomationService::new(self.clone())
    }

    pub fn populator(&self) -> Populator<'_> {
        Populator::new(&self.store)
    }
}

/// Log and swallow the failure of a side effect so the triggering request still succeeds
pub(crate) fn isolate<T>(effect: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} failed: {}", effect, e);
            None
        }
    }
}

/// Deserialize a field that distinguishes "absent" from an explicit `null`
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: absent is `None`, `null` is `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
