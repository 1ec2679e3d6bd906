//! Domain documents
//!
//! Every document is keyed by a UUID serialized as `_id`, carries
//! `createdAt`/`updatedAt`, and refers to other documents by id.

pub mod activity;
pub mod automation;
pub mod comment;
pub mod notification;
pub mod project;
pub mod task;
pub mod team;
pub mod user;
pub mod workspace;

pub use activity::{ActivityAction, ActivityLog};
pub use automation::{ActionType, Automation, AutomationAction, Trigger, TriggerConditions, TriggerType};
pub use comment::{Comment, Reaction};
pub use notification::{NewNotification, Notification, NotificationType};
pub use project::{
    CustomField, CustomFieldType, Privacy, Project, ProjectMember, ProjectRole, ProjectStatus,
    ProjectView, Section,
};
pub use task::{Attachment, Dependencies, DependencyType, Priority, Subtask, Task, TaskStatus};
pub use team::{Team, TeamMember, TeamRole};
pub use user::{Preferences, PreferencesUpdate, User, UserProfile, UserRole, UserSummary};
pub use workspace::{
    PendingInvitation, Workspace, WorkspaceMember, WorkspaceRole, WorkspaceSettings,
    WorkspaceSettingsUpdate,
};
