//! User accounts and their preferences

use crate::storage::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    /// Stored lowercased and trimmed
    pub email: String,
    /// Argon2 PHC string; never leaves the store, see [`User::profile`]
    pub password_hash: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub workspaces: Vec<Uuid>,
    #[serde(default)]
    pub teams: Vec<Uuid>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub onboarded: bool,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            avatar: String::new(),
            role: UserRole::User,
            workspaces: Vec::new(),
            teams: Vec::new(),
            preferences: Preferences::default(),
            onboarded: false,
            last_active: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Response view without credentials
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            role: self.role,
            workspaces: self.workspaces.clone(),
            teams: self.teams.clone(),
            preferences: self.preferences.clone(),
            onboarded: self.onboarded,
            last_active: self.last_active,
            created_at: self.created_at,
        }
    }

    /// Compact view used wherever a user reference is populated
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

/// Public account fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub role: UserRole,
    pub workspaces: Vec<Uuid>,
    pub teams: Vec<Uuid>,
    pub preferences: Preferences,
    pub onboarded: bool,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub notifications: NotificationPreferences,
    #[serde(default = "crate::config::models::default_true")]
    pub keyboard_shortcuts: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            notifications: NotificationPreferences::default(),
            keyboard_shortcuts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub mentions: bool,
    pub assignments: bool,
    pub due_dates: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            mentions: true,
            assignments: true,
            due_dates: true,
        }
    }
}

/// Partial preferences accepted by the profile endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub theme: Option<Theme>,
    pub notifications: Option<NotificationPreferencesUpdate>,
    pub keyboard_shortcuts: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferencesUpdate {
    pub email: Option<bool>,
    pub push: Option<bool>,
    pub mentions: Option<bool>,
    pub assignments: Option<bool>,
    pub due_dates: Option<bool>,
}

impl Preferences {
    /// Overwrite only the fields present in `update`
    pub fn merge(&mut self, update: PreferencesUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(shortcuts) = update.keyboard_shortcuts {
            self.keyboard_shortcuts = shortcuts;
        }
        if let Some(n) = update.notifications {
            let current = &mut self.notifications;
            current.email = n.email.unwrap_or(current.email);
            current.push = n.push.unwrap_or(current.push);
            current.mentions = n.mentions.unwrap_or(current.mentions);
            current.assignments = n.assignments.unwrap_or(current.assignments);
            current.due_dates = n.due_dates.unwrap_or(current.due_dates);
        }
    }
}
