//! Periodic housekeeping
//!
//! One background task purges stale activity and notifications and sweeps
//! task due dates. Reminders are remembered in-process, so each open task is
//! notified at most once per kind while it stays open and dated. A task that
//! is unassigned when it comes due is reminded once someone is assigned.

use super::{ServiceContext, isolate};
use crate::models::activity::ACTIVITY_RETENTION_DAYS;
use crate::models::notification::NOTIFICATION_RETENTION_DAYS;
use crate::models::{Task, TriggerType};
use crate::utils::error::Result;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashSet;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How often the sweep runs
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60 * 60);

/// Tasks due within this window get a due-soon reminder
const DUE_SOON_WINDOW_DAYS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Reminder {
    DueSoon,
    Overdue,
    /// `due_date_approaching` automations, which fire whether or not anyone is assigned
    DueSoonRules,
}

/// What one sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub activity_purged: usize,
    pub notifications_purged: usize,
    pub due_soon: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone)]
pub struct Maintenance {
    ctx: ServiceContext,
    reminded: Arc<DashSet<(Uuid, Reminder)>>,
}

impl Maintenance {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            reminded: Arc::new(DashSet::new()),
        }
    }

    /// Run [`Maintenance::sweep`] every `period`, starting immediately
    pub fn spawn(self, period: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match self.sweep(Utc::now()).await {
                    Ok(report) => debug!("Maintenance sweep: {:?}", report),
                    Err(e) => warn!("Maintenance sweep failed: {}", e),
                }
            }
        })
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut report = SweepReport {
            activity_purged: self
                .ctx
                .activity()
                .purge_before(now - Duration::days(ACTIVITY_RETENTION_DAYS))
                .await?,
            notifications_purged: self
                .ctx
                .notifier()
                .purge_before(now - Duration::days(NOTIFICATION_RETENTION_DAYS))
                .await?,
            ..Default::default()
        };

        let open: Vec<Task> = self
            .ctx
            .store
            .find(|t: &Task| !t.is_completed() && t.due_date.is_some())
            .await?;
        let open_ids: HashSet<Uuid> = open.iter().map(|t| t.id).collect();
        self.reminded.retain(|(task, _)| open_ids.contains(task));

        let due_soon_until = now + Duration::days(DUE_SOON_WINDOW_DAYS);
        let notifier = self.ctx.notifier();

        for mut task in open {
            let Some(due) = task.due_date else { continue };
            let assigned = task.assignee.is_some();
            if due < now {
                if assigned && self.first_time(task.id, Reminder::Overdue) {
                    isolate("Overdue notice", notifier.notify_overdue_task(&task).await);
                    report.overdue += 1;
                }
            } else if due <= due_soon_until {
                if assigned && self.first_time(task.id, Reminder::DueSoon) {
                    isolate(
                        "Due-soon notice",
                        notifier
                            .notify_due_date_approaching(&task, days_until(now, due))
                            .await,
                    );
                    report.due_soon += 1;
                }
                if self.first_time(task.id, Reminder::DueSoonRules) {
                    self.ctx
                        .automations()
                        .execute(TriggerType::DueDateApproaching, &mut task)
                        .await;
                }
            }
        }

        if report != SweepReport::default() {
            info!(
                activity = report.activity_purged,
                notifications = report.notifications_purged,
                due_soon = report.due_soon,
                overdue = report.overdue,
                "Maintenance sweep finished"
            );
        }
        Ok(report)
    }

    fn first_time(&self, task: Uuid, kind: Reminder) -> bool {
        self.reminded.insert((task, kind))
    }
}

/// Whole days until `due`, rounded up and never below one
fn days_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let hours = (due - now).num_hours();
    ((hours + 23) / 24).max(1)
}
