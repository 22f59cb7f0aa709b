//! Deadline reminder sweep
//!
//! One pass over the configured look-ahead windows, notifying assignees of
//! unfinished tasks whose deadline is approaching. The periodic trigger is
//! external; the binary drives this on an interval. A matching task is
//! re-notified on the next sweep — suppression is the trigger's concern.

use chrono::{DateTime, Utc};
use tracing::{info, warn, debug};

use crate::services::notification::NotificationDispatcher;
use crate::services::task::TaskService;
use crate::utils::errors::Result;

/// Whole hours until the deadline, rounded up, never negative.
pub fn hours_left(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let minutes = (deadline - now).num_minutes();
    if minutes <= 0 {
        return 0;
    }
    (minutes + 59) / 60
}

/// Sweep the given windows and dispatch reminders to assignees.
/// Unassigned tasks are skipped. Returns the number of reminders sent.
pub async fn run_sweep(
    tasks: &TaskService,
    dispatcher: &NotificationDispatcher,
    windows: &[i64],
) -> Result<usize> {
    let mut sent = 0;

    for &window in windows {
        let due = tasks.list_with_deadline_within(window).await?;
        debug!(window_hours = window, matches = due.len(), "Deadline sweep window");

        for task in due {
            let Some(assignee) = task.assignee.clone() else {
                continue;
            };
            let Some(deadline) = task.deadline else {
                continue;
            };

            let remaining = hours_left(deadline, Utc::now());
            match dispatcher.notify_deadline_reminder(&task, &assignee, remaining).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!(task_id = task.id, error = %e, "Failed to dispatch deadline reminder");
                }
            }
        }
    }

    if sent > 0 {
        info!(reminders = sent, "Deadline sweep completed");
    }

    Ok(sent)
}
