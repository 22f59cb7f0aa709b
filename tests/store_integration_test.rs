//! Database-backed integration tests
//!
//! These exercise the task store, identity resolver, and notification
//! fan-out against a real Postgres database. They skip silently when
//! TASKBUDDY_TEST_DATABASE_URL is not set or unreachable, so the suite
//! stays green on machines without a test database.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;

use TaskBuddy::config::Settings;
use TaskBuddy::database::DatabaseService;
use TaskBuddy::models::notification::{CreateNotificationRequest, NotificationType};
use TaskBuddy::models::task::{CreateTaskRequest, TaskFilter, TaskPriority, TaskStatus, UpdateTaskRequest};
use TaskBuddy::models::user::{CreateUserRequest, Platform, UserRole};
use TaskBuddy::services::ServiceFactory;

async fn test_services() -> Option<(ServiceFactory, DatabaseService)> {
    let url = std::env::var("TASKBUDDY_TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .ok()?;
    sqlx::migrate!("./migrations").run(&pool).await.ok()?;

    let db = DatabaseService::new(pool);
    let services = ServiceFactory::new(Settings::default(), db.clone(), Vec::new()).ok()?;
    Some((services, db))
}

fn unique(name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}_{}", name, nanos)
}

async fn member(db: &DatabaseService, name: &str) -> i64 {
    member_with_role(db, name, UserRole::Member).await
}

async fn member_with_role(db: &DatabaseService, name: &str, role: UserRole) -> i64 {
    db.users
        .create(CreateUserRequest {
            username: unique(name),
            discord_id: None,
            telegram_id: None,
            role: Some(role),
        })
        .await
        .expect("create user")
        .id
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "creator").await;

    let created = services
        .task_service
        .create(CreateTaskRequest {
            title: "Ship release".to_string(),
            description: None,
            priority: None,
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create task");

    assert_eq!(created.status, TaskStatus::Todo);
    assert_eq!(created.priority, TaskPriority::Medium);
    assert_eq!(created.assignee_id, None);
    assert_eq!(created.created_by, Some(creator));
    assert!(created.creator.is_some());

    let fetched = services
        .task_service
        .get(created.id)
        .await
        .expect("get task")
        .expect("task exists");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_rejects_blank_title_and_unknown_creator() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "validator").await;

    let blank = services
        .task_service
        .create(CreateTaskRequest {
            title: "   ".to_string(),
            description: None,
            priority: None,
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await;
    assert!(blank.is_err());

    let phantom = services
        .task_service
        .create(CreateTaskRequest {
            title: "Orphan".to_string(),
            description: None,
            priority: None,
            assignee_id: None,
            created_by: i64::MAX - 7,
            deadline: None,
        })
        .await;
    assert!(phantom.is_err());
}

#[tokio::test]
async fn empty_partial_update_is_idempotent() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "noop").await;

    let created = services
        .task_service
        .create(CreateTaskRequest {
            title: "Untouched".to_string(),
            description: Some("leave me be".to_string()),
            priority: Some(TaskPriority::High),
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create task");

    let updated = services
        .task_service
        .update(created.id, UpdateTaskRequest::default())
        .await
        .expect("update task")
        .expect("task exists");

    assert_eq!(updated, created);
}

#[tokio::test]
async fn partial_update_changes_only_supplied_fields() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "partial").await;

    let created = services
        .task_service
        .create(CreateTaskRequest {
            title: "Keep title".to_string(),
            description: Some("keep description".to_string()),
            priority: Some(TaskPriority::Urgent),
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create task");

    let updated = services
        .task_service
        .update(
            created.id,
            UpdateTaskRequest {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await
        .expect("update task")
        .expect("task exists");

    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.priority, created.priority);
    assert_eq!(updated.assignee_id, created.assignee_id);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn assignment_scenario_notifies_the_new_assignee_once() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "scenario_creator").await;
    let assignee = member(&db, "scenario_assignee").await;

    let title = unique("Ship release");
    let created = services
        .task_service
        .create(CreateTaskRequest {
            title: title.clone(),
            description: None,
            priority: None,
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create task");

    assert_eq!(created.status, TaskStatus::Todo);
    assert_eq!(created.priority, TaskPriority::Medium);
    assert!(created.assignee.is_none());

    let updated = services
        .task_service
        .update(
            created.id,
            UpdateTaskRequest {
                assignee_id: Some(Some(assignee)),
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .expect("update task")
        .expect("task exists");

    assert_eq!(updated.assignee_id, Some(assignee));
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert!(updated.updated_at >= created.updated_at);

    let assigned: Vec<_> = db
        .notifications
        .list_unread(assignee)
        .await
        .expect("list unread")
        .into_iter()
        .filter(|n| n.kind == NotificationType::TaskAssigned && n.message.contains(&title))
        .collect();
    assert_eq!(assigned.len(), 1);
}

#[tokio::test]
async fn unassign_clears_the_assignee() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "unassign_creator").await;
    let assignee = member(&db, "unassign_assignee").await;

    let created = services
        .task_service
        .create(CreateTaskRequest {
            title: "Hot potato".to_string(),
            description: None,
            priority: None,
            assignee_id: Some(assignee),
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create task");
    assert_eq!(created.assignee_id, Some(assignee));

    let updated = services
        .task_service
        .update(
            created.id,
            UpdateTaskRequest {
                assignee_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("update task")
        .expect("task exists");

    assert_eq!(updated.assignee_id, None);
    assert!(updated.assignee.is_none());
}

#[tokio::test]
async fn update_of_unknown_task_returns_none() {
    let Some((services, _db)) = test_services().await else { return };

    let missing = services
        .task_service
        .update(
            i64::MAX - 11,
            UpdateTaskRequest {
                title: Some("ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update should not error");
    assert!(missing.is_none());
}

#[tokio::test]
async fn identity_merge_links_instead_of_duplicating() {
    let Some((services, _db)) = test_services().await else { return };
    let identity = &services.identity_service;

    let display_name = unique("casey");
    let discord_ref = unique("d");
    let telegram_ref = unique("t");

    let first = identity
        .resolve_or_create(Platform::Discord, &discord_ref, &display_name)
        .await
        .expect("resolve via discord");
    assert_eq!(first.role, UserRole::Member);
    assert_eq!(first.discord_id.as_deref(), Some(discord_ref.as_str()));

    // Same human arrives via Telegram with the same display name
    let second = identity
        .resolve_or_create(Platform::Telegram, &telegram_ref, &display_name)
        .await
        .expect("resolve via telegram");
    assert_eq!(second.id, first.id);
    assert_eq!(second.telegram_id.as_deref(), Some(telegram_ref.as_str()));
    assert_eq!(second.discord_id.as_deref(), Some(discord_ref.as_str()));

    // Resolving the same platform reference again is idempotent
    let third = identity
        .resolve_or_create(Platform::Discord, &discord_ref, &display_name)
        .await
        .expect("resolve again");
    assert_eq!(third.id, first.id);
}

#[tokio::test]
async fn role_hierarchy_checks() {
    let Some((services, db)) = test_services().await else { return };
    let identity = &services.identity_service;

    let admin = member_with_role(&db, "perm_admin", UserRole::Admin).await;
    let manager = member_with_role(&db, "perm_manager", UserRole::Manager).await;
    let plain = member_with_role(&db, "perm_member", UserRole::Member).await;

    assert!(identity.has_permission(admin, UserRole::Member).await.unwrap());
    assert!(identity.has_permission(admin, UserRole::Admin).await.unwrap());
    assert!(identity.has_permission(manager, UserRole::Manager).await.unwrap());
    assert!(!identity.has_permission(manager, UserRole::Admin).await.unwrap());
    assert!(!identity.has_permission(plain, UserRole::Admin).await.unwrap());
    assert!(!identity.has_permission(i64::MAX - 3, UserRole::Member).await.unwrap());
}

#[tokio::test]
async fn task_created_fans_out_to_admins_and_managers_except_creator() {
    let Some((services, db)) = test_services().await else { return };

    let admin_one = member_with_role(&db, "fanout_admin1", UserRole::Admin).await;
    let admin_two = member_with_role(&db, "fanout_admin2", UserRole::Admin).await;
    let creator = member_with_role(&db, "fanout_creator", UserRole::Manager).await;

    let title = unique("Fan-out probe");
    services
        .task_service
        .create(CreateTaskRequest {
            title: title.clone(),
            description: None,
            priority: None,
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create task");

    for admin in [admin_one, admin_two] {
        let received: Vec<_> = db
            .notifications
            .list_unread(admin)
            .await
            .expect("list unread")
            .into_iter()
            .filter(|n| n.kind == NotificationType::TaskCreated && n.message.contains(&title))
            .collect();
        assert_eq!(received.len(), 1, "admin {} should hear exactly once", admin);
    }

    // The creator is a manager but never hears about their own task
    let creator_rows: Vec<_> = db
        .notifications
        .list_unread(creator)
        .await
        .expect("list unread")
        .into_iter()
        .filter(|n| n.message.contains(&title))
        .collect();
    assert!(creator_rows.is_empty());
}

#[tokio::test]
async fn deadline_window_is_half_open_and_skips_done() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "deadline_creator").await;

    let make = |title: String, deadline| CreateTaskRequest {
        title,
        description: None,
        priority: None,
        assignee_id: None,
        created_by: creator,
        deadline: Some(deadline),
    };

    let now = Utc::now();
    let soon = services
        .task_service
        .create(make(unique("due_soon"), now + Duration::hours(1)))
        .await
        .expect("create");
    let past = services
        .task_service
        .create(make(unique("overdue"), now - Duration::hours(1)))
        .await
        .expect("create");
    let far = services
        .task_service
        .create(make(unique("due_late"), now + Duration::hours(100)))
        .await
        .expect("create");
    let finished = services
        .task_service
        .create(make(unique("wrapped_up"), now + Duration::hours(1)))
        .await
        .expect("create");
    services
        .task_service
        .update(
            finished.id,
            UpdateTaskRequest {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await
        .expect("update")
        .expect("task exists");

    let window = services
        .task_service
        .list_with_deadline_within(2)
        .await
        .expect("window query");

    let ids: Vec<i64> = window.iter().map(|t| t.id).collect();
    assert!(ids.contains(&soon.id));
    assert!(!ids.contains(&past.id));
    assert!(!ids.contains(&far.id));
    assert!(!ids.contains(&finished.id));

    // Every returned row respects the bounds, whatever else is in the table
    let cutoff = Utc::now() + Duration::hours(2);
    for task in &window {
        let deadline = task.deadline.expect("windowed tasks have deadlines");
        assert!(deadline <= cutoff);
        assert!(task.status != TaskStatus::Done);
    }
}

#[tokio::test]
async fn deleting_a_user_leaves_null_joins_behind() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "leaver").await;

    let created = services
        .task_service
        .create(CreateTaskRequest {
            title: "Abandoned".to_string(),
            description: None,
            priority: None,
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create task");

    assert!(services
        .identity_service
        .remove_member(creator)
        .await
        .expect("delete user"));

    let orphaned = services
        .task_service
        .get(created.id)
        .await
        .expect("get task")
        .expect("task survives");
    assert_eq!(orphaned.created_by, None);
    assert!(orphaned.creator.is_none());
}

#[tokio::test]
async fn delete_task_reports_whether_a_row_went_away() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "deleter").await;

    let created = services
        .task_service
        .create(CreateTaskRequest {
            title: "Short lived".to_string(),
            description: None,
            priority: None,
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create task");

    assert!(services.task_service.delete(created.id).await.expect("delete"));
    assert!(services.task_service.get(created.id).await.expect("get").is_none());
    assert!(!services.task_service.delete(created.id).await.expect("second delete"));
}

#[tokio::test]
async fn list_filters_by_creator_and_unassigned() {
    let Some((services, db)) = test_services().await else { return };
    let creator = member(&db, "filterer").await;
    let assignee = member(&db, "filter_assignee").await;

    let assigned = services
        .task_service
        .create(CreateTaskRequest {
            title: "Mine".to_string(),
            description: None,
            priority: None,
            assignee_id: Some(assignee),
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create");
    let unassigned = services
        .task_service
        .create(CreateTaskRequest {
            title: "Nobody's".to_string(),
            description: None,
            priority: None,
            assignee_id: None,
            created_by: creator,
            deadline: None,
        })
        .await
        .expect("create");

    let mine = services
        .task_service
        .list(&TaskFilter {
            created_by: Some(creator),
            ..Default::default()
        })
        .await
        .expect("list");
    let ids: Vec<i64> = mine.iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), 2);
    // Newest first
    assert_eq!(ids, vec![unassigned.id, assigned.id]);

    let floating = services
        .task_service
        .list(&TaskFilter {
            created_by: Some(creator),
            assignee_id: Some(None),
            ..Default::default()
        })
        .await
        .expect("list");
    assert_eq!(floating.len(), 1);
    assert_eq!(floating[0].id, unassigned.id);

    let theirs = services
        .task_service
        .list_for_assignee(assignee)
        .await
        .expect("list for assignee");
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].id, assigned.id);
}

#[tokio::test]
async fn notifications_can_be_read_and_acknowledged() {
    let Some((services, db)) = test_services().await else { return };
    let user = member(&db, "reader").await;

    let created = db
        .notifications
        .create(CreateNotificationRequest {
            user_id: user,
            message: "manual note".to_string(),
            kind: NotificationType::StatusChanged,
        })
        .await
        .expect("create notification");
    assert!(!created.is_read);

    let unread = services
        .notification_dispatcher
        .unread_for_user(user)
        .await
        .expect("unread");
    assert!(unread.iter().any(|n| n.id == created.id));

    assert!(services
        .notification_dispatcher
        .mark_as_read(created.id)
        .await
        .expect("mark read"));

    let unread = services
        .notification_dispatcher
        .unread_for_user(user)
        .await
        .expect("unread");
    assert!(!unread.iter().any(|n| n.id == created.id));
}
