use std::collections::BTreeSet;

use taskman_core::filter::{Pagination, TaskFilter, UserFilter};
use taskman_core::models::{NewLabel, NewTask, NewTaskStatus, NewUser, Role};
use taskman_core::store::{LabelStore, TaskStatusStore, TaskStore, UserStore};
use taskman_core::{AppError, PasswordHasher, TaskService, seed_defaults, seed_demo};
use taskman_db::Backend;

use crate::integration::common::setup_test_db;

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.into(),
        first_name: Some("Jane".into()),
        last_name: Some("Doe".into()),
        password_digest: "$argon2id$placeholder".into(),
        role: Role::User,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn user_round_trip_and_unique_email() {
    let (db, _container) = setup_test_db().await;
    let users = db.users();

    let created = users.create_user(new_user("jane@example.com")).await.unwrap();
    assert_eq!(created.role, Role::User);

    let found = users
        .find_user_by_email("jane@example.com")
        .await
        .unwrap()
        .expect("Should find the user");
    assert_eq!(found.id, created.id);

    let err = users
        .create_user(new_user("jane@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn user_filters_and_pagination() {
    let (db, _container) = setup_test_db().await;
    let users = db.users();
    for i in 0..12 {
        users
            .create_user(new_user(&format!("user{i}@example.com")))
            .await
            .unwrap();
    }

    let page = users
        .list_users(&UserFilter::default(), Pagination::new(Some(2), Some(5)))
        .await
        .unwrap();
    assert_eq!(page.total, 12);
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.items[0].email, "user5@example.com");

    let filter = UserFilter {
        email_cont: Some("USER1".into()),
        ..Default::default()
    };
    let page = users.list_users(&filter, Pagination::default()).await.unwrap();
    // user1, user10, user11
    assert_eq!(page.total, 3);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn like_wildcards_are_matched_literally() {
    let (db, _container) = setup_test_db().await;
    let users = db.users();
    users.create_user(new_user("a_b@example.com")).await.unwrap();
    users.create_user(new_user("axb@example.com")).await.unwrap();

    let filter = UserFilter {
        email_cont: Some("a_b".into()),
        ..Default::default()
    };
    let page = users.list_users(&filter, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn task_labels_are_replaced_atomically() {
    let (db, _container) = setup_test_db().await;
    let status = db
        .task_statuses()
        .create_status(NewTaskStatus::new("Draft", "draft"))
        .await
        .unwrap();
    let feature = db.labels().create_label(NewLabel::new("feature")).await.unwrap();
    let bug = db.labels().create_label(NewLabel::new("bug")).await.unwrap();

    let tasks = db.tasks();
    let mut task = tasks
        .create_task(NewTask {
            index: Some(1),
            name: "Implement user authentication".into(),
            description: Some("Develop secure login".into()),
            task_status_id: status.id,
            assignee_id: None,
            label_ids: BTreeSet::from([feature.id, bug.id]),
        })
        .await
        .unwrap();
    assert_eq!(task.status_slug, "draft");
    assert_eq!(task.label_ids, BTreeSet::from([feature.id, bug.id]));

    task.label_ids = BTreeSet::from([bug.id]);
    task.name = "Implement login".into();
    let updated = tasks.update_task(&task).await.unwrap();
    assert_eq!(updated.name, "Implement login");
    assert_eq!(updated.label_ids, BTreeSet::from([bug.id]));

    assert!(tasks.has_tasks_with_label(bug.id).await.unwrap());
    assert!(!tasks.has_tasks_with_label(feature.id).await.unwrap());

    // Deleting a label still linked to a task trips the foreign key.
    let err = db.labels().delete_label(bug.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    assert!(tasks.delete_task(task.id).await.unwrap());
    assert!(db.labels().delete_label(bug.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn task_with_missing_status_is_conflict() {
    let (db, _container) = setup_test_db().await;
    let err = db
        .tasks()
        .create_task(NewTask {
            index: None,
            name: "Orphan".into(),
            description: None,
            task_status_id: 4242,
            assignee_id: None,
            label_ids: BTreeSet::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn seeded_data_is_filterable_through_backend() {
    let (db, _container) = setup_test_db().await;
    let backend = Backend::Postgres(db);
    let hasher = PasswordHasher::with_params(8, 1).unwrap();

    seed_defaults(&backend, &hasher, &Default::default())
        .await
        .unwrap();
    seed_demo(&backend, &hasher).await.unwrap();
    assert_eq!(backend.count_tasks().await.unwrap(), 8);

    let tasks = TaskService::new(backend.clone());
    let filter = TaskFilter {
        title_cont: Some("bug".into()),
        status: Some("to_be_fixed".into()),
        ..Default::default()
    };
    let page = tasks.list(&filter, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Fix payment processing bug");
    assert_eq!(page.items[0].label_ids.len(), 2);

    assert!(backend.health_check().await.is_ok());
}
