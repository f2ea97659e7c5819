//! Reference data inserted at startup and by `taskman seed`.

use std::collections::BTreeSet;

use crate::error::AppError;
use crate::models::{CreateUser, NewLabel, NewTask, NewTaskStatus, NewUser, Role};
use crate::password::PasswordHasher;
use crate::store::Store;

pub const DEFAULT_ADMIN_EMAIL: &str = "hexlet@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "qwerty";

pub const DEFAULT_STATUSES: [(&str, &str); 5] = [
    ("Draft", "draft"),
    ("ToReview", "to_review"),
    ("ToBeFixed", "to_be_fixed"),
    ("ToPublish", "to_publish"),
    ("Published", "published"),
];

pub const DEFAULT_LABELS: [&str; 4] = ["feature", "bug", "urgent", "documentation"];

const DEMO_PASSWORD: &str = "password123";

const DEMO_USERS: [(&str, &str, &str); 3] = [
    ("alice.smith@example.com", "Alice", "Smith"),
    ("bob.johnson@example.com", "Bob", "Johnson"),
    ("carol.williams@example.com", "Carol", "Williams"),
];

struct DemoTask {
    title: &'static str,
    content: &'static str,
    status: &'static str,
    assignee: Option<&'static str>,
    labels: &'static [&'static str],
}

const DEMO_TASKS: [DemoTask; 8] = [
    DemoTask {
        title: "Implement user authentication",
        content: "Develop secure login and registration system",
        status: "draft",
        assignee: Some("bob.johnson@example.com"),
        labels: &["feature"],
    },
    DemoTask {
        title: "Fix payment processing bug",
        content: "Payment gateway integration is failing for certain cards",
        status: "to_be_fixed",
        assignee: Some("carol.williams@example.com"),
        labels: &["bug", "urgent"],
    },
    DemoTask {
        title: "Design new dashboard UI",
        content: "Create modern and responsive dashboard interface",
        status: "to_review",
        assignee: Some("alice.smith@example.com"),
        labels: &["feature"],
    },
    DemoTask {
        title: "Write API documentation",
        content: "Document all REST API endpoints with examples",
        status: "to_publish",
        assignee: Some("alice.smith@example.com"),
        labels: &["documentation"],
    },
    DemoTask {
        title: "Research new technologies",
        content: "Investigate potential new frameworks and libraries",
        status: "draft",
        assignee: None,
        labels: &[],
    },
    DemoTask {
        title: "Performance optimization",
        content: "Improve application performance and reduce load times",
        status: "published",
        assignee: Some("carol.williams@example.com"),
        labels: &["feature", "urgent"],
    },
    DemoTask {
        title: "Database migration",
        content: "Migrate from MySQL to PostgreSQL",
        status: "to_be_fixed",
        assignee: Some("bob.johnson@example.com"),
        labels: &["feature"],
    },
    DemoTask {
        title: "Security audit",
        content: "Conduct comprehensive security review of the application",
        status: "to_review",
        assignee: Some("alice.smith@example.com"),
        labels: &["urgent"],
    },
];

/// Credentials of the bootstrap administrator.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
}

impl Default for AdminAccount {
    fn default() -> Self {
        Self {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

/// Number of rows a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub statuses: usize,
    pub labels: usize,
    pub tasks: usize,
}

/// Insert the admin account, default statuses and default labels.
///
/// Rows that already exist are left alone, so this is safe on every start.
pub async fn seed_defaults<S: Store>(
    store: &S,
    hasher: &PasswordHasher,
    admin: &AdminAccount,
) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    if ensure_user(
        store,
        hasher,
        &admin.email,
        &admin.password,
        ("Hexlet", "Admin"),
        Role::Admin,
    )
    .await?
    {
        report.users += 1;
    }

    for (name, slug) in DEFAULT_STATUSES {
        if store.find_status_by_slug(slug).await?.is_none() {
            store.create_status(NewTaskStatus::new(name, slug)).await?;
            report.statuses += 1;
        }
    }

    for name in DEFAULT_LABELS {
        if store.find_label_by_name(name).await?.is_none() {
            store.create_label(NewLabel::new(name)).await?;
            report.labels += 1;
        }
    }

    tracing::info!(
        users = report.users,
        statuses = report.statuses,
        labels = report.labels,
        "Default data seeded"
    );
    Ok(report)
}

/// Insert three demo users and eight demo tasks.
///
/// Tasks are only created while the task table is empty. Expects
/// [`seed_defaults`] to have run first.
pub async fn seed_demo<S: Store>(
    store: &S,
    hasher: &PasswordHasher,
) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    for (email, first, last) in DEMO_USERS {
        if ensure_user(store, hasher, email, DEMO_PASSWORD, (first, last), Role::User).await? {
            report.users += 1;
        }
    }

    if store.count_tasks().await? > 0 {
        tracing::info!("Tasks already present, skipping demo tasks");
        return Ok(report);
    }

    for (position, demo) in DEMO_TASKS.iter().enumerate() {
        let status = store
            .find_status_by_slug(demo.status)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task status not found: {}", demo.status)))?;

        let assignee_id = match demo.assignee {
            Some(email) => store.find_user_by_email(email).await?.map(|u| u.id),
            None => None,
        };

        let mut label_ids = BTreeSet::new();
        for name in demo.labels {
            if let Some(label) = store.find_label_by_name(name).await? {
                label_ids.insert(label.id);
            }
        }

        store
            .create_task(NewTask {
                index: Some(position as i32 + 1),
                name: demo.title.to_string(),
                description: Some(demo.content.to_string()),
                task_status_id: status.id,
                assignee_id,
                label_ids,
            })
            .await?;
        report.tasks += 1;
    }

    tracing::info!(
        users = report.users,
        tasks = report.tasks,
        "Demo data seeded"
    );
    Ok(report)
}

async fn ensure_user<S: Store>(
    store: &S,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
    (first_name, last_name): (&str, &str),
    role: Role,
) -> Result<bool, AppError> {
    if store.find_user_by_email(email).await?.is_some() {
        return Ok(false);
    }

    let input = CreateUser::new(email, password)
        .with_name(first_name, last_name)
        .with_role(role);
    input.validate()?;

    store
        .create_user(NewUser {
            password_digest: hasher.hash(&input.password)?,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
        })
        .await?;
    Ok(true)
}
