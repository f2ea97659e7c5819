use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;
use crate::patch::Patch;

pub const PASSWORD_MIN_LEN: usize = 3;
pub const LABEL_NAME_MIN_LEN: usize = 3;
pub const LABEL_NAME_MAX_LEN: usize = 1000;
/// Column width of e-mails, names, slugs and task titles.
pub const MAX_FIELD_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Authorization role of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input, carrying the plain-text password.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl CreateUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: None,
            last_name: None,
            password: password.into(),
            role: Role::User,
        }
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn validate(&self) -> Result<(), crate::AppError> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        if let Some(first_name) = &self.first_name {
            check_max_len(&mut errors, "firstName", first_name);
        }
        if let Some(last_name) = &self.last_name {
            check_max_len(&mut errors, "lastName", last_name);
        }
        errors.into_result()
    }
}

/// Row to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_digest: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Patch<String>,
    #[serde(default)]
    pub last_name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), crate::AppError> {
        let mut errors = FieldErrors::new();
        match &self.email {
            Patch::Value(email) => check_email(&mut errors, email),
            Patch::Null => errors.add("email", "Email is required"),
            Patch::Missing => {}
        }
        match &self.password {
            Patch::Value(password) => check_password(&mut errors, password),
            Patch::Null => errors.add("password", "Minimum 3 characters"),
            Patch::Missing => {}
        }
        if let Patch::Value(first_name) = &self.first_name {
            check_max_len(&mut errors, "firstName", first_name);
        }
        if let Patch::Value(last_name) = &self.last_name {
            check_max_len(&mut errors, "lastName", last_name);
        }
        errors.into_result()
    }
}

// ---------------------------------------------------------------------------
// Task statuses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTaskStatus {
    pub name: String,
    pub slug: String,
}

impl NewTaskStatus {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), crate::AppError> {
        let mut errors = FieldErrors::new();
        check_not_blank(&mut errors, "name", &self.name);
        check_not_blank(&mut errors, "slug", &self.slug);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatusUpdate {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub slug: Patch<String>,
}

impl TaskStatusUpdate {
    pub fn validate(&self) -> Result<(), crate::AppError> {
        let mut errors = FieldErrors::new();
        check_patch_not_blank(&mut errors, "name", &self.name);
        check_patch_not_blank(&mut errors, "slug", &self.slug);
        errors.into_result()
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLabel {
    pub name: String,
}

impl NewLabel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), crate::AppError> {
        let mut errors = FieldErrors::new();
        check_label_name(&mut errors, &self.name);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelUpdate {
    #[serde(default)]
    pub name: Patch<String>,
}

impl LabelUpdate {
    pub fn validate(&self) -> Result<(), crate::AppError> {
        let mut errors = FieldErrors::new();
        match &self.name {
            Patch::Value(name) => check_label_name(&mut errors, name),
            Patch::Null => errors.add("name", "must not be blank"),
            Patch::Missing => {}
        }
        errors.into_result()
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub index: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub task_status_id: i64,
    /// Slug of the referenced status, resolved when the task is read.
    pub status_slug: String,
    pub assignee_id: Option<i64>,
    pub label_ids: BTreeSet<i64>,
    pub created_at: DateTime<Utc>,
}

/// Task creation input as received from the API: the status is a slug.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTask {
    pub index: Option<i32>,
    pub title: String,
    pub content: Option<String>,
    pub status: String,
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub label_ids: BTreeSet<i64>,
}

impl CreateTask {
    pub fn new(title: &str, status: &str) -> Self {
        Self {
            title: title.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), crate::AppError> {
        let mut errors = FieldErrors::new();
        check_not_blank(&mut errors, "title", &self.title);
        check_not_blank(&mut errors, "status", &self.status);
        errors.into_result()
    }
}

/// Row to insert; references are already resolved to ids.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub index: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub task_status_id: i64,
    pub assignee_id: Option<i64>,
    pub label_ids: BTreeSet<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub index: Patch<i32>,
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub content: Patch<String>,
    #[serde(default)]
    pub status: Patch<String>,
    #[serde(default)]
    pub assignee_id: Patch<i64>,
    #[serde(default)]
    pub label_ids: Patch<BTreeSet<i64>>,
}

impl TaskUpdate {
    pub fn validate(&self) -> Result<(), crate::AppError> {
        let mut errors = FieldErrors::new();
        check_patch_not_blank(&mut errors, "title", &self.title);
        check_patch_not_blank(&mut errors, "status", &self.status);
        errors.into_result()
    }
}

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

fn check_not_blank(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "must not be blank");
    } else {
        check_max_len(errors, field, value);
    }
}

fn check_max_len(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.chars().count() > MAX_FIELD_LEN {
        errors.add(field, format!("size must be at most {MAX_FIELD_LEN}"));
    }
}

fn check_patch_not_blank(errors: &mut FieldErrors, field: &str, value: &Patch<String>) {
    match value {
        Patch::Value(v) => check_not_blank(errors, field, v),
        Patch::Null => errors.add(field, "must not be blank"),
        Patch::Missing => {}
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if email.chars().count() > MAX_FIELD_LEN {
        errors.add("email", format!("size must be at most {MAX_FIELD_LEN}"));
    } else if !is_valid_email(email) {
        errors.add("email", "must be a well-formed email address");
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.add("password", "Minimum 3 characters");
    }
}

fn check_label_name(errors: &mut FieldErrors, name: &str) {
    let len = name.chars().count();
    if name.trim().is_empty() {
        errors.add("name", "must not be blank");
    } else if !(LABEL_NAME_MIN_LEN..=LABEL_NAME_MAX_LEN).contains(&len) {
        errors.add(
            "name",
            format!("size must be between {LABEL_NAME_MIN_LEN} and {LABEL_NAME_MAX_LEN}"),
        );
    }
}

/// Loose address check: one `@`, non-empty local part and domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
