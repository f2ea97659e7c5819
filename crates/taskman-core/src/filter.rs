//! List filters and pagination shared by every store backend.
//!
//! All predicates are AND-combined. `*_cont` predicates are case-insensitive
//! substring matches. The PostgreSQL repositories render the same rules in SQL;
//! [`UserFilter::matches`] and [`TaskFilter::matches`] are the in-memory form.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{Task, User};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Normalize raw query values: page defaults to 1, size to 10 and is capped at 100.
    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    /// Slice an already-ordered collection.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.size as usize)
            .collect()
    }
}

/// One page of results plus the number of rows matching the filter.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub email_cont: Option<String>,
    pub first_name: Option<String>,
    pub first_name_cont: Option<String>,
    pub last_name: Option<String>,
    pub last_name_cont: Option<String>,
    pub created_at: Option<NaiveDate>,
    pub created_at_gt: Option<NaiveDate>,
    pub created_at_lt: Option<NaiveDate>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        let created = user.created_at.date_naive();

        self.id.is_none_or(|id| user.id == id)
            && self.email.as_deref().is_none_or(|e| user.email == e)
            && self
                .email_cont
                .as_deref()
                .is_none_or(|p| contains_ci(&user.email, p))
            && self
                .first_name
                .as_deref()
                .is_none_or(|n| user.first_name.as_deref() == Some(n))
            && self
                .first_name_cont
                .as_deref()
                .is_none_or(|p| user.first_name.as_deref().is_some_and(|n| contains_ci(n, p)))
            && self
                .last_name
                .as_deref()
                .is_none_or(|n| user.last_name.as_deref() == Some(n))
            && self
                .last_name_cont
                .as_deref()
                .is_none_or(|p| user.last_name.as_deref().is_some_and(|n| contains_ci(n, p)))
            && self.created_at.is_none_or(|d| created == d)
            && self.created_at_gt.is_none_or(|d| created > d)
            && self.created_at_lt.is_none_or(|d| created < d)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub title_cont: Option<String>,
    pub assignee_id: Option<i64>,
    /// Status slug.
    pub status: Option<String>,
    pub label_id: Option<i64>,
}

impl TaskFilter {
    /// `title_cont` with blank values treated as absent.
    pub fn title_cont(&self) -> Option<&str> {
        non_blank(self.title_cont.as_deref())
    }

    /// `status` with blank values treated as absent.
    pub fn status(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.title_cont().is_none_or(|p| contains_ci(&task.name, p))
            && self
                .assignee_id
                .is_none_or(|id| task.assignee_id == Some(id))
            && self.status().is_none_or(|slug| task.status_slug == slug)
            && self.label_id.is_none_or(|id| task.label_ids.contains(&id))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escape `%`, `_` and `\` so user input is matched literally by `LIKE`.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
