use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minimum number of characters in a thread or comment body
pub const MIN_THREAD_LENGTH: usize = 3;

/// A single failed rule, addressed by the JSON field it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// All issues found while validating a submission
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}", format_issues(.issues))]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn has_path(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

#[derive(Default)]
struct Collector {
    issues: Vec<ValidationIssue>,
}

impl Collector {
    fn thread_body(&mut self, path: &str, value: &str) {
        let len = value.chars().count();
        if len == 0 {
            self.issues
                .push(ValidationIssue::new(path, "String must contain at least 1 character(s)"));
        }
        if len < MIN_THREAD_LENGTH {
            self.issues.push(ValidationIssue::new(
                path,
                format!("String must contain at least {} character(s)", MIN_THREAD_LENGTH),
            ));
        }
    }

    fn required(&mut self, path: &str, value: &str) {
        if value.is_empty() {
            self.issues.push(ValidationIssue::new(path, "Required"));
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { issues: self.issues })
        }
    }
}

/// New top-level thread submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadValidation {
    pub thread: String,
    /// Storage id of the authoring user
    pub account_id: String,
}

impl ThreadValidation {
    pub fn new(thread: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            thread: thread.into(),
            account_id: account_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut collector = Collector::default();
        collector.thread_body("thread", &self.thread);
        collector.required("accountId", &self.account_id);
        collector.finish()
    }
}

/// Reply submission; the author comes from the authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentValidation {
    pub thread: String,
}

impl CommentValidation {
    pub fn new(thread: impl Into<String>) -> Self {
        Self {
            thread: thread.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut collector = Collector::default();
        collector.thread_body("thread", &self.thread);
        collector.finish()
    }
}
