//! User-facing notifications.

use serde::Serialize;

use crate::bucket::BucketOutcome;
use crate::SiftError;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A message to show once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice for a bucket mutation.
    pub fn for_bucket(outcome: BucketOutcome) -> Self {
        match outcome {
            BucketOutcome::Added => Notice::success("Added to bucket"),
            BucketOutcome::AlreadyPresent => Notice::success("Already in bucket"),
            BucketOutcome::Removed => Notice::success("Removed from bucket"),
            BucketOutcome::NotPresent => Notice::info("Not in bucket"),
            BucketOutcome::Cleared => Notice::success("Bucket cleared"),
        }
    }

    /// Notice for a failed operation.
    pub fn for_error(error: &SiftError) -> Self {
        match error {
            SiftError::Unauthorized => Notice::info("Session expired"),
            SiftError::Server { .. } => Notice::error("Server error, contact support"),
            other => Notice::error(other.to_string()),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
